pub mod geoapify_repo;
pub mod server_api;
