pub mod handler_404;
pub mod image_hosts;
