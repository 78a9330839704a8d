pub mod business;
pub mod geocoding;
pub mod restaurant;
