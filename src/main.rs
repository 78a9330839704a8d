use std::sync::Arc;
use std::time::Duration;
use anyhow::{ensure, Context};
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use crate::config::Config;
use crate::controller::AppState;
use crate::helpers::image_hosts::ImageHostAllowList;
use crate::models::geocoding::GeocodingParams;
use crate::repositories::geoapify_repo::GeoapifyRepo;
use crate::repositories::server_api::ServerApi;

pub mod actions;
pub mod config;
pub mod controller;
pub mod error;
pub mod helpers;
pub mod models;
pub mod repositories;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::parse();
    info!("Starting kosher directory server ({})", config.environment);

    let geocoding_params = GeocodingParams::from_config(&config);
    ensure!(
        geocoding_params.bounding_box.is_valid(),
        "Geocoding bounding box is inverted: {:?}",
        geocoding_params.bounding_box
    );

    let server_api = ServerApi::new(
        &config.api_base_url,
        Duration::from_secs(config.api_timeout_secs),
    )
    .context("Failed to build the directory API client")?;
    info!("Proxying directory API at {}", server_api.base_url());

    let app_state = AppState {
        server_api: Arc::new(server_api),
        geocoder: Arc::new(GeoapifyRepo::new(Arc::new(geocoding_params))),
        image_hosts: Arc::new(ImageHostAllowList::default()),
    };

    controller::serve(app_state, &config).await
}
