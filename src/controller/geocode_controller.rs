use std::sync::Arc;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::controller::AppState;
use crate::models::geocoding::Coordinates;
use crate::repositories::geoapify_repo::GeoapifyRepo;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/geocode", get(geocode_address))
        .route_layer(Extension(app_state.geocoder))
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct GeocodeParam {
    pub address: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub async fn geocode_address(
    Extension(geocoder): Extension<Arc<GeoapifyRepo>>,
    Query(query): Query<GeocodeParam>,
) -> impl IntoResponse {
    if query.address.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, "address is required").into_response();
    }

    let geocode_res = match (query.lat, query.lon) {
        (Some(lat), Some(lon)) => {
            geocoder
                .geocode_near(&query.address, Coordinates { lat, lon })
                .await
        }
        _ => geocoder.geocode(&query.address).await,
    };

    match geocode_res {
        Ok(results) if results.is_empty() => (
            StatusCode::NOT_FOUND,
            "No match for this address inside the service area",
        )
            .into_response(),
        Ok(results) => (StatusCode::OK, Json(results)).into_response(),
        Err(e) => {
            warn!("Something went wrong geocoding {:?} due to: {}", query.address, e);
            (
                StatusCode::BAD_GATEWAY,
                "Failed to look up the address, please try again!",
            )
                .into_response()
        }
    }
}
