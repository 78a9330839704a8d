use std::sync::Arc;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Extension, Json, Router};
use tracing::warn;
use crate::actions::business_actions::create_business_action;
use crate::controller::AppState;
use crate::error::{BusinessError, GeocodeError};
use crate::models::business::NewBusiness;
use crate::repositories::geoapify_repo::GeoapifyRepo;
use crate::repositories::server_api::ServerApi;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/business", post(create_business))
        .route_layer(Extension(app_state.server_api))
        .route_layer(Extension(app_state.geocoder))
}

pub async fn create_business(
    Extension(server_api): Extension<Arc<ServerApi>>,
    Extension(geocoder): Extension<Arc<GeoapifyRepo>>,
    headers: HeaderMap,
    Json(body): Json<NewBusiness>,
) -> impl IntoResponse {
    let create_res = create_business_action(&server_api, &geocoder, &headers, &body).await;

    match create_res {
        Ok(business) => (StatusCode::CREATED, Json(business)).into_response(),
        Err(BusinessError::Validation(reason)) => {
            (StatusCode::BAD_REQUEST, reason).into_response()
        }
        Err(BusinessError::Geocode(GeocodeError::NotFound(_))) => (
            StatusCode::BAD_REQUEST,
            "Address could not be found inside the service area".to_string(),
        )
            .into_response(),
        Err(e) => {
            warn!("Something went wrong creating business {:?} due to: {}", body.name, e);
            let status = match &e {
                BusinessError::Api(api_error) => api_error
                    .status()
                    .filter(|status| status.is_client_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                _ => StatusCode::BAD_GATEWAY,
            };
            (status, "Failed to create business, please try again!".to_string()).into_response()
        }
    }
}
