use std::sync::Arc;
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::actions::restaurant_actions::get_restaurants_action;
use crate::controller::AppState;
use crate::helpers::image_hosts::ImageHostAllowList;
use crate::repositories::server_api::ServerApi;

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/restaurants", get(list_restaurants))
        .route_layer(Extension(app_state.server_api))
        .route_layer(Extension(app_state.image_hosts))
}

fn first_page() -> u32 {
    1
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ListRestaurantsParam {
    #[serde(default = "first_page")]
    pub page: u32,
}

pub async fn list_restaurants(
    Extension(server_api): Extension<Arc<ServerApi>>,
    Extension(image_hosts): Extension<Arc<ImageHostAllowList>>,
    Query(query): Query<ListRestaurantsParam>,
) -> impl IntoResponse {
    let mut restaurants = get_restaurants_action(&server_api, query.page).await;

    for restaurant in restaurants.iter_mut() {
        let blocked = restaurant
            .image()
            .is_some_and(|image| !image_hosts.allows(image));
        if blocked {
            debug!("Dropping image of {:?} from a host outside the allow-list", restaurant.id());
            restaurant.remove_image();
        }
    }

    (StatusCode::OK, Json(restaurants))
}
