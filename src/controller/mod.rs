use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use axum::http::HeaderValue;
use axum::Router;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::Method;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tracing::info;
use crate::config::Config;
use crate::helpers::handler_404::page_not_found_handler;
use crate::helpers::image_hosts::ImageHostAllowList;
use crate::repositories::geoapify_repo::GeoapifyRepo;
use crate::repositories::server_api::ServerApi;

pub mod business_controller;
pub mod geocode_controller;
pub mod health_check;
pub mod restaurant_controller;

#[derive(Clone)]
pub struct AppState {
    pub server_api: Arc<ServerApi>,
    pub geocoder: Arc<GeoapifyRepo>,
    pub image_hosts: Arc<ImageHostAllowList>,
}

pub async fn serve(
    app_state: AppState,
    config: &Config,
) -> anyhow::Result<()> {
    let origins = config
        .origin_urls
        .split(',')
        .map(|s| s.trim().parse::<HeaderValue>())
        .collect::<Result<Vec<HeaderValue>, _>>()
        .context("ORIGIN_URLS contains an invalid origin")?;

    let address: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST and PORT do not form a valid socket address")?;

    let application = application(app_state, origins);

    info!("API server listening on: {}", address);
    axum::Server::bind(&address)
        .serve(application.into_make_service())
        .await
        .context("Error spinning up the API server")
}

pub fn application(
    app_state: AppState,
    origins: Vec<HeaderValue>,
) -> Router {
    router_endpoints(app_state)
        .fallback(page_not_found_handler)
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::OPTIONS
                        ])
                        .allow_origin(origins)
                        .allow_headers([CONTENT_TYPE, COOKIE])
                        .allow_credentials(true)
                )
                .layer(CompressionLayer::new())
        )
}

pub fn router_endpoints(app_state: AppState) -> Router {
    health_check::router()
        .merge(restaurant_controller::router(app_state.clone()))
        .merge(geocode_controller::router(app_state.clone()))
        .merge(business_controller::router(app_state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::models::geocoding::GeocodingParams;

    fn app_state(upstream: &MockServer) -> AppState {
        let params = GeocodingParams::new("test-key", format!("{}/geo", upstream.uri()));
        AppState {
            server_api: Arc::new(
                ServerApi::new(format!("{}/api", upstream.uri()), Duration::from_secs(5)).unwrap(),
            ),
            geocoder: Arc::new(GeoapifyRepo::new(Arc::new(params))),
            image_hosts: Arc::new(ImageHostAllowList::default()),
        }
    }

    async fn spawn_app(upstream: &MockServer) -> String {
        let origins = vec![HeaderValue::from_static("http://localhost:3000")];
        let app = application(app_state(upstream), origins);
        let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
            .serve(app.into_make_service());
        let address = server.local_addr();
        tokio::spawn(server);
        format!("http://{}", address)
    }

    #[tokio::test]
    async fn health_check_is_ok() {
        let upstream = MockServer::start().await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let upstream = MockServer::start().await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{}/nope", base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn lists_restaurants_and_drops_disallowed_images() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/discover/preview"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    { "id": "1", "name": "X", "image": "https://images.unsplash.com/x" },
                    { "id": "2", "name": "Y", "image": "http://tracker.example/y.gif" }
                ]
            })))
            .expect(1)
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream).await;

        let body: Value = reqwest::get(format!("{}/restaurants?page=2", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(
            body,
            json!([
                { "id": "1", "name": "X", "image": "https://images.unsplash.com/x" },
                { "id": "2", "name": "Y" }
            ])
        );
    }

    #[tokio::test]
    async fn listing_degrades_to_empty_on_upstream_failure() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{}/restaurants", base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.json::<Value>().await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn create_business_forwards_inbound_cookie() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "lat": 32.0853, "lon": 34.7818, "formatted": "Tel Aviv" }]
            })))
            .mount(&upstream)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/business"))
            .and(header("cookie", "session=abc123"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "b1" })))
            .expect(1)
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::Client::new()
            .post(format!("{}/business", base))
            .header("cookie", "session=abc123")
            .json(&json!({ "name": "Hummus Abu Hassan", "address": "HaDolfin 1, Jaffa" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.json::<Value>().await.unwrap()["id"], "b1");
    }

    #[tokio::test]
    async fn create_business_with_blank_address_is_bad_request() {
        let upstream = MockServer::start().await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::Client::new()
            .post(format!("{}/business", base))
            .json(&json!({ "name": "Hummus Abu Hassan", "address": " " }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_unauthorized_is_passed_through() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "lat": 32.0853, "lon": 34.7818 }]
            })))
            .mount(&upstream)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/business"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::Client::new()
            .post(format!("{}/business", base))
            .json(&json!({ "name": "Hummus Abu Hassan", "address": "HaDolfin 1, Jaffa" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn geocode_outside_service_area_is_not_found() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "lat": 48.8566, "lon": 2.3522, "formatted": "Paris" }]
            })))
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream).await;

        let response = reqwest::get(format!("{}/geocode?address=Paris", base)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn geocode_returns_results_inside_service_area() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/search"))
            .and(query_param("text", "Ben Yehuda 1, Tel Aviv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{ "lat": 32.0809, "lon": 34.7700, "formatted": "Ben Yehuda St 1, Tel Aviv" }]
            })))
            .mount(&upstream)
            .await;
        let base = spawn_app(&upstream).await;

        let body: Value = reqwest::Client::new()
            .get(format!("{}/geocode", base))
            .query(&[("address", "Ben Yehuda 1, Tel Aviv")])
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body[0]["formattedAddress"], "Ben Yehuda St 1, Tel Aviv");
    }
}
