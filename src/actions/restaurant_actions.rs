use tracing::warn;
use crate::models::restaurant::{PreviewPage, RestaurantPreview};
use crate::repositories::server_api::{NoCookies, RequestOptions, ServerApi};

pub const PAGE_SIZE: usize = 12;

pub fn preview_path(page: u32) -> String {
    format!("/discover/preview?size={}&page={}", PAGE_SIZE, page)
}

/// One page of listings for the browse view. Failures degrade to an empty page.
pub async fn get_restaurants_action(
    api: &ServerApi,
    page: u32,
) -> Vec<RestaurantPreview> {
    let res = api
        .get::<PreviewPage, _>(&preview_path(page), RequestOptions::default(), &NoCookies)
        .await;

    match res {
        Ok(PreviewPage { content: Some(content) }) => content,
        Ok(PreviewPage { content: None }) => {
            warn!("Listing page {} came back without content", page);
            Vec::new()
        }
        Err(e) => {
            warn!("Something went wrong retrieving restaurants due to: {}", e);
            Vec::new()
        }
    }
}
