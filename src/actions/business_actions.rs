use tracing::{info, warn};
use crate::error::BusinessError;
use crate::models::business::{Business, BusinessPayload, NewBusiness};
use crate::repositories::geoapify_repo::GeoapifyRepo;
use crate::repositories::server_api::{CookieSource, RequestOptions, ServerApi};

pub const CREATE_BUSINESS_PATH: &str = "/business";

fn validate(form: &NewBusiness) -> Result<(), BusinessError> {
    if form.name.trim().is_empty() {
        return Err(BusinessError::Validation("name is required".to_string()));
    }
    if form.address.trim().is_empty() {
        return Err(BusinessError::Validation("address is required".to_string()));
    }
    Ok(())
}

/// Geocodes the submitted address and creates the listing on behalf of the signed in user.
pub async fn create_business_action<C>(
    api: &ServerApi,
    geocoder: &GeoapifyRepo,
    cookies: &C,
    form: &NewBusiness,
) -> Result<Business, BusinessError>
where
    C: CookieSource + ?Sized,
{
    validate(form)?;

    let location = geocoder.resolve_address(&form.address).await.map_err(|e| {
        warn!("Could not place {:?} at {:?} due to: {}", form.name, form.address, e);
        e
    })?;

    let payload = BusinessPayload {
        form,
        lat: location.lat,
        lon: location.lon,
        formatted_address: location.formatted_address,
    };

    let business: Business = api
        .post(CREATE_BUSINESS_PATH, &payload, RequestOptions::with_cookies(), cookies)
        .await?;

    match business.id() {
        Some(id) => info!("Created business {} ({})", id, form.name),
        None => info!("Created business {} without an id in the response", form.name),
    }
    Ok(business)
}
