use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Submission of the business creation form.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewBusiness {
    pub name: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kashrut: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// What gets posted to the backend once the address is resolved.
#[derive(Clone, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BusinessPayload<'a> {
    #[serde(flatten)]
    pub form: &'a NewBusiness,
    pub lat: f64,
    pub lon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
}

/// Record the backend answers with after creating a listing, `null` when it sent no body.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct Business(pub Value);

impl Business {
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|id| !id.is_null())
    }
}
