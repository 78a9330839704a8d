use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Listing summary as shown on the browse page.
///
/// Kept as the backend sent it; ids may be strings or numbers and any field
/// may be missing or null, so the accessors only read.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(transparent)]
pub struct RestaurantPreview(pub Value);

impl RestaurantPreview {
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|id| !id.is_null())
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn image(&self) -> Option<&str> {
        self.str_field("image")
    }

    pub fn food_type(&self) -> Option<&str> {
        self.str_field("foodType")
    }

    pub fn region(&self) -> Option<&str> {
        self.str_field("region")
    }

    pub fn remove_image(&mut self) {
        if let Some(fields) = self.0.as_object_mut() {
            fields.remove("image");
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Paged body of `GET /discover/preview`.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct PreviewPage {
    #[serde(default)]
    pub content: Option<Vec<RestaurantPreview>>,
}
