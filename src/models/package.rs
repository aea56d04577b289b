use serde::{Deserialize, Deserializer, Serialize};

/// Tour package record as served by the catalog API. Everything except the
/// price and the identity fields is passed through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TourPackage {
    #[serde(default, deserialize_with = "deserialize_flexible_id")]
    pub id: Option<String>,
    #[serde(
        rename = "_id",
        default,
        deserialize_with = "deserialize_flexible_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub mongo_id: Option<String>,
    #[serde(default)]
    pub title_key: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flexible_rating")]
    pub rating: Option<f64>,
}

impl TourPackage {
    /// Catalog records carry either `id` or `_id` depending on the endpoint.
    pub fn identifier(&self) -> Option<&str> {
        self.id.as_deref().or(self.mongo_id.as_deref())
    }
}

/// The package fields a booking session keeps once the user picks a tour,
/// including the per-tier unit prices derived from the display price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageSelection {
    pub id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    pub duration: Option<String>,
    pub adult_price: f64,
    pub child_price: f64,
    pub infant_price: f64,
}

// Catalog ids show up as strings or numbers depending on the backing store.
fn deserialize_flexible_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn deserialize_flexible_rating<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}
