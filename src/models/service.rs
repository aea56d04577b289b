use serde::{Deserialize, Serialize};

/// Ancillary service record (bike rental, guided tours, transportation, ...)
/// as served by the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub title_key: String,
    #[serde(default)]
    pub desc_key: Option<String>,
    #[serde(default)]
    pub img: Option<String>,
}

/// The service fields a booking session keeps once the user picks a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSelection {
    pub slug: String,
    pub title_key: String,
    pub desc_key: Option<String>,
    pub image: Option<String>,
}

impl From<&ServiceOffering> for ServiceSelection {
    fn from(service: &ServiceOffering) -> Self {
        Self {
            slug: service.slug.clone().unwrap_or_default(),
            title_key: service.title_key.clone(),
            desc_key: service.desc_key.clone(),
            image: service.img.clone(),
        }
    }
}
