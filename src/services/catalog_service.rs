use std::sync::Mutex;

use crate::models::package::TourPackage;
use crate::models::service::ServiceOffering;

const DEFAULT_API_BASE_URL: &str = "https://depi-final-project-production.up.railway.app/api";

#[derive(Debug)]
pub enum CatalogError {
    Request(String),
    Decode(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Request(err) => write!(f, "Catalog request error: {}", err),
            CatalogError::Decode(err) => write!(f, "Catalog decode error: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Client for the external catalog REST API. Responses are cached in memory;
/// failures are logged and surfaced to the caller, never retried here.
pub struct CatalogService {
    base_url: String,
    client: reqwest::Client,
    tours_cache: Mutex<Option<Vec<TourPackage>>>,
    services_cache: Mutex<Option<Vec<ServiceOffering>>>,
}

// The caches hold plain Options with no invariant to protect, so a poisoned
// lock is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl CatalogService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
            tours_cache: Mutex::new(None),
            services_cache: Mutex::new(None),
        }
    }

    pub fn from_env() -> Self {
        let base_url =
            std::env::var("VOYAGO_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        Self::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn tour_packages(&self) -> Result<Vec<TourPackage>, CatalogError> {
        if let Some(cached) = lock(&self.tours_cache).clone() {
            return Ok(cached);
        }

        let url = format!("{}/tourPackages", self.base_url);
        let tours: Vec<TourPackage> = self.get_json(&url).await?;
        *lock(&self.tours_cache) = Some(tours.clone());
        Ok(tours)
    }

    pub async fn tour_package_by_id(&self, id: &str) -> Result<TourPackage, CatalogError> {
        let url = format!("{}/tourPackages/{}", self.base_url, id);
        self.get_json(&url).await
    }

    pub async fn services(&self) -> Result<Vec<ServiceOffering>, CatalogError> {
        if let Some(cached) = lock(&self.services_cache).clone() {
            return Ok(cached);
        }

        let url = format!("{}/services", self.base_url);
        let services: Vec<ServiceOffering> = self.get_json(&url).await?;
        *lock(&self.services_cache) = Some(services.clone());
        Ok(services)
    }

    /// The catalog serves services as a fixed-order array; slugs (and their
    /// marketing aliases) map onto positions in it.
    pub async fn service_by_slug(&self, slug: &str) -> Result<Option<ServiceOffering>, CatalogError> {
        let index = match slug {
            "bike-rickshaw" | "bike-tour" => 0,
            "guided-tours" => 1,
            "tuscan-hills" => 2,
            "transportation" | "coach-trips" => 3,
            "luxury-cars" => 4,
            "wine-tours" => 5,
            _ => return Ok(None),
        };
        let services = self.services().await?;
        Ok(services.into_iter().nth(index))
    }

    pub fn clear_cache(&self) {
        *lock(&self.tours_cache) = None;
        *lock(&self.services_cache) = None;
    }

    /// Pre-load the caches, e.g. from a fixture or a previous session.
    pub fn seed(&self, tours: Vec<TourPackage>, services: Vec<ServiceOffering>) {
        *lock(&self.tours_cache) = Some(tours);
        *lock(&self.services_cache) = Some(services);
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|err| {
                log::error!("Catalog request to {} failed: {}", url, err);
                CatalogError::Request(err.to_string())
            })?;

        response.json().await.map_err(|err| {
            log::error!("Catalog response from {} did not decode: {}", url, err);
            CatalogError::Decode(err.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_services() -> Vec<ServiceOffering> {
        ["bikeRental", "guidedTours", "tuscanHills", "transportation", "luxuryCars", "wineTours"]
            .iter()
            .map(|key| ServiceOffering {
                slug: None,
                title_key: key.to_string(),
                desc_key: None,
                img: None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_service_by_slug_uses_fixed_positions() {
        let catalog = CatalogService::new("http://unused.invalid/api");
        catalog.seed(Vec::new(), sample_services());

        let service = catalog.service_by_slug("tuscan-hills").await.unwrap().unwrap();
        assert_eq!(service.title_key, "tuscanHills");

        // Alias slugs land on the same entries
        let service = catalog.service_by_slug("coach-trips").await.unwrap().unwrap();
        assert_eq!(service.title_key, "transportation");

        let missing = catalog.service_by_slug("submarine").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_cached_tours_are_served_without_a_request() {
        let catalog = CatalogService::new("http://unused.invalid/api");
        let tour: TourPackage =
            serde_json::from_str(r#"{"id": 1, "titleKey": "luccaHills", "price": "€34"}"#).unwrap();
        catalog.seed(vec![tour], Vec::new());

        let tours = catalog.tour_packages().await.unwrap();
        assert_eq!(tours.len(), 1);
        assert_eq!(tours[0].title_key, "luccaHills");

        catalog.clear_cache();
        // After clearing, the next call would hit the (unreachable) API.
        assert!(catalog.tour_packages().await.is_err());
    }

    #[tokio::test]
    async fn test_cache_survives_a_poisoned_lock() {
        let catalog = std::sync::Arc::new(CatalogService::new("http://unused.invalid/api"));
        catalog.seed(Vec::new(), sample_services());

        let poisoner = std::sync::Arc::clone(&catalog);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.services_cache.lock().unwrap();
            panic!("poison the cache lock");
        })
        .join();

        // The cached value is still served after the panic.
        let services = catalog.services().await.unwrap();
        assert_eq!(services.len(), 6);
    }

    #[test]
    #[serial_test::serial]
    fn test_base_url_from_env() {
        std::env::remove_var("VOYAGO_API_URL");
        assert_eq!(CatalogService::from_env().base_url(), DEFAULT_API_BASE_URL);

        std::env::set_var("VOYAGO_API_URL", "http://localhost:9000/api");
        assert_eq!(CatalogService::from_env().base_url(), "http://localhost:9000/api");
        std::env::remove_var("VOYAGO_API_URL");
    }
}
