use voyago_booking::db::local::LocalStorage;
use voyago_booking::models::package::TourPackage;
use voyago_booking::models::service::ServiceOffering;

pub fn init() {
    dotenv::dotenv().ok();
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Storage rooted in a unique temp directory so tests never share state.
pub fn temp_storage(tag: &str) -> LocalStorage {
    let dir = std::env::temp_dir().join(format!(
        "voyago-test-{}-{}",
        tag,
        chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
    ));
    LocalStorage::at(dir)
}

pub fn sample_package() -> TourPackage {
    serde_json::from_value(serde_json::json!({
        "id": 1,
        "titleKey": "luccaBikeTour",
        "price": "€34",
        "duration": "3 hours",
        "img": "/images/lucca-bike.jpg",
        "rating": 4.8,
    }))
    .unwrap()
}

pub fn sample_service() -> ServiceOffering {
    serde_json::from_value(serde_json::json!({
        "slug": "bike-rickshaw",
        "titleKey": "bikeRental",
        "descKey": "bikeRentalDesc",
    }))
    .unwrap()
}
