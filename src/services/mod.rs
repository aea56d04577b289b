pub mod catalog_service;
pub mod discount_service;
pub mod pricing_service;
pub mod search_service;
pub mod validation_service;
