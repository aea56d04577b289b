use crate::models::package::TourPackage;
use crate::services::pricing_service::PricingService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Tours,
    Activities,
    Transportation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationFilter {
    #[default]
    Any,
    HalfDay,
    FullDay,
    MultiDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Recommended,
    PriceLowToHigh,
    PriceHighToLow,
    Rating,
    Newest,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchFilters {
    pub category: CategoryFilter,
    pub duration: DurationFilter,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl SearchFilters {
    /// How many filters differ from their defaults, for the filter badge.
    pub fn active_count(&self) -> usize {
        let mut count = 0;
        if self.category != CategoryFilter::All {
            count += 1;
        }
        if self.duration != DurationFilter::Any {
            count += 1;
        }
        if self.min_price.is_some() {
            count += 1;
        }
        if self.max_price.is_some() {
            count += 1;
        }
        if self.min_rating.is_some() {
            count += 1;
        }
        count
    }
}

/// Client-side search over the fetched tour catalog: free-text query,
/// filters, and sorting. Works on whatever slice the caller already holds so
/// it can be re-run on every keystroke without touching the network.
pub struct SearchService;

impl SearchService {
    pub fn search_tours(
        tours: &[TourPackage],
        query: &str,
        filters: &SearchFilters,
        sort_by: SortBy,
    ) -> Vec<TourPackage> {
        let mut results: Vec<TourPackage> = tours.to_vec();

        let query = query.trim().to_lowercase();
        if !query.is_empty() {
            results.retain(|tour| {
                tour.title_key.to_lowercase().contains(&query)
                    || tour
                        .desc
                        .as_deref()
                        .is_some_and(|desc| desc.to_lowercase().contains(&query))
            });
        }

        match filters.category {
            CategoryFilter::All | CategoryFilter::Tours => {}
            CategoryFilter::Activities => {
                results.retain(|tour| {
                    let title = tour.title_key.to_lowercase();
                    title.contains("tour") || title.contains("tasting")
                });
            }
            CategoryFilter::Transportation => {
                results.retain(|tour| {
                    let title = tour.title_key.to_lowercase();
                    title.contains("bike") || title.contains("coach")
                });
            }
        }

        if filters.min_price.is_some() || filters.max_price.is_some() {
            results.retain(|tour| {
                let price = PricingService::parse_display_price(&tour.price);
                filters.min_price.map_or(true, |min| price >= min)
                    && filters.max_price.map_or(true, |max| price <= max)
            });
        }

        if filters.duration != DurationFilter::Any {
            results.retain(|tour| {
                let hours =
                    PricingService::parse_display_price(tour.duration.as_deref().unwrap_or(""));
                Self::duration_category(hours) == filters.duration
            });
        }

        if let Some(min_rating) = filters.min_rating {
            results.retain(|tour| tour.rating.unwrap_or(0.0) >= min_rating);
        }

        match sort_by {
            SortBy::Recommended => {} // keep catalog order
            SortBy::PriceLowToHigh => results.sort_by(|a, b| {
                PricingService::parse_display_price(&a.price)
                    .partial_cmp(&PricingService::parse_display_price(&b.price))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortBy::PriceHighToLow => results.sort_by(|a, b| {
                PricingService::parse_display_price(&b.price)
                    .partial_cmp(&PricingService::parse_display_price(&a.price))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortBy::Rating => results.sort_by(|a, b| {
                b.rating
                    .unwrap_or(0.0)
                    .partial_cmp(&a.rating.unwrap_or(0.0))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortBy::Newest => results.sort_by(|a, b| Self::id_number(b).cmp(&Self::id_number(a))),
        }

        results
    }

    /// Duration buckets used by the duration filter: up to 4 hours is a half
    /// day, up to 8 a full day, anything longer spans multiple days.
    pub fn duration_category(hours: f64) -> DurationFilter {
        if hours <= 4.0 {
            DurationFilter::HalfDay
        } else if hours <= 8.0 {
            DurationFilter::FullDay
        } else {
            DurationFilter::MultiDay
        }
    }

    /// Title suggestions for the search box; empty below two characters.
    pub fn suggestions(tours: &[TourPackage], query: &str, limit: usize) -> Vec<String> {
        let query = query.trim().to_lowercase();
        if query.len() < 2 {
            return Vec::new();
        }
        tours
            .iter()
            .filter(|tour| tour.title_key.to_lowercase().contains(&query))
            .map(|tour| tour.title_key.clone())
            .take(limit)
            .collect()
    }

    /// Tours related to a service page, matched by title keywords.
    pub fn tours_for_service(tours: &[TourPackage], service_slug: &str) -> Vec<TourPackage> {
        let keywords: &[&str] = match service_slug {
            "bike-rickshaw" => &["bike", "lucca"],
            "guided-tours" => &["tour", "guided"],
            "bike-tour" => &["bike", "tour"],
            "tuscan-hills" => &["hills", "tuscan", "lucca hills"],
            "transportation" => &["coach", "pisa", "florence"],
            "wine-tours" => &["wine", "tasting", "tuscany"],
            "coach-trips" => &["coach", "trip"],
            "luxury-cars" => &["luxury", "siena"],
            _ => &[],
        };

        if keywords.is_empty() {
            return tours.to_vec();
        }

        tours
            .iter()
            .filter(|tour| {
                let title = tour.title_key.to_lowercase();
                keywords.iter().any(|keyword| title.contains(keyword))
            })
            .cloned()
            .collect()
    }

    fn id_number(tour: &TourPackage) -> i64 {
        tour.id
            .as_deref()
            .and_then(|id| id.parse().ok())
            .unwrap_or(0)
    }
}
