//! Location, service, and local-keyword extraction from a business
//! profile.

use postpilot_types::{BusinessContext, MAX_LOCAL_KEYWORDS};

/// Most locations used for keyword and pair derivation.
pub const MAX_LOCATIONS: usize = 5;
/// Most services used for keyword and pair derivation.
pub const MAX_SERVICES: usize = 8;

/// Fallback locations when a profile carries no usable geography.
// TODO: replace with a default-region lookup collaborator instead of a
// hard-coded home-region list.
pub const DEFAULT_SEED_LOCATIONS: [&str; 3] = ["Spring Hill", "Brooksville", "Tampa"];

fn push_unique(list: &mut Vec<String>, value: &str) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !list.iter().any(|v| v.eq_ignore_ascii_case(value)) {
        list.push(value.to_string());
    }
}

/// Derive up to [`MAX_LOCATIONS`] location names from the address,
/// service-area places, and region code, in that order.
///
/// Address segments starting with a digit (street numbers, zip codes)
/// are skipped. An empty result falls back to
/// [`DEFAULT_SEED_LOCATIONS`].
pub fn extract_locations(business: &BusinessContext) -> Vec<String> {
    let mut locations = Vec::new();

    for segment in business.address.split(',') {
        let segment = segment.trim();
        if segment.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }
        push_unique(&mut locations, segment);
    }

    if let Some(area) = &business.service_area {
        for place in &area.places {
            push_unique(&mut locations, &place.place_name);
        }
        if let Some(region) = &area.region_code {
            push_unique(&mut locations, region);
        }
    }

    locations.truncate(MAX_LOCATIONS);
    if locations.is_empty() {
        locations = DEFAULT_SEED_LOCATIONS.iter().map(|s| s.to_string()).collect();
    }
    locations
}

/// Derive up to [`MAX_SERVICES`] service names: declared service types,
/// then all categories, then the primary category, deduplicated with
/// original order preserved.
pub fn extract_services(business: &BusinessContext) -> Vec<String> {
    let mut services = Vec::new();
    for service in &business.service_types {
        push_unique(&mut services, &service.display_name);
    }
    for category in &business.all_categories {
        push_unique(&mut services, category);
    }
    push_unique(&mut services, &business.category);
    services.truncate(MAX_SERVICES);
    services
}

/// Templated "{category} in {location}"-style phrases for each
/// location, plus two business-name keywords, first-computed-first-kept
/// up to [`MAX_LOCAL_KEYWORDS`].
pub fn generate_local_keywords(business: &BusinessContext, locations: &[String]) -> Vec<String> {
    let category = &business.category;
    let mut keywords = Vec::new();
    for location in locations {
        for phrase in [
            format!("{category} in {location}"),
            format!("{location} {category}"),
            format!("best {category} {location}"),
            format!("{category} near {location}"),
            format!("{category} services {location}"),
        ] {
            push_unique(&mut keywords, &phrase);
        }
    }
    push_unique(&mut keywords, &format!("{} {category}", business.name));
    push_unique(&mut keywords, &format!("{} near me", business.name));
    keywords.truncate(MAX_LOCAL_KEYWORDS);
    keywords
}

#[cfg(test)]
mod tests {
    use super::*;
    use postpilot_types::{ServiceArea, ServicePlace, ServiceType};

    fn business() -> BusinessContext {
        BusinessContext {
            name: "Gulf Coast Plumbing".into(),
            category: "Plumbing".into(),
            address: "123 Main St, Spring Hill, FL, 34606".into(),
            website: None,
            phone: None,
            service_area: Some(ServiceArea {
                business_type: "customer_location".into(),
                places: vec![
                    ServicePlace { place_name: "Brooksville".into(), place_id: "p1".into() },
                    ServicePlace { place_name: "Spring Hill".into(), place_id: "p2".into() },
                ],
                region_code: Some("US-FL".into()),
            }),
            service_types: vec![ServiceType {
                service_type_id: "s1".into(),
                display_name: "Drain Cleaning".into(),
            }],
            all_categories: vec!["Plumbing".into(), "Water Heater Repair".into()],
            rating: Some(4.8),
            review_count: Some(120),
        }
    }

    #[test]
    fn test_extract_locations_skips_numeric_segments() {
        let locations = extract_locations(&business());
        // "123 Main St" and "34606" start with digits; "Spring Hill"
        // deduplicates against the service-area place.
        assert_eq!(locations, vec!["Spring Hill", "FL", "Brooksville", "US-FL"]);
    }

    #[test]
    fn test_extract_locations_caps_at_five() {
        let mut biz = business();
        biz.address = "Alpha, Beta, Gamma, Delta, Epsilon, Zeta".into();
        assert_eq!(extract_locations(&biz).len(), MAX_LOCATIONS);
    }

    #[test]
    fn test_extract_locations_falls_back_to_seed_list() {
        let mut biz = business();
        biz.address = String::new();
        biz.service_area = None;
        assert_eq!(extract_locations(&biz), DEFAULT_SEED_LOCATIONS.to_vec());
    }

    #[test]
    fn test_extract_services_dedup_order() {
        let services = extract_services(&business());
        assert_eq!(services, vec!["Drain Cleaning", "Plumbing", "Water Heater Repair"]);
    }

    #[test]
    fn test_extract_services_category_only() {
        // Scenario D: bare profile yields exactly the primary category.
        let mut biz = business();
        biz.service_types.clear();
        biz.all_categories.clear();
        assert_eq!(extract_services(&biz), vec!["Plumbing"]);
    }

    #[test]
    fn test_local_keywords_capped_and_templated() {
        let biz = business();
        let locations = extract_locations(&biz);
        let keywords = generate_local_keywords(&biz, &locations);
        assert_eq!(keywords.len(), MAX_LOCAL_KEYWORDS);
        assert_eq!(keywords[0], "Plumbing in Spring Hill");
        assert!(keywords.contains(&"best Plumbing Spring Hill".to_string()));
    }

    #[test]
    fn test_local_keywords_include_business_name_when_room() {
        let biz = business();
        let one_location = vec!["Tampa".to_string()];
        let keywords = generate_local_keywords(&biz, &one_location);
        assert!(keywords.contains(&"Gulf Coast Plumbing Plumbing".to_string()));
        assert!(keywords.contains(&"Gulf Coast Plumbing near me".to_string()));
    }
}
