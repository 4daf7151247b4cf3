//! Fixed content templates used when the generation backend is
//! unavailable. Always produce well-formed content.

use postpilot_types::{
    BusinessContext, ContentOptions, ContentType, GeneratedContent, MAX_DESCRIPTION_LEN,
    MAX_HASHTAGS, MAX_TITLE_LEN, ServiceLocationPair,
};

use crate::enhance::local_hashtags;

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Fill the fixed template for the requested content type from the
/// primary pair and the full pair list.
pub fn fallback_content(
    business: &BusinessContext,
    options: &ContentOptions,
    pairs: &[ServiceLocationPair],
    keywords: &[String],
) -> GeneratedContent {
    let name = &business.name;
    let primary = pairs.first().cloned().unwrap_or_else(|| ServiceLocationPair {
        service: business.category.clone(),
        location: "your area".to_string(),
    });
    let service = &primary.service;
    let location = &primary.location;
    let area_list = if pairs.len() > 1 {
        pairs
            .iter()
            .map(|p| p.location.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        location.clone()
    };

    let (title, body) = match options.content_type {
        ContentType::Promotional => (
            format!("Quality {service} in {location}"),
            format!(
                "Looking for dependable {service} in {location}? {name} delivers \
                 honest work at fair prices, backed by a team that treats your \
                 home like their own.\n\nWe proudly serve {area_list} and the \
                 surrounding communities."
            ),
        ),
        ContentType::Educational => (
            format!("{service} Tips from {name}"),
            format!(
                "A little maintenance goes a long way. Regular attention to your \
                 {service} needs prevents small problems from becoming expensive \
                 ones.\n\nOur team serves {area_list} with straightforward advice \
                 and honest recommendations."
            ),
        ),
        ContentType::CommunitySpotlight => (
            format!("Proud to Serve {location}"),
            format!(
                "{location} is more than a service area to us. {name} has built \
                 lasting relationships across {area_list}, one job at a time.\n\n\
                 Thank you for trusting a local business with your {service} needs."
            ),
        ),
        ContentType::Seasonal => (
            format!("Seasonal {service} in {location}"),
            format!(
                "Every season brings its own demands on your home. Now is a great \
                 time to get ahead of your {service} needs before the rush.\n\n\
                 {name} is ready to help across {area_list}."
            ),
        ),
        ContentType::BehindTheScenes => (
            format!("Behind the Scenes at {name}"),
            format!(
                "Ever wonder what goes into a {service} visit? Our team shows up \
                 prepared, works clean, and walks you through everything before \
                 we start.\n\nThat is how we do business across {area_list}."
            ),
        ),
        ContentType::CustomerStory => (
            format!("Another Happy Customer in {location}"),
            format!(
                "Nothing beats hearing that a job was done right. Customers \
                 across {area_list} count on {name} for {service} done properly \
                 the first time.\n\nWe would love to earn your trust too."
            ),
        ),
        ContentType::ServiceHighlight => (
            format!("{service}: What to Expect"),
            format!(
                "{service} is one of the services our customers in {location} \
                 rely on most. {name} handles every job with care, from the \
                 first call to the final walkthrough.\n\nAvailable throughout \
                 {area_list}."
            ),
        ),
    };

    let description = format!("{body}\n\nContact {name} today for {service} in {location}!");
    let mut hashtags = local_hashtags(business, pairs);
    hashtags.truncate(MAX_HASHTAGS);

    GeneratedContent {
        title: truncate_chars(&title, MAX_TITLE_LEN),
        description: truncate_chars(&description, MAX_DESCRIPTION_LEN),
        hashtags,
        local_keywords: keywords.to_vec(),
        service_location_pairs: pairs.to_vec(),
        used_fallback: true,
    }
}
