//! Prompt assembly for the generation backend.

use postpilot_types::{BusinessContext, ContentOptions, ContentType, ServiceLocationPair, Tone};

/// Content-type-specific instruction text.
pub fn instruction_for(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Promotional => {
            "Write a promotional post highlighting a current offer or reason to choose this business now."
        }
        ContentType::Educational => {
            "Write an educational post sharing one practical tip customers can use, positioning the business as the local expert."
        }
        ContentType::CommunitySpotlight => {
            "Write a community-focused post celebrating the local area this business serves and its connection to it."
        }
        ContentType::Seasonal => {
            "Write a seasonal post tying the business's services to the current time of year."
        }
        ContentType::BehindTheScenes => {
            "Write a behind-the-scenes post showing how the team works and what customers can expect."
        }
        ContentType::CustomerStory => {
            "Write a post telling a short, plausible customer-success story (no invented names or reviews)."
        }
        ContentType::ServiceHighlight => {
            "Write a post spotlighting one specific service in depth: what it includes and who needs it."
        }
    }
}

fn tone_phrase(tone: Tone) -> &'static str {
    match tone {
        Tone::Professional => "a professional, trustworthy",
        Tone::Friendly => "a warm, friendly",
        Tone::Casual => "a relaxed, conversational",
        Tone::Enthusiastic => "an upbeat, enthusiastic",
        Tone::Informative => "a clear, informative",
    }
}

/// Deterministic prompt: business facts, the sampled pairs, and the
/// content-type instruction, requesting a title line, 2-3 paragraphs,
/// and a trailing hashtag line.
pub fn build_prompt(
    business: &BusinessContext,
    options: &ContentOptions,
    services: &[String],
    locations: &[String],
    pairs: &[ServiceLocationPair],
) -> String {
    let mut prompt = String::new();
    prompt.push_str(&format!(
        "You are writing a social post for {name}, a {category} business.\n",
        name = business.name,
        category = business.category,
    ));
    if !business.address.is_empty() {
        prompt.push_str(&format!("Address: {}\n", business.address));
    }
    if let Some(website) = &business.website {
        prompt.push_str(&format!("Website: {website}\n"));
    }
    if let (Some(rating), Some(reviews)) = (business.rating, business.review_count) {
        prompt.push_str(&format!("Rated {rating:.1} across {reviews} reviews.\n"));
    }
    if options.include_services && !services.is_empty() {
        prompt.push_str(&format!("Services: {}\n", services.join(", ")));
    }
    if options.include_locations && !locations.is_empty() {
        prompt.push_str(&format!("Service areas: {}\n", locations.join(", ")));
    }
    if !pairs.is_empty() {
        prompt.push_str("Feature these service/location combinations naturally:\n");
        for pair in pairs {
            prompt.push_str(&format!("- {} in {}\n", pair.service, pair.location));
        }
    }

    prompt.push('\n');
    prompt.push_str(instruction_for(options.content_type));
    prompt.push('\n');
    if let Some(context) = &options.seasonal_context {
        prompt.push_str(&format!("Seasonal context: {context}.\n"));
    }
    prompt.push_str(&format!("Use {} voice.\n", tone_phrase(options.tone)));
    if options.focus_local_seo {
        prompt.push_str(
            "Weave the service areas into the copy naturally for local search visibility.\n",
        );
    }
    prompt.push_str(
        "\nFormat: first line is the title, then 2-3 short paragraphs, \
         then one final line containing only hashtags.\n",
    );
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business() -> BusinessContext {
        BusinessContext {
            name: "Gulf Coast Plumbing".into(),
            category: "Plumbing".into(),
            address: "Spring Hill, FL".into(),
            website: Some("https://gulfcoastplumbing.example".into()),
            phone: None,
            service_area: None,
            service_types: vec![],
            all_categories: vec![],
            rating: None,
            review_count: None,
        }
    }

    fn options(content_type: ContentType) -> ContentOptions {
        ContentOptions {
            content_type,
            tone: Tone::Friendly,
            include_services: true,
            include_locations: true,
            focus_local_seo: true,
            seasonal_context: None,
        }
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let pairs = vec![ServiceLocationPair {
            service: "Drain Cleaning".into(),
            location: "Tampa".into(),
        }];
        let services = vec!["Drain Cleaning".to_string()];
        let locations = vec!["Tampa".to_string()];
        let a = build_prompt(&business(), &options(ContentType::Promotional), &services, &locations, &pairs);
        let b = build_prompt(&business(), &options(ContentType::Promotional), &services, &locations, &pairs);
        assert_eq!(a, b);
        assert!(a.contains("Gulf Coast Plumbing"));
        assert!(a.contains("Drain Cleaning in Tampa"));
        assert!(a.contains("hashtags"));
    }

    #[test]
    fn test_each_content_type_has_distinct_instruction() {
        let mut seen = std::collections::HashSet::new();
        for ct in ContentType::ALL {
            assert!(seen.insert(instruction_for(ct)), "duplicate instruction for {ct:?}");
        }
    }

    #[test]
    fn test_flags_gate_sections() {
        let mut opts = options(ContentType::Educational);
        opts.include_services = false;
        opts.include_locations = false;
        let services = vec!["Drain Cleaning".to_string()];
        let locations = vec!["Tampa".to_string()];
        let prompt = build_prompt(&business(), &opts, &services, &locations, &[]);
        assert!(!prompt.contains("Services:"));
        assert!(!prompt.contains("Service areas:"));
    }

    #[test]
    fn test_seasonal_context_included() {
        let mut opts = options(ContentType::Seasonal);
        opts.seasonal_context = Some("hurricane season".into());
        let prompt = build_prompt(&business(), &opts, &[], &[], &[]);
        assert!(prompt.contains("hurricane season"));
    }
}
