//! Post-processing of raw backend output into invariant-satisfying
//! content.
//!
//! Whatever the backend produced, the result honors the local-SEO
//! guarantees: capped title/description, deduplicated alphanumeric
//! hashtags, and explicit service/location mentions.

use regex::Regex;

use postpilot_types::{
    BusinessContext, GeneratedContent, MAX_DESCRIPTION_LEN, MAX_HASHTAGS, MAX_TITLE_LEN,
    ServiceLocationPair,
};

const COMMUNITY_TAGS: [&str; 5] = [
    "LocalBusiness",
    "SupportLocal",
    "SmallBusiness",
    "Community",
    "ShopLocal",
];

const FLORIDA_TAGS: [&str; 4] = ["Florida", "FloridaLife", "SunshineState", "FloridaLocal"];

/// Character-capped copy of a string. Applied only at final assembly;
/// not sentence-aware (documented limitation).
fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Collapse a tag body to alphanumeric characters; None when nothing
/// survives.
fn sanitize_tag(body: &str) -> Option<String> {
    let clean: String = body.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if clean.is_empty() { None } else { Some(format!("#{clean}")) }
}

fn push_tag(tags: &mut Vec<String>, body: &str) {
    if let Some(tag) = sanitize_tag(body) {
        if !tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            tags.push(tag);
        }
    }
}

/// True when the address names Florida, either spelled out or as the
/// state code.
pub fn mentions_florida(address: &str) -> bool {
    address.contains("Florida")
        || address
            .split(|c: char| !c.is_ascii_alphanumeric())
            .any(|token| token == "FL")
}

/// Locally derived hashtags: category, each pair's location and
/// service, the combined location+service token, five community tags,
/// and four Florida tags when the address points there.
pub fn local_hashtags(business: &BusinessContext, pairs: &[ServiceLocationPair]) -> Vec<String> {
    let mut tags = Vec::new();
    push_tag(&mut tags, &business.category);
    for pair in pairs {
        push_tag(&mut tags, &pair.location);
        push_tag(&mut tags, &pair.service);
        push_tag(&mut tags, &format!("{}{}", pair.location, pair.service));
    }
    for tag in COMMUNITY_TAGS {
        push_tag(&mut tags, tag);
    }
    if mentions_florida(&business.address) {
        for tag in FLORIDA_TAGS {
            push_tag(&mut tags, tag);
        }
    }
    tags
}

/// A line consisting only of hashtag tokens.
fn is_hashtag_line(line: &str) -> bool {
    let mut tokens = line.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(|t| t.starts_with('#'))
}

/// Strip quotes, leading markdown heading markers, and bold markers
/// from a title candidate.
fn clean_title(line: &str) -> String {
    let stripped = line.trim().trim_start_matches('#').replace("**", "");
    stripped
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Parse raw backend output and enforce the local-SEO guarantees.
pub fn parse_and_enhance(
    raw: &str,
    business: &BusinessContext,
    pairs: &[ServiceLocationPair],
    keywords: &[String],
) -> GeneratedContent {
    let mut lines = raw.lines();
    let mut title = String::new();
    for line in lines.by_ref() {
        if !line.trim().is_empty() {
            title = clean_title(line);
            break;
        }
    }

    let body: Vec<&str> = lines
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_hashtag_line(l))
        .collect();
    let mut description = body.join("\n\n");

    // Backend hashtags first, then the locally derived set.
    let tag_re = Regex::new(r"#\w+").unwrap();
    let mut hashtags = Vec::new();
    for m in tag_re.find_iter(raw) {
        push_tag(&mut hashtags, &m.as_str()[1..]);
    }
    for tag in local_hashtags(business, pairs) {
        push_tag(&mut hashtags, &tag[1..]);
    }
    hashtags.truncate(MAX_HASHTAGS);

    if title.is_empty() {
        title = business.name.clone();
    }
    if let Some(first) = pairs.first() {
        if !contains_ci(&title, &first.service) && !contains_ci(&title, &first.location) {
            title = format!("{title}: {} in {}", first.service, first.location);
        }
        let mentions_pair = pairs.iter().any(|p| {
            contains_ci(&description, &p.service) || contains_ci(&description, &p.location)
        });
        if !mentions_pair {
            if !description.is_empty() {
                description.push_str("\n\n");
            }
            description.push_str(&format!(
                "Proudly serving {} and surrounding areas with {}.",
                first.location,
                first.service.to_lowercase(),
            ));
        }
        if !contains_ci(&description, "call") && !contains_ci(&description, "contact") {
            description.push_str(&format!(
                "\n\nContact {} today for {} in {}!",
                business.name,
                first.service.to_lowercase(),
                first.location,
            ));
        }
    }

    GeneratedContent {
        title: truncate_chars(&title, MAX_TITLE_LEN),
        description: truncate_chars(&description, MAX_DESCRIPTION_LEN),
        hashtags,
        local_keywords: keywords.to_vec(),
        service_location_pairs: pairs.to_vec(),
        used_fallback: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(address: &str) -> BusinessContext {
        BusinessContext {
            name: "Gulf Coast Plumbing".into(),
            category: "Plumbing".into(),
            address: address.into(),
            website: None,
            phone: None,
            service_area: None,
            service_types: vec![],
            all_categories: vec![],
            rating: None,
            review_count: None,
        }
    }

    fn pair(service: &str, location: &str) -> ServiceLocationPair {
        ServiceLocationPair { service: service.into(), location: location.into() }
    }

    #[test]
    fn test_title_from_first_line_strips_markup() {
        let raw = "## \"**Big Savings This Week**\"\n\nWe fix drains in Tampa. Call us.\n\n#plumbing";
        let content = parse_and_enhance(raw, &business(""), &[pair("Drain Cleaning", "Tampa")], &[]);
        assert_eq!(content.title, "Big Savings This Week: Drain Cleaning in Tampa");
        assert!(content.description.starts_with("We fix drains in Tampa."));
    }

    #[test]
    fn test_title_not_augmented_when_pair_present() {
        let raw = "Drain Cleaning deals\n\nServing Tampa all week. Call now.";
        let content = parse_and_enhance(raw, &business(""), &[pair("Drain Cleaning", "Tampa")], &[]);
        assert_eq!(content.title, "Drain Cleaning deals");
    }

    #[test]
    fn test_hashtag_line_excluded_from_description() {
        let raw = "Title\n\nBody text. Call today.\n\n#one #two #three";
        let content = parse_and_enhance(raw, &business(""), &[], &[]);
        assert!(!content.description.contains("#one"));
        assert!(content.hashtags.contains(&"#one".to_string()));
    }

    #[test]
    fn test_hashtags_sanitized_deduped_capped() {
        let raw = "T\n\nBody. Call.\n\n#Tampa #tampa #dr-ains #a #b #c #d #e #f #g #h #i";
        let content = parse_and_enhance(raw, &business(""), &[], &[]);
        assert!(content.hashtags.len() <= MAX_HASHTAGS);
        let tampa_count = content
            .hashtags
            .iter()
            .filter(|t| t.eq_ignore_ascii_case("#tampa"))
            .count();
        assert_eq!(tampa_count, 1);
        for tag in &content.hashtags {
            assert!(tag.starts_with('#'));
            assert!(tag[1..].chars().all(|c| c.is_ascii_alphanumeric()), "{tag}");
        }
    }

    #[test]
    fn test_florida_tags_only_for_florida_addresses() {
        let raw = "T\n\nBody. Call.";
        let fl = parse_and_enhance(raw, &business("Spring Hill, FL 34606"), &[], &[]);
        assert!(fl.hashtags.contains(&"#Florida".to_string()));
        let ohio = parse_and_enhance(raw, &business("Columbus, OH"), &[], &[]);
        assert!(!ohio.hashtags.contains(&"#Florida".to_string()));
    }

    #[test]
    fn test_serving_sentence_added_when_no_pair_mentioned() {
        let raw = "Great week\n\nWe love our customers.";
        let content = parse_and_enhance(raw, &business(""), &[pair("Plumbing", "Tampa")], &[]);
        assert!(content.description.contains("Proudly serving Tampa"));
    }

    #[test]
    fn test_cta_added_when_missing() {
        let raw = "Great week\n\nWe love Tampa.";
        let content = parse_and_enhance(raw, &business(""), &[pair("Plumbing", "Tampa")], &[]);
        assert!(content.description.to_lowercase().contains("contact"));

        let raw_with_cta = "Great week\n\nCall us today in Tampa!";
        let content = parse_and_enhance(raw_with_cta, &business(""), &[pair("Plumbing", "Tampa")], &[]);
        assert!(!content.description.contains("Contact Gulf Coast Plumbing"));
    }

    #[test]
    fn test_caps_applied_at_final_assembly() {
        let long_line = "word ".repeat(600);
        let raw = format!("{}\n\n{}", "t".repeat(300), long_line);
        let content =
            parse_and_enhance(&raw, &business(""), &[pair("Plumbing", "Tampa")], &[]);
        assert!(content.title.chars().count() <= MAX_TITLE_LEN);
        assert!(content.description.chars().count() <= MAX_DESCRIPTION_LEN);
    }

    #[test]
    fn test_empty_output_still_yields_content() {
        let content = parse_and_enhance("", &business(""), &[pair("Plumbing", "Tampa")], &[]);
        assert!(!content.title.is_empty());
        assert!(!content.description.is_empty());
    }
}
