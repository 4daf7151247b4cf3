//! postpilot-content: The local-SEO content generation pipeline.
//!
//! Turns a business-profile snapshot plus content options into
//! SEO-annotated post content. The pipeline always returns usable
//! content: when the generation backend is unreachable it degrades to a
//! fixed template for the requested content type.

pub mod backend;
pub mod enhance;
pub mod fallback;
pub mod generator;
pub mod keywords;
pub mod pairs;
pub mod prompt;

pub use backend::{GenerationBackend, HttpGenerationBackend};
pub use generator::ContentGenerator;

use std::str::FromStr;

use postpilot_types::{ContentOptions, ContentType, Tone};

/// Errors surfaced by the content pipeline's string-level entry points.
///
/// Backend failures are not represented here: the pipeline swallows
/// them and falls back to templates.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Build [`ContentOptions`] from string tags, as received from job
/// settings or the CLI. Unknown content types and tones have no
/// fallback, so they surface as [`ContentError::InvalidOptions`].
pub fn parse_options(
    content_type: &str,
    tone: &str,
    seasonal_context: Option<String>,
) -> Result<ContentOptions, ContentError> {
    let content_type = ContentType::from_str(content_type)
        .map_err(|e| ContentError::InvalidOptions(e.to_string()))?;
    let tone = Tone::from_str(tone).map_err(|e| ContentError::InvalidOptions(e.to_string()))?;
    Ok(ContentOptions {
        content_type,
        tone,
        include_services: true,
        include_locations: true,
        focus_local_seo: true,
        seasonal_context,
    })
}
