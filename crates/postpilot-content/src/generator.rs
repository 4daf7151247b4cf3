//! Pipeline orchestration: extract, sample, prompt, generate, enhance.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use postpilot_types::{BusinessContext, ContentOptions, GeneratedContent};

use crate::backend::GenerationBackend;
use crate::enhance::parse_and_enhance;
use crate::fallback::fallback_content;
use crate::keywords::{extract_locations, extract_services, generate_local_keywords};
use crate::pairs::sample_pairs;
use crate::prompt::build_prompt;

/// The local-SEO content generator.
///
/// `generate` never fails: backend errors are logged and the fixed
/// template for the requested content type is returned instead, so the
/// caller always receives invariant-satisfying content.
pub struct ContentGenerator {
    backend: Arc<dyn GenerationBackend>,
    seed: Option<u64>,
}

impl ContentGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend, seed: None }
    }

    /// Pin the pair-sampling seed; used by tests for determinism.
    pub fn with_seed(backend: Arc<dyn GenerationBackend>, seed: u64) -> Self {
        Self { backend, seed: Some(seed) }
    }

    /// Generate a post for a business.
    pub async fn generate(
        &self,
        business: &BusinessContext,
        options: &ContentOptions,
    ) -> GeneratedContent {
        let locations = extract_locations(business);
        let services = extract_services(business);
        let keywords = generate_local_keywords(business, &locations);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let pairs = sample_pairs(&services, &locations, &mut rng);

        let prompt = build_prompt(business, options, &services, &locations, &pairs);
        match self.backend.generate(&prompt).await {
            Ok(raw) => {
                debug!(
                    business = %business.name,
                    content_type = options.content_type.as_str(),
                    "Backend returned {} chars",
                    raw.len()
                );
                parse_and_enhance(&raw, business, &pairs, &keywords)
            }
            Err(e) => {
                // Surfaced as a warn so operators can watch the
                // fallback rate without the caller ever seeing an error.
                warn!(
                    business = %business.name,
                    content_type = options.content_type.as_str(),
                    error = %e,
                    "Generation backend failed; using template fallback"
                );
                fallback_content(business, options, &pairs, &keywords)
            }
        }
    }
}
