//! postpilot-types: Shared domain types for the postpilot engine.
//!
//! Job and schedule records used by the scheduling registry, plus the
//! business-profile snapshot and content records exchanged with the
//! local-SEO content generator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ──────────────────── Limits ────────────────────

/// Maximum generated title length, in characters.
pub const MAX_TITLE_LEN: usize = 100;
/// Maximum generated description length, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 1500;
/// Maximum number of hashtags on a generated post.
pub const MAX_HASHTAGS: usize = 10;
/// Maximum number of local keywords on a generated post.
pub const MAX_LOCAL_KEYWORDS: usize = 10;
/// Maximum number of service/location pairs on a generated post.
pub const MAX_SERVICE_LOCATION_PAIRS: usize = 4;

// ──────────────────── Schedule Types ────────────────────

/// When a job should recur.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Schedule {
    /// Once a day at a fixed local time ("HH:MM", 24-hour).
    Daily { time: String },
    /// At minute zero of each listed hour (0..=23).
    Hourly { hours: Vec<u8> },
    /// On each listed weekday (0 = Sunday .. 6 = Saturday) at a fixed
    /// local time ("HH:MM", 24-hour).
    Weekly { days: Vec<u8>, time: String },
    /// A cron expression, evaluated by an external evaluator.
    Cron { expression: String },
}

/// A malformed schedule descriptor.
#[derive(Debug, thiserror::Error)]
pub enum InvalidSchedule {
    #[error("malformed time of day (expected HH:MM): {0}")]
    BadTime(String),
    #[error("hourly schedule has no hours")]
    EmptyHours,
    #[error("hour out of range (0..=23): {0}")]
    HourOutOfRange(u8),
    #[error("weekly schedule has no days")]
    EmptyDays,
    #[error("day out of range (0 = Sunday ..= 6 = Saturday): {0}")]
    DayOutOfRange(u8),
    #[error("empty cron expression")]
    EmptyExpression,
}

/// Parse a 24-hour "HH:MM" time-of-day string.
pub fn parse_hhmm(s: &str) -> Result<(u32, u32), InvalidSchedule> {
    let bad = || InvalidSchedule::BadTime(s.to_string());
    let (h, m) = s.split_once(':').ok_or_else(bad)?;
    if h.len() != 2 || m.len() != 2 {
        return Err(bad());
    }
    let hour: u32 = h.parse().map_err(|_| bad())?;
    let minute: u32 = m.parse().map_err(|_| bad())?;
    if hour > 23 || minute > 59 {
        return Err(bad());
    }
    Ok((hour, minute))
}

impl Schedule {
    /// Check the descriptor's structural invariants.
    ///
    /// Time strings must be well-formed 24-hour "HH:MM"; hour and day
    /// sets must be non-empty and in range; cron expressions must be
    /// non-empty (their syntax is checked by the evaluator).
    pub fn validate(&self) -> Result<(), InvalidSchedule> {
        match self {
            Schedule::Daily { time } => {
                parse_hhmm(time)?;
            }
            Schedule::Hourly { hours } => {
                if hours.is_empty() {
                    return Err(InvalidSchedule::EmptyHours);
                }
                if let Some(&h) = hours.iter().find(|&&h| h > 23) {
                    return Err(InvalidSchedule::HourOutOfRange(h));
                }
            }
            Schedule::Weekly { days, time } => {
                if days.is_empty() {
                    return Err(InvalidSchedule::EmptyDays);
                }
                if let Some(&d) = days.iter().find(|&&d| d > 6) {
                    return Err(InvalidSchedule::DayOutOfRange(d));
                }
                parse_hhmm(time)?;
            }
            Schedule::Cron { expression } => {
                if expression.trim().is_empty() {
                    return Err(InvalidSchedule::EmptyExpression);
                }
            }
        }
        Ok(())
    }
}

// ──────────────────── Job Types ────────────────────

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Eligible for scheduling.
    Active,
    /// Temporarily suspended; keeps its definition but never becomes due.
    Paused,
    /// Retired; kept for history, never becomes due.
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Archived => "archived",
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(JobStatus::Active),
            "paused" => Ok(JobStatus::Paused),
            "archived" => Ok(JobStatus::Archived),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// Content configuration attached to a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSettings {
    /// What kind of post to generate.
    pub content_type: ContentType,
    /// Voice of the generated copy.
    pub tone: Tone,
    /// Whether the posting collaborator should attach images.
    #[serde(default)]
    pub include_images: bool,
    /// Upper bound on posts per business per day.
    #[serde(default = "default_max_posts")]
    pub max_posts_per_day: u32,
}

fn default_max_posts() -> u32 {
    1
}

/// Run accounting for a job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub total_runs: u64,
    pub successful_runs: u64,
    pub failed_runs: u64,
    /// When the job last ran (any outcome).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    /// Next eligible run; None while paused or archived.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
}

/// A recurring content-automation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job ID (immutable).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Foreign key of the content-generation agent.
    pub agent_id: String,
    /// Cached display name of the agent.
    pub agent_name: String,
    /// Target business-profile IDs (at least one).
    pub business_ids: Vec<String>,
    /// Recurrence descriptor.
    pub schedule: Schedule,
    /// Lifecycle state.
    pub status: JobStatus,
    /// IANA timezone the schedule is evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Content generation settings.
    pub settings: ContentSettings,
    /// Run accounting.
    #[serde(default)]
    pub stats: RunStats,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

fn default_timezone() -> String {
    "UTC".to_string()
}

// ──────────────────── Business Profile Types ────────────────────

/// A named place inside a business's service area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServicePlace {
    pub place_name: String,
    pub place_id: String,
}

/// The geographic area a business serves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceArea {
    /// e.g. "customer_location" for businesses that travel to customers.
    pub business_type: String,
    #[serde(default)]
    pub places: Vec<ServicePlace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_code: Option<String>,
}

/// A service a business offers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceType {
    pub service_type_id: String,
    pub display_name: String,
}

/// Read-only snapshot of a business profile passed into content
/// generation. The generator never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessContext {
    pub name: String,
    /// Primary category (e.g. "Plumbing").
    pub category: String,
    /// Postal address as a single comma-separated string; may be empty.
    #[serde(default)]
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_area: Option<ServiceArea>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub service_types: Vec<ServiceType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
}

// ──────────────────── Content Types ────────────────────

/// The seven supported post kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Promotional,
    Educational,
    CommunitySpotlight,
    Seasonal,
    BehindTheScenes,
    CustomerStory,
    ServiceHighlight,
}

impl ContentType {
    pub const ALL: [ContentType; 7] = [
        ContentType::Promotional,
        ContentType::Educational,
        ContentType::CommunitySpotlight,
        ContentType::Seasonal,
        ContentType::BehindTheScenes,
        ContentType::CustomerStory,
        ContentType::ServiceHighlight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Promotional => "promotional",
            ContentType::Educational => "educational",
            ContentType::CommunitySpotlight => "community_spotlight",
            ContentType::Seasonal => "seasonal",
            ContentType::BehindTheScenes => "behind_the_scenes",
            ContentType::CustomerStory => "customer_story",
            ContentType::ServiceHighlight => "service_highlight",
        }
    }
}

/// An unrecognized content type or tone tag.
#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownTag {
    pub kind: &'static str,
    pub value: String,
}

impl FromStr for ContentType {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownTag {
                kind: "content type",
                value: s.to_string(),
            })
    }
}

/// Voice of the generated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Professional,
    Friendly,
    Casual,
    Enthusiastic,
    Informative,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Friendly,
        Tone::Casual,
        Tone::Enthusiastic,
        Tone::Informative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Casual => "casual",
            Tone::Enthusiastic => "enthusiastic",
            Tone::Informative => "informative",
        }
    }
}

impl FromStr for Tone {
    type Err = UnknownTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTag {
                kind: "tone",
                value: s.to_string(),
            })
    }
}

/// Options for a single content-generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentOptions {
    pub content_type: ContentType,
    pub tone: Tone,
    #[serde(default = "default_true")]
    pub include_services: bool,
    #[serde(default = "default_true")]
    pub include_locations: bool,
    #[serde(default = "default_true")]
    pub focus_local_seo: bool,
    /// e.g. "spring cleaning season" for seasonal posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seasonal_context: Option<String>,
}

fn default_true() -> bool {
    true
}

/// A (service, location) pairing used to localize generated copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLocationPair {
    pub service: String,
    pub location: String,
}

/// A generated post, with the local-SEO invariants already enforced:
/// title ≤ 100 chars, description ≤ 1500 chars, ≤ 10 deduplicated
/// alphanumeric hashtags, ≤ 10 local keywords, ≤ 4 unique pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub description: String,
    pub hashtags: Vec<String>,
    pub local_keywords: Vec<String>,
    pub service_location_pairs: Vec<ServiceLocationPair>,
    /// True when the fixed template was used because the generation
    /// backend was unavailable.
    #[serde(default)]
    pub used_fallback: bool,
}
