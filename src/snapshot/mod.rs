//! # Context Snapshot Module
//!
//! The persisted aggregate written once per run, and the records it is made
//! of. Field names serialize in camelCase and struct field order is the key
//! order of the written file.
//!
//! ## Key Components
//!
//! - `ContextSnapshot`: the whole document (`meta`, `currentDate`, `events`,
//!   `technology`, `importantFacts`, `context`, `statistics`)
//! - `EventRecord`, `TechUpdateRecord`: generated or looked-up list entries
//! - `assemble`: pure construction of a snapshot from run results
//! - `merge_technology`: registry-first merge of version and model entries

mod assemble;
mod calendar;

pub use assemble::{GeneratedContent, SourceCounts, assemble, merge_technology};
pub use calendar::{german_date, german_month_name, german_weekday_name};

use serde::{Deserialize, Serialize};

/// Schema version written into `meta.version`
pub const SNAPSHOT_VERSION: &str = "2.2";

/// Upper bound for the merged technology list
pub const MAX_TECHNOLOGY: usize = 12;

/// A notable event from the last week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Free-text date as reported by the model
    pub date: String,

    /// Category such as "Politik" or "Technologie"
    pub category: String,

    /// Short description
    pub description: String,

    /// Optional source attribution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A software release or technology update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechUpdateRecord {
    pub name: String,
    pub version: String,
    pub date: String,
    pub description: String,
}

/// Whether a generated list carries real content or the static default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Good,
    Fallback,
}

impl Quality {
    /// A list with more than one entry counts as real content
    pub fn of_len(len: usize) -> Self {
        if len > 1 {
            Quality::Good
        } else {
            Quality::Fallback
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQuality {
    pub events: Quality,
    pub technology: Quality,
    pub facts: Quality,
}

/// Snapshot metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub last_updated: String,
    pub next_update: String,
    pub version: String,
    pub purpose: String,
    pub source: String,
    pub data_quality: DataQuality,
    pub news_sources: usize,
    pub tech_sources: usize,
    pub registry_packages: usize,
}

/// Calendar breakdown of the run time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub quarter: u32,
    pub day_of_week: String,
    pub month_name: String,
    pub iso: String,
    pub timestamp: String,
    pub timezone: String,
    pub week_of_year: u32,
}

/// Static orientation text for consumers of the snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextInfo {
    pub timeframe: String,
    pub world_state: String,
    pub key_topics: Vec<String>,
    pub last_major_update: String,
    pub news_coverage: String,
    pub update_frequency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub events_count: usize,
    pub technology_count: usize,
    pub facts_count: usize,
    pub generation_time_ms: u64,
    pub news_sources_queried: usize,
    pub tech_sources_queried: usize,
    pub registry_versions_found: usize,
}

/// The document persisted to `context.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub meta: Meta,
    pub current_date: CurrentDate,
    pub events: Vec<EventRecord>,
    pub technology: Vec<TechUpdateRecord>,
    pub important_facts: Vec<String>,
    pub context: ContextInfo,
    pub statistics: Statistics,
}
