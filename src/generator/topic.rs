//! Generation topics and their fixed parameters

use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use crate::snapshot::{EventRecord, TechUpdateRecord, german_date};

/// One of the three generation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Events,
    Technology,
    Facts,
}

/// Sampling parameters sent with a generation request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub top_k: Option<i32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: i32,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Events, Topic::Technology, Topic::Facts];

    pub fn sampling(self) -> Sampling {
        match self {
            Topic::Events => Sampling {
                temperature: 0.3,
                top_k: Some(40),
                top_p: Some(0.95),
                max_output_tokens: 2048,
            },
            Topic::Technology => Sampling {
                temperature: 0.2,
                top_k: None,
                top_p: None,
                max_output_tokens: 2048,
            },
            Topic::Facts => Sampling {
                temperature: 0.1,
                top_k: None,
                top_p: None,
                max_output_tokens: 1024,
            },
        }
    }

    /// How many extracted documents go into the prompt
    pub fn source_limit(self) -> usize {
        match self {
            Topic::Events => 5,
            Topic::Technology => 3,
            Topic::Facts => 0,
        }
    }

    /// Characters of each document quoted in the prompt
    pub fn excerpt_chars(self) -> usize {
        200
    }

    /// Maximum number of generated entries kept
    pub fn cap(self) -> usize {
        match self {
            Topic::Events => 8,
            Topic::Technology => 10,
            Topic::Facts => 6,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topic::Events => "events",
            Topic::Technology => "technology",
            Topic::Facts => "facts",
        };
        f.write_str(name)
    }
}

// Fallbacks hold a single entry so the snapshot flags them as "fallback".

pub fn fallback_events(now: &DateTime<Utc>) -> Vec<EventRecord> {
    vec![EventRecord {
        date: german_date(now),
        category: "System".to_string(),
        description: "Kontext-Update ausgeführt, keine aktuellen Ereignisse verfügbar"
            .to_string(),
        source: Some("context-updater".to_string()),
    }]
}

pub fn fallback_technology(now: &DateTime<Utc>) -> Vec<TechUpdateRecord> {
    vec![TechUpdateRecord {
        name: "context-updater".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        date: german_date(now),
        description: "Keine aktuellen Technologie-Updates verfügbar".to_string(),
    }]
}

pub fn fallback_facts(now: &DateTime<Utc>) -> Vec<String> {
    vec![format!("Das aktuelle Jahr ist {}", now.year())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fallbacks_are_single_entries() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(fallback_events(&now).len(), 1);
        assert_eq!(fallback_technology(&now).len(), 1);
        assert_eq!(fallback_facts(&now), vec!["Das aktuelle Jahr ist 2025"]);
        assert_eq!(fallback_events(&now)[0].date, "01.03.2025");
    }

    #[test]
    fn test_topic_parameters() {
        assert_eq!(Topic::Events.cap(), 8);
        assert_eq!(Topic::Facts.cap(), 6);
        assert_eq!(Topic::Facts.source_limit(), 0);
        assert_eq!(Topic::Events.sampling().top_k, Some(40));
        assert_eq!(Topic::Facts.sampling().max_output_tokens, 1024);
    }
}
