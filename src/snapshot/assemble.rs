//! Snapshot assembly
//!
//! Everything here is a pure function of its inputs; the clock reading is
//! passed in by the caller.

use std::time::Duration;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};

use super::calendar::{german_month_name, german_weekday_name};
use super::{
    ContextInfo, ContextSnapshot, CurrentDate, DataQuality, EventRecord, Meta, Quality,
    SNAPSHOT_VERSION, Statistics, TechUpdateRecord,
};

/// Number of configured inputs, reported in `meta` and `statistics`
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceCounts {
    pub news: usize,
    pub tech: usize,
    pub registry: usize,
}

/// The generated lists of one run
#[derive(Debug, Clone, Default)]
pub struct GeneratedContent {
    pub events: Vec<EventRecord>,
    /// Already merged and capped, see [`merge_technology`]
    pub technology: Vec<TechUpdateRecord>,
    pub facts: Vec<String>,
    /// How many registry lookups produced a version
    pub registry_versions_found: usize,
}

/// Merge looked-up versions with model output
///
/// Registry entries come first; the result never exceeds `cap`.
pub fn merge_technology(
    registry: Vec<TechUpdateRecord>,
    generated: Vec<TechUpdateRecord>,
    cap: usize,
) -> Vec<TechUpdateRecord> {
    registry.into_iter().chain(generated).take(cap).collect()
}

fn iso_timestamp(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build the snapshot for one run
///
/// # Arguments
///
/// * `content` - Generated events, technology and facts
/// * `now` - Wall-clock time of the run
/// * `counts` - Configured source counts
/// * `generation_time` - Time spent producing `content`
/// * `update_interval` - Schedule interval, used for `nextUpdate`
pub fn assemble(
    content: GeneratedContent,
    now: DateTime<Utc>,
    counts: SourceCounts,
    generation_time: Duration,
    update_interval: chrono::Duration,
) -> ContextSnapshot {
    let month_name = german_month_name(now.month());
    let iso_date = now.format("%Y-%m-%d").to_string();
    let interval_hours = update_interval.num_hours();

    let meta = Meta {
        last_updated: iso_timestamp(&now),
        next_update: iso_timestamp(&(now + update_interval)),
        version: SNAPSHOT_VERSION.to_string(),
        purpose: "Aktuelle Kontextinformationen für KI-Systeme".to_string(),
        source: "Automatisch generiert via Gemini AI + News-Scraping + Paket-Registries"
            .to_string(),
        data_quality: DataQuality {
            events: Quality::of_len(content.events.len()),
            technology: Quality::of_len(content.technology.len()),
            facts: Quality::of_len(content.facts.len()),
        },
        news_sources: counts.news,
        tech_sources: counts.tech,
        registry_packages: counts.registry,
    };

    let current_date = CurrentDate {
        year: now.year(),
        month: now.month(),
        day: now.day(),
        quarter: (now.month() - 1) / 3 + 1,
        day_of_week: german_weekday_name(now.weekday()).to_string(),
        month_name: month_name.to_string(),
        iso: iso_date.clone(),
        timestamp: iso_timestamp(&now),
        timezone: "UTC".to_string(),
        week_of_year: now.iso_week().week(),
    };

    let context = ContextInfo {
        timeframe: format!("{} {}", month_name, now.year()),
        world_state: "Post-2024 KI-Boom, kontinuierliche technologische Entwicklung"
            .to_string(),
        key_topics: [
            "Künstliche Intelligenz",
            "Automatisierung",
            "Multimodale Systeme",
            "LLM Integration",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        last_major_update: iso_date,
        news_coverage: "Letzte 7 Tage".to_string(),
        update_frequency: format!("Alle {} Stunden", interval_hours),
    };

    let statistics = Statistics {
        events_count: content.events.len(),
        technology_count: content.technology.len(),
        facts_count: content.facts.len(),
        generation_time_ms: generation_time.as_millis() as u64,
        news_sources_queried: counts.news,
        tech_sources_queried: counts.tech,
        registry_versions_found: content.registry_versions_found,
    };

    ContextSnapshot {
        meta,
        current_date,
        events: content.events,
        technology: content.technology,
        important_facts: content.facts,
        context,
        statistics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tech(name: &str) -> TechUpdateRecord {
        TechUpdateRecord {
            name: name.to_string(),
            version: "1.0".to_string(),
            date: "27.01.2025".to_string(),
            description: String::new(),
        }
    }

    fn counts() -> SourceCounts {
        SourceCounts {
            news: 8,
            tech: 6,
            registry: 8,
        }
    }

    #[test]
    fn test_merge_puts_registry_first_and_caps() {
        let registry: Vec<_> = (0..8).map(|i| tech(&format!("reg{i}"))).collect();
        let generated: Vec<_> = (0..10).map(|i| tech(&format!("gen{i}"))).collect();

        let merged = merge_technology(registry, generated, 12);

        assert_eq!(merged.len(), 12);
        assert!(merged[..8].iter().all(|t| t.name.starts_with("reg")));
        assert_eq!(merged[8].name, "gen0");
        assert_eq!(merged[11].name, "gen3");
    }

    #[test]
    fn test_merge_without_registry() {
        let merged = merge_technology(Vec::new(), vec![tech("a"), tech("b")], 12);
        assert_eq!(merged, vec![tech("a"), tech("b")]);
    }

    #[test]
    fn test_current_date_block() {
        let now = Utc.with_ymd_and_hms(2025, 1, 27, 10, 30, 0).unwrap();
        let snapshot = assemble(
            GeneratedContent::default(),
            now,
            counts(),
            Duration::from_millis(1234),
            chrono::Duration::hours(6),
        );

        let date = &snapshot.current_date;
        assert_eq!((date.year, date.month, date.day), (2025, 1, 27));
        assert_eq!(date.quarter, 1);
        assert_eq!(date.day_of_week, "Montag");
        assert_eq!(date.month_name, "Januar");
        assert_eq!(date.iso, "2025-01-27");
        assert_eq!(date.timestamp, "2025-01-27T10:30:00.000Z");
        assert_eq!(date.week_of_year, 5);

        assert_eq!(snapshot.meta.last_updated, "2025-01-27T10:30:00.000Z");
        assert_eq!(snapshot.meta.next_update, "2025-01-27T16:30:00.000Z");
        assert_eq!(snapshot.context.timeframe, "Januar 2025");
        assert_eq!(snapshot.context.update_frequency, "Alle 6 Stunden");
        assert_eq!(snapshot.statistics.generation_time_ms, 1234);
    }

    #[test]
    fn test_iso_week_crosses_year_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        let snapshot = assemble(
            GeneratedContent::default(),
            now,
            counts(),
            Duration::ZERO,
            chrono::Duration::hours(6),
        );
        assert_eq!(snapshot.current_date.week_of_year, 1);
        assert_eq!(snapshot.current_date.quarter, 4);
    }

    #[test]
    fn test_quality_flags_and_counts() {
        let now = Utc.with_ymd_and_hms(2025, 7, 4, 12, 0, 0).unwrap();
        let content = GeneratedContent {
            events: Vec::new(),
            technology: vec![tech("a"), tech("b")],
            facts: vec!["Das aktuelle Jahr ist 2025".to_string()],
            registry_versions_found: 1,
        };

        let snapshot = assemble(
            content,
            now,
            counts(),
            Duration::ZERO,
            chrono::Duration::hours(6),
        );

        assert_eq!(snapshot.meta.data_quality.events, Quality::Fallback);
        assert_eq!(snapshot.meta.data_quality.technology, Quality::Good);
        assert_eq!(snapshot.meta.data_quality.facts, Quality::Fallback);
        assert_eq!(snapshot.statistics.technology_count, 2);
        assert_eq!(snapshot.statistics.news_sources_queried, 8);
        assert_eq!(snapshot.meta.registry_packages, 8);
        assert_eq!(snapshot.current_date.quarter, 3);
    }

    #[test]
    fn test_serialized_key_order() {
        let now = Utc.with_ymd_and_hms(2025, 1, 27, 10, 30, 0).unwrap();
        let snapshot = assemble(
            GeneratedContent::default(),
            now,
            counts(),
            Duration::ZERO,
            chrono::Duration::hours(6),
        );
        let value = serde_json::to_value(&snapshot).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            keys,
            vec![
                "meta",
                "currentDate",
                "events",
                "technology",
                "importantFacts",
                "context",
                "statistics"
            ]
        );
        assert_eq!(value["meta"]["dataQuality"]["events"], "fallback");
    }
}
