//! Recovery of JSON embedded in free-form model replies
//!
//! Replies are expected to hold a JSON array, but models wrap it in code
//! fences, prose or both. The scanner strips fence markers and then looks for
//! the first `[` or `{` whose bracket-balanced span (string-aware) parses as
//! JSON. Typed parsing moves on to the next span when a span holds nothing
//! of the expected shape. Brackets inside surrounding prose can still produce
//! a wrong match, so callers always supply a fallback.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Remove Markdown code-fence markers (with or without a language tag)
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Find the end (inclusive byte index) of the bracket span starting at `start`
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(ch) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Every parseable bracket span in `clean`, left to right
///
/// Scanning resumes after the end of each parsed span, so elements of an
/// array are not offered again as candidates of their own.
fn candidates(clean: &str) -> impl Iterator<Item = Vec<Value>> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        while let Some(offset) = clean[pos..].find(|c: char| c == '[' || c == '{') {
            let start = pos + offset;
            pos = start + 1;
            let Some(end) = balanced_end(clean, start) else {
                continue;
            };
            if let Ok(value) = serde_json::from_str::<Value>(&clean[start..=end]) {
                pos = end + 1;
                return Some(match value {
                    Value::Array(items) => items,
                    other => vec![other],
                });
            }
        }
        None
    })
}

/// Locate and parse the first JSON array or object in `text`
///
/// A top-level object is wrapped into a one-element sequence.
pub fn extract_json(text: &str) -> Option<Vec<Value>> {
    candidates(&strip_code_fences(text)).next()
}

/// Parse a model reply into records, or return `fallback`
///
/// Elements that do not deserialize as `T` are dropped. A candidate with
/// elements of which none fit is skipped in favour of the next one; when no
/// candidate yields a record, the fallback is returned.
pub fn parse_json_or<T: DeserializeOwned>(text: &str, fallback: Vec<T>) -> Vec<T> {
    let clean = strip_code_fences(text);
    let mut skipped = 0;

    for items in candidates(&clean) {
        let total = items.len();
        let records: Vec<T> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect();

        if total > 0 && records.is_empty() {
            debug!("Skipping JSON candidate with {} unusable elements", total);
            skipped += 1;
            continue;
        }
        if records.len() < total {
            warn!("Dropped {} malformed JSON elements", total - records.len());
        }
        return records;
    }

    if skipped == 0 {
        warn!("No valid JSON found in model reply, using fallback");
    } else {
        warn!("None of {} JSON candidates had the expected shape, using fallback", skipped);
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::EventRecord;
    use serde_json::json;

    #[test]
    fn test_plain_array() {
        assert_eq!(
            extract_json(r#"["a", "b"]"#),
            Some(vec![json!("a"), json!("b")])
        );
    }

    #[test]
    fn test_fenced_array_with_prose() {
        let reply = "Hier ist die Liste:\n```json\n[{\"name\": \"Rust\", \"tags\": [\"x\", \"y\"]}]\n```\nViel Erfolg!";
        assert_eq!(
            extract_json(reply),
            Some(vec![json!({"name": "Rust", "tags": ["x", "y"]})])
        );
    }

    #[test]
    fn test_nested_arrays_are_not_cut_short() {
        let reply = r#"[{"a": [1, 2]}, {"b": [3]}]"#;
        assert_eq!(
            extract_json(reply),
            Some(vec![json!({"a": [1, 2]}), json!({"b": [3]})])
        );
    }

    #[test]
    fn test_single_object_is_wrapped() {
        assert_eq!(
            extract_json(r#"Antwort: {"x": 1} fertig"#),
            Some(vec![json!({"x": 1})])
        );
    }

    #[test]
    fn test_brackets_inside_strings() {
        let reply = r#"["a ] tricky [ one", "b}"]"#;
        assert_eq!(
            extract_json(reply),
            Some(vec![json!("a ] tricky [ one"), json!("b}")])
        );
    }

    #[test]
    fn test_unparseable_candidate_is_skipped() {
        let reply = r#"[siehe unten] ["echt"]"#;
        assert_eq!(extract_json(reply), Some(vec![json!("echt")]));
    }

    #[test]
    fn test_no_json_returns_fallback_unchanged() {
        let fallback = vec![json!("fallback")];
        assert_eq!(
            parse_json_or("Leider keine Daten verfügbar.", fallback.clone()),
            fallback
        );
        assert_eq!(parse_json_or("[1, 2", fallback.clone()), fallback);
    }

    #[test]
    fn test_values_round_trip_exactly() {
        let reply = "```\n[{\"date\": \"27.01.2025\", \"n\": 3.5, \"ok\": true, \"none\": null}]\n```";
        let parsed: Vec<Value> = parse_json_or(reply, Vec::new());
        assert_eq!(
            parsed,
            vec![json!({"date": "27.01.2025", "n": 3.5, "ok": true, "none": null})]
        );
    }

    #[test]
    fn test_typed_records_drop_malformed_elements() {
        let reply = r#"[
            {"date": "27.01.2025", "category": "Politik", "description": "Wahl"},
            {"unexpected": true}
        ]"#;
        let events: Vec<EventRecord> = parse_json_or(reply, Vec::new());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].category, "Politik");
    }

    #[test]
    fn test_typed_records_skip_unusable_leading_candidate() {
        let reply = r#"Hinweis [1] siehe: [{"date": "26.01.2025", "category": "Politik", "description": "Wahl"}]"#;
        assert_eq!(extract_json(reply), Some(vec![json!(1)]));

        let events: Vec<EventRecord> = parse_json_or(reply, Vec::new());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].description, "Wahl");
    }

    #[test]
    fn test_array_elements_are_not_separate_candidates() {
        let fallback = vec!["fallback".to_string()];
        let facts: Vec<String> = parse_json_or(r#"[{"a": ["x"]}]"#, fallback.clone());
        assert_eq!(facts, fallback);
    }

    #[test]
    fn test_typed_records_all_malformed_use_fallback() {
        let fallback = vec!["Das aktuelle Jahr ist 2025".to_string()];
        let facts: Vec<String> = parse_json_or(r#"[{"a": 1}, 2]"#, fallback.clone());
        assert_eq!(facts, fallback);
    }
}
