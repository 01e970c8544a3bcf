//! # Version Registry Lookup
//!
//! Queries package registries for current release versions. Each entry names
//! an endpoint and a JSON pointer to the version field in its response.
//! Lookups run concurrently; a failed or empty lookup omits that package.

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::fetcher::{FetchError, Fetcher};
use crate::snapshot::{TechUpdateRecord, german_date};

/// Upper bound on registry-sourced entries
pub const MAX_REGISTRY_ENTRIES: usize = 8;

/// One package in the version registry table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Display name, e.g. "Node.js"
    pub name: String,

    /// Endpoint returning JSON
    pub url: String,

    /// JSON pointer (RFC 6901) to the version field
    pub pointer: String,

    /// Description written into the snapshot entry
    #[serde(default)]
    pub description: Option<String>,
}

impl RegistryEntry {
    pub fn new(name: &str, url: &str, pointer: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            pointer: pointer.to_string(),
            description: None,
        }
    }
}

pub fn default_registry() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry::new("Node.js", "https://nodejs.org/dist/index.json", "/0/version"),
        RegistryEntry::new(
            "Python",
            "https://endoflife.date/api/python.json",
            "/0/latest",
        ),
        RegistryEntry::new(
            "Rust",
            "https://api.github.com/repos/rust-lang/rust/releases/latest",
            "/tag_name",
        ),
        RegistryEntry::new("TypeScript", "https://registry.npmjs.org/typescript/latest", "/version"),
        RegistryEntry::new("React", "https://registry.npmjs.org/react/latest", "/version"),
        RegistryEntry::new("Vue.js", "https://registry.npmjs.org/vue/latest", "/version"),
        RegistryEntry::new(
            "Angular",
            "https://registry.npmjs.org/@angular/core/latest",
            "/version",
        ),
        RegistryEntry::new("npm", "https://registry.npmjs.org/npm/latest", "/version"),
    ]
}

/// Trim a version string and drop a leading `v`/`V`
///
/// Returns `None` for blank input.
pub fn normalize_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let version = trimmed
        .strip_prefix('v')
        .or_else(|| trimmed.strip_prefix('V'))
        .unwrap_or(trimmed)
        .trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// Read the version field at `pointer`; strings and numbers are accepted
fn version_at(document: &Value, pointer: &str) -> Option<String> {
    match document.pointer(pointer)? {
        Value::String(s) => normalize_version(s),
        Value::Number(n) => normalize_version(&n.to_string()),
        _ => None,
    }
}

async fn lookup_one(
    fetcher: &Fetcher,
    entry: &RegistryEntry,
    timeout: Duration,
) -> Result<Option<String>, FetchError> {
    let document = fetcher.get_json(&entry.url, timeout).await?;
    Ok(version_at(&document, &entry.pointer))
}

/// Look up the latest version of every registry entry
///
/// # Arguments
///
/// * `fetcher` - Shared HTTP fetcher
/// * `entries` - Registry table; output follows its order
/// * `timeout` - Per-lookup timeout
/// * `now` - Date stamped on each entry
///
/// # Returns
///
/// At most [`MAX_REGISTRY_ENTRIES`] records, failed lookups omitted
#[instrument(skip(fetcher, entries), fields(packages = entries.len()))]
pub async fn lookup_versions(
    fetcher: &Fetcher,
    entries: &[RegistryEntry],
    timeout: Duration,
    now: DateTime<Utc>,
) -> Vec<TechUpdateRecord> {
    let lookups = entries
        .iter()
        .map(|entry| async move { (entry, lookup_one(fetcher, entry, timeout).await) });
    let results = future::join_all(lookups).await;

    let date = german_date(&now);
    let records: Vec<TechUpdateRecord> = results
        .into_iter()
        .filter_map(|(entry, result)| match result {
            Ok(Some(version)) => {
                debug!("{} is at {}", entry.name, version);
                Some(TechUpdateRecord {
                    name: entry.name.clone(),
                    version,
                    date: date.clone(),
                    description: entry
                        .description
                        .clone()
                        .unwrap_or_else(|| "Aktuelle stabile Version laut Paket-Registry".to_string()),
                })
            }
            Ok(None) => {
                warn!("No version field at {} for {}", entry.pointer, entry.name);
                None
            }
            Err(e) => {
                warn!("Version lookup for {} failed: {}", entry.name, e);
                None
            }
        })
        .take(MAX_REGISTRY_ENTRIES)
        .collect();

    info!("{} of {} registry versions found", records.len(), entries.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchConfig;
    use chrono::TimeZone;
    use mockito::Server;

    #[test]
    fn test_normalize_version() {
        assert_eq!(normalize_version("v22.13.1").as_deref(), Some("22.13.1"));
        assert_eq!(normalize_version(" V1.0 ").as_deref(), Some("1.0"));
        assert_eq!(normalize_version("19.0.0").as_deref(), Some("19.0.0"));
        assert_eq!(normalize_version("v"), None);
        assert_eq!(normalize_version("  "), None);
    }

    #[test]
    fn test_version_at_pointer() {
        let doc = serde_json::json!([{"version": "v23.6.0"}, {"version": "v23.5.0"}]);
        assert_eq!(version_at(&doc, "/0/version").as_deref(), Some("23.6.0"));
        assert_eq!(version_at(&doc, "/5/version"), None);
        assert_eq!(
            version_at(&serde_json::json!({"latest": 3.13}), "/latest").as_deref(),
            Some("3.13")
        );
        assert_eq!(version_at(&serde_json::json!({"latest": null}), "/latest"), None);
    }

    #[test]
    fn test_default_registry_fits_cap() {
        assert!(default_registry().len() <= MAX_REGISTRY_ENTRIES);
    }

    #[tokio::test]
    async fn test_lookup_versions_omits_failures_and_keeps_order() {
        let mut server = Server::new_async().await;
        let _node = server
            .mock("GET", "/node")
            .with_status(200)
            .with_body(r#"[{"version": "v22.13.1"}]"#)
            .create_async()
            .await;
        let _down = server
            .mock("GET", "/down")
            .with_status(502)
            .create_async()
            .await;
        let _empty = server
            .mock("GET", "/empty")
            .with_status(200)
            .with_body(r#"{"version": ""}"#)
            .create_async()
            .await;
        let _garbage = server
            .mock("GET", "/garbage")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;
        let _react = server
            .mock("GET", "/react")
            .with_status(200)
            .with_body(r#"{"name": "react", "version": "19.0.0"}"#)
            .create_async()
            .await;

        let entries = vec![
            RegistryEntry::new("Node.js", &format!("{}/node", server.url()), "/0/version"),
            RegistryEntry::new("Down", &format!("{}/down", server.url()), "/version"),
            RegistryEntry::new("Empty", &format!("{}/empty", server.url()), "/version"),
            RegistryEntry::new("Garbage", &format!("{}/garbage", server.url()), "/version"),
            RegistryEntry::new("React", &format!("{}/react", server.url()), "/version"),
        ];
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 27, 0, 0, 0).unwrap();

        let records = lookup_versions(&fetcher, &entries, Duration::from_secs(2), now).await;

        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Node.js", "React"]);
        assert_eq!(records[0].version, "22.13.1");
        assert_eq!(records[0].date, "27.01.2025");
    }

    #[tokio::test]
    async fn test_lookup_versions_omits_timed_out_package() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let silent = format!("http://{}/latest", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut server = Server::new_async().await;
        let _vue = server
            .mock("GET", "/vue")
            .with_status(200)
            .with_body(r#"{"version": "3.5.13"}"#)
            .create_async()
            .await;

        let entries = vec![
            RegistryEntry::new("Slow", &silent, "/version"),
            RegistryEntry::new("Vue.js", &format!("{}/vue", server.url()), "/version"),
        ];
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();

        let started = std::time::Instant::now();
        let records =
            lookup_versions(&fetcher, &entries, Duration::from_millis(300), Utc::now()).await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Vue.js");
        assert_eq!(records[0].version, "3.5.13");
    }

    #[tokio::test]
    async fn test_lookup_versions_caps_result() {
        let mut server = Server::new_async().await;
        let _pkg = server
            .mock("GET", "/pkg")
            .with_status(200)
            .with_body(r#"{"version": "1.2.3"}"#)
            .expect_at_least(1)
            .create_async()
            .await;

        let entries: Vec<_> = (0..10)
            .map(|i| RegistryEntry::new(&format!("pkg{i}"), &format!("{}/pkg", server.url()), "/version"))
            .collect();
        let fetcher = Fetcher::new(FetchConfig::default()).unwrap();

        let records = lookup_versions(&fetcher, &entries, Duration::from_secs(2), Utc::now()).await;
        assert_eq!(records.len(), MAX_REGISTRY_ENTRIES);
        assert_eq!(records[7].name, "pkg7");
    }
}
