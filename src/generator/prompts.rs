//! Prompt templates
//!
//! Prompts are deterministic for a given time and document set.

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::fetcher::{SourceDocument, truncate_chars};
use crate::snapshot::german_date;

/// `host: excerpt...` lines under a heading, or nothing without documents
fn context_section(heading: &str, documents: &[SourceDocument], excerpt_chars: usize) -> String {
    if documents.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = documents
        .iter()
        .map(|doc| {
            format!(
                "{}: {}...",
                doc.source,
                truncate_chars(&doc.content, excerpt_chars)
            )
        })
        .collect();
    format!("\n\n{}:\n{}", heading, lines.join("\n"))
}

pub fn events_prompt(
    now: &DateTime<Utc>,
    documents: &[SourceDocument],
    excerpt_chars: usize,
) -> String {
    let today = german_date(now);
    let week_ago = german_date(&(*now - Duration::days(7)));
    let context = context_section(
        "Kontext aus aktuellen News-Quellen",
        documents,
        excerpt_chars,
    );

    format!(
        r#"Du bist ein Nachrichten-Analyst. Erstelle eine JSON-Liste der 8 wichtigsten aktuellen Ereignisse der letzten Woche ({week_ago} bis {today}).

Berücksichtige:
- Politik (Wahlen, Gesetze, internationale Beziehungen, Krisen)
- Wirtschaft (Unternehmen, Börse, Fusionen, Insolvenzen)
- Technologie (KI, Software-Releases, Sicherheitsvorfälle)
- Gesellschaft (Kultur, Sport)
- Wissenschaft (Medizin, Forschung)

Verwende nur echte, überprüfbare Ereignisse der letzten 7 Tage.{context}

Format:
[
  {{
    "date": "TT.MM.JJJJ",
    "category": "Kategorie",
    "description": "Kurze, präzise Beschreibung",
    "source": "Quelle (optional)"
  }}
]

Aktuelles Datum: {today}
Antworte nur mit dem JSON-Array."#
    )
}

pub fn technology_prompt(
    now: &DateTime<Utc>,
    documents: &[SourceDocument],
    excerpt_chars: usize,
) -> String {
    let today = german_date(now);
    let context = context_section("Kontext aus Tech-News", documents, excerpt_chars);

    format!(
        r#"Du bist ein Tech-Experte. Erstelle eine JSON-Liste der 10 wichtigsten Software- und Technologie-Updates der letzten Woche.

Berücksichtige:
- Neue Versionen von Programmiersprachen und Frameworks
- Browser-Updates
- KI-Modelle
- Mobile Betriebssysteme
- Sicherheits-Updates und Patches{context}

Format:
[
  {{
    "name": "Software/Tool",
    "version": "Versionsnummer",
    "date": "TT.MM.JJJJ",
    "description": "Wichtigste Neuerung"
  }}
]

Aktuelles Datum: {today}
Antworte nur mit dem JSON-Array."#
    )
}

pub fn facts_prompt(now: &DateTime<Utc>) -> String {
    let today = german_date(now);
    let year = now.year();

    format!(
        r#"Du bist ein KI-Trainer. Erstelle eine JSON-Liste der 6 wichtigsten Fakten für KI-Systeme über die aktuelle Zeit ({year}).

Fokus auf grundlegende Orientierung:
- Aktuelles Jahr ({year})
- Wichtige technologische Standards
- Verbreitete Tools und Plattformen
- Gesellschaftliche Entwicklungen
- Aktuelle politische und wirtschaftliche Lage

Format:
[
  "Das aktuelle Jahr ist {year}",
  "Weitere Fakten..."
]

Datum heute: {today}
Antworte nur mit dem JSON-Array."#
    )
}
