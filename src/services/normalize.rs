// src/services/normalize.rs

//! Maps raw adapter records onto the canonical `Posting`.
//!
//! Never fails: a missing or blank title becomes `No Title`, a missing or
//! blank location becomes `Unknown`, a missing url becomes empty.

use crate::models::{NO_TITLE, Posting, RawPosting, UNKNOWN_LOCATION};
use crate::utils::normalize_whitespace;

/// Normalize one raw record for `source_name`.
pub fn normalize(raw: RawPosting, source_name: &str) -> Posting {
    Posting {
        title: non_blank(raw.title).unwrap_or_else(|| NO_TITLE.to_string()),
        url: raw.url.map(|u| u.trim().to_string()).unwrap_or_default(),
        location: non_blank(raw.location).unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
        source_name: source_name.to_string(),
    }
}

/// Normalize every record from one source.
pub fn normalize_all(raw: Vec<RawPosting>, source_name: &str) -> Vec<Posting> {
    raw.into_iter().map(|r| normalize(r, source_name)).collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_whitespace(&v))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_defaults_for_missing_fields() {
        let posting = normalize(RawPosting::default(), "Acme");
        assert_eq!(posting.title, "No Title");
        assert_eq!(posting.url, "");
        assert_eq!(posting.location, "Unknown");
        assert_eq!(posting.source_name, "Acme");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let raw = RawPosting {
            title: Some("   ".to_string()),
            url: Some(" https://example.com/1 ".to_string()),
            location: Some("\n".to_string()),
        };
        let posting = normalize(raw, "Acme");
        assert_eq!(posting.title, "No Title");
        assert_eq!(posting.url, "https://example.com/1");
        assert_eq!(posting.location, "Unknown");
    }

    #[test]
    fn collapses_whitespace() {
        let raw = RawPosting::new("  Support\n  Specialist ", "u").with_location("Tel  Aviv");
        let posting = normalize(raw, "Acme");
        assert_eq!(posting.title, "Support Specialist");
        assert_eq!(posting.location, "Tel Aviv");
    }

    #[test]
    fn normalize_all_keeps_order() {
        let postings = normalize_all(
            vec![RawPosting::new("A", "1"), RawPosting::new("B", "2")],
            "Acme",
        );
        let titles: Vec<_> = postings.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["A", "B"]);
    }
}
