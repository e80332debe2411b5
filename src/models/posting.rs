//! Posting data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Title used when a source omits one.
pub const NO_TITLE: &str = "No Title";

/// Location used when a source omits one.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// A posting as an adapter extracted it, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPosting {
    pub title: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
}

impl RawPosting {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: Some(url.into()),
            location: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A normalized job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Job title
    pub title: String,

    /// Absolute link to the posting (may be empty)
    pub url: String,

    /// Location text, `Unknown` when the source gave none
    pub location: String,

    /// Name of the source the posting came from
    pub source_name: String,
}

impl Posting {
    /// Deduplication key for this posting.
    pub fn identity(&self, mode: IdentityMode) -> PostingIdentity {
        match mode {
            IdentityMode::SourceTitle => PostingIdentity(format!(
                "{}{}{}",
                self.source_name,
                PostingIdentity::SEPARATOR,
                self.title
            )),
            IdentityMode::SourceTitleUrl => PostingIdentity(format!(
                "{}{sep}{}{sep}{}",
                self.source_name,
                self.title,
                self.url,
                sep = PostingIdentity::SEPARATOR
            )),
        }
    }

    /// Whether the location carries real information.
    pub fn has_location(&self, min_len: usize) -> bool {
        let location = self.location.trim();
        location.chars().count() >= min_len && !location.eq_ignore_ascii_case(UNKNOWN_LOCATION)
    }

    /// Format posting for display using a template.
    ///
    /// Supported placeholders: `{source}`, `{title}`, `{location}`, `{url}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{source}", &self.source_name)
            .replace("{title}", &self.title)
            .replace("{location}", &self.location)
            .replace("{url}", &self.url)
    }
}

/// Which posting fields make up the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityMode {
    #[default]
    SourceTitle,
    SourceTitleUrl,
}

/// Stable dedup key, always prefixed by the source name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingIdentity(String);

impl PostingIdentity {
    /// Joins identity fields; source names may not contain it.
    pub const SEPARATOR: &'static str = "::";

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PostingIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for PostingIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(source: &str, title: &str) -> Posting {
        Posting {
            title: title.to_string(),
            url: "https://example.com/jobs/1".to_string(),
            location: "Tel Aviv".to_string(),
            source_name: source.to_string(),
        }
    }

    #[test]
    fn identity_includes_source_name() {
        let a = sample("Acme", "Support Specialist");
        let b = sample("Globex", "Support Specialist");
        assert_ne!(
            a.identity(IdentityMode::SourceTitle),
            b.identity(IdentityMode::SourceTitle)
        );
        assert_eq!(
            a.identity(IdentityMode::SourceTitle).as_str(),
            "Acme::Support Specialist"
        );
    }

    #[test]
    fn identity_with_url() {
        let a = sample("Acme", "QA Analyst");
        assert_eq!(
            a.identity(IdentityMode::SourceTitleUrl).as_str(),
            "Acme::QA Analyst::https://example.com/jobs/1"
        );
    }

    #[test]
    fn placeholder_locations_carry_no_information() {
        let mut posting = sample("Acme", "QA Analyst");
        assert!(posting.has_location(3));

        posting.location = "Unknown".to_string();
        assert!(!posting.has_location(3));

        posting.location = " ".to_string();
        assert!(!posting.has_location(3));

        posting.location = "IL".to_string();
        assert!(!posting.has_location(3));
    }

    #[test]
    fn test_format() {
        let posting = sample("Acme", "QA Analyst");
        assert_eq!(
            posting.format("[{source}] {title} ({location})"),
            "[Acme] QA Analyst (Tel Aviv)"
        );
    }
}
