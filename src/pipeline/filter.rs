// src/pipeline/filter.rs

//! Keyword and location admission rules.
//!
//! Order of checks:
//! 1. any exclusion keyword in the title rejects,
//! 2. no inclusion keyword in the title rejects,
//! 3. a real location that matches no allowed region is rejected only when
//!    it names a denied region.
//!
//! Blank and placeholder locations always pass step 3.

use crate::models::{FilterConfig, Posting};
use crate::utils::lowercase_keywords;

/// Outcome of evaluating one posting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    Admitted,
    /// Title contains this exclusion keyword
    Excluded(String),
    /// Title contains no inclusion keyword
    NoInclusionMatch,
    /// Location names this denied region
    LocationDenied(String),
}

impl FilterVerdict {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Compiled filter criteria, lower-cased once at construction.
#[derive(Debug, Clone)]
pub struct FilterEngine {
    include: Vec<String>,
    exclude: Vec<String>,
    allowed_locations: Vec<String>,
    denied_locations: Vec<String>,
    min_location_len: usize,
}

impl FilterEngine {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            include: lowercase_keywords(&config.include),
            exclude: lowercase_keywords(&config.exclude),
            allowed_locations: lowercase_keywords(&config.allowed_locations),
            denied_locations: lowercase_keywords(&config.denied_locations),
            min_location_len: config.min_location_len,
        }
    }

    /// Whether the posting should go on to scoring.
    pub fn admits(&self, posting: &Posting) -> bool {
        self.evaluate(posting).is_admitted()
    }

    pub fn evaluate(&self, posting: &Posting) -> FilterVerdict {
        let title = posting.title.to_lowercase();

        if let Some(keyword) = first_match(&self.exclude, &title) {
            return FilterVerdict::Excluded(keyword.to_string());
        }
        if first_match(&self.include, &title).is_none() {
            return FilterVerdict::NoInclusionMatch;
        }

        if posting.has_location(self.min_location_len) {
            let location = posting.location.to_lowercase();
            if first_match(&self.allowed_locations, &location).is_none() {
                if let Some(region) = first_match(&self.denied_locations, &location) {
                    return FilterVerdict::LocationDenied(region.to_string());
                }
            }
        }

        FilterVerdict::Admitted
    }
}

fn first_match<'a>(keywords: &'a [String], haystack: &str) -> Option<&'a str> {
    keywords
        .iter()
        .find(|k| haystack.contains(k.as_str()))
        .map(String::as_str)
}
