// src/models/source.rs

//! Employer job-board descriptors.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::PostingIdentity;

/// Format of an employer's job listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Greenhouse board API (JSON), locator is the board token
    Greenhouse,
    /// Comeet listing page (HTML), locator is the company slug
    Comeet,
    /// Arbitrary careers page (HTML), locator is the page URL
    CareersPage,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Greenhouse => "greenhouse",
            Self::Comeet => "comeet",
            Self::CareersPage => "careers_page",
        };
        f.write_str(name)
    }
}

/// One configured employer endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Company display name, also part of every posting identity
    pub name: String,

    #[serde(rename = "type")]
    pub kind: SourceKind,

    /// Board identifier or page URL
    #[serde(alias = "identifier", alias = "url")]
    pub locator: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, kind: SourceKind, locator: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            locator: locator.into(),
        }
    }
}

/// Parse a JSON source list, skipping malformed entries.
///
/// A document that is not a JSON array yields no sources.
pub fn parse_sources(content: &str) -> Vec<SourceDescriptor> {
    let entries: Vec<serde_json::Value> = match serde_json::from_str(content) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("Source list is not a JSON array: {}", e);
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(
            |(idx, entry)| match serde_json::from_value::<SourceDescriptor>(entry) {
                Ok(source) if source.name.trim().is_empty() || source.locator.trim().is_empty() => {
                    log::warn!("Skipping source #{}: empty name or locator", idx);
                    None
                }
                Ok(source) if source.name.contains(PostingIdentity::SEPARATOR) => {
                    log::warn!(
                        "Skipping source #{}: name '{}' contains '{}'",
                        idx,
                        source.name,
                        PostingIdentity::SEPARATOR
                    );
                    None
                }
                Ok(source) => Some(source),
                Err(e) => {
                    log::warn!("Skipping source #{}: {}", idx, e);
                    None
                }
            },
        )
        .collect()
}

/// Load the source list from a JSON file.
///
/// Missing or unreadable files yield an empty list.
pub fn load_sources(path: impl AsRef<Path>) -> Vec<SourceDescriptor> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => parse_sources(&content),
        Err(e) => {
            log::warn!("Source list unavailable at {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
