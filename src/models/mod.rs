// src/models/mod.rs

//! Domain models for the job radar.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod posting;
mod score;
mod seen;
mod source;

// Re-export all public types
pub use config::{
    Config, DevOverrides, FilterConfig, HttpConfig, NotifyConfig, PipelineConfig, ScorerConfig,
    ScorerProvider,
};
pub use posting::{IdentityMode, NO_TITLE, Posting, PostingIdentity, RawPosting, UNKNOWN_LOCATION};
pub use score::ScoreResult;
pub use seen::SeenSet;
pub use source::{SourceDescriptor, SourceKind, load_sources, parse_sources};
