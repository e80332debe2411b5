//! Service layer for the job radar.
//!
//! This module contains the I/O-facing pieces of a scan:
//! - Source adapters (`SourceFetcher`, `HttpSourceFetcher`)
//! - Posting normalization (`normalize`)
//! - Relevance scoring (`RelevanceScorer`, `TextGenerator`)
//! - Notification delivery (`Notifier`)

pub mod normalize;
pub mod notify;
pub mod scorer;
pub mod sources;

pub use notify::{LogNotifier, Notifier, TelegramNotifier};
pub use scorer::{DynTextGenerator, RelevanceScorer, TextGenerator};
pub use sources::{HttpSourceFetcher, SourceFetcher};
