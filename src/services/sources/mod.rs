// src/services/sources/mod.rs

//! Source adapters.
//!
//! Each adapter turns one employer endpoint into raw postings. Fetching and
//! parsing are split so the parsers can be exercised on fixture documents:
//! - `greenhouse`: JSON board API
//! - `comeet`: listing page scrape by job/position/career class names
//! - `careers_page`: any careers page, anchors pre-filtered by keyword

pub mod careers_page;
pub mod comeet;
pub mod greenhouse;

use async_trait::async_trait;
use reqwest::Client;
use scraper::Selector;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{RawPosting, SourceDescriptor, SourceKind};
use crate::utils::http::fetch_text;
use crate::utils::lowercase_keywords;

/// Produces raw postings for a source.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawPosting>>;
}

/// Live fetcher dispatching on the source kind.
pub struct HttpSourceFetcher {
    client: Client,
    include: Vec<String>,
}

impl HttpSourceFetcher {
    /// `include` are the inclusion keywords used to pre-filter careers pages.
    pub fn new(client: Client, include: &[String]) -> Self {
        Self {
            client,
            include: lowercase_keywords(include),
        }
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<Vec<RawPosting>> {
        log::debug!("Fetching {} ({})", source.name, source.kind);

        match source.kind {
            SourceKind::Greenhouse => {
                let url = greenhouse::board_url(&source.locator);
                let body = fetch_text(&self.client, &url).await?;
                greenhouse::parse_board(&body)
            }
            SourceKind::Comeet => {
                let url = comeet::listing_url(&source.locator);
                let page_url = Url::parse(&url)?;
                let body = fetch_text(&self.client, &url).await?;
                comeet::parse_listing(&body, &page_url)
            }
            SourceKind::CareersPage => {
                let page_url = Url::parse(&source.locator)?;
                let body = fetch_text(&self.client, page_url.as_str()).await?;
                careers_page::parse_careers_page(&body, &page_url, &self.include)
            }
        }
    }
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
