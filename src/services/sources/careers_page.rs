//! Generic careers page adapter.

use scraper::Html;
use url::Url;

use crate::error::Result;
use crate::models::RawPosting;
use crate::services::sources::parse_selector;
use crate::utils::{normalize_whitespace, resolve_url};

/// Extract links whose text mentions one of `keywords`.
///
/// `keywords` must already be lower-cased. Careers pages are large and
/// noisy, so anchors are pre-filtered here rather than only downstream.
pub fn parse_careers_page(
    html: &str,
    page_url: &Url,
    keywords: &[String],
) -> Result<Vec<RawPosting>> {
    let document = Html::parse_document(html);
    let link_sel = parse_selector("a[href]")?;

    Ok(document
        .select(&link_sel)
        .filter_map(|link| {
            let text = normalize_whitespace(&link.text().collect::<String>());
            let lower = text.to_lowercase();
            if text.is_empty() || !keywords.iter().any(|k| lower.contains(k.as_str())) {
                return None;
            }
            let href = link.value().attr("href")?;
            Some(RawPosting::new(text, resolve_url(page_url, href)))
        })
        .collect())
}
