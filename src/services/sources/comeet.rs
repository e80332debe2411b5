//! Comeet listing page adapter.
//!
//! Job links carry class names mentioning job, position or career. Pages that
//! render their list differently fall back to the innermost such classed
//! elements that contain a link.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::Result;
use crate::models::RawPosting;
use crate::services::sources::parse_selector;
use crate::utils::{normalize_whitespace, resolve_url};

const LISTING_BASE: &str = "https://www.comeet.com/jobs";

static JOB_CLASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)job|position|career").expect("job class pattern is a valid regex")
});

/// Listing page for a company slug.
pub fn listing_url(slug: &str) -> String {
    format!("{}/{}/all", LISTING_BASE, slug.trim().trim_matches('/'))
}

/// Extract postings from a listing page.
pub fn parse_listing(html: &str, page_url: &Url) -> Result<Vec<RawPosting>> {
    let document = Html::parse_document(html);

    let postings = job_anchors(&document, page_url)?;
    if !postings.is_empty() {
        return Ok(postings);
    }

    log::debug!("No classed job anchors on {}, trying broader match", page_url);
    classed_containers(&document, page_url)
}

fn has_job_class(element: &ElementRef) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|class| JOB_CLASS.is_match(class))
}

fn job_anchors(document: &Html, page_url: &Url) -> Result<Vec<RawPosting>> {
    let anchor_sel = parse_selector("a[class]")?;

    Ok(document
        .select(&anchor_sel)
        .filter(has_job_class)
        .filter_map(|anchor| {
            let title = normalize_whitespace(&anchor.text().collect::<String>());
            if title.is_empty() {
                return None;
            }
            let href = anchor.value().attr("href").unwrap_or("");
            let url = if href.is_empty() {
                String::new()
            } else {
                resolve_url(page_url, href)
            };
            Some(RawPosting::new(title, url))
        })
        .collect())
}

fn classed_containers(document: &Html, page_url: &Url) -> Result<Vec<RawPosting>> {
    let classed_sel = parse_selector("[class]")?;
    let link_sel = parse_selector("a[href]")?;

    let mut seen = HashSet::new();
    let mut postings = Vec::new();

    for element in document.select(&classed_sel).filter(has_job_class) {
        let Some(link) = element.select(&link_sel).next() else {
            continue;
        };
        if wraps_linked_row(&element, &link_sel) {
            continue;
        }
        let title = normalize_whitespace(&element.text().collect::<String>());
        let href = link.value().attr("href").unwrap_or("");
        if title.is_empty() || href.is_empty() {
            continue;
        }

        let url = resolve_url(page_url, href);
        if seen.insert((title.clone(), url.clone())) {
            postings.push(RawPosting::new(title, url));
        }
    }

    Ok(postings)
}

/// Whether a job-classed descendant with its own link sits inside `element`.
fn wraps_linked_row(element: &ElementRef, link_sel: &Selector) -> bool {
    element
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|inner| has_job_class(&inner) && inner.select(link_sel).next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse(&listing_url("acme/12.00A")).unwrap()
    }

    #[test]
    fn test_listing_url() {
        assert_eq!(
            listing_url("acme/12.00A"),
            "https://www.comeet.com/jobs/acme/12.00A/all"
        );
    }

    #[test]
    fn extracts_classed_anchors_case_insensitively() {
        let html = r#"
            <ul>
              <li><a class="Position-Link" href="/jobs/acme/12.00A/support/34.A1">
                  Support   Specialist</a></li>
              <li><a class="job-item" href="https://www.comeet.com/jobs/acme/12.00A/qa/35.B2">QA Analyst</a></li>
              <li><a class="nav" href="/about">About us</a></li>
              <li><a class="career-card" href="/x"> </a></li>
            </ul>"#;

        let postings = parse_listing(html, &page_url()).unwrap();

        assert_eq!(postings.len(), 2);
        assert_eq!(postings[0].title.as_deref(), Some("Support Specialist"));
        assert_eq!(
            postings[0].url.as_deref(),
            Some("https://www.comeet.com/jobs/acme/12.00A/support/34.A1")
        );
        assert_eq!(postings[1].title.as_deref(), Some("QA Analyst"));
        assert_eq!(postings[1].location, None);
    }

    #[test]
    fn falls_back_to_classed_containers() {
        let html = r#"
            <div class="positions">
              <div class="position-row"><a href="/jobs/acme/1">Community Manager</a></div>
              <div class="position-row"><span>No link here</span></div>
            </div>"#;

        let postings = parse_listing(html, &page_url()).unwrap();

        assert_eq!(
            postings,
            vec![RawPosting::new(
                "Community Manager",
                "https://www.comeet.com/jobs/acme/1"
            )]
        );
    }

    #[test]
    fn fallback_skips_wrappers_around_rows() {
        let html = r#"
            <div class="positions">
              <div class="position-row"><a href="/jobs/acme/1">Community Manager</a></div>
              <div class="position-row"><a href="/jobs/acme/2">Support Specialist</a></div>
            </div>"#;

        let postings = parse_listing(html, &page_url()).unwrap();

        let titles: Vec<_> = postings.iter().filter_map(|p| p.title.as_deref()).collect();
        assert_eq!(titles, ["Community Manager", "Support Specialist"]);
        assert_eq!(
            postings[1].url.as_deref(),
            Some("https://www.comeet.com/jobs/acme/2")
        );
    }

    #[test]
    fn fallback_keeps_row_with_classed_title_span() {
        let html = r#"
            <div class="job-row">
              <span class="job-title">QA Analyst</span>
              <a href="/jobs/acme/7">Apply</a>
            </div>"#;

        let postings = parse_listing(html, &page_url()).unwrap();

        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].title.as_deref(), Some("QA Analyst Apply"));
    }

    #[test]
    fn empty_page_yields_nothing() {
        assert!(
            parse_listing("<html><body></body></html>", &page_url())
                .unwrap()
                .is_empty()
        );
    }
}
