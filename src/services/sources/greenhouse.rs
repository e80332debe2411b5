//! Greenhouse board API adapter.

use serde::Deserialize;

use crate::error::Result;
use crate::models::RawPosting;

const API_BASE: &str = "https://boards-api.greenhouse.io/v1/boards";

/// Jobs endpoint for a board token.
pub fn board_url(token: &str) -> String {
    format!("{}/{}/jobs", API_BASE, token.trim())
}

#[derive(Debug, Deserialize)]
struct BoardResponse {
    #[serde(default)]
    jobs: Vec<BoardJob>,
}

#[derive(Debug, Deserialize)]
struct BoardJob {
    title: Option<String>,
    absolute_url: Option<String>,
    location: Option<BoardLocation>,
}

#[derive(Debug, Deserialize)]
struct BoardLocation {
    name: Option<String>,
}

/// Parse a board API response.
pub fn parse_board(body: &str) -> Result<Vec<RawPosting>> {
    let response: BoardResponse = serde_json::from_str(body)?;

    Ok(response
        .jobs
        .into_iter()
        .map(|job| RawPosting {
            title: job.title,
            url: job.absolute_url,
            location: job.location.and_then(|l| l.name),
        })
        .collect())
}
