// src/services/scorer/mod.rs

//! Relevance scoring through an external text-generation model.
//!
//! The model is treated as an untrusted peer: its reply may be fenced,
//! wrapped in prose, or not JSON at all. `RelevanceScorer::score` never
//! fails; anything unusable becomes a zero score with the failure recorded
//! in the reason.

mod gemini;
mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{AppError, Result};
use crate::models::{Posting, ScoreResult, ScorerConfig, ScorerProvider};
use crate::utils::truncate_chars;

pub use gemini::{GeminiClient, select_model};
pub use openai::OpenAiClient;

/// Reason used when the reply carries none.
pub const NO_REASON: &str = "No reason provided";

/// Longest title or url embedded in a prompt.
const MAX_FIELD_CHARS: usize = 300;

/// A single request/response text-generation capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Model identifier for logs and announcements.
    fn model_name(&self) -> &str;
}

/// Shared, dynamically dispatched generator.
pub type DynTextGenerator = Arc<dyn TextGenerator>;

/// Build the configured generator.
///
/// Returns `Ok(None)` when the provider offers no usable model.
pub async fn connect(
    client: reqwest::Client,
    config: &ScorerConfig,
    api_key: String,
) -> Result<Option<DynTextGenerator>> {
    match config.provider {
        ScorerProvider::Gemini => {
            let model = match &config.model {
                Some(model) => model.clone(),
                None => {
                    let listing = GeminiClient::list_models(&client, &api_key).await;
                    match choose_model(listing, &config.preferred_models)? {
                        Some(model) => model,
                        None => return Ok(None),
                    }
                }
            };
            Ok(Some(Arc::new(GeminiClient::new(client, api_key, model))))
        }
        ScorerProvider::Openai => {
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| OpenAiClient::DEFAULT_MODEL.to_string());
            Ok(Some(Arc::new(OpenAiClient::new(client, api_key, model))))
        }
    }
}

/// Pick a model from a discovery result.
///
/// A failed listing falls back to the first preferred model; the error is
/// returned only when there is no preference to fall back to.
pub fn choose_model(listing: Result<Vec<String>>, preferred: &[String]) -> Result<Option<String>> {
    match listing {
        Ok(available) => {
            log::info!("Available models: {}", available.join(", "));
            Ok(select_model(&available, preferred))
        }
        Err(e) => match preferred.first() {
            Some(fallback) => {
                log::warn!("Model listing failed ({}), falling back to {}", e, fallback);
                Ok(Some(fallback.clone()))
            }
            None => Err(e),
        },
    }
}

/// Scores postings against the candidate profile.
pub struct RelevanceScorer {
    generator: DynTextGenerator,
    profile: String,
    max_prompt_chars: usize,
}

impl RelevanceScorer {
    pub fn new(generator: DynTextGenerator, config: &ScorerConfig) -> Self {
        Self {
            generator,
            profile: config.profile.trim().to_string(),
            max_prompt_chars: config.max_prompt_chars,
        }
    }

    pub fn model_name(&self) -> &str {
        self.generator.model_name()
    }

    /// Prompt for one posting, at most `max_prompt_chars` long.
    ///
    /// The posting block and reply instructions are kept whole; the profile
    /// is shortened to fit.
    pub fn build_prompt(&self, posting: &Posting) -> String {
        let job = format!(
            "Job: {} at {}\nLocation: {}\nLink: {}\n\n\
             Give a score from 0 to 100 for how well this job fits the candidate.\n\
             Return JSON ONLY: {{\"score\": int, \"reason\": \"short text\"}}",
            truncate_chars(&posting.title, MAX_FIELD_CHARS),
            posting.source_name,
            posting.location,
            truncate_chars(&posting.url, MAX_FIELD_CHARS),
        );
        let header = "Rate this job for the candidate below.\n\nCandidate profile:\n";

        let used = header.chars().count() + job.chars().count() + 2;
        let profile = truncate_chars(&self.profile, self.max_prompt_chars.saturating_sub(used));

        let prompt = format!("{header}{profile}\n\n{job}");
        truncate_chars(&prompt, self.max_prompt_chars).to_string()
    }

    /// Score a posting. Failures yield a zero score.
    pub async fn score(&self, posting: &Posting) -> ScoreResult {
        let prompt = self.build_prompt(posting);

        let reply = match self.generator.generate(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("Scorer call failed for '{}': {}", posting.title, e);
                return ScoreResult::failed(e);
            }
        };

        parse_reply(&reply).unwrap_or_else(|e| {
            log::warn!("Unusable scorer reply for '{}': {}", posting.title, e);
            log::debug!("Raw reply: {}", reply);
            ScoreResult::failed(e)
        })
    }
}

/// Locate the JSON object in a model reply.
///
/// Strips code fences, then takes the outermost `{...}` span when one exists.
pub fn extract_json(reply: &str) -> String {
    let cleaned = reply.trim().replace("```json", "").replace("```", "");

    match (cleaned.find('{'), cleaned.rfind('}')) {
        (Some(start), Some(end)) if end > start => cleaned[start..=end].to_string(),
        _ => cleaned.trim().to_string(),
    }
}

/// Parse a model reply into a score.
pub fn parse_reply(reply: &str) -> Result<ScoreResult> {
    let json = extract_json(reply);
    let value: Value = serde_json::from_str(&json)?;
    let object = value
        .as_object()
        .ok_or_else(|| AppError::scorer("reply is not a JSON object"))?;

    Ok(ScoreResult::new(
        score_field(object).unwrap_or(0),
        reason_field(object).unwrap_or(NO_REASON),
    ))
}

fn score_field(object: &Map<String, Value>) -> Option<u8> {
    let raw = match object.get("score")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(0.0, f64::from(ScoreResult::MAX)) as u8)
}

fn reason_field(object: &Map<String, Value>) -> Option<&str> {
    object
        .get("reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedGenerator(std::result::Result<&'static str, &'static str>);

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.0.map(String::from).map_err(AppError::scorer)
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn scorer(reply: std::result::Result<&'static str, &'static str>) -> RelevanceScorer {
        RelevanceScorer::new(Arc::new(CannedGenerator(reply)), &ScorerConfig::default())
    }

    fn posting() -> Posting {
        Posting {
            title: "Customer Success Manager".to_string(),
            url: "https://boards.greenhouse.io/acme/jobs/1".to_string(),
            location: "Tel Aviv".to_string(),
            source_name: "Acme".to_string(),
        }
    }

    #[test]
    fn choose_model_prefers_listed_models() {
        let listing = Ok(vec!["models/gemini-1.0-pro".to_string()]);
        let preferred = ["gemini-1.5-flash".to_string(), "gemini-1.0-pro".to_string()];
        assert_eq!(
            choose_model(listing, &preferred).unwrap().as_deref(),
            Some("models/gemini-1.0-pro")
        );
        assert_eq!(choose_model(Ok(Vec::new()), &preferred).unwrap(), None);
    }

    #[test]
    fn choose_model_falls_back_when_listing_fails() {
        let preferred = ["gemini-1.5-flash".to_string()];
        let chosen = choose_model(Err(AppError::scorer("HTTP 401")), &preferred).unwrap();
        assert_eq!(chosen.as_deref(), Some("gemini-1.5-flash"));

        assert!(choose_model(Err(AppError::scorer("HTTP 401")), &[]).is_err());
    }

    #[test]
    fn parses_fenced_reply() {
        let result = parse_reply("```json\n{\"score\": 85, \"reason\": \"Good fit\"}\n```").unwrap();
        assert_eq!(result, ScoreResult::new(85, "Good fit"));
    }

    #[test]
    fn parses_reply_with_surrounding_prose() {
        let result =
            parse_reply("Sure! Here is my rating: {\"score\": 72, \"reason\": \"Ops role\"} Hope it helps.")
                .unwrap();
        assert_eq!(result.score, 72);
        assert_eq!(result.reason, "Ops role");
    }

    #[test]
    fn rejects_non_json_reply() {
        assert!(parse_reply("I cannot rate this job.").is_err());
        assert!(parse_reply("[1, 2, 3]").is_err());
    }

    #[test]
    fn missing_fields_get_defaults() {
        assert_eq!(parse_reply("{}").unwrap(), ScoreResult::new(0, NO_REASON));
        assert_eq!(
            parse_reply(r#"{"score": 40, "reason": "  "}"#).unwrap(),
            ScoreResult::new(40, NO_REASON)
        );
    }

    #[test]
    fn lenient_score_values() {
        assert_eq!(parse_reply(r#"{"score": "90"}"#).unwrap().score, 90);
        assert_eq!(parse_reply(r#"{"score": 77.6}"#).unwrap().score, 78);
        assert_eq!(parse_reply(r#"{"score": 140}"#).unwrap().score, 100);
        assert_eq!(parse_reply(r#"{"score": -5}"#).unwrap().score, 0);
        assert_eq!(parse_reply(r#"{"score": "high"}"#).unwrap().score, 0);
    }

    #[test]
    fn prompt_embeds_posting_and_profile() {
        let prompt = scorer(Ok("{}")).build_prompt(&posting());
        assert!(prompt.contains("Customer Success Manager at Acme"));
        assert!(prompt.contains("Location: Tel Aviv"));
        assert!(prompt.contains("https://boards.greenhouse.io/acme/jobs/1"));
        assert!(prompt.contains("Customer Success, Support"));
        assert!(prompt.contains("Return JSON ONLY"));
    }

    #[test]
    fn prompt_is_bounded() {
        let config = ScorerConfig {
            profile: "x".repeat(10_000),
            max_prompt_chars: 600,
            ..ScorerConfig::default()
        };
        let scorer = RelevanceScorer::new(Arc::new(CannedGenerator(Ok("{}"))), &config);

        let prompt = scorer.build_prompt(&posting());
        assert!(prompt.chars().count() <= 600);
        assert!(prompt.contains("Return JSON ONLY"));
    }

    #[tokio::test]
    async fn score_survives_garbage_reply() {
        let result = scorer(Ok("no json here")).score(&posting()).await;
        assert_eq!(result.score, 0);
        assert!(result.reason.starts_with("AI Error:"));
    }

    #[tokio::test]
    async fn score_survives_call_failure() {
        let result = scorer(Err("quota exceeded")).score(&posting()).await;
        assert_eq!(result.score, 0);
        assert!(result.reason.contains("quota exceeded"));
    }

    #[tokio::test]
    async fn score_parses_good_reply() {
        let result = scorer(Ok("```json\n{\"score\": 85, \"reason\": \"Strong match\"}\n```"))
            .score(&posting())
            .await;
        assert_eq!(result, ScoreResult::new(85, "Strong match"));
    }
}
