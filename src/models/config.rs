//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::IdentityMode;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings shared by all source adapters
    #[serde(default)]
    pub http: HttpConfig,

    /// Keyword and location admission rules
    #[serde(default)]
    pub filter: FilterConfig,

    /// Relevance scorer settings
    #[serde(default)]
    pub scorer: ScorerConfig,

    /// Notification channel settings
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Run policy: threshold, identity, file locations
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if !(1..=60).contains(&self.http.timeout_secs) {
            return Err(AppError::validation(
                "http.timeout_secs must be between 1 and 60",
            ));
        }
        if self.filter.include.is_empty() {
            return Err(AppError::validation("filter.include must not be empty"));
        }

        let include: HashSet<String> = self
            .filter
            .include
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        if let Some(shared) = self
            .filter
            .exclude
            .iter()
            .find(|k| include.contains(&k.to_lowercase()))
        {
            return Err(AppError::validation(format!(
                "keyword '{shared}' is both included and excluded"
            )));
        }

        if self.pipeline.threshold > 100 {
            return Err(AppError::validation(
                "pipeline.threshold must be between 0 and 100",
            ));
        }
        if self.scorer.api_key_env.trim().is_empty() {
            return Err(AppError::validation("scorer.api_key_env is empty"));
        }
        if !(1..=120).contains(&self.scorer.timeout_secs) {
            return Err(AppError::validation(
                "scorer.timeout_secs must be between 1 and 120",
            ));
        }
        if self.scorer.max_prompt_chars < 200 {
            return Err(AppError::validation(
                "scorer.max_prompt_chars must be at least 200",
            ));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Accept header
    #[serde(default = "defaults::accept")]
    pub accept: String,

    /// Accept-Language header
    #[serde(default = "defaults::accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            accept: defaults::accept(),
            accept_language: defaults::accept_language(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Keyword and location admission rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// At least one must appear in the title
    #[serde(default = "defaults::include_keywords")]
    pub include: Vec<String>,

    /// None may appear in the title
    #[serde(default = "defaults::exclude_keywords")]
    pub exclude: Vec<String>,

    /// Region tokens that always pass the location check
    #[serde(default = "defaults::allowed_locations")]
    pub allowed_locations: Vec<String>,

    /// Region tokens that reject a posting whose location is not allowed
    #[serde(default)]
    pub denied_locations: Vec<String>,

    /// Locations shorter than this are placeholders and never rejected
    #[serde(default = "defaults::min_location_len")]
    pub min_location_len: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include: defaults::include_keywords(),
            exclude: defaults::exclude_keywords(),
            allowed_locations: defaults::allowed_locations(),
            denied_locations: Vec::new(),
            min_location_len: defaults::min_location_len(),
        }
    }
}

/// Which text-generation backend scores postings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerProvider {
    #[default]
    Gemini,
    Openai,
}

/// Relevance scorer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerConfig {
    #[serde(default)]
    pub provider: ScorerProvider,

    /// Fixed model name; discovered from the provider when absent
    #[serde(default)]
    pub model: Option<String>,

    /// Discovery preference order
    #[serde(default = "defaults::preferred_models")]
    pub preferred_models: Vec<String>,

    /// Environment variable holding the API key
    #[serde(default = "defaults::api_key_env")]
    pub api_key_env: String,

    #[serde(default = "defaults::scorer_timeout")]
    pub timeout_secs: u64,

    /// Candidate profile embedded in every prompt
    #[serde(default = "defaults::profile")]
    pub profile: String,

    #[serde(default = "defaults::max_prompt_chars")]
    pub max_prompt_chars: usize,

    /// Pause after each scorer call in milliseconds
    #[serde(default = "defaults::pacing_delay")]
    pub delay_ms: u64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            provider: ScorerProvider::default(),
            model: None,
            preferred_models: defaults::preferred_models(),
            api_key_env: defaults::api_key_env(),
            timeout_secs: defaults::scorer_timeout(),
            profile: defaults::profile(),
            max_prompt_chars: defaults::max_prompt_chars(),
            delay_ms: defaults::pacing_delay(),
        }
    }
}

/// Notification channel settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Environment variable holding the bot token
    #[serde(default = "defaults::token_env")]
    pub token_env: String,

    /// Environment variable holding the chat id
    #[serde(default = "defaults::chat_id_env")]
    pub chat_id_env: String,

    #[serde(default = "defaults::notify_timeout")]
    pub timeout_secs: u64,

    /// Pause after each notification in milliseconds
    #[serde(default = "defaults::pacing_delay")]
    pub delay_ms: u64,

    /// Send start and completion messages
    #[serde(default = "defaults::announce_runs")]
    pub announce_runs: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            token_env: defaults::token_env(),
            chat_id_env: defaults::chat_id_env(),
            timeout_secs: defaults::notify_timeout(),
            delay_ms: defaults::pacing_delay(),
            announce_runs: defaults::announce_runs(),
        }
    }
}

/// Run policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Minimum score that triggers a notification
    #[serde(default = "defaults::threshold")]
    pub threshold: u8,

    #[serde(default)]
    pub identity: IdentityMode,

    /// Source list, relative to the storage directory
    #[serde(default = "defaults::sources_file")]
    pub sources_file: String,

    /// Seen-set file, relative to the storage directory
    #[serde(default = "defaults::ledger_file")]
    pub ledger_file: String,

    #[serde(default)]
    pub dev: DevOverrides,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: defaults::threshold(),
            identity: IdentityMode::default(),
            sources_file: defaults::sources_file(),
            ledger_file: defaults::ledger_file(),
            dev: DevOverrides::default(),
        }
    }
}

/// Development-mode overrides. Both are off by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevOverrides {
    /// Notify this many scored postings regardless of score
    #[serde(default)]
    pub force_send: usize,

    /// Start every run from an empty seen-set
    #[serde(default)]
    pub ignore_ledger: bool,
}

mod defaults {
    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/91.0.4472.124 Safari/537.36"
            .into()
    }
    pub fn accept() -> String {
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8".into()
    }
    pub fn accept_language() -> String {
        "en-US,en;q=0.5".into()
    }
    pub fn timeout() -> u64 {
        10
    }

    // Filter defaults
    pub fn include_keywords() -> Vec<String> {
        [
            "Success",
            "Support",
            "Care",
            "Operation",
            "Project",
            "Coordinator",
            "Community",
            "Game",
            "Junior",
            "Entry",
            "Specialist",
            "QA",
            "Trust",
            "Product",
            "Tier",
            "Analyst",
            "Manager",
            "Admin",
            "Client",
            "Help",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn exclude_keywords() -> Vec<String> {
        [
            "Senior",
            "Head",
            "Director",
            "VP",
            "Chief",
            "Engineer",
            "Developer",
            "DevOps",
            "Backend",
            "Frontend",
            "Full Stack",
            "Architect",
            "Legal",
            "Sales",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn allowed_locations() -> Vec<String> {
        vec!["Israel".into(), "Tel Aviv".into(), "Remote".into()]
    }
    pub fn min_location_len() -> usize {
        3
    }

    // Scorer defaults
    pub fn preferred_models() -> Vec<String> {
        vec![
            "gemini-1.5-flash".into(),
            "gemini-1.5-pro".into(),
            "gemini-1.0-pro".into(),
        ]
    }
    pub fn api_key_env() -> String {
        "GEMINI_API_KEY".into()
    }
    pub fn scorer_timeout() -> u64 {
        15
    }
    pub fn profile() -> String {
        "Location: Tel Aviv, Israel\n\
         Looking for: Junior Project Management, Operations, Customer Success, Support.\n\
         Scoring guide: Support/Success/Project/Ops roles score 80 or more; \
         Engineer/Developer roles score 0."
            .into()
    }
    pub fn max_prompt_chars() -> usize {
        2000
    }
    pub fn pacing_delay() -> u64 {
        1000
    }

    // Notify defaults
    pub fn token_env() -> String {
        "TELEGRAM_TOKEN".into()
    }
    pub fn chat_id_env() -> String {
        "TELEGRAM_CHAT_ID".into()
    }
    pub fn notify_timeout() -> u64 {
        10
    }
    pub fn announce_runs() -> bool {
        true
    }

    // Pipeline defaults
    pub fn threshold() -> u8 {
        50
    }
    pub fn sources_file() -> String {
        "companies.json".into()
    }
    pub fn ledger_file() -> String {
        "history.json".into()
    }
}
