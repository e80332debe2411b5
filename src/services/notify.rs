// src/services/notify.rs

//! Notification sink.
//!
//! Delivery is fire-and-forget: callers log failures and move on; nothing
//! is retried.

use std::time::Duration;

use async_trait::async_trait;
use html_escape::encode_text;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::{Posting, ScoreResult};

/// Delivers a single chat message.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<()>;
}

/// Telegram Bot API `sendMessage` with HTML formatting.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    token: String,
    chat_id: String,
    timeout: Duration,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, token: String, chat_id: String) -> Self {
        Self {
            client,
            token,
            chat_id,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let payload = SendMessage {
            chat_id: &self.chat_id,
            text: message,
            parse_mode: "HTML",
        };

        // The token is part of the URL, so transport errors are stripped of it.
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::notify(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::notify(format!(
                "Telegram answered HTTP {}",
                status.as_u16()
            )));
        }
        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        log::info!("[notify] {}", message.replace('\n', " | "));
        Ok(())
    }
}

/// Message for a posting that met the threshold.
pub fn match_message(posting: &Posting, result: &ScoreResult) -> String {
    format!(
        "🎯 <b>Match Found!</b> ({})\n🏢 {}\n💼 {}\n📍 {}\n💭 {}\n🔗 {}",
        result.score,
        encode_text(&posting.source_name),
        encode_text(&posting.title),
        encode_text(&posting.location),
        encode_text(&result.reason),
        encode_text(&posting.url),
    )
}

/// Message for a posting sent by the development override.
pub fn debug_message(ordinal: usize, posting: &Posting, result: &ScoreResult) -> String {
    format!(
        "🐞 <b>DEBUG #{}</b>\n🏢 {}\n💼 {}\n🤖 Score: {}\n💭 Reason: {}\n🔗 {}",
        ordinal,
        encode_text(&posting.source_name),
        encode_text(&posting.title),
        result.score,
        encode_text(&result.reason),
        encode_text(&posting.url),
    )
}

/// Message for a failure that ends the run early.
pub fn error_message(detail: &str) -> String {
    format!("❌ <b>Error</b>: {}", encode_text(detail))
}

/// Send an error report, logging instead of failing when delivery fails.
pub async fn report_error(notifier: &dyn Notifier, detail: &str) {
    log::error!("{}", detail);
    if let Err(e) = notifier.send(&error_message(detail)).await {
        log::warn!("Notification failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting() -> Posting {
        Posting {
            title: "Support <Tier 2> & Ops".to_string(),
            url: "https://example.com/jobs/1".to_string(),
            location: "Tel Aviv".to_string(),
            source_name: "Acme".to_string(),
        }
    }

    #[test]
    fn match_message_contains_company_title_score_and_link() {
        let message = match_message(&posting(), &ScoreResult::new(85, "Good fit"));
        assert!(message.contains("(85)"));
        assert!(message.contains("Acme"));
        assert!(message.contains("Support &lt;Tier 2&gt; &amp; Ops"));
        assert!(message.contains("https://example.com/jobs/1"));
        assert!(message.contains("Good fit"));
    }

    #[test]
    fn debug_message_is_numbered() {
        let message = debug_message(3, &posting(), &ScoreResult::new(10, "meh"));
        assert!(message.contains("DEBUG #3"));
        assert!(message.contains("Score: 10"));
    }

    #[test]
    fn payload_uses_html_mode() {
        let payload = SendMessage {
            chat_id: "42",
            text: "hi",
            parse_mode: "HTML",
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["parse_mode"], "HTML");
        assert_eq!(json["chat_id"], "42");
    }

    #[tokio::test]
    async fn log_notifier_never_fails() {
        assert!(LogNotifier.send("line one\nline two").await.is_ok());
    }

    struct Rejecting;

    #[async_trait]
    impl Notifier for Rejecting {
        async fn send(&self, _message: &str) -> Result<()> {
            Err(AppError::notify("chat unavailable"))
        }
    }

    #[test]
    fn error_message_escapes_detail() {
        let message = error_message("Scorer error: HTTP 401 <unauthorized>");
        assert!(message.starts_with("❌ <b>Error</b>"));
        assert!(message.contains("&lt;unauthorized&gt;"));
    }

    #[tokio::test]
    async fn report_error_tolerates_delivery_failure() {
        report_error(&Rejecting, "model listing failed").await;
        report_error(&LogNotifier, "model listing failed").await;
    }
}
