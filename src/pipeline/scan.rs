// src/pipeline/scan.rs

//! Scan orchestration.
//!
//! Sources are processed one at a time, in configured order. For each
//! posting: seen-set check, filter, score, record as seen, then notify when
//! the score meets the threshold. The seen-set is checked before scoring so
//! postings evaluated in an earlier run never cost a scorer call.

use std::fmt;
use std::time::Duration;

use crate::error::AppError;
use crate::models::{Config, IdentityMode, Posting, SeenSet, SourceDescriptor};
use crate::pipeline::filter::{FilterEngine, FilterVerdict};
use crate::services::normalize::normalize_all;
use crate::services::notify::{debug_message, match_message};
use crate::services::{Notifier, RelevanceScorer, SourceFetcher};
use crate::storage::SeenStore;

const LOG_LINE: &str = "[{source}] {title} ({location})";

/// Run-level counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sources_scanned: usize,
    pub source_failures: usize,
    pub postings_scanned: usize,
    pub already_seen: usize,
    pub filtered_out: usize,
    pub scored: usize,
    pub matches: usize,
    pub forced_sends: usize,
    pub notify_failures: usize,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sources: {} ({} failed)\nPostings: {}\nAlready seen: {}\nFiltered out: {}\nScored: {}\nMatches: {}\nForced sends: {}\nFailed notifications: {}",
            self.sources_scanned,
            self.source_failures,
            self.postings_scanned,
            self.already_seen,
            self.filtered_out,
            self.scored,
            self.matches,
            self.forced_sends,
            self.notify_failures,
        )
    }
}

/// Result of a run: counters, plus the error that stopped it early, if any.
#[derive(Debug, Default)]
pub struct ScanReport {
    pub stats: RunStats,
    pub aborted: Option<AppError>,
}

/// Admission and pacing policy for a run.
#[derive(Debug, Clone)]
pub struct ScanPolicy {
    pub threshold: u8,
    pub identity: IdentityMode,
    pub force_send: usize,
    pub ignore_ledger: bool,
    pub announce_runs: bool,
    pub scorer_delay: Duration,
    pub notify_delay: Duration,
}

impl ScanPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            threshold: config.pipeline.threshold,
            identity: config.pipeline.identity,
            force_send: config.pipeline.dev.force_send,
            ignore_ledger: config.pipeline.dev.ignore_ledger,
            announce_runs: config.notify.announce_runs,
            scorer_delay: Duration::from_millis(config.scorer.delay_ms),
            notify_delay: Duration::from_millis(config.notify.delay_ms),
        }
    }
}

/// Sequential scan over configured sources.
pub struct Scanner<'a> {
    fetcher: &'a dyn SourceFetcher,
    filter: FilterEngine,
    scorer: &'a RelevanceScorer,
    notifier: &'a dyn Notifier,
    policy: ScanPolicy,
}

impl<'a> Scanner<'a> {
    pub fn new(
        config: &Config,
        fetcher: &'a dyn SourceFetcher,
        scorer: &'a RelevanceScorer,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self::with_policy(
            ScanPolicy::from_config(config),
            FilterEngine::new(&config.filter),
            fetcher,
            scorer,
            notifier,
        )
    }

    pub fn with_policy(
        policy: ScanPolicy,
        filter: FilterEngine,
        fetcher: &'a dyn SourceFetcher,
        scorer: &'a RelevanceScorer,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            fetcher,
            filter,
            scorer,
            notifier,
            policy,
        }
    }

    /// Full run: load ledger, scan, persist ledger, report.
    ///
    /// The ledger is saved even when the scan stops early. With the
    /// `ignore_ledger` override the run starts empty and nothing is saved.
    pub async fn run(&self, sources: &[SourceDescriptor], store: &dyn SeenStore) -> ScanReport {
        if self.policy.announce_runs {
            self.deliver_quietly(&format!(
                "🧠 <b>AI Connected</b>\nUsing model: {}\nStarting scan of {} sources...",
                self.scorer.model_name(),
                sources.len()
            ))
            .await;
        }

        let mut seen = if self.policy.ignore_ledger {
            log::warn!("Ignoring ledger for this run (dev override)");
            SeenSet::new()
        } else {
            store.load().await
        };

        let report = self.scan(sources, &mut seen).await;

        if !self.policy.ignore_ledger {
            if let Err(e) = store.save(&seen).await {
                log::error!("Failed to persist ledger: {}", e);
            }
        }

        log::info!("Scan summary:\n{}", report.stats);

        if let Some(error) = &report.aborted {
            self.deliver_quietly(&format!(
                "❌ <b>Scan aborted</b>\n{}",
                html_escape::encode_text(&error.to_string())
            ))
            .await;
        }
        if self.policy.announce_runs {
            self.deliver_quietly(&format!("🏁 <b>Scan complete</b>\n{}", report.stats))
                .await;
        }

        report
    }

    /// Scan every source, updating `seen` in place.
    pub async fn scan(&self, sources: &[SourceDescriptor], seen: &mut SeenSet) -> ScanReport {
        let mut report = ScanReport::default();

        for source in sources {
            report.stats.sources_scanned += 1;
            log::info!("Scanning {}...", source.name);

            let raw = match self.fetcher.fetch(source).await {
                Ok(raw) => raw,
                Err(error) if error.is_source_local() => {
                    report.stats.source_failures += 1;
                    log::warn!(
                        "Failed to fetch {} ({} {}): {}",
                        source.name,
                        source.kind,
                        source.locator,
                        error
                    );
                    continue;
                }
                Err(error) => {
                    report.stats.source_failures += 1;
                    log::error!("Aborting scan at {}: {}", source.name, error);
                    report.aborted = Some(error);
                    break;
                }
            };

            let postings = normalize_all(raw, &source.name);
            log::info!("{}: {} postings", source.name, postings.len());

            for posting in postings {
                report.stats.postings_scanned += 1;
                self.process_posting(posting, seen, &mut report.stats).await;
            }
        }

        report
    }

    async fn process_posting(&self, posting: Posting, seen: &mut SeenSet, stats: &mut RunStats) {
        let identity = posting.identity(self.policy.identity);
        if seen.contains(&identity) {
            stats.already_seen += 1;
            log::debug!("Already seen: {}", identity);
            return;
        }

        match self.filter.evaluate(&posting) {
            FilterVerdict::Admitted => {}
            verdict => {
                stats.filtered_out += 1;
                log::debug!("Filtered out {}: {:?}", posting.format(LOG_LINE), verdict);
                return;
            }
        }

        let result = self.scorer.score(&posting).await;
        stats.scored += 1;
        seen.add(identity);
        log::info!(
            "Scored {}: {} ({})",
            posting.format(LOG_LINE),
            result.score,
            result.reason
        );
        pace(self.policy.scorer_delay).await;

        let passes = result.passes(self.policy.threshold);
        if passes {
            stats.matches += 1;
        }

        let message = if stats.forced_sends < self.policy.force_send {
            stats.forced_sends += 1;
            Some(debug_message(stats.forced_sends, &posting, &result))
        } else if passes {
            Some(match_message(&posting, &result))
        } else {
            None
        };

        if let Some(message) = message {
            if !self.deliver(&message).await {
                stats.notify_failures += 1;
            }
        }
    }

    /// Send a message, logging failure. Returns whether it was delivered.
    async fn deliver(&self, message: &str) -> bool {
        let delivered = match self.notifier.send(message).await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Notification failed: {}", e);
                false
            }
        };
        pace(self.policy.notify_delay).await;
        delivered
    }

    async fn deliver_quietly(&self, message: &str) {
        if let Err(e) = self.notifier.send(message).await {
            log::warn!("Notification failed: {}", e);
        }
    }
}

async fn pace(delay: Duration) {
    if delay.as_millis() > 0 {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_reads_config() {
        let mut config = Config::default();
        config.pipeline.threshold = 65;
        config.pipeline.dev.force_send = 5;
        config.scorer.delay_ms = 0;

        let policy = ScanPolicy::from_config(&config);
        assert_eq!(policy.threshold, 65);
        assert_eq!(policy.force_send, 5);
        assert!(!policy.ignore_ledger);
        assert_eq!(policy.scorer_delay, Duration::ZERO);
        assert_eq!(policy.notify_delay, Duration::from_millis(1000));
    }

    #[test]
    fn stats_display_lists_counters() {
        let stats = RunStats {
            sources_scanned: 3,
            source_failures: 1,
            postings_scanned: 40,
            scored: 4,
            matches: 2,
            forced_sends: 1,
            notify_failures: 3,
            ..RunStats::default()
        };
        let text = stats.to_string();
        assert!(text.contains("Sources: 3 (1 failed)"));
        assert!(text.contains("Postings: 40"));
        assert!(text.contains("Matches: 2"));
        assert!(text.contains("Forced sends: 1"));
        assert!(text.contains("Failed notifications: 3"));
    }
}
