//! Content retrieval.
//!
//! Fetches one payload per filtered path on a bounded worker pool and decodes
//! it to text. Each path succeeds or is skipped on its own; a skip never
//! aborts the run. Results come back in input order whatever order the
//! workers finish in.
//!
//! All workers share a [`RateLimitGate`]. When the remote signals a rate
//! limit, the gate closes until the indicated time and every worker waits on
//! it before its next request. Rate-limited and transport failures are
//! retried with exponential backoff; other statuses are not.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rayon::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ImportSection;
use crate::constants::BACKOFF_BASE_MILLIS;
use crate::credentials::AccessToken;
use crate::errors::GroveError;
use crate::remote::{RemoteError, RemoteRepositoryService};
use crate::types::{RemoteContent, RepositoryReference, RetrievedFile, SkipReason, SkippedPath};

/// Granularity of cancellable sleeps.
const SLEEP_SLICE: Duration = Duration::from_millis(50);

// ============================================================================
// RetrievalOptions
// ============================================================================

/// Tuning of the retrieval stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalOptions {
    /// Worker threads.
    pub concurrency: usize,
    /// Retries per path for rate-limited or transport failures.
    pub max_retries: u32,
    /// First backoff delay; doubled on each retry.
    pub backoff_base: Duration,
    /// Cap on any single wait.
    pub max_backoff: Duration,
}

impl RetrievalOptions {
    pub fn from_config(config: &ImportSection) -> Self {
        Self {
            concurrency: config.concurrency,
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(BACKOFF_BASE_MILLIS),
            max_backoff: Duration::from_secs(config.max_backoff_secs),
        }
    }

    /// Backoff before retry number `attempt` (0-based), capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.backoff_base
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self::from_config(&ImportSection::default())
    }
}

// ============================================================================
// RateLimitGate
// ============================================================================

/// Pause shared by all workers of one retrieval run.
#[derive(Debug, Default)]
pub struct RateLimitGate {
    paused_until: Mutex<Option<Instant>>,
}

impl RateLimitGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the gate for `duration`. An existing longer pause is kept.
    pub fn pause_for(&self, duration: Duration) {
        let until = Instant::now() + duration;
        if let Ok(mut guard) = self.paused_until.lock() {
            if guard.is_none_or(|current| current < until) {
                *guard = Some(until);
            }
        }
    }

    /// Time left until the gate opens.
    pub fn remaining(&self) -> Option<Duration> {
        let guard = self.paused_until.lock().ok()?;
        let until = (*guard)?;
        until.checked_duration_since(Instant::now())
    }

    /// Block until the gate is open. Returns `false` if cancelled meanwhile.
    pub fn wait(&self, cancel: &CancellationToken) -> bool {
        while let Some(left) = self.remaining() {
            if cancel.is_cancelled() {
                return false;
            }
            std::thread::sleep(left.min(SLEEP_SLICE));
        }
        !cancel.is_cancelled()
    }
}

/// Sleep for `duration` in slices. Returns `false` if cancelled meanwhile.
fn sleep_cancellable(duration: Duration, cancel: &CancellationToken) -> bool {
    let deadline = Instant::now() + duration;
    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
        if left.is_zero() {
            break;
        }
        if cancel.is_cancelled() {
            return false;
        }
        std::thread::sleep(left.min(SLEEP_SLICE));
    }
    !cancel.is_cancelled()
}

// ============================================================================
// Retrieval
// ============================================================================

/// Files and skips of one retrieval run, both in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalReport {
    pub files: Vec<RetrievedFile>,
    pub skipped: Vec<SkippedPath>,
}

enum FetchOutcome {
    Retrieved(RetrievedFile),
    Skipped(SkippedPath),
    Cancelled,
}

/// Retrieve and decode the content of every path.
///
/// # Errors
///
/// Returns [`GroveError::Cancelled`] if `cancel` fires before all paths are
/// done; partial results are dropped.
pub fn retrieve_contents(
    remote: &dyn RemoteRepositoryService,
    repo: &RepositoryReference,
    token: &AccessToken,
    paths: &[String],
    options: &RetrievalOptions,
    cancel: &CancellationToken,
) -> Result<RetrievalReport, GroveError> {
    if paths.is_empty() {
        return Ok(RetrievalReport::default());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.concurrency.max(1))
        .thread_name(|i| format!("grove-fetch-{}", i))
        .build()
        .map_err(|e| GroveError::Other(anyhow::anyhow!("failed to start worker pool: {}", e)))?;

    let gate = RateLimitGate::new();
    debug!(
        "Retrieving {} paths from {} with {} workers",
        paths.len(),
        repo,
        options.concurrency
    );

    let outcomes: Vec<FetchOutcome> = pool.install(|| {
        paths
            .par_iter()
            .map(|path| fetch_one(remote, repo, token, path, options, &gate, cancel))
            .collect()
    });

    if cancel.is_cancelled() {
        return Err(GroveError::Cancelled);
    }

    let mut report = RetrievalReport::default();
    for outcome in outcomes {
        match outcome {
            FetchOutcome::Retrieved(file) => report.files.push(file),
            FetchOutcome::Skipped(skip) => report.skipped.push(skip),
            FetchOutcome::Cancelled => return Err(GroveError::Cancelled),
        }
    }
    Ok(report)
}

fn fetch_one(
    remote: &dyn RemoteRepositoryService,
    repo: &RepositoryReference,
    token: &AccessToken,
    path: &str,
    options: &RetrievalOptions,
    gate: &RateLimitGate,
    cancel: &CancellationToken,
) -> FetchOutcome {
    let skip = |reason: SkipReason| {
        warn!(path = %path, "Skipping {}: {}", path, reason);
        FetchOutcome::Skipped(SkippedPath {
            path: path.to_string(),
            reason,
        })
    };

    let mut attempt: u32 = 0;
    loop {
        if !gate.wait(cancel) {
            return FetchOutcome::Cancelled;
        }

        match remote.fetch_content(repo, path, token.as_str()) {
            Ok(payload) => {
                return match decode_content(payload) {
                    Ok(content) => {
                        debug!(path = %path, bytes = content.len(), "fetched");
                        FetchOutcome::Retrieved(RetrievedFile {
                            path: path.to_string(),
                            content,
                        })
                    }
                    Err(reason) => skip(reason),
                };
            }
            Err(RemoteError::RateLimited {
                status,
                retry_after,
            }) => {
                if attempt >= options.max_retries {
                    return skip(SkipReason::RateLimited);
                }
                let wait = retry_after
                    .unwrap_or_else(|| options.backoff(attempt))
                    .min(options.max_backoff);
                warn!(
                    "Rate limited (HTTP {}) on {}; pausing all workers for {:?}",
                    status, path, wait
                );
                gate.pause_for(wait);
            }
            Err(RemoteError::Transport(msg)) => {
                if attempt >= options.max_retries {
                    return skip(SkipReason::Transport(msg));
                }
                let wait = options.backoff(attempt);
                debug!(path = %path, "transport error, retrying in {:?}: {}", wait, msg);
                if !sleep_cancellable(wait, cancel) {
                    return FetchOutcome::Cancelled;
                }
            }
            Err(RemoteError::Status { status, .. }) => return skip(SkipReason::Status(status)),
            Err(RemoteError::Malformed(msg)) => return skip(SkipReason::Malformed(msg)),
        }
        attempt += 1;
    }
}

/// Decode a content payload to text.
///
/// Only `base64` payloads with non-empty content are accepted. Line breaks
/// inside the payload are ignored; bytes that are not UTF-8 are rejected
/// rather than replaced.
pub fn decode_content(payload: RemoteContent) -> Result<String, SkipReason> {
    match payload.encoding.as_deref() {
        Some("base64") => {}
        Some(other) => return Err(SkipReason::UnsupportedEncoding(other.to_string())),
        None => return Err(SkipReason::UnsupportedEncoding("none".to_string())),
    }

    let raw = payload
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(SkipReason::MissingContent)?;
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| SkipReason::InvalidBase64(e.to_string()))?;
    String::from_utf8(bytes).map_err(|_| SkipReason::InvalidUtf8)
}

// ============================================================================
// Tests
// ============================================================================
