use crossbeam_channel::{Receiver, after, never, select};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::engine::catalog::address_set;
use crate::engine::progress::{ProgressBar, finish_progress_bar, update_progress_bar, vault_progress};
use crate::engine::rate_limiter::RateLimiter;
use crate::engine::retry::RetryPolicy;
use crate::error::FetchError;
use crate::source::VolumeSource;
use crate::utils::logger::Colors;
use crate::{FetchOutcome, Opts, RunResult, VaultFailure, VaultRef};

use super::context::{CancelToken, PipelineTuning, create_pipeline_channels};
use super::worker::{WorkerShared, spawn_fetch_workers};

/// Dispatcher settings for one run.
#[derive(Clone, Debug, Default)]
pub struct DispatchConfig {
    /// Requested pool size; clamped to `[1, items]`.
    pub workers: usize,
    /// Addresses never fetched.
    pub denylist: HashSet<String>,
    /// Override the worker-derived retry policy (tests use a zero delay).
    pub retry: Option<RetryPolicy>,
    /// Cancel outstanding work after this long.
    pub run_timeout: Option<Duration>,
    pub show_progress: bool,
}

impl From<&Opts> for DispatchConfig {
    fn from(o: &Opts) -> Self {
        DispatchConfig {
            workers: o.workers,
            denylist: address_set(&o.exclude),
            retry: None,
            run_timeout: o.run_timeout,
            show_progress: o.verbose,
        }
    }
}

/// Runs the worker pool over a prepared vault list.
pub struct Dispatcher<V: ?Sized> {
    source: Arc<V>,
    limiter: Arc<RateLimiter>,
    config: DispatchConfig,
    cancel: CancelToken,
}

impl<V: VolumeSource + ?Sized + 'static> Dispatcher<V> {
    /// Denylist entries are matched case-insensitively.
    pub fn new(source: Arc<V>, limiter: Arc<RateLimiter>, mut config: DispatchConfig) -> Self {
        config.denylist = address_set(&config.denylist);
        Self {
            source,
            limiter,
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Share an external cancel token (e.g. wired to Ctrl+C).
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Drop denylisted and repeated addresses; identity is the address.
    fn admit(&self, vaults: Vec<VaultRef>) -> Vec<VaultRef> {
        let mut seen = HashSet::with_capacity(vaults.len());
        vaults
            .into_iter()
            .filter(|v| {
                let key = v.address.to_lowercase();
                if self.config.denylist.contains(&key) {
                    debug!("skipping denylisted vault {}", v.address);
                    return false;
                }
                seen.insert(key)
            })
            .collect()
    }

    /// Fetch every vault and return once each has produced exactly one outcome.
    /// Per-vault failures are collected, never escalated.
    pub fn run(&self, vaults: Vec<VaultRef>) -> RunResult {
        let vaults = self.admit(vaults);
        if vaults.is_empty() {
            debug!("no vaults to fetch");
            return RunResult::default();
        }

        let total = vaults.len();
        let tuning = PipelineTuning::new(self.config.workers, total, self.config.retry);
        debug!(
            "fetching {} vaults with {} workers (retry base {:?}, max {} attempts)",
            total,
            tuning.workers,
            tuning.retry.base_delay(),
            tuning.retry.max_attempts()
        );

        let channels = create_pipeline_channels(total);
        let pending: HashSet<String> = vaults.iter().map(|v| v.address.clone()).collect();
        for vault in vaults {
            // Capacity == total, so this never blocks.
            let _ = channels.vault_tx.send(vault);
        }
        // Queue is complete; workers exit once it drains.
        drop(channels.vault_tx);

        let shared = WorkerShared {
            source: Arc::clone(&self.source),
            limiter: Arc::clone(&self.limiter),
            retry: tuning.retry,
            cancel: self.cancel.clone(),
        };
        let worker_handles =
            spawn_fetch_workers(channels.vault_rx, &channels.outcome_tx, &shared, tuning.workers);

        // Dropping the last sender closes the channel once every worker has exited.
        drop(channels.outcome_tx);

        let bar = vault_progress(self.config.show_progress, total);
        let result = collect_outcomes(
            channels.outcome_rx,
            pending,
            self.config.run_timeout,
            &self.cancel,
            bar.as_ref(),
        );
        if let Some(bar) = &bar {
            finish_progress_bar(bar);
        }
        shutdown_workers(worker_handles);

        info!(
            "fetched {}/{} vaults ({} failed, {} retries)",
            Colors::colorize(Colors::OK, &result.records.len().to_string()),
            total,
            Colors::colorize(Colors::FAILED, &result.failures.len().to_string()),
            Colors::colorize(Colors::RETRIED, &result.retries.to_string())
        );
        result
    }
}

enum CollectEvent {
    /// None once every worker has dropped its sender.
    Outcome(Option<FetchOutcome>),
    Timeout,
}

/// Single consumer of the outcome channel. Stops when every pending address has an outcome.
/// Addresses still pending when all workers are gone are recorded as lost.
fn collect_outcomes(
    outcome_rx: Receiver<FetchOutcome>,
    mut pending: HashSet<String>,
    run_timeout: Option<Duration>,
    cancel: &CancelToken,
    bar: Option<&ProgressBar>,
) -> RunResult {
    let total = pending.len();
    let start = Instant::now();
    let deadline = run_timeout.map(after).unwrap_or_else(never);
    let disarmed = never::<Instant>();
    let mut timed_out = false;
    let mut result = RunResult::default();

    while !pending.is_empty() {
        let deadline_rx = if timed_out { &disarmed } else { &deadline };
        let event = select! {
            recv(outcome_rx) -> msg => CollectEvent::Outcome(msg.ok()),
            recv(deadline_rx) -> _ => CollectEvent::Timeout,
        };
        match event {
            CollectEvent::Outcome(None) => break,
            CollectEvent::Outcome(Some(outcome)) => {
                if !pending.remove(outcome.address()) {
                    warn!("dropping duplicate outcome for vault {}", outcome.address());
                    continue;
                }
                log_outcome(&outcome, start, total - pending.len(), total);
                result.push(outcome);
                if let Some(bar) = bar {
                    update_progress_bar(bar, 1);
                }
            }
            CollectEvent::Timeout => {
                warn!(
                    "run timeout reached, cancelling {} outstanding vaults",
                    pending.len()
                );
                cancel.cancel();
                timed_out = true;
            }
        }
    }

    for address in pending.drain() {
        warn!("vault {} was never reported by a worker", address);
        result.push(FetchOutcome::Failed(VaultFailure {
            address,
            error: FetchError::WorkerLost,
        }));
    }
    result
}

fn log_outcome(outcome: &FetchOutcome, start: Instant, done: usize, total: usize) {
    match outcome {
        FetchOutcome::Fetched { record, retries } => debug!(
            "done for vault {} after {} retries, elapsed {:?}, {}/{}",
            record.address,
            retries,
            start.elapsed(),
            done,
            total
        ),
        FetchOutcome::Failed(f) => debug!(
            "failed vault {}: {}, elapsed {:?}, {}/{}",
            f.address,
            f.error,
            start.elapsed(),
            done,
            total
        ),
    }
}

/// Join worker threads after the outcome channel is drained.
fn shutdown_workers(worker_handles: Vec<JoinHandle<()>>) {
    for h in worker_handles {
        if h.join().is_err() {
            warn!("fetch worker panicked");
        }
    }
}
