//! Pipeline context and tuning: channels, cancel token, and pool sizing for one run.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::engine::retry::RetryPolicy;
use crate::utils::config::RetryConsts;
use crate::{FetchOutcome, VaultRef};

/// Shared cancel flag. Set by Ctrl+C or the run timeout; checked by workers before every
/// attempt and during retry sleeps.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Sleep for `d` in short slices. Returns false if cancelled before the time is up.
    pub fn sleep(&self, d: Duration) -> bool {
        let until = Instant::now() + d;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= until {
                return true;
            }
            std::thread::sleep((until - now).min(RetryConsts::SLEEP_SLICE));
        }
    }
}

/// Pool size and retry policy for a run of `items` vaults.
#[derive(Clone, Debug)]
pub struct PipelineTuning {
    pub workers: usize,
    pub retry: RetryPolicy,
}

impl PipelineTuning {
    /// Requested workers, at least 1 and at most one per item. The retry base follows the
    /// clamped count unless an explicit policy is given.
    pub fn new(requested: usize, items: usize, retry: Option<RetryPolicy>) -> Self {
        let workers = requested.max(1).min(items.max(1));
        Self {
            workers,
            retry: retry.unwrap_or_else(|| RetryPolicy::for_workers(workers)),
        }
    }
}

/// Work queue and outcome channel. Workers get vault_rx and a clone of outcome_tx; the
/// collector keeps outcome_rx.
pub struct PipelineChannels {
    pub vault_tx: Sender<VaultRef>,
    pub vault_rx: Receiver<VaultRef>,
    pub outcome_tx: Sender<FetchOutcome>,
    pub outcome_rx: Receiver<FetchOutcome>,
}

/// Both channels hold `cap` items so the queue can be filled up front and no worker ever
/// blocks on send.
pub fn create_pipeline_channels(cap: usize) -> PipelineChannels {
    let (vault_tx, vault_rx) = bounded::<VaultRef>(cap);
    let (outcome_tx, outcome_rx) = bounded::<FetchOutcome>(cap);
    PipelineChannels {
        vault_tx,
        vault_rx,
        outcome_tx,
        outcome_rx,
    }
}
