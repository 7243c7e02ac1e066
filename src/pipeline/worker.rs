use crossbeam_channel::{Receiver, Sender};
use log::debug;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::engine::rate_limiter::RateLimiter;
use crate::engine::retry::{Retried, RetryPolicy};
use crate::source::VolumeSource;
use crate::{FetchOutcome, VaultFailure, VaultRef, VaultVolumeRecord};

use super::context::CancelToken;

/// What every worker shares: the source, the limiter, the policy, and the cancel flag.
pub struct WorkerShared<V: ?Sized> {
    pub source: Arc<V>,
    pub limiter: Arc<RateLimiter>,
    pub retry: RetryPolicy,
    pub cancel: CancelToken,
}

impl<V: ?Sized> Clone for WorkerShared<V> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            limiter: Arc::clone(&self.limiter),
            retry: self.retry,
            cancel: self.cancel.clone(),
        }
    }
}

/// Fetch one vault through the retry policy. Always yields exactly one outcome.
pub fn fetch_one<V: VolumeSource + ?Sized>(
    source: &V,
    limiter: &RateLimiter,
    retry: &RetryPolicy,
    cancel: &CancelToken,
    vault: &VaultRef,
) -> FetchOutcome {
    match retry.run(limiter, cancel, || source.fetch_volume(&vault.address)) {
        Ok(Retried { value, retries }) => FetchOutcome::Fetched {
            record: VaultVolumeRecord::new(vault, value),
            retries,
        },
        Err(error) => FetchOutcome::Failed(VaultFailure {
            address: vault.address.clone(),
            error,
        }),
    }
}

/// Single fetch worker: take vaults from vault_rx until the queue is empty, send one
/// outcome per vault on outcome_tx.
fn fetch_worker_loop<V: VolumeSource + ?Sized>(
    id: usize,
    vault_rx: Receiver<VaultRef>,
    outcome_tx: Sender<FetchOutcome>,
    shared: WorkerShared<V>,
) {
    let mut handled = 0_usize;
    while let Ok(vault) = vault_rx.recv() {
        let outcome = fetch_one(
            &*shared.source,
            &shared.limiter,
            &shared.retry,
            &shared.cancel,
            &vault,
        );
        handled += 1;
        if outcome_tx.send(outcome).is_err() {
            break;
        }
    }
    debug!("worker {} done after {} vaults", id, handled);
}

/// Spawn `num_workers` fetch workers on one shared queue. Caller must drop its own
/// outcome sender after this so the collector sees the channel close.
pub fn spawn_fetch_workers<V: VolumeSource + ?Sized + 'static>(
    vault_rx: Receiver<VaultRef>,
    outcome_tx: &Sender<FetchOutcome>,
    shared: &WorkerShared<V>,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|id| {
            let vault_rx = vault_rx.clone();
            let outcome_tx = outcome_tx.clone();
            let shared = shared.clone();
            thread::spawn(move || fetch_worker_loop(id, vault_rx, outcome_tx, shared))
        })
        .collect()
}
