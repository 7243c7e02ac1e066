//! Seams to the upstream: the vault catalog and the per-vault volume endpoint.
//!
//! [`HttpSource`](crate::engine::client::HttpSource) implements both against the live API;
//! tests and lib callers can substitute their own.

use crate::error::FetchError;
use crate::{Result, VaultRef, VaultVolumeSample};

/// Lists every known vault. A failure here aborts the run.
pub trait CatalogSource {
    fn fetch_vaults(&self) -> Result<Vec<VaultRef>>;
}

/// Fetches one vault's volume. Shared by all workers, so it must be `Send + Sync`.
pub trait VolumeSource: Send + Sync {
    fn fetch_volume(&self, address: &str) -> std::result::Result<VaultVolumeSample, FetchError>;
}
