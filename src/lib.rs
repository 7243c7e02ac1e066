//! Vaultvol: concurrent vault volume and TVL reporter

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

use anyhow::Context;
use log::debug;
use std::sync::Arc;

use engine::catalog::{CatalogFilter, address_set, prepare_catalog};
use engine::rate_limiter::RateLimiter;
use engine::retry::RetryPolicy;
use pipeline::{CancelToken, DispatchConfig, Dispatcher, fetch_one};
use source::{CatalogSource, VolumeSource};

/// Result alias used by public vaultvol API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Catalog filter for a volume run: open vaults above `opts.min_tvl`, denylist applied
/// before the cap, priority first.
pub fn volume_filter(opts: &Opts) -> CatalogFilter {
    CatalogFilter {
        min_tvl: opts.min_tvl,
        priority_only: opts.priority_only,
        count: opts.count,
        ascending: false,
        exclude: address_set(&opts.exclude),
    }
}

/// Single entry point for a volume run: read the catalog once, prepare it, fetch every
/// remaining vault on the worker pool.
///
/// Only a catalog failure is an error. Per-vault failures come back in
/// [`RunResult::failures`](crate::RunResult).
pub fn fetch_vault_volumes<C, V>(
    catalog: &C,
    volumes: Arc<V>,
    limiter: Arc<RateLimiter>,
    opts: &Opts,
    cancel: CancelToken,
) -> Result<VolumeRun>
where
    C: CatalogSource + ?Sized,
    V: VolumeSource + ?Sized + 'static,
{
    let config_str = format!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    let vaults = catalog.fetch_vaults().context("failed to fetch vaults")?;
    let submitted = prepare_catalog(vaults, &volume_filter(opts));

    let dispatcher = Dispatcher::new(volumes, limiter, DispatchConfig::from(opts)).with_cancel(cancel);
    let result = dispatcher.run(submitted.clone());
    Ok(VolumeRun { submitted, result })
}

/// Fetch one vault through the same limiter and retry policy as a pool of one. The name is
/// resolved from the catalog when it is reachable, otherwise the address is used.
pub fn fetch_single_volume<C, V>(
    catalog: &C,
    volumes: &V,
    limiter: &RateLimiter,
    cancel: &CancelToken,
    address: &str,
) -> Result<(String, VaultVolumeSample)>
where
    C: CatalogSource + ?Sized,
    V: VolumeSource + ?Sized,
{
    let vault = VaultRef {
        address: address.to_string(),
        name: address.to_string(),
        tvl: 0.0,
        is_priority: false,
        is_closed: false,
    };
    let sample = match fetch_one(volumes, limiter, &RetryPolicy::for_workers(1), cancel, &vault) {
        FetchOutcome::Fetched { record, .. } => record.volume,
        FetchOutcome::Failed(f) => {
            return Err(f.error).with_context(|| format!("fetch vault volume for address {address}"));
        }
    };
    let name = match catalog.fetch_vaults() {
        Ok(vaults) => vaults
            .into_iter()
            .find(|v| v.address.eq_ignore_ascii_case(address))
            .map(|v| v.name)
            .unwrap_or_else(|| address.to_string()),
        Err(e) => {
            debug!("catalog unavailable for name lookup: {e:#}");
            address.to_string()
        }
    };
    Ok((name, sample))
}

/// Catalog listing: open vaults above the TVL floor, priority first, TVL ordered.
pub fn list_vaults<C: CatalogSource + ?Sized>(catalog: &C, filter: &CatalogFilter) -> Result<Vec<VaultRef>> {
    let vaults = catalog.fetch_vaults().context("failed to fetch vaults")?;
    Ok(prepare_catalog(vaults, filter))
}
