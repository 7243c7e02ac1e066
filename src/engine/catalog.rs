//! Catalog preparation: filtering and priority ordering of the vault list before it is
//! fetched or listed.

use std::collections::HashSet;

use crate::VaultRef;
use crate::aggregate::priority_then_desc;

/// Lowercased address set; vault addresses compare case-insensitively.
pub fn address_set<'a, I>(addresses: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    addresses.into_iter().map(|a| a.to_lowercase()).collect()
}

/// Which vaults of the catalog to keep, and in what order.
#[derive(Clone, Debug, Default)]
pub struct CatalogFilter {
    pub min_tvl: f64,
    pub priority_only: bool,
    /// 0 = keep all.
    pub count: usize,
    /// TVL order within each priority group.
    pub ascending: bool,
    /// Addresses dropped before the cap, lowercased (see [`address_set`]).
    pub exclude: HashSet<String>,
}

pub fn filter_open(vaults: Vec<VaultRef>) -> Vec<VaultRef> {
    vaults.into_iter().filter(|v| !v.is_closed).collect()
}

pub fn filter_excluded(vaults: Vec<VaultRef>, exclude: &HashSet<String>) -> Vec<VaultRef> {
    if exclude.is_empty() {
        return vaults;
    }
    vaults
        .into_iter()
        .filter(|v| !exclude.contains(&v.address.to_lowercase()))
        .collect()
}

pub fn filter_min_tvl(vaults: Vec<VaultRef>, min_tvl: f64) -> Vec<VaultRef> {
    vaults.into_iter().filter(|v| v.tvl >= min_tvl).collect()
}

/// Stable sort: priority-class vaults first, then by TVL.
pub fn sort_with_priority(vaults: &mut [VaultRef], ascending: bool) {
    vaults.sort_by(|a, b| {
        let ord = priority_then_desc(a.is_priority, a.tvl, b.is_priority, b.tvl);
        if ascending && a.is_priority == b.is_priority {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Open, non-excluded vaults above the TVL floor, optionally priority only, priority first,
/// capped at exactly `count`.
pub fn prepare_catalog(vaults: Vec<VaultRef>, filter: &CatalogFilter) -> Vec<VaultRef> {
    let total = vaults.len();
    let vaults = filter_excluded(filter_open(vaults), &filter.exclude);
    let mut vaults = filter_min_tvl(vaults, filter.min_tvl);
    if filter.priority_only {
        vaults.retain(|v| v.is_priority);
    }
    sort_with_priority(&mut vaults, filter.ascending);
    if filter.count > 0 {
        vaults.truncate(filter.count);
    }
    log::debug!("catalog: kept {} of {} vaults", vaults.len(), total);
    vaults
}

