//! Pure views over a completed run: display listing, field ranking, priority summary.
//! Nothing here does I/O and every function accepts an empty record set.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::AddAssign;

use crate::utils::config::TOP_TVL_ROWS;
use crate::{SortField, VaultVolumeRecord, VolumeFigures};

/// Priority-class first, then `key` descending. Callers use it with a stable sort.
pub fn priority_then_desc(a_priority: bool, a_key: f64, b_priority: bool, b_key: f64) -> Ordering {
    b_priority
        .cmp(&a_priority)
        .then_with(|| b_key.total_cmp(&a_key))
}

/// Records in the order of `display_order` (addresses). Records not named there follow,
/// in their incoming order.
pub fn listing(records: &[VaultVolumeRecord], display_order: &[String]) -> Vec<VaultVolumeRecord> {
    let position: HashMap<&str, usize> = display_order
        .iter()
        .enumerate()
        .map(|(i, a)| (a.as_str(), i))
        .collect();
    let mut out = records.to_vec();
    out.sort_by_key(|r| position.get(r.address.as_str()).copied().unwrap_or(usize::MAX));
    out
}

/// Stable sort, descending by the chosen spot figure. `SortField::None` keeps the order.
pub fn rank_by_field(records: &[VaultVolumeRecord], field: SortField) -> Vec<VaultVolumeRecord> {
    let mut out = records.to_vec();
    if field != SortField::None {
        out.sort_by(|a, b| {
            let a = a.volume.spot.get(field).unwrap_or(0.0);
            let b = b.volume.spot.get(field).unwrap_or(0.0);
            b.total_cmp(&a)
        });
    }
    out
}

/// Sums over one group of records.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GroupTotals {
    pub count: usize,
    pub tvl: f64,
    pub spot: VolumeFigures,
    pub perp: VolumeFigures,
}

impl GroupTotals {
    fn add_record(&mut self, r: &VaultVolumeRecord) {
        self.count += 1;
        self.tvl += r.tvl;
        self.spot += r.volume.spot;
        self.perp += r.volume.perp;
    }
}

impl AddAssign for GroupTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.count += rhs.count;
        self.tvl += rhs.tvl;
        self.spot += rhs.spot;
        self.perp += rhs.perp;
    }
}

/// Totals across every record.
pub fn totals(records: &[VaultVolumeRecord]) -> GroupTotals {
    let mut t = GroupTotals::default();
    for r in records {
        t.add_record(r);
    }
    t
}

/// Priority vs. other totals plus the combined top vaults by TVL.
#[derive(Clone, Debug, Default)]
pub struct VolumeSummary {
    pub priority: GroupTotals,
    pub other: GroupTotals,
    pub top_by_tvl: Vec<VaultVolumeRecord>,
}

impl VolumeSummary {
    pub fn grand_total(&self) -> GroupTotals {
        let mut t = self.priority;
        t += self.other;
        t
    }
}

pub fn summarize(records: &[VaultVolumeRecord]) -> VolumeSummary {
    let mut summary = VolumeSummary::default();
    for r in records {
        if r.is_priority {
            summary.priority.add_record(r);
        } else {
            summary.other.add_record(r);
        }
    }
    summary.top_by_tvl = top_by_tvl(records, TOP_TVL_ROWS);
    summary
}

/// First `n` records, priority class first, then TVL descending.
pub fn top_by_tvl(records: &[VaultVolumeRecord], n: usize) -> Vec<VaultVolumeRecord> {
    let mut out = records.to_vec();
    out.sort_by(|a, b| priority_then_desc(a.is_priority, a.tvl, b.is_priority, b.tvl));
    out.truncate(n);
    out
}
