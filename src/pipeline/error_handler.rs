use log::warn;

use crate::RunResult;

/// Log every permanent failure of a run. Call after the run; the report also lists them.
pub fn log_failures(result: &RunResult) {
    if result.failures.is_empty() {
        return;
    }
    warn!(
        "{} of {} vaults failed",
        result.failures.len(),
        result.outcome_count()
    );
    for f in &result.failures {
        warn!("  {}: {}", f.address, f.error);
    }
}
