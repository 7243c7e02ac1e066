//! Progress bar for volume runs. Only the collector touches it, so workers never contend.

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Configuration for creating a progress bar
pub struct ProgressBarConfig {
    pub total: usize,
    pub desc: &'static str,
    pub animation: Animation,
}

impl ProgressBarConfig {
    pub fn new(total: usize, desc: &'static str, animation: Animation) -> Self {
        Self {
            total,
            desc,
            animation,
        }
    }
}

pub fn create_progress_bar(config: ProgressBarConfig) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = config.total,
        desc = config.desc,
        animation = config.animation,
        unit = " vaults"
    )))
}

/// Bar for a run of `total` vaults, or None when progress is off.
pub fn vault_progress(enabled: bool, total: usize) -> Option<ProgressBar> {
    enabled.then(|| {
        create_progress_bar(ProgressBarConfig::new(
            total,
            "Fetching",
            Animation::Classic,
        ))
    })
}

/// Uses try_lock so a contended bar skips an update instead of blocking.
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Finish the line so following log output starts on a fresh one.
pub fn finish_progress_bar(pb: &ProgressBar) {
    if let Ok(mut pb) = pb.lock() {
        let _ = pb.refresh();
        eprintln!();
    }
}
