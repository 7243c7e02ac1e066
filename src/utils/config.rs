//! Application configuration constants.
//! Endpoints, limits, and thresholds in one place.

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    config_filename: String,
    env_prefix: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                config_filename: format!(".{pkg}.toml"),
                env_prefix: pkg.to_uppercase(),
            }
        })
    }

    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }

    /// Env var name for a setting, e.g. `info_url` -> `VAULTVOL_INFO_URL`.
    pub fn env_var(&self, key: &str) -> String {
        format!("{}_{}", self.env_prefix, key.to_uppercase())
    }

    /// `~/.vaultvol.toml`, if a home directory is known.
    pub fn default_config_path(&self) -> Option<PathBuf> {
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join(self.config_filename()))
    }
}

// ---- Upstream ----

/// Leader address of the priority-class (HLP) vaults. Also the parent HLP vault, which is
/// excluded from volume runs by default.
pub const HLP_LEADER_ADDRESS: &str = "0xdfc24b077bc1425ad1dea75bcb6f8158e10df303";

/// Default values used when neither config file, env, nor CLI set a field.
pub struct Defaults;

impl Defaults {
    pub const INFO_URL: &'static str = "https://api.hyperliquid.xyz/info";
    pub const CATALOG_URL: &'static str = "https://stats-data.hyperliquid.xyz/Mainnet/vaults";
    pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
    pub const WORKERS: usize = 5;
    /// Vaults below this TVL are not fetched in a volume run.
    pub const VOLUME_MIN_TVL: f64 = 10.0;
    /// Vaults below this TVL are hidden from the catalog listing.
    pub const LISTING_MIN_TVL: f64 = 50_000.0;
    pub const LISTING_COUNT: usize = 100;
}

// ---- Rate limiting ----

/// Windows enforced together by [`RateLimiter::upstream_default`](crate::engine::RateLimiter::upstream_default).
pub struct RateLimits;

impl RateLimits {
    pub const SUSTAINED_WINDOW: Duration = Duration::from_secs(60);
    pub const SUSTAINED_MAX: usize = 300;
    pub const BURST_WINDOW: Duration = Duration::from_millis(100);
    pub const BURST_MAX: usize = 3;
}

// ---- Retry ----

/// Backoff tuning for rate-limited attempts.
pub struct RetryConsts;

impl RetryConsts {
    /// Total attempts per vault, first one included.
    pub const MAX_ATTEMPTS: u32 = 20;
    /// Cap on the backoff base, in seconds.
    pub const MAX_BASE_SECS: u64 = 5;
    /// Granularity of cancellable sleeps.
    pub const SLEEP_SLICE: Duration = Duration::from_millis(100);
}

// ---- Report ----

/// Figures are shown in millions of USD.
pub const MILLION: f64 = 1_000_000.0;

/// Rows in the summary's top-by-TVL table.
pub const TOP_TVL_ROWS: usize = 10;

/// Names longer than this are abbreviated in the catalog table.
pub const NAME_DISPLAY_MAX: usize = 20;
