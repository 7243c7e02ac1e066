//! Public and internal types for the vaultvol API and pipeline.

use std::ops::AddAssign;
use std::time::Duration;

use crate::error::FetchError;

/// One vault as listed by the catalog. Identity is [`Self::address`].
#[derive(Clone, Debug, PartialEq)]
pub struct VaultRef {
    pub address: String,
    pub name: String,
    /// Total value locked, in USD.
    pub tvl: f64,
    /// Member of the priority class (HLP).
    pub is_priority: bool,
    pub is_closed: bool,
}

/// Four time-bucketed volume figures (USD).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VolumeFigures {
    pub day: f64,
    pub week: f64,
    pub month: f64,
    pub all_time: f64,
}

impl VolumeFigures {
    /// Figure for a ranking field. `SortField::None` has no figure.
    pub fn get(&self, field: SortField) -> Option<f64> {
        match field {
            SortField::None => None,
            SortField::Day => Some(self.day),
            SortField::Week => Some(self.week),
            SortField::Month => Some(self.month),
            SortField::AllTime => Some(self.all_time),
        }
    }
}

impl AddAssign for VolumeFigures {
    fn add_assign(&mut self, rhs: Self) {
        self.day += rhs.day;
        self.week += rhs.week;
        self.month += rhs.month;
        self.all_time += rhs.all_time;
    }
}

/// Volume of one vault: spot figures plus the perp subset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VaultVolumeSample {
    pub spot: VolumeFigures,
    pub perp: VolumeFigures,
}

/// One successfully fetched vault. The unit the aggregator works on.
#[derive(Clone, Debug, PartialEq)]
pub struct VaultVolumeRecord {
    pub address: String,
    pub name: String,
    pub tvl: f64,
    pub is_priority: bool,
    pub volume: VaultVolumeSample,
}

impl VaultVolumeRecord {
    pub fn new(vault: &VaultRef, volume: VaultVolumeSample) -> Self {
        Self {
            address: vault.address.clone(),
            name: vault.name.clone(),
            tvl: vault.tvl,
            is_priority: vault.is_priority,
            volume,
        }
    }
}

/// Permanent failure for one vault.
#[derive(Debug)]
pub struct VaultFailure {
    pub address: String,
    pub error: FetchError,
}

/// Exactly one of these is produced per submitted vault.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched {
        record: VaultVolumeRecord,
        /// Rate-limited attempts before the successful one.
        retries: u32,
    },
    Failed(VaultFailure),
}

impl FetchOutcome {
    pub fn address(&self) -> &str {
        match self {
            FetchOutcome::Fetched { record, .. } => &record.address,
            FetchOutcome::Failed(f) => &f.address,
        }
    }
}

/// Records and failures of one run. Order carries no meaning.
#[derive(Debug, Default)]
pub struct RunResult {
    pub records: Vec<VaultVolumeRecord>,
    pub failures: Vec<VaultFailure>,
    /// Sum of retries over all fetched vaults.
    pub retries: u32,
}

impl RunResult {
    /// Number of outcomes collected (successes + failures).
    pub fn outcome_count(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcome_count() == 0
    }

    pub(crate) fn push(&mut self, outcome: FetchOutcome) {
        match outcome {
            FetchOutcome::Fetched { record, retries } => {
                self.retries += retries;
                self.records.push(record);
            }
            FetchOutcome::Failed(failure) => self.failures.push(failure),
        }
    }
}

/// A volume run: the vaults submitted (in catalog display order) and what came back.
#[derive(Debug, Default)]
pub struct VolumeRun {
    pub submitted: Vec<VaultRef>,
    pub result: RunResult,
}

impl VolumeRun {
    /// Addresses in the order they were submitted.
    pub fn display_order(&self) -> Vec<String> {
        self.submitted.iter().map(|v| v.address.clone()).collect()
    }
}

/// Field used to rank records. `None` keeps the incoming order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortField {
    /// Keep catalog order (priority first, then TVL).
    #[default]
    #[value(alias = "tvl")]
    None,
    Day,
    Week,
    Month,
    AllTime,
}

/// Full options (CLI and lib). Built from defaults, config file, env, then CLI flags.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Endpoint for per-vault detail requests.
    pub info_url: String,
    /// Endpoint listing every vault.
    pub catalog_url: String,
    /// Timeout for a single HTTP request.
    pub http_timeout: Duration,
    /// Number of concurrent fetch workers. 0 is treated as 1.
    pub workers: usize,
    /// Only priority-class (HLP) vaults.
    pub priority_only: bool,
    /// Cap on vaults fetched. 0 = unlimited.
    pub count: usize,
    pub sort_by: SortField,
    /// Minimum TVL for a vault to be fetched.
    pub min_tvl: f64,
    /// Vault addresses never fetched.
    pub exclude: Vec<String>,
    /// Abort outstanding work after this long.
    pub run_timeout: Option<Duration>,
    /// Debug logging and progress bar.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        use crate::utils::config::{Defaults, HLP_LEADER_ADDRESS};
        Self {
            info_url: Defaults::INFO_URL.to_string(),
            catalog_url: Defaults::CATALOG_URL.to_string(),
            http_timeout: Defaults::HTTP_TIMEOUT,
            workers: Defaults::WORKERS,
            priority_only: false,
            count: 0,
            sort_by: SortField::None,
            min_tvl: Defaults::VOLUME_MIN_TVL,
            exclude: vec![HLP_LEADER_ADDRESS.to_string()],
            run_timeout: None,
            verbose: false,
        }
    }
}
