use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::SortField;
use crate::utils::config::Defaults;

struct DefaultArgs;

impl DefaultArgs {
    pub const COUNT: usize = 0;
    pub const LISTING_COUNT: usize = Defaults::LISTING_COUNT;
    pub const LISTING_MIN_TVL: f64 = Defaults::LISTING_MIN_TVL;
}

/// Concurrent vault volume and TVL reporter.
#[derive(Clone, Parser)]
#[command(name = "vaultvol")]
#[command(about = "Fetch vault volume and TVL statistics and aggregate them into a report.")]
pub struct Cli {
    /// Config file. Default: `~/.vaultvol.toml` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Info endpoint for per-vault requests.
    #[arg(long, short = 'i', global = true)]
    pub info_url: Option<String>,

    /// Endpoint listing every vault.
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// Verbose output (debug logs and progress bar).
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Fetch volume for all open vaults (or one with --address) and report it.
    #[command(visible_aliases = ["vault-volume", "vvol"])]
    Volume(VolumeArgs),

    /// List open vaults, HLP first, ordered by TVL.
    #[command(visible_aliases = ["get-vault", "vault"])]
    Vaults(VaultsArgs),
}

#[derive(Clone, Args)]
pub struct VolumeArgs {
    /// Fetch a single vault by address.
    #[arg(long)]
    pub address: Option<String>,

    /// Only HLP vaults.
    #[arg(long)]
    pub hlp: bool,

    /// Number of vaults to fetch (0 for all).
    #[arg(long, short = 'c', default_value_t = DefaultArgs::COUNT)]
    pub count: usize,

    /// Concurrent fetch workers. Default: 5, or `workers` from the config file.
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Rank results by a volume field (HLP-first TVL order when none).
    #[arg(long, value_enum, default_value_t = SortField::None)]
    pub sort_by: SortField,

    /// Show totals by HLP/non-HLP and the top 10 vaults by TVL.
    #[arg(long)]
    pub summary: bool,

    /// Skip vaults below this TVL.
    #[arg(long)]
    pub min_tvl: Option<f64>,

    /// Additional vault addresses to skip. Can specify multiple: -e addr1 addr2
    #[arg(long, short = 'e', num_args = 1..)]
    pub exclude: Vec<String>,

    /// Give up on outstanding vaults after this many seconds.
    #[arg(long, value_parser = clap::value_parser!(u64))]
    pub timeout: Option<u64>,
}

#[derive(Clone, Args)]
pub struct VaultsArgs {
    /// Number of vaults to display.
    #[arg(long, short = 'c', default_value_t = DefaultArgs::LISTING_COUNT)]
    pub count: usize,

    /// Sort TVL descending within the HLP and non-HLP groups.
    #[arg(long, num_args = 0..=1, default_value_t = true, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub desc: bool,

    /// Minimum TVL for a vault to be listed.
    #[arg(long, default_value_t = DefaultArgs::LISTING_MIN_TVL)]
    pub min_tvl: f64,
}
