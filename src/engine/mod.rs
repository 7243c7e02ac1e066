//! Engine module: upstream client, rate limiting, retry, catalog preparation, CLI

pub mod arg_parser;
pub mod catalog;
pub mod cli;
pub mod client;
pub mod progress;
pub mod rate_limiter;
pub mod retry;

// Re-export commonly used items
pub use arg_parser::{Cli, Commands, VaultsArgs, VolumeArgs};
pub use catalog::{
    CatalogFilter, address_set, filter_excluded, filter_min_tvl, filter_open, prepare_catalog,
    sort_with_priority,
};
pub use cli::handle_run;
pub use client::{HttpSource, decode_catalog, decode_vault_details};
pub use rate_limiter::{RateLimiter, WindowLimit};
pub use retry::{Retried, RetryPolicy};
