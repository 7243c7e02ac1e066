//! Load `.vaultvol.toml` and environment overrides (CLI only). Lib callers build [`Opts`]
//! themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::Opts;
use crate::utils::config::PackagePaths;

#[derive(Debug, Default, Deserialize)]
pub struct VaultvolToml {
    #[serde(default)]
    settings: SettingsSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    info_url: Option<String>,
    catalog_url: Option<String>,
    /// Seconds.
    http_timeout: Option<u64>,
    workers: Option<usize>,
    exclude: Option<Vec<String>>,
    min_tvl: Option<f64>,
    verbose: Option<bool>,
}

/// Parse a config file. A missing default file is not an error; a file named explicitly must
/// exist and parse.
pub fn load_vaultvol_toml(path: &Path, required: bool) -> Result<Option<VaultvolToml>> {
    let s = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(e).with_context(|| format!("read config file {}", path.display()));
        }
    };
    let parsed: VaultvolToml =
        toml::from_str(&s).with_context(|| format!("parse config file {}", path.display()))?;
    log::debug!("Using config file: {}", path.display());
    Ok(Some(parsed))
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(ref v) = $idx.$idx_field {
            $opts.$opts_field = v.clone();
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before env and CLI.
pub fn apply_file_to_opts(file: &VaultvolToml, opts: &mut Opts) {
    let s = &file.settings;
    apply_file_opt!(s, opts, info_url => info_url);
    apply_file_opt!(s, opts, catalog_url => catalog_url);
    apply_file_opt!(s, opts, workers => workers);
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, min_tvl => min_tvl);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(secs) = s.http_timeout {
        opts.http_timeout = Duration::from_secs(secs);
    }
}

/// Apply `VAULTVOL_INFO_URL` / `VAULTVOL_CATALOG_URL`, loading `.env` from the working
/// directory first when present.
pub fn apply_env_to_opts(opts: &mut Opts) {
    let _ = dotenvy::dotenv();
    let paths = PackagePaths::get();
    if let Some(url) = env_nonempty(&paths.env_var("info_url")) {
        opts.info_url = url;
    }
    if let Some(url) = env_nonempty(&paths.env_var("catalog_url")) {
        opts.catalog_url = url;
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
