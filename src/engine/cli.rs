//! CLI command handlers: `volume` runs the fetch pipeline, `vaults` lists the catalog.

use anyhow::{Context, Result};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::aggregate::{listing, rank_by_field, summarize};
use crate::engine::arg_parser::{Cli, Commands, VaultsArgs, VolumeArgs};
use crate::engine::catalog::CatalogFilter;
use crate::engine::client::HttpSource;
use crate::engine::rate_limiter::RateLimiter;
use crate::pipeline::{CancelToken, log_failures};
use crate::report;
use crate::utils::config::PackagePaths;
use crate::utils::{apply_env_to_opts, apply_file_to_opts, load_vaultvol_toml, setup_logging};
use crate::{Opts, fetch_single_volume, fetch_vault_volumes, list_vaults};

/// Defaults, then config file, then env, then global CLI flags.
fn setup_opts(cli: &Cli) -> Result<Opts> {
    let mut opts = Opts::default();
    let file = match &cli.config {
        Some(path) => load_vaultvol_toml(path, true)?,
        None => match PackagePaths::get().default_config_path() {
            Some(path) => load_vaultvol_toml(&path, false)?,
            None => None,
        },
    };
    if let Some(file) = &file {
        apply_file_to_opts(file, &mut opts);
    }
    apply_env_to_opts(&mut opts);
    if let Some(url) = &cli.info_url {
        opts.info_url = url.clone();
    }
    if let Some(url) = &cli.catalog_url {
        opts.catalog_url = url.clone();
    }
    if let Some(verbose) = cli.verbose {
        opts.verbose = verbose;
    }
    setup_logging(opts.verbose);
    Ok(opts)
}

fn apply_volume_args(args: &VolumeArgs, opts: &mut Opts) {
    opts.priority_only = args.hlp;
    opts.count = args.count;
    opts.sort_by = args.sort_by;
    if let Some(w) = args.workers {
        opts.workers = w;
    }
    if let Some(min) = args.min_tvl {
        opts.min_tvl = min;
    }
    opts.exclude.extend(args.exclude.iter().cloned());
    opts.run_timeout = args.timeout.map(Duration::from_secs);
}

/// Ctrl+C stops outstanding fetches; completed vaults are still reported.
fn cancel_on_ctrlc() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    let handler_cancel = cancel.clone();
    ctrlc::set_handler(move || handler_cancel.cancel()).context("set Ctrl+C handler")?;
    Ok(cancel)
}

fn handle_volume(args: &VolumeArgs, mut opts: Opts) -> Result<()> {
    apply_volume_args(args, &mut opts);
    let source = Arc::new(HttpSource::new(&opts)?);
    let limiter = Arc::new(RateLimiter::upstream_default());
    let cancel = cancel_on_ctrlc()?;

    if let Some(address) = &args.address {
        let (name, sample) =
            fetch_single_volume(source.as_ref(), source.as_ref(), &limiter, &cancel, address)?;
        println!("{}", report::format_single(&name, &sample));
        return Ok(());
    }

    let run = fetch_vault_volumes(
        source.as_ref(),
        Arc::clone(&source),
        limiter,
        &opts,
        cancel.clone(),
    )?;
    log_failures(&run.result);
    if cancel.is_cancelled() {
        warn!("Run was cancelled; report covers completed vaults only.");
    }

    if args.summary {
        println!("{}", report::format_summary(&summarize(&run.result.records)));
    } else {
        let ordered = listing(&run.result.records, &run.display_order());
        let ranked = rank_by_field(&ordered, opts.sort_by);
        println!("{}", report::format_listing(&ranked));
    }
    let failures = report::format_failures(&run.result.failures);
    if !failures.is_empty() {
        println!("{}", failures);
    }
    Ok(())
}

fn handle_vaults(args: &VaultsArgs, opts: Opts) -> Result<()> {
    let source = HttpSource::new(&opts)?;
    let filter = CatalogFilter {
        min_tvl: args.min_tvl,
        priority_only: false,
        count: args.count,
        ascending: !args.desc,
        exclude: Default::default(),
    };
    let vaults = list_vaults(&source, &filter)?;
    debug!("listing {} vaults", vaults.len());
    println!("{}", report::format_vaults(&vaults, args.count));
    Ok(())
}

/// Run the selected subcommand.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = setup_opts(cli)?;
    match &cli.command {
        Commands::Volume(args) => handle_volume(args, opts),
        Commands::Vaults(args) => handle_vaults(args, opts),
    }
}
