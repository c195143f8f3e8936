//! CLI command handler: watch by default; --once drains the source directory
//! and exits.

use anyhow::{Context, Result};
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::drain::drain_dir;
use crate::engine::arg_parser::Cli;
use crate::types::{Category, Config, Delivery};
use crate::utils::setup_logging;
use crate::utils::sluicer_toml::{apply_file_to_config, load_sluicer_toml};
use crate::watch::watch_dir;

/// Resolve configuration: defaults, then `.sluicer.toml` from the working
/// directory, then flags.
fn setup_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::default();
    if let Some(file) = load_sluicer_toml(Path::new(".")) {
        apply_file_to_config(&file, &mut config)?;
    }
    if let Some(ref source) = cli.source {
        config.source = source.clone();
    }
    if let Some(ref dir) = cli.csv_dir {
        config.routes.set(Category::Csv, dir.clone());
    }
    if let Some(ref dir) = cli.txt_dir {
        config.routes.set(Category::Txt, dir.clone());
    }
    if let Some(ref dir) = cli.error_dir {
        config.routes.set(Category::Error, dir.clone());
    }
    if let Some(ms) = cli.interval_ms {
        config.opts.poll_interval = Duration::from_millis(ms);
    }
    if let Some(n) = cli.max_per_tick {
        config.opts.max_per_tick = n.max(1);
    }
    if let Some(bound) = cli.queue_bound {
        config.opts.queue_bound = Some(bound);
    }
    if let Some(v) = cli.verbose {
        config.opts.verbose = v;
    }
    Ok(config)
}

/// Watch (default) or drain once when --once.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose.unwrap_or(false));
    let config = setup_config(cli)?;
    debug!(
        "{} CONFIG:{:#?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        config
    );

    if cli.once {
        let report = drain_dir(
            &config.source,
            &config.routes,
            &config.table,
            &config.opts,
            Some(|delivery: &Delivery| {
                info!(
                    "{} -> {}",
                    delivery.entry.path.display(),
                    delivery.dest.display()
                );
            }),
        )?;
        info!(
            "drained {} file(s), {} failed",
            report.total(),
            report.failed.len()
        );
    } else {
        let shutdown = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .context("install Ctrl-C handler")?;
        let report = watch_dir(
            &config.source,
            &config.routes,
            &config.table,
            &config.opts,
            shutdown,
        )?;
        info!(
            "stopped after {} delivery(ies), {} failed",
            report.total(),
            report.failed.len()
        );
    }
    Ok(())
}
