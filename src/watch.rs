//! Long-running watch: poll, route, and deliver until shut down.

use anyhow::Result;
use log::info;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::pipeline::{check_for_fatal_or_failed, join_pipeline_handles, run_pipeline};
use crate::types::{Opts, Report, RouteTable, Routes};

/// Run the pipeline until `shutdown` is set (e.g. from a Ctrl-C handler),
/// logging each delivery. Queued deliveries drain before this returns.
pub fn watch_dir(
    source: &Path,
    routes: &Routes,
    table: &RouteTable,
    opts: &Opts,
    shutdown: Arc<AtomicBool>,
) -> Result<Report> {
    let handles = run_pipeline(source, routes, table, opts, false, shutdown)?;
    info!("watching {}", source.display());

    let mut report = Report::default();
    while let Ok(delivery) = handles.delivered_rx.recv() {
        info!(
            "{} -> {}",
            delivery.entry.path.display(),
            delivery.dest.display()
        );
        report.record(delivery.category);
    }

    join_pipeline_handles(handles.poller_handle, handles.worker_handles)?;
    report.failed = check_for_fatal_or_failed(&handles.first_error, &handles.failed_paths)?;
    Ok(report)
}
