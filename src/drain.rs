//! One-shot drain: route everything currently in the source directory,
//! then stop.

use anyhow::Result;
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::pipeline::{check_for_fatal_or_failed, join_pipeline_handles, run_pipeline};
use crate::types::{Delivery, Opts, Report, RouteTable, Routes};

/// Poll `source` until it offers nothing new, deliver everything queued, and
/// return the totals. Each file that fails to deliver is attempted once and
/// listed in [`Report::failed`]; it stays in the source directory.
/// `on_delivery` runs for every completed move as it happens; keep it fast
/// or send to a channel.
pub fn drain_dir<F>(
    source: &Path,
    routes: &Routes,
    table: &RouteTable,
    opts: &Opts,
    mut on_delivery: Option<F>,
) -> Result<Report>
where
    F: FnMut(&Delivery),
{
    let shutdown = Arc::new(AtomicBool::new(false));
    let handles = run_pipeline(source, routes, table, opts, true, shutdown)?;

    let mut report = Report::default();
    while let Ok(delivery) = handles.delivered_rx.recv() {
        report.record(delivery.category);
        if let Some(f) = on_delivery.as_mut() {
            f(&delivery);
        }
    }

    let (emitted, delivered) =
        join_pipeline_handles(handles.poller_handle, handles.worker_handles)?;
    debug!("drain: {emitted} queued, {delivered} delivered");

    report.failed = check_for_fatal_or_failed(&handles.first_error, &handles.failed_paths)?;
    Ok(report)
}
