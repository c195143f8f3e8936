//! Wires poller → router → delivery workers and owns their lifecycles.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::error::PipelineError;
use crate::pipeline;
use crate::types::{Opts, RouteTable, Routes};

use super::context::{PipelineChannels, PipelineContext, PipelineHandles};
use super::router::Router;

/// Start the poll + route + deliver pipeline. Validation and the source
/// directory happen before any thread is spawned, and every delivery worker
/// is up before the first tick: either the whole pipeline starts or none of
/// it does. The caller receives completed moves from `delivered_rx` and joins
/// the handles when the stream closes.
pub fn run_pipeline(
    source: &Path,
    routes: &Routes,
    table: &RouteTable,
    opts: &Opts,
    drain_once: bool,
    shutdown: Arc<AtomicBool>,
) -> Result<PipelineHandles, PipelineError> {
    routes.validate()?;
    std::fs::create_dir_all(source).map_err(|err| PipelineError::SourceUnavailable {
        path: source.to_path_buf(),
        source: err,
    })?;

    let PipelineChannels {
        entry_txs,
        entry_rxs,
        delivered_tx,
        delivered_rx,
    } = pipeline::create_pipeline_channels(opts);

    let ctx = PipelineContext {
        source: source.to_path_buf(),
        opts: opts.clone(),
        drain_once,
        shutdown: Arc::clone(&shutdown),
        in_flight: Arc::new(Mutex::new(HashSet::new())),
        first_error: Arc::new(Mutex::new(None)),
        failed_paths: Arc::new(Mutex::new(Vec::new())),
    };
    let first_error = Arc::clone(&ctx.first_error);
    let failed_paths = Arc::clone(&ctx.failed_paths);

    let worker_handles =
        pipeline::spawn_delivery_workers(entry_rxs, &delivered_tx, routes, &ctx)?;

    let router = Router::new(table.clone(), entry_txs);
    let poller_handle = pipeline::spawn_poller_thread(router, ctx);

    // Dropping the last delivered sender here means the stream closes once
    // the workers exit.
    drop(delivered_tx);

    Ok(PipelineHandles {
        delivered_rx,
        poller_handle,
        worker_handles,
        shutdown,
        first_error,
        failed_paths,
    })
}

/// Join poller and workers after the delivered stream is drained. Returns
/// (entries queued, files delivered).
pub fn join_pipeline_handles(
    poller_handle: JoinHandle<usize>,
    worker_handles: Vec<JoinHandle<usize>>,
) -> Result<(usize, usize)> {
    let emitted = poller_handle
        .join()
        .map_err(|_| anyhow::anyhow!("poller thread panicked"))?;
    let mut delivered = 0_usize;
    for handle in worker_handles {
        delivered += handle
            .join()
            .map_err(|_| anyhow::anyhow!("delivery worker panicked"))?;
    }
    Ok((emitted, delivered))
}

/// Request a stop and wait for the drain: the poller exits at its next tick
/// and drops the queues' senders, the workers finish whatever is already
/// queued (a move in progress always completes), then everything is joined.
pub fn shutdown_pipeline(handles: PipelineHandles) -> Result<(usize, usize)> {
    handles.shutdown.store(true, Ordering::Relaxed);
    join_pipeline_handles(handles.poller_handle, handles.worker_handles)
}
