//! Poll loop: scan the source directory on a fixed interval and hand new
//! files to the router.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};

use crossbeam_channel::tick;
use log::{debug, warn};

use crate::types::FileEntry;

use super::context::PipelineContext;
use super::router::{RouteError, Router};

/// What one scan of the source directory did.
struct ScanOutcome {
    /// Entries handed to the router this tick.
    emitted: usize,
    /// New files were seen but not handed over (tick budget, full queue).
    /// They are picked up on a later tick.
    deferred: bool,
}

pub fn spawn_poller_thread(router: Router, ctx: PipelineContext) -> JoinHandle<usize> {
    thread::spawn(move || run_poll_loop(router, ctx))
}

/// Run the tick loop until shutdown (watch mode) or until a scan offers
/// nothing unattempted (drain mode). Returns the number of entries emitted.
/// Dropping the router on exit closes every queue, which lets the workers
/// drain and stop. A tick never overlaps the previous one: the next scan
/// starts only after this scan's enqueue work returns.
fn run_poll_loop(router: Router, ctx: PipelineContext) -> usize {
    let ticker = tick(ctx.opts.poll_interval);
    let mut attempted: HashSet<PathBuf> = HashSet::new();
    let mut emitted = 0_usize;
    loop {
        if ctx.shutdown.load(Ordering::Relaxed) {
            break;
        }
        match scan_tick(&router, &ctx, &mut attempted) {
            Ok(outcome) => {
                emitted += outcome.emitted;
                if ctx.drain_once && outcome.emitted == 0 && !outcome.deferred {
                    break;
                }
            }
            Err(err) => {
                if ctx.drain_once {
                    let _ = ctx
                        .first_error
                        .lock()
                        .unwrap()
                        .get_or_insert_with(|| format!("list {}: {}", ctx.source.display(), err));
                    break;
                }
                // Transient in watch mode; the directory may come back.
                warn!("list {}: {}", ctx.source.display(), err);
            }
        }
        if ticker.recv().is_err() {
            break;
        }
    }
    emitted
}

/// One tick: list the source non-recursively, keep regular files, sort by
/// name for a deterministic discovery order, and route at most
/// `max_per_tick` entries that are not already in flight (or, in drain mode,
/// already attempted).
fn scan_tick(
    router: &Router,
    ctx: &PipelineContext,
    attempted: &mut HashSet<PathBuf>,
) -> std::io::Result<ScanOutcome> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    for dir_entry in std::fs::read_dir(&ctx.source)? {
        let Ok(dir_entry) = dir_entry else { continue };
        let path = dir_entry.path();
        // metadata() follows symlinks: a link to a regular file counts, a
        // link to a directory does not. A file deleted between the listing
        // and this call is a skip, not an error.
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => candidates.push(path),
            Ok(_) => {}
            Err(err) => debug!("skip {}: {}", path.display(), err),
        }
    }
    candidates.sort();

    let mut outcome = ScanOutcome {
        emitted: 0,
        deferred: false,
    };
    for path in candidates {
        if ctx.in_flight.lock().unwrap().contains(&path) {
            continue;
        }
        if ctx.drain_once && attempted.contains(&path) {
            continue;
        }
        if outcome.emitted >= ctx.opts.max_per_tick {
            outcome.deferred = true;
            break;
        }
        ctx.in_flight.lock().unwrap().insert(path.clone());
        match router.route(FileEntry::new(path.clone())) {
            Ok(category) => {
                debug!("queued {} -> {}", path.display(), category);
                if ctx.drain_once {
                    attempted.insert(path);
                }
                outcome.emitted += 1;
            }
            Err(RouteError::Backpressure(_)) => {
                // Stop the tick at the first full queue so per-category
                // order is kept; the file is rediscovered next interval.
                ctx.in_flight.lock().unwrap().remove(&path);
                outcome.deferred = true;
                break;
            }
            Err(RouteError::Unroutable(category)) => {
                ctx.in_flight.lock().unwrap().remove(&path);
                let _ = ctx
                    .first_error
                    .lock()
                    .unwrap()
                    .get_or_insert_with(|| format!("no queue for category `{category}`"));
                ctx.shutdown.store(true, Ordering::Relaxed);
                break;
            }
            Err(RouteError::WorkerGone(category)) => {
                ctx.in_flight.lock().unwrap().remove(&path);
                let _ = ctx.first_error.lock().unwrap().get_or_insert_with(|| {
                    format!("delivery worker for category `{category}` stopped")
                });
                ctx.shutdown.store(true, Ordering::Relaxed);
                break;
            }
        }
    }
    Ok(outcome)
}
