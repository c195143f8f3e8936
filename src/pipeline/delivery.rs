//! Delivery workers: one thread per category, draining that category's queue
//! into its destination directory.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::{debug, warn};

use crate::error::{DeliveryError, PipelineError};
use crate::types::{Category, Delivery, FileEntry, Routes};
use crate::utils::config::WORKER_IDLE_POLL_MS;

use super::context::PipelineContext;

/// Spawn one worker per category queue. Every destination is resolved before
/// the first thread starts, so either all workers come up or none do. The
/// caller must drop its own `delivered_tx` clone after this so the delivered
/// stream closes when the workers exit.
pub fn spawn_delivery_workers(
    entry_rxs: HashMap<Category, Receiver<FileEntry>>,
    delivered_tx: &Sender<Delivery>,
    routes: &Routes,
    ctx: &PipelineContext,
) -> Result<Vec<JoinHandle<usize>>, PipelineError> {
    let mut planned = Vec::new();
    for (category, rx) in entry_rxs {
        let dest = routes
            .destination(category)
            .ok_or(PipelineError::MissingDestination(category))?
            .to_path_buf();
        planned.push((category, rx, dest));
    }

    Ok(planned
        .into_iter()
        .map(|(category, rx, dest)| {
            let delivered_tx = delivered_tx.clone();
            let in_flight = Arc::clone(&ctx.in_flight);
            let failed_paths = Arc::clone(&ctx.failed_paths);
            let shutdown = Arc::clone(&ctx.shutdown);
            thread::spawn(move || {
                delivery_worker_loop(
                    category,
                    rx,
                    dest,
                    delivered_tx,
                    in_flight,
                    failed_paths,
                    shutdown,
                )
            })
        })
        .collect())
}

/// Single delivery worker: take entries off the queue in order and move each
/// into `dest_dir`. One move at a time per category, so there is at most one
/// writer per destination directory. Runs until the queue disconnects, or
/// until shutdown once the queue is idle; a move in progress always runs to
/// completion. Returns the number of files delivered.
///
/// Failure reporting is rate-limited per path: the first failure logs at warn
/// and lands in `failed_paths`, repeats (the file stays in the source
/// directory and is re-polled) log at debug. A later success clears the path.
fn delivery_worker_loop(
    category: Category,
    rx: Receiver<FileEntry>,
    dest_dir: PathBuf,
    delivered_tx: Sender<Delivery>,
    in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    failed_paths: Arc<Mutex<Vec<(PathBuf, String)>>>,
    shutdown: Arc<AtomicBool>,
) -> usize {
    let idle = Duration::from_millis(WORKER_IDLE_POLL_MS);
    let mut reported: HashSet<PathBuf> = HashSet::new();
    let mut delivered = 0_usize;
    loop {
        let entry = match rx.recv_timeout(idle) {
            Ok(entry) => entry,
            Err(RecvTimeoutError::Timeout) => {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                continue;
            }
            Err(RecvTimeoutError::Disconnected) => break,
        };

        let source_path = entry.path.clone();
        // Deleted or moved externally between discovery and now: a skip,
        // not a failure.
        if fs::symlink_metadata(&source_path).is_err() {
            debug!("{category}: {} vanished before delivery", source_path.display());
            in_flight.lock().unwrap().remove(&source_path);
            continue;
        }

        match deliver(&entry, &dest_dir) {
            Ok(dest) => {
                delivered += 1;
                reported.remove(&source_path);
                debug!("{category}: delivered {}", dest.display());
                let _ = delivered_tx.send(Delivery {
                    entry,
                    category,
                    dest,
                });
            }
            Err(err) => {
                if reported.insert(source_path.clone()) {
                    warn!("{category}: {err}");
                    failed_paths
                        .lock()
                        .unwrap()
                        .push((source_path.clone(), err.to_string()));
                } else {
                    debug!("{category}: {err}");
                }
            }
        }
        in_flight.lock().unwrap().remove(&source_path);
    }
    delivered
}

/// Move one file into `dest_dir`, creating the directory if missing
/// (idempotent). A same-named file already at the destination is a conflict
/// and the source is left untouched. The move itself is a single
/// same-filesystem rename, so the file is never visible half-written under
/// its final name. One attempt; the caller decides whether a re-poll retries.
fn deliver(entry: &FileEntry, dest_dir: &Path) -> Result<PathBuf, DeliveryError> {
    fs::create_dir_all(dest_dir).map_err(|source| DeliveryError::Io {
        src: entry.path.clone(),
        dest: dest_dir.to_path_buf(),
        source,
    })?;

    let Some(name) = entry.path.file_name() else {
        return Err(DeliveryError::Io {
            src: entry.path.clone(),
            dest: dest_dir.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name"),
        });
    };
    let dest = dest_dir.join(name);

    // symlink_metadata so even a dangling link at the destination counts.
    if fs::symlink_metadata(&dest).is_ok() {
        return Err(DeliveryError::Conflict { dest });
    }
    fs::rename(&entry.path, &dest).map_err(|source| DeliveryError::Io {
        src: entry.path.clone(),
        dest: dest.clone(),
        source,
    })?;
    Ok(dest)
}
