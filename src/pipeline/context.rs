//! Pipeline context and shared state passed into the poller and delivery workers.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::types::{Category, Delivery, FileEntry, Opts};

/// Shared context for the poll + delivery pipeline. Built in `run_pipeline`
/// and handed to the poller thread.
pub struct PipelineContext {
    pub source: PathBuf,
    pub opts: Opts,
    /// One-shot mode: the poller exits once a scan offers nothing unattempted.
    pub drain_once: bool,
    /// Cooperative stop flag; the poller exits at its next tick.
    pub shutdown: Arc<AtomicBool>,
    /// Paths handed to a queue and not yet attempted by a worker. Keeps later
    /// ticks from re-emitting a file that is still awaiting delivery.
    pub in_flight: Arc<Mutex<HashSet<PathBuf>>>,
    /// First fatal error seen inside the pipeline (unroutable category,
    /// drain-mode listing failure).
    pub first_error: Arc<Mutex<Option<String>>>,
    /// First failure per path: (source path, error description).
    pub failed_paths: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

/// Channels for the pipeline. The router gets the per-category senders; each
/// worker gets its category's receiver plus a clone of the delivered sender.
pub struct PipelineChannels {
    pub entry_txs: HashMap<Category, Sender<FileEntry>>,
    pub entry_rxs: HashMap<Category, Receiver<FileEntry>>,
    pub delivered_tx: Sender<Delivery>,
    pub delivered_rx: Receiver<Delivery>,
}

/// Handles returned by `run_pipeline` for streaming: receive deliveries and
/// join when done. The delivered channel closes once the poller and every
/// worker have exited.
pub struct PipelineHandles {
    pub delivered_rx: Receiver<Delivery>,
    pub poller_handle: JoinHandle<usize>,
    pub worker_handles: Vec<JoinHandle<usize>>,
    pub shutdown: Arc<AtomicBool>,
    pub first_error: Arc<Mutex<Option<String>>>,
    pub failed_paths: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

/// One queue per category, bounded when `opts.queue_bound` is set. The
/// delivered stream is always unbounded.
pub fn create_pipeline_channels(opts: &Opts) -> PipelineChannels {
    let mut entry_txs = HashMap::new();
    let mut entry_rxs = HashMap::new();
    for category in Category::ALL {
        let (tx, rx) = match opts.queue_bound {
            Some(cap) => bounded::<FileEntry>(cap),
            None => unbounded::<FileEntry>(),
        };
        entry_txs.insert(category, tx);
        entry_rxs.insert(category, rx);
    }
    let (delivered_tx, delivered_rx) = unbounded::<Delivery>();

    PipelineChannels {
        entry_txs,
        entry_rxs,
        delivered_tx,
        delivered_rx,
    }
}
