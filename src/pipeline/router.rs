//! Classify entries and enqueue them on their category's delivery queue.

use std::collections::HashMap;

use crossbeam_channel::{Sender, TrySendError};

use crate::types::{Category, FileEntry, RouteTable};

/// Why an entry could not be enqueued.
pub enum RouteError {
    /// The category's queue is at its bound. The entry is handed back; the
    /// poller ends the tick and the file is retried next interval.
    Backpressure(FileEntry),
    /// No queue exists for this category. Startup validation makes this
    /// unreachable; defended anyway since it means a configuration bug.
    Unroutable(Category),
    /// The category's worker is gone (receiver dropped). Fatal.
    WorkerGone(Category),
}

/// Dispatches classified entries to per-category queues. Enqueueing is
/// synchronous, so entries of one category reach their worker in discovery
/// order.
pub struct Router {
    table: RouteTable,
    entry_txs: HashMap<Category, Sender<FileEntry>>,
}

impl Router {
    pub fn new(table: RouteTable, entry_txs: HashMap<Category, Sender<FileEntry>>) -> Self {
        Router { table, entry_txs }
    }

    /// Classify `entry` and append it to the matching queue. Returns the
    /// chosen category. Never blocks: a full bounded queue reports
    /// [`RouteError::Backpressure`] instead.
    pub fn route(&self, entry: FileEntry) -> Result<Category, RouteError> {
        let category = self.table.classify(&entry);
        let Some(tx) = self.entry_txs.get(&category) else {
            return Err(RouteError::Unroutable(category));
        };
        match tx.try_send(entry) {
            Ok(()) => Ok(category),
            Err(TrySendError::Full(entry)) => Err(RouteError::Backpressure(entry)),
            Err(TrySendError::Disconnected(_)) => Err(RouteError::WorkerGone(category)),
        }
    }
}
