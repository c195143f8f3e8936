//! Post-run error handling: fatal pipeline errors and per-file failure
//! summaries.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Check pipeline state after joining: a recorded fatal error wins; otherwise
/// summarize per-file failures at warn (each was already reported
/// individually by its worker) and hand them back for the caller's report.
pub fn check_for_fatal_or_failed(
    first_error: &Arc<Mutex<Option<String>>>,
    failed_paths: &Arc<Mutex<Vec<(PathBuf, String)>>>,
) -> Result<Vec<(PathBuf, String)>> {
    if let Some(msg) = first_error.lock().unwrap().take() {
        return Err(anyhow::anyhow!("{}", msg));
    }
    let failed = failed_paths.lock().unwrap().clone();
    if !failed.is_empty() {
        log::warn!("{} file(s) could not be delivered", failed.len());
    }
    Ok(failed)
}
