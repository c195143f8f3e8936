//! Application configuration constants.
//! Defaults and tuning in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// Per-directory config file name (`.sluicer.toml`). CLI only.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Polling ----

/// Poller cadence defaults.
pub struct PollDefaults;

impl PollDefaults {
    /// Fixed delay between source scans (milliseconds).
    pub const INTERVAL_MS: u64 = 500;
    /// Most new files handed to the router per tick.
    pub const MAX_PER_TICK: usize = 1;
}

// ---- Delivery workers ----

/// How long a delivery worker blocks on its queue before re-checking the
/// shutdown flag (milliseconds). Bounds shutdown latency on a quiet queue.
pub const WORKER_IDLE_POLL_MS: u64 = 100;

// ---- Default directories (CLI) ----

/// Directory defaults when neither flags nor `.sluicer.toml` say otherwise,
/// relative to the working directory.
pub struct DefaultDirs;

impl DefaultDirs {
    pub const SOURCE: &'static str = "in";
    pub const CSV: &'static str = "out/csv";
    pub const TXT: &'static str = "out/txt";
    pub const ERROR: &'static str = "out/errors";
}
