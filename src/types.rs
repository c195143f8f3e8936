//! Public and internal types for the sluicer API and pipeline.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, SystemTime};

use crate::engine::tools::normalized_extension;
use crate::error::PipelineError;
use crate::utils::config::{DefaultDirs, PollDefaults};

/// Destination label for one file, derived from its extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Csv,
    Txt,
    /// Fallback for any extension without an explicit mapping.
    Error,
}

impl Category {
    /// Every category, in worker spawn order.
    pub const ALL: [Category; 3] = [Category::Csv, Category::Txt, Category::Error];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Csv => "csv",
            Category::Txt => "txt",
            Category::Error => "error",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Category::Csv),
            "txt" => Ok(Category::Txt),
            "error" => Ok(Category::Error),
            other => Err(format!("unknown category `{other}`")),
        }
    }
}

/// One file discovered in the source directory. Immutable once built; the
/// pipeline consumes it exactly once.
#[derive(Clone, Debug)]
pub struct FileEntry {
    /// Path of the file inside the source directory.
    pub path: PathBuf,
    /// Extension, lowercased, without the leading dot. Empty when the file has none.
    pub extension: String,
    /// When the poller first saw the file.
    pub discovered_at: SystemTime,
}

impl FileEntry {
    pub fn new(path: PathBuf) -> Self {
        let extension = normalized_extension(&path);
        FileEntry {
            path,
            extension,
            discovered_at: SystemTime::now(),
        }
    }
}

/// Category → destination directory. Every category must have exactly one
/// destination; [`Routes::validate`] enforces that before the pipeline starts.
/// Directories are created lazily on first delivery.
#[derive(Clone, Debug)]
pub struct Routes {
    dirs: HashMap<Category, PathBuf>,
}

impl Routes {
    pub fn new(csv_dir: PathBuf, txt_dir: PathBuf, error_dir: PathBuf) -> Self {
        let mut dirs = HashMap::new();
        dirs.insert(Category::Csv, csv_dir);
        dirs.insert(Category::Txt, txt_dir);
        dirs.insert(Category::Error, error_dir);
        Routes { dirs }
    }

    /// Build from an explicit map; missing categories surface in [`Routes::validate`].
    pub fn from_map(dirs: HashMap<Category, PathBuf>) -> Self {
        Routes { dirs }
    }

    pub fn set(&mut self, category: Category, dir: PathBuf) {
        self.dirs.insert(category, dir);
    }

    pub fn destination(&self, category: Category) -> Option<&Path> {
        self.dirs.get(&category).map(PathBuf::as_path)
    }

    /// Err when any category has no destination directory.
    pub fn validate(&self) -> Result<(), PipelineError> {
        for category in Category::ALL {
            if !self.dirs.contains_key(&category) {
                return Err(PipelineError::MissingDestination(category));
            }
        }
        Ok(())
    }
}

/// Extension → category mapping consulted by the classifier. Lookups are
/// case-insensitive; anything unmapped (including files with no extension)
/// falls back to [`Category::Error`].
#[derive(Clone, Debug)]
pub struct RouteTable {
    by_ext: HashMap<String, Category>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut table = RouteTable {
            by_ext: HashMap::new(),
        };
        table.insert("csv", Category::Csv);
        table.insert("txt", Category::Txt);
        table
    }
}

impl RouteTable {
    /// Map `extension` to `category`. Keys are stored lowercased.
    pub fn insert(&mut self, extension: &str, category: Category) {
        self.by_ext.insert(extension.to_ascii_lowercase(), category);
    }

    /// Classify an extension. Total: unmapped extensions are [`Category::Error`].
    pub fn category_for(&self, extension: &str) -> Category {
        self.by_ext
            .get(&extension.to_ascii_lowercase())
            .copied()
            .unwrap_or(Category::Error)
    }

    /// Classify a discovered file by its already-normalized extension.
    /// Never touches the filesystem.
    pub fn classify(&self, entry: &FileEntry) -> Category {
        self.category_for(&entry.extension)
    }
}

/// Record of one completed move, streamed to the caller while the pipeline runs.
#[derive(Clone, Debug)]
pub struct Delivery {
    pub entry: FileEntry,
    pub category: Category,
    /// Final path under the category's destination directory.
    pub dest: PathBuf,
}

/// Totals for a drain or watch run.
#[derive(Debug, Default)]
pub struct Report {
    delivered: HashMap<Category, usize>,
    /// First failure per path: (source path, error description).
    pub failed: Vec<(PathBuf, String)>,
}

impl Report {
    pub fn record(&mut self, category: Category) {
        *self.delivered.entry(category).or_insert(0) += 1;
    }

    pub fn delivered(&self, category: Category) -> usize {
        self.delivered.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.delivered.values().sum()
    }
}

/// Polling and queue tuning. `Default` matches the stock cadence: 500 ms
/// ticks, one new file per tick, unbounded queues.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Fixed delay between source directory scans.
    pub poll_interval: Duration,
    /// Most new files handed to the router per tick.
    pub max_per_tick: usize,
    /// Per-category queue capacity. When None the queues grow without bound;
    /// when set, a full queue ends the tick early and the file is retried
    /// next interval.
    pub queue_bound: Option<usize>,
    /// Show debug output.
    pub verbose: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Opts {
            poll_interval: Duration::from_millis(PollDefaults::INTERVAL_MS),
            max_per_tick: PollDefaults::MAX_PER_TICK,
            queue_bound: None,
            verbose: false,
        }
    }
}

/// Resolved startup configuration: source, destinations, classification table,
/// tuning. Built once by the CLI layer (defaults, then `.sluicer.toml`, then
/// flags) and handed to the pipeline by reference.
#[derive(Clone, Debug)]
pub struct Config {
    pub source: PathBuf,
    pub routes: Routes,
    pub table: RouteTable,
    pub opts: Opts,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: PathBuf::from(DefaultDirs::SOURCE),
            routes: Routes::new(
                PathBuf::from(DefaultDirs::CSV),
                PathBuf::from(DefaultDirs::TXT),
                PathBuf::from(DefaultDirs::ERROR),
            ),
            table: RouteTable::default(),
            opts: Opts::default(),
        }
    }
}
