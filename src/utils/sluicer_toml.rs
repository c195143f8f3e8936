//! Load `.sluicer.toml` from a directory (CLI only). Lib callers inject
//! configuration directly through [`crate::Config`].

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::types::{Category, Config};
use crate::utils::config::PackagePaths;

#[derive(Debug, Deserialize)]
pub(crate) struct SluicerToml {
    #[serde(default)]
    settings: SettingsSection,
    /// Extra extension → category pairs, e.g. `tsv = "csv"`.
    #[serde(default)]
    extensions: HashMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    source: Option<String>,
    csv_dir: Option<String>,
    txt_dir: Option<String>,
    error_dir: Option<String>,
    interval_ms: Option<u64>,
    max_per_tick: Option<usize>,
    queue_bound: Option<usize>,
    verbose: Option<bool>,
}

/// Load `.sluicer.toml` from `dir` if present. Returns None if the file is
/// missing or unreadable.
pub(crate) fn load_sluicer_toml(dir: &Path) -> Option<SluicerToml> {
    let path = dir.join(PackagePaths::get().config_filename());
    let s = std::fs::read_to_string(&path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Apply file config to `config` (only fields present in the file). Call
/// before applying CLI flags. An unknown category name under `[extensions]`
/// is a startup error, not a silent fallback.
pub(crate) fn apply_file_to_config(file: &SluicerToml, config: &mut Config) -> Result<()> {
    let s = &file.settings;
    if let Some(ref p) = s.source {
        config.source = PathBuf::from(p);
    }
    if let Some(ref p) = s.csv_dir {
        config.routes.set(Category::Csv, PathBuf::from(p));
    }
    if let Some(ref p) = s.txt_dir {
        config.routes.set(Category::Txt, PathBuf::from(p));
    }
    if let Some(ref p) = s.error_dir {
        config.routes.set(Category::Error, PathBuf::from(p));
    }
    if let Some(ms) = s.interval_ms {
        config.opts.poll_interval = Duration::from_millis(ms);
    }
    if let Some(n) = s.max_per_tick {
        config.opts.max_per_tick = n.max(1);
    }
    if let Some(bound) = s.queue_bound {
        config.opts.queue_bound = Some(bound);
    }
    if let Some(v) = s.verbose {
        config.opts.verbose = v;
    }
    for (extension, category) in &file.extensions {
        let category: Category = category
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("[extensions] {extension}"))?;
        config.table.insert(extension, category);
    }
    Ok(())
}
