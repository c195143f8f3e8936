//! Sluicer: polling file router. Watches an inbox directory, classifies each
//! new file by extension, and moves it into its category's destination
//! directory.

pub mod drain;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;
pub mod watch;

/// Re-export types for API
pub use error::{DeliveryError, PipelineError};
pub use types::*;

use log::debug;
use std::path::Path;

/// Result alias used by public sluicer API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: drain `source` once with the default extension table,
/// moving every file into its category's directory under `routes`.
///
/// - **`on_delivery: None`** → totals only, from the returned [`Report`].
/// - **`on_delivery: Some(f)`** → `f` runs for each completed move as it
///   happens. Keep it fast or send to a channel.
///
/// For a custom extension table or a long-running watch, use
/// [`drain::drain_dir`] / [`watch::watch_dir`] directly.
pub fn sluice_dir<F>(
    source: &Path,
    routes: &Routes,
    opts: &Opts,
    on_delivery: Option<F>,
) -> Result<Report>
where
    F: FnMut(&Delivery),
{
    let config_str = format!(
        "{} OPTS:{:#?}",
        env!("CARGO_PKG_NAME").to_string().to_uppercase(),
        opts
    );
    debug!("{}", config_str);

    drain::drain_dir(source, routes, &RouteTable::default(), opts, on_delivery)
}
