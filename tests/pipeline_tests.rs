//! Filesystem integration tests: drain and watch the real pipeline against
//! temp directories.

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use sluicer::drain::drain_dir;
use sluicer::pipeline::{run_pipeline, shutdown_pipeline};
use sluicer::{Category, Delivery, Opts, RouteTable, Routes};

type NoCallback = Option<fn(&Delivery)>;
const NO_CALLBACK: NoCallback = None;

/// Short ticks and a roomy per-tick budget so drains finish quickly.
fn fast_opts() -> Opts {
    Opts {
        poll_interval: Duration::from_millis(10),
        max_per_tick: 16,
        queue_bound: None,
        verbose: false,
    }
}

fn routes_under(base: &Path) -> Routes {
    Routes::new(base.join("csv"), base.join("txt"), base.join("errors"))
}

fn write_file(path: &Path, contents: &[u8]) {
    fs::write(path, contents).unwrap();
}

fn source_file_count(source: &Path) -> usize {
    fs::read_dir(source).unwrap().count()
}

#[test]
fn test_drain_routes_by_extension() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("report.csv"), b"a,b\n1,2\n");
    write_file(&source.join("notes.txt"), b"hello\n");
    write_file(&source.join("image.png"), b"\x89PNG");

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.total(), 3);
    assert_eq!(report.delivered(Category::Csv), 1);
    assert_eq!(report.delivered(Category::Txt), 1);
    assert_eq!(report.delivered(Category::Error), 1);
    assert!(report.failed.is_empty());

    assert_eq!(fs::read(out.join("csv/report.csv"))?, b"a,b\n1,2\n");
    assert_eq!(fs::read(out.join("txt/notes.txt"))?, b"hello\n");
    assert_eq!(fs::read(out.join("errors/image.png"))?, b"\x89PNG");
    assert_eq!(source_file_count(&source), 0);
    Ok(())
}

#[test]
fn test_drain_uppercase_extension() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("DATA.CSV"), b"x\n");

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.delivered(Category::Csv), 1);
    // File name is preserved as-is; only classification is case-insensitive.
    assert!(out.join("csv/DATA.CSV").exists());
    Ok(())
}

#[test]
fn test_drain_no_extension_goes_to_errors() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("README"), b"no extension\n");

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.delivered(Category::Error), 1);
    assert!(out.join("errors/README").exists());
    Ok(())
}

#[test]
fn test_destinations_created_on_demand() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("a.csv"), b"1\n");

    // Deeply nested, nothing exists yet.
    let out = tmp.path().join("deep/nested/out");
    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.total(), 1);
    assert!(out.join("csv/a.csv").exists());
    Ok(())
}

#[test]
fn test_source_created_when_missing() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("not-yet");

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert!(source.is_dir());
    assert_eq!(report.total(), 0);
    assert!(report.failed.is_empty());
    Ok(())
}

#[test]
fn test_conflict_leaves_source_and_destination() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("data.csv"), b"new content\n");

    let out = tmp.path().join("out");
    fs::create_dir_all(out.join("csv"))?;
    write_file(&out.join("csv/data.csv"), b"old content\n");

    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.total(), 0);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, source.join("data.csv"));
    assert!(report.failed[0].1.contains("refusing to overwrite"));

    // Neither side was touched.
    assert_eq!(fs::read(source.join("data.csv"))?, b"new content\n");
    assert_eq!(fs::read(out.join("csv/data.csv"))?, b"old content\n");
    Ok(())
}

#[test]
fn test_conflict_does_not_stop_other_categories() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("blocked.csv"), b"new\n");
    write_file(&source.join("fine.txt"), b"ok\n");

    let out = tmp.path().join("out");
    fs::create_dir_all(out.join("csv"))?;
    write_file(&out.join("csv/blocked.csv"), b"old\n");

    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.delivered(Category::Txt), 1);
    assert_eq!(report.failed.len(), 1);
    assert!(out.join("txt/fine.txt").exists());
    assert!(source.join("blocked.csv").exists());
    Ok(())
}

#[test]
fn test_fifo_order_within_category() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    for name in ["a.csv", "b.csv", "c.csv", "d.csv", "e.csv"] {
        write_file(&source.join(name), name.as_bytes());
    }

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    // One file per tick: discovery order is the sorted listing order.
    let opts = Opts {
        max_per_tick: 1,
        ..fast_opts()
    };

    let mut order: Vec<String> = Vec::new();
    let report = drain_dir(
        &source,
        &routes,
        &RouteTable::default(),
        &opts,
        Some(|delivery: &Delivery| {
            order.push(
                delivery
                    .dest
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned(),
            );
        }),
    )?;

    assert_eq!(report.delivered(Category::Csv), 5);
    assert_eq!(order, ["a.csv", "b.csv", "c.csv", "d.csv", "e.csv"]);
    Ok(())
}

#[test]
fn test_bounded_queue_still_drains_everything() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    for i in 0..6 {
        write_file(&source.join(format!("f{i}.csv")), b"x\n");
    }

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let opts = Opts {
        queue_bound: Some(1),
        ..fast_opts()
    };
    let report = drain_dir(&source, &routes, &RouteTable::default(), &opts, NO_CALLBACK)?;

    assert_eq!(report.delivered(Category::Csv), 6);
    assert_eq!(source_file_count(&source), 0);
    Ok(())
}

#[test]
fn test_subdirectories_are_ignored() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(source.join("subdir"))?;
    write_file(&source.join("subdir/inner.csv"), b"stay\n");
    write_file(&source.join("top.csv"), b"go\n");

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let report = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)?;

    assert_eq!(report.total(), 1);
    assert!(out.join("csv/top.csv").exists());
    assert!(source.join("subdir/inner.csv").exists());
    Ok(())
}

#[test]
fn test_missing_destination_refuses_to_start() {
    let tmp = tempfile::tempdir().unwrap();
    let source = tmp.path().join("in");
    fs::create_dir_all(&source).unwrap();

    let mut dirs = HashMap::new();
    dirs.insert(Category::Csv, tmp.path().join("out/csv"));
    let routes = Routes::from_map(dirs);

    let err = drain_dir(&source, &routes, &RouteTable::default(), &fast_opts(), NO_CALLBACK)
        .unwrap_err();
    assert!(err.to_string().contains("no destination directory"));
}

#[test]
fn test_extended_route_table() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;
    write_file(&source.join("table.tsv"), b"a\tb\n");

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let mut table = RouteTable::default();
    table.insert("tsv", Category::Csv);

    let report = drain_dir(&source, &routes, &table, &fast_opts(), NO_CALLBACK)?;
    assert_eq!(report.delivered(Category::Csv), 1);
    assert!(out.join("csv/table.tsv").exists());
    Ok(())
}

#[test]
fn test_watch_mode_picks_up_new_files_and_shuts_down() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let source = tmp.path().join("in");
    fs::create_dir_all(&source)?;

    let out = tmp.path().join("out");
    let routes = routes_under(&out);
    let shutdown = Arc::new(AtomicBool::new(false));
    let handles = run_pipeline(
        &source,
        &routes,
        &RouteTable::default(),
        &fast_opts(),
        false,
        Arc::clone(&shutdown),
    )?;

    // Files arrive after the pipeline is already watching.
    write_file(&source.join("late.csv"), b"1\n");
    write_file(&source.join("later.txt"), b"2\n");

    let mut delivered: Vec<PathBuf> = Vec::new();
    while delivered.len() < 2 {
        let delivery = handles
            .delivered_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("delivery within timeout");
        delivered.push(delivery.dest);
    }

    let (_emitted, moved) = shutdown_pipeline(handles)?;
    assert_eq!(moved, 2);
    assert!(out.join("csv/late.csv").exists());
    assert!(out.join("txt/later.txt").exists());
    assert_eq!(source_file_count(&source), 0);
    Ok(())
}
