//! Configuration and logging integration tests.
//!
//! These tests load settings from real files and check that every stage
//! picks them up, and that pipeline runs leave a trace in the log file.

use reqplan::config::{Config, LayoutConfig};
use reqplan::pipeline::LayoutEngine;
use reqplan::{rlog, Error, Pipeline};

use crate::fixtures::{TestWorkspace, SHOP_DOC};

/// Test: Settings file drives the pipeline
/// Given a TOML file overriding extractor and layout settings
/// When the pipeline is built from it
/// Then effort defaults and layout seed follow the file
#[test]
fn test_config_file_drives_pipeline() {
    let ws = TestWorkspace::new();
    let path = ws.write(
        "reqplan.toml",
        "[extractor]\ndefault_effort_hours = 1.5\n\n[layout]\nseed = 7\niterations = 20\n",
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.extractor.default_effort_hours, 1.5);
    assert_eq!(config.layout.seed, 7);
    assert_eq!(config.layout.iterations, 20);
    assert_eq!(config.relevance, Config::default().relevance);

    let pipeline = Pipeline::new(config.clone());
    let plan = pipeline.plan("- Write docs\n- Review budget");
    assert_eq!(plan.total_effort(), 3.0);

    let expected = LayoutEngine::new(config.layout.clone())
        .layout_with_seed(&plan.graph, 400.0, 300.0, 7)
        .unwrap();
    assert_eq!(pipeline.layout(&plan.graph, 400.0, 300.0).unwrap(), expected);
}

/// Test: Missing file means defaults
#[test]
fn test_missing_config_file_uses_defaults() {
    let ws = TestWorkspace::new();
    let config = Config::load(ws.file("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

/// Test: Save and load agree
#[test]
fn test_saved_config_loads_back() {
    let ws = TestWorkspace::new();
    let config = Config {
        layout: LayoutConfig {
            node_radius: 12.0,
            ..LayoutConfig::default()
        },
        ..Config::default()
    };
    let path = ws.file("nested/dir/reqplan.toml");
    config.save(&path).unwrap();
    assert_eq!(Config::load(&path).unwrap(), config);
}

/// Test: Bad files are reported, not ignored
#[test]
fn test_invalid_config_files_error() {
    let ws = TestWorkspace::new();

    let malformed = ws.write("malformed.toml", "[layout\nseed = 1");
    assert!(matches!(Config::load(&malformed), Err(Error::TomlParse(_))));

    let out_of_range = ws.write("range.toml", "[layout]\niterations = 0\n");
    assert!(matches!(Config::load(&out_of_range), Err(Error::Config(_))));
}

/// Test: Pipeline runs are logged
/// Given a log file installed at the default level
/// When a plan runs, a reference is dropped and bad input is rejected
/// Then INFO, WARN and ERROR lines all reach the file
#[test]
fn test_pipeline_runs_are_logged() {
    let ws = TestWorkspace::new();
    let log_path = ws.file("reqplan.log");
    reqplan::log::init(&log_path);

    rlog!("integration run starting");
    let pipeline = Pipeline::default();
    let plan = pipeline.plan(SHOP_DOC);
    pipeline.plan("## Ops\n- Rotate keys (after Unknown migration)");
    let bad = ws.write("bad.toml", "[layout]\niterations = 0\n");
    assert!(Config::load(&bad).is_err());
    assert!(pipeline.find_relevant(&[], "anything", 0).is_err());
    assert!(pipeline.layout(&plan.graph, 0.0, 600.0).is_err());
    reqplan::log::shutdown();

    let contents = std::fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("[INFO] integration run starting"));
    assert!(contents.contains("plan: 4 phases, 9 tasks, 11 nodes, 7 edges, 0 cycles"));
    assert!(contents.contains("[WARN] extract_tasks: task-1 unresolved reference 'Unknown migration' dropped"));
    assert!(contents.contains("[ERROR] Config rejected: "));
    assert!(contents.contains("[ERROR] find_relevant: limit must be at least 1"));
    assert!(contents.contains("[ERROR] layout: invalid canvas 0x600"));
}
