//! End to end runs of analysis configurations

use std::path::{Path, PathBuf};

use mutomo_analysis::{check_file, inspect, run, run_file, AnalysisConfig, Error, Task};
use mutomo_grid::{read_grid, Container, Table, VoxelGrid};
use rstest::{fixture, rstest};

/// Fresh scratch directory under the system temp dir
fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mutomo_analysis_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Container with a signal and background drum, plus a small event table
fn write_inputs(dir: &Path) -> PathBuf {
    let mut signal = VoxelGrid::uniform("signal", [6, 6, 6], [-90.0, 90.0]).unwrap();
    let mut background = signal.blank_like("background");
    for (i, (s, b)) in signal
        .values_mut()
        .iter_mut()
        .zip(background.values_mut())
        .enumerate()
    {
        *s = 11.0 + (i % 5) as f64 * 0.2;
        *b = 10.0 + (i % 3) as f64 * 0.2;
    }

    let mut events = Table::new("T");
    events.add_column("x", vec![-100.0, -10.0, 0.0, 10.0, 100.0]).unwrap();
    events.add_column("y", vec![0.0; 5]).unwrap();
    events.add_column("z", vec![0.0; 5]).unwrap();
    events.add_column("discr", vec![9.0, 10.5, 11.0, 11.5, 12.0]).unwrap();

    let mut container = Container::default();
    container.insert_grid(signal);
    container.insert_grid(background);
    container.insert_table(events);

    let path = dir.join("drums.bin");
    container.write(&path).unwrap();
    path
}

#[fixture]
fn inputs() -> (PathBuf, PathBuf) {
    let dir = scratch(&format!("{:?}", std::thread::current().id()).replace(['(', ')'], ""));
    let container = write_inputs(&dir);
    (dir, container)
}

fn config(json: String) -> AnalysisConfig {
    let config = AnalysisConfig::from_json(&json).unwrap();
    config.validate().unwrap();
    config
}

#[rstest]
fn distribution_with_cumulative_and_summary(inputs: (PathBuf, PathBuf)) {
    let (dir, container) = inputs;
    let config = config(format!(
        r#"{{ "analyses": [ {{
            "name": "signal",
            "output": {out:?},
            "task": {{
                "kind": "distribution",
                "source": {{ "path": {container:?}, "field": "signal" }},
                "binning": {{ "bins": 100, "lo": 0.0, "hi": 20.0 }},
                "summary_window": [10.0, 13.0],
                "cumulative": true
            }}
        }} ] }}"#,
        out = dir.join("signal"),
    ));

    let report = run(&config);
    assert!(report.is_success());
    assert_eq!(report.completed[0].1.len(), 5);
    assert!(dir.join("signal.csv").exists());
    assert!(dir.join("signal_cumulative.json").exists());

    let summary: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.join("signal_summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["entries"], 216.0);
}

#[rstest]
#[case("diff", "diff_grid.bin")]
#[case("diff.json", "diff_grid.json")]
#[case("diff.bin", "diff_grid.bin")]
fn difference_writes_grid_container(
    inputs: (PathBuf, PathBuf),
    #[case] stem: &str,
    #[case] grid_file: &str,
) {
    let (dir, container) = inputs;
    let config = config(format!(
        r#"{{ "analyses": [ {{
            "name": "signal minus background",
            "output": {out:?},
            "task": {{
                "kind": "difference",
                "a": {{ "path": {container:?}, "field": "signal" }},
                "b": {{ "path": {container:?}, "field": "background" }},
                "binning": {{ "bins": 40, "lo": -2.0, "hi": 2.0 }}
            }}
        }} ] }}"#,
        out = dir.join(stem),
    ));

    assert!(run(&config).is_success());

    // the distribution json beside the stem must not replace the grid
    let grid = read_grid(dir.join(grid_file), "signal-background").unwrap();
    assert_eq!(grid.n_measured(), 216);
    assert!(grid.values().iter().all(|v| *v > 0.0));

    let distribution: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.join("diff.json")).unwrap()).unwrap();
    assert_eq!(distribution["entries"], 216);
}

#[rstest]
fn failures_do_not_stop_the_batch(inputs: (PathBuf, PathBuf)) {
    let (dir, container) = inputs;
    let config = config(format!(
        r#"{{ "analyses": [
            {{
                "name": "missing field",
                "output": {missing:?},
                "task": {{
                    "kind": "distribution",
                    "source": {{ "path": {container:?}, "field": "nope" }},
                    "binning": {{ "bins": 10, "lo": 0.0, "hi": 20.0 }}
                }}
            }},
            {{
                "name": "projection",
                "output": {projection:?},
                "task": {{
                    "kind": "projection",
                    "source": {{ "path": {container:?}, "table": "T" }},
                    "column": "discr",
                    "cut": "(x>-50)&&(x<50)",
                    "binning": {{ "bins": 200, "lo": 0.0, "hi": 140.0 }}
                }}
            }}
        ] }}"#,
        missing = dir.join("missing"),
        projection = dir.join("projection"),
    ));

    let report = run(&config);
    assert_eq!(report.total(), 2);
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.failed[0].0, "missing field");
    assert!(report.failed[0].1.is_not_found());
    assert!(dir.join("projection.csv").exists());
    assert!(matches!(
        report.into_result(),
        Err(Error::AnalysesFailed {
            failed: 1,
            total: 2
        })
    ));
}

#[rstest]
fn efficiency_and_significance(inputs: (PathBuf, PathBuf)) {
    let (dir, container) = inputs;
    let config = config(format!(
        r#"{{ "analyses": [
            {{
                "name": "efficiency",
                "output": {efficiency:?},
                "task": {{
                    "kind": "efficiency",
                    "signal": {{ "path": {container:?}, "field": "signal" }},
                    "background": {{ "path": {container:?}, "field": "background" }},
                    "binning": {{ "bins": 20, "lo": 8.0, "hi": 14.0 }}
                }}
            }},
            {{
                "name": "significance",
                "output": {significance:?},
                "task": {{
                    "kind": "significance",
                    "signal": {{ "path": {container:?}, "field": "signal" }},
                    "background": {{ "path": {container:?}, "field": "background" }},
                    "binning": {{ "bins": 20, "lo": 8.0, "hi": 14.0 }},
                    "summary_window": [8.0, 14.0]
                }}
            }}
        ] }}"#,
        efficiency = dir.join("eff"),
        significance = dir.join("sig"),
    ));

    assert!(run(&config).is_success());

    let mut reader = csv::Reader::from_path(dir.join("eff.csv")).unwrap();
    assert_eq!(reader.records().count(), 20);

    let report: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.join("sig.json")).unwrap()).unwrap();
    assert!(report["significance"].as_f64().unwrap() > 0.0);
}

#[rstest]
fn inspect_lists_contents(inputs: (PathBuf, PathBuf)) {
    let (_, container) = inputs;
    let text = inspect(&container).unwrap();
    assert!(text.contains("2 grids, 1 tables"));
    assert!(text.contains("signal"));
}

#[test]
fn example_configuration_parses() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/example.json");
    let config = AnalysisConfig::from_file(path).unwrap();
    config.validate().unwrap();

    let kinds = config
        .analyses
        .iter()
        .map(|a| a.task.kind())
        .collect::<Vec<_>>();
    assert_eq!(
        kinds,
        [
            "distribution",
            "difference",
            "efficiency",
            "neighbours",
            "binary_map",
            "projection",
            "significance",
            "trend",
            "voxelize"
        ]
    );
    assert!(matches!(config.analyses[0].task, Task::Distribution { .. }));
}

#[rstest]
fn derived_grids_and_trend(inputs: (PathBuf, PathBuf)) {
    let (dir, container) = inputs;
    let config = config(format!(
        r#"{{ "analyses": [
            {{
                "name": "neighbours",
                "output": {neighbours:?},
                "task": {{
                    "kind": "neighbours",
                    "source": {{ "path": {container:?}, "field": "signal" }},
                    "threshold": 11.4
                }}
            }},
            {{
                "name": "bubbles",
                "output": {bubbles:?},
                "task": {{
                    "kind": "binary_map",
                    "source": {{ "path": {container:?}, "field": "signal" }},
                    "regions": [ {{ "frame": {{ "kind": "axis_centres" }}, "threshold": 11.4 }} ]
                }}
            }},
            {{
                "name": "trend",
                "output": {trend:?},
                "task": {{
                    "kind": "trend",
                    "points": [
                        {{ "x": 0.0, "path": {container:?}, "field": "background" }},
                        {{ "x": 1.0, "path": {container:?}, "field": "signal" }}
                    ],
                    "reference": {{ "path": {container:?}, "field": "background" }},
                    "binning": {{ "bins": 60, "lo": 8.0, "hi": 14.0 }},
                    "summary_window": [8.0, 14.0]
                }}
            }},
            {{
                "name": "voxelize",
                "output": {voxelize:?},
                "task": {{
                    "kind": "voxelize",
                    "source": {{ "path": {container:?}, "table": "T" }},
                    "column": "discr",
                    "width": 100.0,
                    "x": [-100.0, 100.0],
                    "y": [-50.0, 50.0],
                    "z": [-50.0, 50.0]
                }}
            }}
        ] }}"#,
        neighbours = dir.join("nb"),
        bubbles = dir.join("bubbles"),
        trend = dir.join("trend"),
        voxelize = dir.join("vox.vtr"),
    ));

    let report = run(&config);
    assert!(report.is_success(), "{:?}", report.failed);

    assert!(dir.join("nb_above.csv").exists());
    assert!(dir.join("nb_below.json").exists());
    assert!(dir.join("vox.vtr").exists());

    let map = read_grid(dir.join("bubbles.bin"), "signal_binary").unwrap();
    assert!(map.values().iter().all(|v| *v == 0.0 || *v == 1.0));
    assert!(map.n_measured() > 0);

    // the background point sits exactly on the reference
    let fit: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(dir.join("trend_fit.json")).unwrap())
            .unwrap();
    assert!(fit["fit"]["slope"].as_f64().unwrap() > 0.0);
    assert!(fit["fit"]["intercept"].as_f64().unwrap().abs() < 1e-9);
}

#[test]
fn invalid_configuration_is_rejected() {
    let config = AnalysisConfig::from_json(
        r#"{ "analyses": [ {
            "name": "bad binning",
            "output": "out/bad",
            "task": {
                "kind": "distribution",
                "source": { "path": "missing.bin", "field": "f" },
                "binning": { "bins": 0, "lo": 0.0, "hi": 1.0 }
            }
        } ] }"#,
    )
    .unwrap();
    assert!(config.validate().is_err());

    let report = run(&config);
    assert_eq!(report.failed.len(), 1);
}

#[rstest]
fn invalid_analysis_does_not_stop_a_file_run(inputs: (PathBuf, PathBuf)) {
    let (dir, container) = inputs;
    let json = format!(
        r#"{{ "analyses": [
            {{
                "name": "bad cut",
                "output": {bad:?},
                "task": {{
                    "kind": "projection",
                    "source": {{ "path": {container:?}, "table": "T" }},
                    "column": "discr",
                    "cut": "x >",
                    "binning": {{ "bins": 200, "lo": 0.0, "hi": 140.0 }}
                }}
            }},
            {{
                "name": "signal",
                "output": {good:?},
                "task": {{
                    "kind": "distribution",
                    "source": {{ "path": {container:?}, "field": "signal" }},
                    "binning": {{ "bins": 100, "lo": 0.0, "hi": 20.0 }}
                }}
            }}
        ] }}"#,
        bad = dir.join("bad"),
        good = dir.join("good"),
    );
    let path = dir.join("mixed.json");
    std::fs::write(&path, json).unwrap();

    // checking rejects the file as a whole
    assert!(check_file(&path).is_err());

    // running still writes everything that is valid
    let report = run_file(&path).unwrap();
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "bad cut");
    assert!(dir.join("good.csv").exists());
    assert!(!dir.join("bad.csv").exists());
    assert!(report.into_result().is_err());
}
