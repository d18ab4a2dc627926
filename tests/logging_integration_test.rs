// Installs the global subscriber, so this file holds a single test.

mod common;

use std::fs;
use tempfile::TempDir;

use translit_probe::domain::models::{LogConfig, LogFormat, RotationPolicy};
use translit_probe::infrastructure::logging::LoggerImpl;
use translit_probe::services::AbortSignal;

#[test]
fn test_run_writes_structured_log_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = LogConfig {
        level: "info".to_string(),
        format: LogFormat::Json,
        log_dir: Some(temp_dir.path().to_path_buf()),
        enable_stdout: false,
        rotation: RotationPolicy::Never,
        retention_days: 7,
    };

    let logger = LoggerImpl::init(&config).unwrap();
    assert!(logger.writes_files());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap();
    let report = runtime.block_on(async {
        let discovery = common::simulated(300, 250);
        common::runner(&discovery, AbortSignal::never())
            .run(&common::builtin().filter(None, Some("Pos_Fun_0003")))
            .await
            .unwrap()
    });
    assert_eq!(report.summary.passed, 1);

    // Flush the non-blocking writer
    drop(logger);

    let contents = fs::read_to_string(temp_dir.path().join("translit-probe.log")).unwrap();
    let lines: Vec<serde_json::Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("log lines are JSON"))
        .collect();

    let passed = lines
        .iter()
        .find(|line| line["fields"]["message"] == "scenario passed")
        .expect("scenario outcome logged");
    assert_eq!(passed["level"], "INFO");
    assert_eq!(passed["span"]["scenario_id"], "Pos_Fun_0003");

    assert!(lines
        .iter()
        .any(|line| line["fields"]["message"] == "run finished" && line["fields"]["passed"] == 1));
    assert!(!contents.contains("superseded transformation"), "trace lines leaked past the filter");
}
