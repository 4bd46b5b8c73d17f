use std::io::Write;

use gdploa::error::{ConfigError, Error};
use gdploa::infrastructure::config::settings::Config;
use tempfile::NamedTempFile;

fn write_temp_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn config_loads_nested_solver_options() {
    let file = write_temp_config(
        r#"
[logging]
level = "debug"
format = "json"

[loa]
iteration_limit = 25
oa_penalty_factor = 500.0
time_limit = 60.0
mip_solver = "highs"
nlp_solver = "ipopt"

[loa.mip_options]
relative_gap = 0.0

[loa.nlp_options]
time_limit = 10.0
"#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.logging.format, "json");
    assert_eq!(config.loa.iteration_limit, 25);
    assert_eq!(config.loa.oa_penalty_factor, 500.0);
    assert_eq!(config.loa.time_limit, Some(60.0));
    assert_eq!(config.loa.mip_options.relative_gap, Some(0.0));
    assert_eq!(config.loa.nlp_options.time_limit, Some(10.0));
    // Unspecified fields keep their defaults.
    assert!(config.loa.oa_slacks);
}

#[test]
fn config_rejects_zero_iteration_limit() {
    let file = write_temp_config("[loa]\niteration_limit = 0\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "iteration_limit",
            ..
        })) => {}
        other => panic!("expected invalid iteration_limit, got {other:?}"),
    }
}

#[test]
fn config_rejects_negative_solver_time_limit() {
    let file = write_temp_config("[loa.mip_options]\ntime_limit = -1.0\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "mip_options.time_limit",
            ..
        })) => {}
        other => panic!("expected invalid mip_options.time_limit, got {other:?}"),
    }
}

#[test]
fn config_rejects_time_limit_too_large_for_a_duration() {
    for contents in [
        "[loa]\ntime_limit = 1e20\n",
        "[loa.mip_options]\ntime_limit = 1e20\n",
    ] {
        let file = write_temp_config(contents);

        match Config::load(file.path()) {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => {
                assert!(field.ends_with("time_limit"), "unexpected field {field}");
            }
            other => panic!("expected invalid time_limit, got {other:?}"),
        }
    }
}

#[test]
fn config_rejects_unknown_log_format() {
    let file = write_temp_config("[logging]\nformat = \"xml\"\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "logging.format",
            ..
        }))
    ));
}

#[test]
fn config_reports_missing_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn default_config_survives_a_file_round_trip() {
    let rendered = Config::default().to_toml().unwrap();
    let file = write_temp_config(&rendered);

    assert_eq!(Config::load(file.path()).unwrap(), Config::default());
}
