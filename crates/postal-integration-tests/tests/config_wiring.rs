//! Integration tests wiring a config file through telemetry into a bus.

use std::collections::HashMap;
use std::io::Write;

use postal_bus::{Mailbox, MailboxError};
use postal_config::{Config, ConfigError};
use postal_telemetry::{LogConfig, LogFormat, LogSink, LogTarget, build_subscriber};
use postal_test::{CapturedLogs, Dog, Left};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_config_file_drives_sink_levels() {
    let file = write_config(
        r#"
[logging]
level = "debug"
format = "compact"

[sinks]
dead_letter_level = "info"
failure_level = "warn"
include_message = true
"#,
    );
    let config = Config::load_with_env(Some(file.path()), &HashMap::new()).unwrap();

    let log_config = LogConfig::try_from(&config.logging).unwrap().without_ansi();
    assert_eq!(log_config.level, "debug");
    assert_eq!(log_config.target, LogTarget::Stderr);

    let sink = LogSink::try_from(&config.sinks).unwrap();
    let bus = sink.into_bus();
    bus.subscribe(&Mailbox::<Dog>::new("vet", |_| {
        Err(MailboxError::recoverable("closed on sundays"))
    }));

    let logs = CapturedLogs::new();
    let subscriber = build_subscriber(&log_config.without_timestamps(), logs.clone()).unwrap();
    tracing::subscriber::with_default(subscriber, || {
        bus.publish(Dog::new("rex")).unwrap();
        bus.publish(Left(4)).unwrap();
    });

    let lines = logs.lines();
    let failure = lines
        .iter()
        .find(|l| l.contains("Mailbox failed to handle message"))
        .unwrap();
    assert!(failure.contains("WARN"));
    assert!(failure.contains("closed on sundays"));
    assert!(failure.contains("rex"));

    let dead = lines
        .iter()
        .find(|l| l.contains("No mailbox accepted message"))
        .unwrap();
    assert!(dead.contains("INFO"));
    assert!(dead.contains("Left"));
}

#[test]
fn test_env_fallback_selects_json_output() {
    let file = write_config("[logging]\nlevel = \"info\"\n");
    let env: HashMap<String, String> =
        [("POSTAL_LOG_FORMAT".to_owned(), "json".to_owned())].into_iter().collect();

    let config = Config::load_with_env(Some(file.path()), &env).unwrap();
    let log_config = LogConfig::try_from(&config.logging).unwrap();
    assert_eq!(log_config.format, LogFormat::Json);

    let logs = CapturedLogs::new();
    let subscriber = build_subscriber(&log_config, logs.clone()).unwrap();
    let bus = LogSink::new().into_bus();
    tracing::subscriber::with_default(subscriber, || {
        bus.publish(Left(1)).unwrap();
    });

    let lines = logs.lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with('{'));
    assert!(lines[0].contains("\"message_type\""));
}

#[test]
fn test_bus_debug_events_follow_directives() {
    let config = Config::from_toml_str(
        "[logging]\nlevel = \"warn\"\ndirectives = [\"postal_bus=debug\"]",
    )
    .unwrap();
    let log_config = LogConfig::try_from(&config.logging)
        .unwrap()
        .without_ansi()
        .without_timestamps();

    let logs = CapturedLogs::new();
    let subscriber = build_subscriber(&log_config, logs.clone()).unwrap();
    let bus = LogSink::new().into_bus();
    tracing::subscriber::with_default(subscriber, || {
        bus.subscribe(&Mailbox::<Dog>::from_fn("kennel", |_| {}));
        bus.publish(Dog::new("rex")).unwrap();
    });

    let output = logs.contents();
    assert!(output.contains("Mailbox subscribed"));
    assert!(output.contains("mailbox=kennel"));
    // Per-delivery events are trace level.
    assert!(!output.contains("Delivering message"));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let file = write_config("[sinks]\nfailure_level = \"catastrophic\"\n");
    let err = Config::load_with_env(Some(file.path()), &HashMap::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidField { ref field, .. } if field == "sinks.failure_level"
    ));
}

// The only test in this binary that installs a global subscriber.
#[test]
fn test_init_from_config_installs_file_logging() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let config = Config::from_toml_str(&format!(
        r#"
[logging]
level = "trace"
target = "file"
directory = {directory:?}

[sinks]
failure_level = "info"
"#,
        directory = log_dir.display().to_string(),
    ))
    .unwrap();

    let sink = postal_telemetry::init_from_config(&config).unwrap();
    assert!(log_dir.is_dir());
    assert_eq!(sink.failure_level(), tracing::Level::INFO);

    assert!(postal_telemetry::init_from_config(&config).is_err());
}
