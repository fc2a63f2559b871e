//! Integration test: config defaults, log handles and validation together.
//!
//! Mirrors what the binary does at startup, with all paths inside temp dirs.

use dfget_core::config::{self, DfgetConfig};
use dfget_core::context::{assert_context, ContextError, OutputProblem, RunContext};
use dfget_core::logging::{self, LogOptions};
use std::fs;
use tempfile::tempdir;

#[test]
fn startup_resolves_output_and_logs_context() {
    let work_home = tempdir().unwrap();
    let download_dir = tempdir().unwrap();
    let config_dir = tempdir().unwrap();
    let config_path = config_dir.path().join("config.toml");
    fs::write(&config_path, "local_limit = 20971520\npattern = \"cdn\"\n").unwrap();

    let cfg: DfgetConfig = config::load_from(&config_path).unwrap();
    let mut ctx = RunContext::new();
    cfg.apply(&mut ctx);
    ctx.url = "https://mirror.example.org/debian/pool/main/a.deb?sig=1".to_string();
    let target = download_dir.path().join("nested").join("a.deb");
    ctx.output = target.to_string_lossy().into_owned();
    ctx.client_logger = Some(logging::client_log(work_home.path(), LogOptions::default()));
    ctx.server_logger = Some(logging::server_log(work_home.path(), LogOptions::default()));

    assert_context(&mut ctx).expect("context should validate");
    assert_eq!(ctx.output, target.to_string_lossy());
    assert_eq!(ctx.local_limit, 20_971_520);
    assert_eq!(ctx.pattern, "cdn");

    let client = ctx.client_logger.as_ref().unwrap();
    client.in_scope(|| tracing::info!("context: {}", ctx));
    let log_path = client.path().expect("client log is a file");
    let log = fs::read_to_string(log_path).unwrap();
    assert!(log.contains("\"localLimit\":20971520"), "log was: {log}");
    assert!(log.contains(&ctx.sign), "log was: {log}");
    assert!(!download_dir.path().join("nested").exists());
}

#[test]
fn startup_rejects_directory_target() {
    let work_home = tempdir().unwrap();
    let download_dir = tempdir().unwrap();

    let mut ctx = RunContext::new();
    ctx.url = "http://127.0.0.1:8080/file.iso".to_string();
    ctx.output = download_dir.path().to_string_lossy().into_owned();
    ctx.client_logger = Some(logging::client_log(work_home.path(), LogOptions::default()));
    ctx.server_logger = Some(logging::server_log(work_home.path(), LogOptions::default()));

    match assert_context(&mut ctx) {
        Err(ContextError::InvalidOutput { path, reason }) => {
            assert_eq!(path, download_dir.path());
            assert!(matches!(reason, OutputProblem::IsDirectory));
        }
        other => panic!("expected InvalidOutput, got {other:?}"),
    }
}
