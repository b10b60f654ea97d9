use std::io::Write;
use std::process::{Command, Output};

fn run_monitor(args: &[&str]) -> Output {
    let binary_path = env!("CARGO_BIN_EXE_basis-monitor");
    Command::new(binary_path)
        .args(args)
        .env("RUST_LOG", "error")
        .output()
        .expect("Failed to start basis-monitor binary")
}

#[test]
fn cli_dry_run_with_bundled_config_works() {
    let config_path = format!(
        "{}/config/basis-monitor.yaml",
        env!("CARGO_MANIFEST_DIR")
    );
    let output = run_monitor(&["--config", &config_path, "--dry-run"]);

    assert!(
        output.status.success(),
        "Process exited with non-zero status: {}\nStdout: {}\nStderr: {}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_dry_run_with_push_config_and_overrides_works() {
    let mut file = tempfile::NamedTempFile::new().expect("temp config");
    writeln!(file, "mode: push\nbase_url: \"https://basis.example.com\"").expect("write config");

    let config_path = file.path().to_string_lossy().to_string();
    let output = run_monitor(&[
        "--config",
        &config_path,
        "--mode",
        "poll",
        "--base-url",
        "http://127.0.0.1:9000",
        "--dry-run",
    ]);
    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn cli_rejects_unsupported_base_url() {
    let output = run_monitor(&["--base-url", "ftp://basis.example.com", "--dry-run"]);
    assert!(!output.status.success());
}

#[test]
fn cli_rejects_missing_config_file() {
    let output = run_monitor(&["--config", "/nonexistent/basis-monitor.yaml", "--dry-run"]);
    assert!(!output.status.success());
}
