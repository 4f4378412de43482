use assert_cmd::Command;

/// Test CLI help output
#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("mcp-server-time").unwrap();
    let assert = cmd.arg("--help").assert();

    assert.success();
}

/// Test CLI version output
#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("mcp-server-time").unwrap();
    let assert = cmd.arg("--version").assert();

    assert.success();
}

/// An unknown default timezone is rejected before the server starts serving
#[test]
fn test_unknown_default_timezone_rejected() {
    let mut cmd = Command::cargo_bin("mcp-server-time").unwrap();
    let assert = cmd.args(["--timezone", "Mars/Colony"]).assert();

    assert.failure();
}
