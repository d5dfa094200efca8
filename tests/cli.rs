// tests/cli.rs
// =============================================================================
// Runs the compiled binary. Only URLs covered by the built-in exclusion
// rules are used, so nothing here touches the network.
// =============================================================================

use std::process::Command;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_md-link-guardian"))
}

#[test]
fn test_urls_json_output_is_only_json() {
    let output = binary()
        .args(["urls", "--json", "https://example.com/a", "mailto:team@acme.dev"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed, serde_json::json!([]));
}

#[test]
fn test_url_reports_excluded_link() {
    let output = binary()
        .args(["url", "https://example.com/a"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("EXCLUDED https://example.com/a"));
}
