// CLI contract tests for the `tabtab` binary: output shape and exit codes.
// Run with: cargo test -p tabtab --test cli_tests
//
// Providers are pointed at an httpmock server through a throwaway settings
// file, so nothing here touches the real per-user settings or the network.

use std::path::Path;
use std::process::{Command, Output};

use httpmock::prelude::*;
use serde_json::json;

fn tabtab() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tabtab"));
    cmd.env_remove("RUST_LOG");
    cmd.env_remove("TABTAB_OPENAI_KEY");
    cmd
}

fn write_settings(dir: &Path, endpoint: &str, provider: &str) -> std::path::PathBuf {
    let path = dir.join("settings.json");
    let settings = json!({
        "generation.minDisplayMs": 0,
        "ai": {
            "provider": provider,
            "ollama_model": "llama3.2",
            "ollama_endpoint": endpoint,
        }
    });
    std::fs::write(&path, settings.to_string()).unwrap();
    path
}

fn ollama_server(reply: &str) -> MockServer {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(200)
            .json_body(json!({ "message": { "role": "assistant", "content": reply } }));
    });
    server
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

#[test]
fn test_generate_prints_sanitized_copy() {
    let server = ollama_server("Rewritten: **Hop in!**");
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), &server.base_url(), "ollama");

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .args(["generate", "--tone", "Playful", "Sign in"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out).trim_end(), "Hop in!");
}

#[test]
fn test_fill_writes_grid() {
    let server = ollama_server("Hop in!");
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), &server.base_url(), "ollama");
    let grid = dir.path().join("copy.tsv");
    std::fs::write(&grid, "playful\tformal\nSign in\t\n").unwrap();
    let filled = dir.path().join("filled.tsv");

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .arg("fill").arg(&grid)
        .args(["--from", "A2", "--to", "B3"])
        .arg("-o").arg(&filled)
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(
        std::fs::read_to_string(&filled).unwrap(),
        "playful\tformal\nSign in\tHop in!\nHop in!\tHop in!\n"
    );
    assert!(stderr(&out).contains("3 generated, 0 failed"));
}

#[test]
fn test_fill_seeds_headers_from_prompt_config() {
    let server = ollama_server("Hop in!");
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), &server.base_url(), "ollama");
    let prompts = dir.path().join("prompts.json");
    std::fs::write(&prompts, r#"{"columnHeaders":["playful","formal"]}"#).unwrap();
    let grid = dir.path().join("copy.tsv");
    std::fs::write(&grid, "\nSign in\n").unwrap();

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .arg("fill").arg(&grid)
        .args(["--from", "A2", "--to", "B2"])
        .arg("--config").arg(&prompts)
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert_eq!(stdout(&out), "playful\tformal\nSign in\tHop in!\n");
}

#[test]
fn test_fill_provider_failure_exit_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/api/chat");
        then.status(404).json_body(json!({ "error": "model 'llama3.2' not found" }));
    });
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), &server.base_url(), "ollama");
    let grid = dir.path().join("copy.tsv");
    std::fs::write(&grid, "playful\nSign in\n").unwrap();

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .arg("fill").arg(&grid)
        .args(["--from", "A2", "--to", "A3"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(11));
    assert!(stdout(&out).contains("⚠ Error: model 'llama3.2' not found"));
}

#[test]
fn test_missing_key_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), "http://127.0.0.1:9", "openai");

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .args(["generate", "--tone", "formal", "Sign in"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(10));
    assert!(stderr(&out).contains("TABTAB_OPENAI_KEY"));
}

#[test]
fn test_fill_rejects_bad_address() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), "http://127.0.0.1:9", "ollama");
    let grid = dir.path().join("copy.tsv");
    std::fs::write(&grid, "playful\nSign in\n").unwrap();

    for (from, to) in [("A0", "A3"), ("A2", "AA3"), ("A1", "A3")] {
        let out = tabtab()
            .arg("--settings").arg(&settings)
            .arg("fill").arg(&grid)
            .args(["--from", from, "--to", to])
            .output()
            .unwrap();
        assert_eq!(out.status.code(), Some(2), "{} -> {}", from, to);
    }
}

#[test]
fn test_doctor_json() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), "http://localhost:11434", "ollama");

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .args(["doctor", "--json"])
        .output()
        .unwrap();

    assert!(out.status.success());
    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["provider"], "ollama");
    assert_eq!(report["model"], "llama3.2");
    assert_eq!(report["status"], "ready");
    assert_eq!(report["key_present"], false);
}

#[test]
fn test_guidelines_summary_and_full() {
    let summary = tabtab().arg("guidelines").output().unwrap();
    assert!(summary.status.success());
    assert!(stdout(&summary).starts_with("## Voice"));
    assert!(!stdout(&summary).contains("## DON'T"));

    let full = tabtab().args(["guidelines", "--full"]).output().unwrap();
    assert!(stdout(&full).contains("## DON'T"));
    assert!(stdout(&full).contains("Would you say this to a friend?"));
}

#[test]
fn test_use_persists_provider_and_model() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_settings(dir.path(), "http://localhost:11434", "ollama");

    let out = tabtab()
        .arg("--settings").arg(&settings)
        .args(["use", "gemini", "--model", "gemini-1.5-flash"])
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&settings).unwrap()).unwrap();
    assert_eq!(saved["ai"]["provider"], "gemini");
    assert_eq!(saved["ai"]["gemini_model"], "gemini-1.5-flash");
    assert_eq!(saved["ai"]["ollama_model"], "llama3.2");
    assert_eq!(saved["generation.minDisplayMs"], 0);
}
