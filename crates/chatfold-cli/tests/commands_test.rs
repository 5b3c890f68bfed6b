use anyhow::Result;
use assert_cmd::Command;
use chatfold_testing::TestWorld;
use chatfold_testing::assertions::workspace;
use chatfold_testing::fixtures::{GPT, SONNET, history_needing_sanitization, two_turn_session};
use predicates::prelude::*;
use serde_json::json;

#[allow(deprecated)]
fn chatfold(world: &TestWorld) -> Command {
    let mut cmd = Command::cargo_bin("chatfold").unwrap();
    world.configure_command(&mut cmd);
    cmd
}

// ==========================================
// price
// ==========================================

#[test]
fn test_price_known_model() -> Result<()> {
    let world = TestWorld::new();
    let result = world.run(&["price", GPT, "--format", "json"])?;
    assert!(result.success());

    let json = result.json()?;
    assert_eq!(json["normalized"], GPT);
    assert_eq!(json["pricing"]["input_cost_per_token"], json!(1.75e-6));
    assert_eq!(json["pricing"]["cache_read_input_token_cost"], json!(1.75e-7));
    Ok(())
}

#[test]
fn test_price_normalizes_gateway_ids() -> Result<()> {
    let world = TestWorld::new();
    let result = world.run(&["price", "gateway:openai/gpt-5.2", "--format", "json"])?;
    let json = result.json()?;
    assert_eq!(json["normalized"], GPT);
    assert!(json["pricing"].is_object());
    Ok(())
}

#[test]
fn test_price_unknown_model_is_not_an_error() {
    let world = TestWorld::new();
    chatfold(&world)
        .args(["price", "acme:mystery-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pricing not found"))
        .stdout(predicate::str::contains("acme/mystery-1"));
}

// ==========================================
// sanitize
// ==========================================

#[test]
fn test_sanitize_repairs_and_redacts() -> Result<()> {
    let world = TestWorld::new();
    let history = serde_json::to_string(&history_needing_sanitization())?;
    let file = world.write_file("history.json", &history)?;

    let result = world.run(&["sanitize", file.to_str().unwrap()])?;
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json()?;
    let broken = &json[1]["parts"][0];
    assert_eq!(broken["input"], json!({}));
    assert_eq!(broken["output"], json!({"success": true}));

    let older = json[1]["parts"][1]["output"]["value"]["content"].as_str().unwrap();
    assert!(older.starts_with("[Screenshot redacted (20KB)"));

    let latest = json[2]["parts"][0]["output"]["value"]["content"].as_str().unwrap();
    assert_eq!(latest.len(), 4_000);
    Ok(())
}

#[test]
fn test_sanitize_threshold_flag_truncates_latest_output() -> Result<()> {
    let world = TestWorld::new();
    let history = serde_json::to_string(&history_needing_sanitization())?;
    let file = world.write_file("history.json", &history)?;

    let result = world.run(&["sanitize", file.to_str().unwrap(), "--threshold", "1000"])?;
    let json = result.json()?;
    let latest = json[2]["parts"][0]["output"]["value"]["content"].as_str().unwrap();
    assert!(latest.len() < 4_000);
    Ok(())
}

#[test]
fn test_sanitize_rejects_non_array() {
    let world = TestWorld::new();
    let file = world.write_file("history.json", "{\"id\": \"u1\"}").unwrap();
    chatfold(&world)
        .args(["sanitize", file.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse message history"));
}

#[test]
fn test_sanitize_reads_stdin() -> Result<()> {
    let world = TestWorld::new();
    let history = serde_json::to_string(&history_needing_sanitization())?;

    let output = chatfold(&world)
        .args(["sanitize", "-"])
        .write_stdin(history)
        .output()?;
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json.as_array().map(Vec::len), Some(3));
    Ok(())
}

// ==========================================
// stats
// ==========================================

#[test]
fn test_stats_rollups_and_recency() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &two_turn_session("ws-1"))?;

    let result = world.run(&[
        "stats",
        feed.to_str().unwrap(),
        "--created-at",
        "1970-01-01T00:00:00Z",
        "--format",
        "json",
    ])?;
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json()?;
    let ws = workspace(&json, "ws-1")?;
    let models = ws["models"].as_array().expect("models array");
    assert_eq!(models.len(), 2);
    assert_eq!(models[0]["model"], SONNET);
    assert_eq!(models[0]["responses"], 1);
    assert_eq!(models[1]["model"], GPT);
    assert_eq!(models[1]["outputTokens"], 200);
    assert_eq!(models[1]["reasoningTokens"], 100);

    // Latest user message ("u2") wins over the epoch creation time
    assert!(ws["recencyTimestamp"].as_i64().unwrap() > 0);
    Ok(())
}

#[test]
fn test_stats_plain() {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &two_turn_session("ws-1")).unwrap();
    chatfold(&world)
        .args(["stats", feed.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last activity:"))
        .stdout(predicate::str::contains("responses"));
}

// ==========================================
// config
// ==========================================

#[test]
fn test_config_init_then_show() {
    let world = TestWorld::new();
    chatfold(&world).args(["config", "init"]).assert().success();
    assert!(world.config_path().exists());

    chatfold(&world)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("window_secs = 60"))
        .stdout(predicate::str::contains("large_content_threshold = 50000"));
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let world = TestWorld::new();
    world.write_config("[rate]\nwindow_secs = 5\n").unwrap();

    chatfold(&world)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    chatfold(&world).args(["config", "init", "--force"]).assert().success();
    let content = std::fs::read_to_string(world.config_path()).unwrap();
    assert!(content.contains("window_secs = 60"));
}

#[test]
fn test_invalid_config_is_reported() {
    let world = TestWorld::new();
    world.write_config("[rate]\nwindow_secs = \"soon\"\n").unwrap();

    chatfold(&world)
        .args(["price", SONNET])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid config"));
}

#[test]
fn test_explicit_config_flag_wins() {
    let world = TestWorld::new();
    let custom = world.root().join("custom.toml");
    chatfold(&world)
        .args(["config", "init", "--config", custom.to_str().unwrap()])
        .assert()
        .success();
    assert!(custom.exists());
    assert!(!world.config_path().exists());
}

#[test]
fn test_price_uses_configured_override_table() -> Result<()> {
    let world = TestWorld::new();
    let table = world.write_file(
        "prices.json",
        r#"{"acme/widget-1": {"max_input_tokens": 8000, "input_cost_per_token": 0.001, "output_cost_per_token": 0.002}}"#,
    )?;
    world.write_config(&format!("[pricing]\noverrides = {:?}\n", table.to_str().unwrap()))?;

    let result = world.run(&["price", "acme:widget-1", "--format", "json"])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    insta::assert_json_snapshot!(result.json()?, @r###"
    {
      "candidates": [
        "widget-1",
        "acme/widget-1",
        "acme/widget-1-cloud"
      ],
      "model": "acme:widget-1",
      "normalized": "acme:widget-1",
      "pricing": {
        "input_cost_per_token": 0.001,
        "max_input_tokens": 8000,
        "output_cost_per_token": 0.002
      }
    }
    "###);
    Ok(())
}
