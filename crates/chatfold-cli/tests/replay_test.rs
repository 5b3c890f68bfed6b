use anyhow::Result;
use chatfold_testing::assertions::{assert_message_count, assert_statuses, workspace};
use chatfold_testing::fixtures::{SONNET, two_turn_session};
use chatfold_testing::{EventScript, TestWorld};
use serde_json::json;

#[test]
fn test_replay_json_folds_session() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &two_turn_session("ws-1"))?;

    let result = world.run(&["replay", feed.to_str().unwrap(), "--format", "json"])?;
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json()?;
    let ws = workspace(&json, "ws-1")?;
    assert_message_count(ws, 4)?;
    assert_statuses(ws, &["complete", "complete", "complete", "complete"])?;
    assert_eq!(ws["runtimeStatus"], json!(null));
    assert_eq!(ws["hints"], json!({"immediate": 11, "throttled": 10, "ignored": 1}));
    assert_eq!(ws["messages"][1]["parts"][1]["toolName"], "bash");
    assert_eq!(ws["messages"][1]["parts"][1]["input"], json!({"script": "ls"}));
    Ok(())
}

#[test]
fn test_replay_plain_shows_statuses() -> Result<()> {
    let world = TestWorld::new();
    let script = EventScript::new("ws-1")
        .user("u1", 1, "Write a poem")
        .start("a1", 2, SONNET)
        .text("a1", "Roses are", 2)
        .abort("a1");
    let feed = world.write_feed("feed.jsonl", &script)?;

    let result = world.run(&["replay", feed.to_str().unwrap()])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains("ws-1"));
    assert!(result.stdout().contains("aborted"));
    assert!(result.stdout().contains("Roses are"));
    assert!(result.stdout().contains("Hints:"));
    Ok(())
}

#[test]
fn test_replay_keeps_streaming_message_open() -> Result<()> {
    let world = TestWorld::new();
    let script = EventScript::new("ws-1")
        .start("a1", 1, SONNET)
        .text("a1", "partial", 1);
    let feed = world.write_feed("feed.jsonl", &script)?;

    let result = world.run(&["replay", feed.to_str().unwrap(), "--format", "json"])?;
    let json = result.json()?;
    let ws = workspace(&json, "ws-1")?;
    assert_statuses(ws, &["streaming"])?;
    assert_eq!(ws["activeMessageId"], "a1");
    Ok(())
}

#[test]
fn test_replay_filters_workspace() -> Result<()> {
    let world = TestWorld::new();
    let mut content = two_turn_session("ws-a").to_jsonl();
    content.push_str(&EventScript::new("ws-b").start("b1", 1, SONNET).to_jsonl());
    let feed = world.write_file("feed.jsonl", &content)?;

    let result = world.run(&[
        "replay",
        feed.to_str().unwrap(),
        "--workspace",
        "ws-b",
        "--format",
        "json",
    ])?;
    let json = result.json()?;
    assert_eq!(json["workspaces"].as_array().map(Vec::len), Some(1));
    assert_statuses(workspace(&json, "ws-b")?, &["streaming"])?;
    Ok(())
}

#[test]
fn test_replay_reports_malformed_line() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_file("feed.jsonl", "{\"type\":\"caught-up\"}\nnot json\n")?;

    let result = world.run(&["replay", feed.to_str().unwrap()])?;
    assert!(!result.success());
    assert!(result.stderr().contains("Error:"));
    assert!(result.stderr().contains("line 2"));
    Ok(())
}

#[test]
fn test_replay_missing_file_fails() -> Result<()> {
    let world = TestWorld::new();
    let result = world.run(&["replay", "does-not-exist.jsonl"])?;
    assert!(!result.success());
    assert!(result.stderr().contains("Failed to open"));
    Ok(())
}
