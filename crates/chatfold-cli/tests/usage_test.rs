use anyhow::Result;
use chatfold_testing::assertions::{assert_lower_bound, workspace};
use chatfold_testing::fixtures::{SONNET, two_turn_session};
use chatfold_testing::script::usage;
use chatfold_testing::{EventScript, TestWorld};

fn mixed_pricing_session() -> EventScript {
    EventScript::new("ws-1")
        .start("a1", 1, SONNET)
        .text("a1", "priced", 1)
        .end("a1", Some(usage(1_000, 100)))
        .start("a2", 2, "acme:mystery-1")
        .text("a2", "unpriced", 1)
        .end("a2", Some(usage(10, 10)))
}

#[test]
fn test_usage_json_totals() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &two_turn_session("ws-1"))?;

    let result = world.run(&["usage", feed.to_str().unwrap(), "--format", "json"])?;
    assert!(result.success(), "stderr: {}", result.stderr());

    let json = result.json()?;
    let ws = workspace(&json, "ws-1")?;
    let snapshots = ws["snapshots"].as_array().expect("snapshots array");
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0]["messageId"], "a1");
    assert_eq!(snapshots[0]["cacheCreate"]["tokens"], 500);
    assert_eq!(snapshots[1]["cached"]["tokens"], 4_000);

    assert_eq!(ws["total"]["input"]["tokens"], 7_000);
    assert!(ws["totalCostUsd"].as_f64().unwrap() > 0.0);
    assert_lower_bound(ws, false)?;
    Ok(())
}

#[test]
fn test_usage_flags_unknown_model_as_lower_bound() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &mixed_pricing_session())?;

    let result = world.run(&["usage", feed.to_str().unwrap(), "--format", "json"])?;
    let json = result.json()?;
    let ws = workspace(&json, "ws-1")?;
    assert_lower_bound(ws, true)?;
    assert!(ws["snapshots"][1].get("costUsd").is_none_or(|cost| cost.is_null()));
    Ok(())
}

#[test]
fn test_usage_plain_marks_lower_bound() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &mixed_pricing_session())?;

    let result = world.run(&["usage", feed.to_str().unwrap()])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    assert!(result.stdout().contains(">= $"));
    assert!(result.stdout().contains("lower bound"));
    Ok(())
}

#[test]
fn test_usage_without_reports() -> Result<()> {
    let world = TestWorld::new();
    let feed = world.write_feed("feed.jsonl", &EventScript::new("ws-1").user("u1", 1, "hi"))?;

    let result = world.run(&["usage", feed.to_str().unwrap()])?;
    assert!(result.success());
    assert!(result.stdout().contains("No usage reported"));
    Ok(())
}

#[test]
fn test_usage_honors_pricing_override_file() -> Result<()> {
    let world = TestWorld::new();
    let table = world.write_file(
        "prices.json",
        r#"{"acme/mystery-1": {"max_input_tokens": 8000, "input_cost_per_token": 0.001, "output_cost_per_token": 0.002}}"#,
    )?;
    world.write_config(&format!(
        "[pricing]\noverrides = {:?}\n",
        table.to_str().unwrap()
    ))?;
    let feed = world.write_feed("feed.jsonl", &mixed_pricing_session())?;

    let result = world.run(&["usage", feed.to_str().unwrap(), "--format", "json"])?;
    assert!(result.success(), "stderr: {}", result.stderr());
    let json = result.json()?;
    let ws = workspace(&json, "ws-1")?;
    assert_lower_bound(ws, false)?;
    let cost = ws["snapshots"][1]["costUsd"].as_f64().unwrap();
    assert!((cost - 0.03).abs() < 1e-9);
    Ok(())
}
