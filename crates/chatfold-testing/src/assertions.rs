//! JSON-level assertions over `--format json` CLI output.
//!
//! `replay`, `usage` and `stats` print `{"workspaces": [...]}`; the assertions
//! below take one entry of that array (see [`workspace`]).

use anyhow::{Context, Result};
use serde_json::Value;

/// Entry of the `workspaces` array with the given id
pub fn workspace<'a>(json: &'a Value, workspace_id: &str) -> Result<&'a Value> {
    json["workspaces"]
        .as_array()
        .context("Expected 'workspaces' array in JSON")?
        .iter()
        .find(|entry| entry["workspaceId"] == workspace_id)
        .with_context(|| format!("No workspace '{}' in output", workspace_id))
}

/// Assert the `messages` array has `expected` entries.
pub fn assert_message_count(workspace: &Value, expected: usize) -> Result<()> {
    let messages = workspace["messages"]
        .as_array()
        .context("Expected 'messages' array in JSON")?;

    if messages.len() != expected {
        anyhow::bail!("Expected {} messages, got {}", expected, messages.len());
    }
    Ok(())
}

/// Assert message statuses in display order.
pub fn assert_statuses(workspace: &Value, expected: &[&str]) -> Result<()> {
    let messages = workspace["messages"]
        .as_array()
        .context("Expected 'messages' array in JSON")?;

    let statuses: Vec<&str> = messages
        .iter()
        .map(|m| m["status"].as_str().unwrap_or("<missing>"))
        .collect();

    if statuses != expected {
        anyhow::bail!("Expected statuses {:?}, got {:?}", expected, statuses);
    }
    Ok(())
}

/// Assert the session total is flagged as a lower bound (or not).
pub fn assert_lower_bound(workspace: &Value, expected: bool) -> Result<()> {
    let flagged = workspace["total"]["hasUnknownCosts"].as_bool().unwrap_or(false);
    if flagged != expected {
        anyhow::bail!(
            "Expected hasUnknownCosts = {}, got {} in {}",
            expected,
            flagged,
            workspace["total"]
        );
    }
    Ok(())
}
