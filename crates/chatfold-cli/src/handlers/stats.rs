use super::HandlerContext;
use crate::feed::{fold_events, read_events};
use anyhow::Result;
use chatfold_engine::{ModelRollup, compute_recency_timestamp, model_rollups};
use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceStats {
    workspace_id: String,
    recency_timestamp: Option<i64>,
    models: Vec<ModelRollup>,
}

#[derive(Serialize)]
struct StatsOutput {
    workspaces: Vec<WorkspaceStats>,
}

pub fn handle(
    ctx: &HandlerContext,
    file: &Path,
    workspace: Option<&str>,
    created_at: Option<&str>,
) -> Result<()> {
    let pricing = ctx.config.pricing()?;
    let events = read_events(file)?;
    let folds = fold_events(&events, workspace, ctx.config.window_ms());

    let workspaces: Vec<WorkspaceStats> = folds
        .iter()
        .map(|fold| WorkspaceStats {
            workspace_id: fold.aggregator.workspace_id().to_string(),
            recency_timestamp: compute_recency_timestamp(
                &fold.aggregator.get_all_messages(),
                created_at,
            ),
            models: model_rollups(&fold.aggregator.get_displayed_messages(), &pricing),
        })
        .collect();

    if ctx.is_json() {
        return ctx.print_json(&StatsOutput { workspaces });
    }

    for stats in &workspaces {
        println!("{} {}", "Workspace".bold(), stats.workspace_id.cyan().bold());
        println!("{}", "=".repeat(80));
        println!("{} {}", "Last activity:".yellow(), format_recency(stats.recency_timestamp));

        if stats.models.is_empty() {
            println!("{}", "No completed responses.".dimmed());
        }
        for rollup in &stats.models {
            let tps = rollup
                .average_tps()
                .map(|tps| format!("{:.1} tok/s", tps))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "  {:<40} {:>4} responses  {:>8} out  {:>8} reasoning  {}",
                rollup.model.bright_blue(),
                rollup.responses,
                rollup.output_tokens,
                rollup.reasoning_tokens,
                tps
            );
        }
        println!();
    }
    Ok(())
}

fn format_recency(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "never".to_string())
}
