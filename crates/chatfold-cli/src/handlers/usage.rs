use super::HandlerContext;
use super::context::{format_component, format_cost};
use crate::feed::{fold_events, read_events};
use anyhow::Result;
use chatfold_engine::{get_total_cost, sum_usage_history};
use chatfold_types::UsageSnapshot;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageUsage {
    message_id: String,
    #[serde(flatten)]
    snapshot: UsageSnapshot,
    cost_usd: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceUsage {
    workspace_id: String,
    snapshots: Vec<MessageUsage>,
    total: Option<UsageSnapshot>,
    total_cost_usd: Option<f64>,
}

#[derive(Serialize)]
struct UsageOutput {
    workspaces: Vec<WorkspaceUsage>,
}

pub fn handle(ctx: &HandlerContext, file: &Path, workspace: Option<&str>) -> Result<()> {
    let pricing = ctx.config.pricing()?;
    let events = read_events(file)?;
    let folds = fold_events(&events, workspace, ctx.config.window_ms());

    let workspaces: Vec<WorkspaceUsage> = folds
        .iter()
        .map(|fold| {
            let snapshots: Vec<MessageUsage> = fold
                .aggregator
                .message_usage(&pricing)
                .into_iter()
                .map(|(message_id, snapshot)| MessageUsage {
                    message_id,
                    cost_usd: get_total_cost(&snapshot),
                    snapshot,
                })
                .collect();

            let history: Vec<UsageSnapshot> = snapshots.iter().map(|m| m.snapshot.clone()).collect();
            let total = sum_usage_history(&history);
            let total_cost_usd = total.as_ref().and_then(get_total_cost);

            WorkspaceUsage {
                workspace_id: fold.aggregator.workspace_id().to_string(),
                snapshots,
                total,
                total_cost_usd,
            }
        })
        .collect();

    if ctx.is_json() {
        return ctx.print_json(&UsageOutput { workspaces });
    }

    if workspaces.iter().all(|w| w.snapshots.is_empty()) {
        println!("{}", "No usage reported in this feed.".yellow());
        return Ok(());
    }

    for usage in &workspaces {
        print_workspace(usage);
    }
    Ok(())
}

fn print_workspace(usage: &WorkspaceUsage) {
    println!("{} {}", "Workspace".bold(), usage.workspace_id.cyan().bold());
    println!("{}", "=".repeat(80));

    for message in &usage.snapshots {
        let model = message.snapshot.model.as_deref().unwrap_or("unknown model");
        println!(
            "{} {}  {}",
            message.message_id.bright_blue(),
            model.dimmed(),
            format_cost(message.cost_usd, message.snapshot.has_unknown_costs)
        );
        print_components(&message.snapshot);
    }

    if let Some(total) = &usage.total {
        println!("{}", "-".repeat(80));
        let cost = format_cost(usage.total_cost_usd, total.has_unknown_costs);
        println!("{} {}", "Session total:".green().bold(), cost.green().bold());
        print_components(total);
        if total.has_unknown_costs {
            println!(
                "  {}",
                "Some models have no known pricing; the total is a lower bound.".yellow()
            );
        }
    }
    println!();
}

fn print_components(snapshot: &UsageSnapshot) {
    println!(
        "  input {}  cached {}  cache-create {}  output {}  reasoning {}",
        format_component(&snapshot.input),
        format_component(&snapshot.cached),
        format_component(&snapshot.cache_create),
        format_component(&snapshot.output),
        format_component(&snapshot.reasoning)
    );
}
