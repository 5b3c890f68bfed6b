use super::HandlerContext;
use super::context::wire_name;
use crate::feed::{HintTally, fold_events, read_events};
use anyhow::Result;
use chatfold_engine::{DisplayedMessage, MessageStatus};
use chatfold_types::{MessagePart, RuntimeStatus};
use owo_colors::OwoColorize;
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkspaceReplay {
    workspace_id: String,
    messages: Vec<DisplayedMessage>,
    runtime_status: Option<RuntimeStatus>,
    active_message_id: Option<String>,
    hints: HintTally,
}

#[derive(Serialize)]
struct ReplayOutput {
    workspaces: Vec<WorkspaceReplay>,
}

pub fn handle(ctx: &HandlerContext, file: &Path, workspace: Option<&str>) -> Result<()> {
    let events = read_events(file)?;
    let folds = fold_events(&events, workspace, ctx.config.window_ms());

    let workspaces: Vec<WorkspaceReplay> = folds
        .into_iter()
        .map(|fold| WorkspaceReplay {
            workspace_id: fold.aggregator.workspace_id().to_string(),
            messages: fold.aggregator.get_displayed_messages(),
            runtime_status: fold.aggregator.get_runtime_status().cloned(),
            active_message_id: fold.aggregator.active_message_id().map(str::to_string),
            hints: fold.hints,
        })
        .collect();

    if ctx.is_json() {
        return ctx.print_json(&ReplayOutput { workspaces });
    }

    if workspaces.is_empty() {
        println!("{}", "No events to replay.".yellow());
        return Ok(());
    }

    for replay in &workspaces {
        print_workspace(replay);
    }
    Ok(())
}

fn print_workspace(replay: &WorkspaceReplay) {
    let name = if replay.workspace_id.is_empty() {
        "(unscoped)"
    } else {
        replay.workspace_id.as_str()
    };
    println!("{} {}", "Workspace".bold(), name.cyan().bold());
    println!("{}", "=".repeat(80));

    if let Some(status) = &replay.runtime_status {
        println!(
            "{} {} runtime is {}",
            "Runtime:".yellow(),
            status.runtime_type,
            wire_name(&status.phase)
        );
    }

    for message in &replay.messages {
        print_message(message);
    }

    println!("{}", "-".repeat(80));
    println!(
        "{} {} immediate, {} throttled, {} ignored",
        "Hints:".dimmed(),
        replay.hints.immediate,
        replay.hints.throttled,
        replay.hints.ignored
    );
    println!();
}

fn print_message(message: &DisplayedMessage) {
    let sequence = message
        .history_sequence
        .map(|seq| format!("#{}", seq))
        .unwrap_or_else(|| "#?".to_string());
    let role = format!("{:?}", message.role).to_lowercase();
    let model = message.model.as_deref().unwrap_or("");

    println!(
        "{:>4} {:<9} {} {}",
        sequence.dimmed(),
        role.bright_blue(),
        status_label(message.status),
        model.dimmed()
    );

    for part in &message.parts {
        match part {
            MessagePart::Text(text) => println!("       {}", text.text),
            MessagePart::Reasoning(reasoning) => {
                println!("       {} {}", "thinking:".dimmed(), reasoning.text.dimmed())
            }
            MessagePart::DynamicTool(tool) => {
                println!(
                    "       {} {} [{}]",
                    "tool:".yellow(),
                    tool.tool_name,
                    wire_name(&tool.state)
                );
            }
        }
    }

    if let Some(error) = &message.error {
        println!("       {} {}", "error:".red(), error.red());
    }
}

fn status_label(status: MessageStatus) -> String {
    match status {
        MessageStatus::Streaming => "streaming".yellow().to_string(),
        MessageStatus::Complete => "complete".green().to_string(),
        MessageStatus::Aborted => "aborted".yellow().bold().to_string(),
        MessageStatus::Errored => "errored".red().bold().to_string(),
    }
}
