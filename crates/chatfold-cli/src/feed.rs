//! Loading recorded feeds and folding them into per-workspace aggregators.

use anyhow::{Context, Result};
use chatfold_engine::{StreamingMessageAggregator, UpdateHint, apply_chat_event};
use chatfold_types::{ChatEvent, ChatMessage, read_event_stream};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// `-` reads stdin
const STDIN_PATH: &str = "-";

fn open(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == STDIN_PATH {
        return Ok(Box::new(std::io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(Box::new(file))
}

/// One event per line; blank lines are skipped
pub fn read_events(path: &Path) -> Result<Vec<ChatEvent>> {
    let reader = BufReader::new(open(path)?);
    let events = read_event_stream(reader)
        .with_context(|| format!("Failed to read event feed {}", path.display()))?;
    info!(events = events.len(), "loaded event feed");
    Ok(events)
}

/// A JSON array of persisted messages
pub fn read_messages(path: &Path) -> Result<Vec<ChatMessage>> {
    let reader = BufReader::new(open(path)?);
    serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse message history {}", path.display()))
}

/// How many events asked for each kind of redraw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HintTally {
    pub immediate: usize,
    pub throttled: usize,
    pub ignored: usize,
}

impl HintTally {
    fn record(&mut self, hint: UpdateHint) {
        match hint {
            UpdateHint::Immediate => self.immediate += 1,
            UpdateHint::Throttled => self.throttled += 1,
            UpdateHint::Ignored => self.ignored += 1,
        }
    }
}

pub struct WorkspaceFold {
    pub aggregator: StreamingMessageAggregator,
    pub hints: HintTally,
}

/// Route every event into one aggregator per workspace id, in first-seen order.
///
/// Events without a workspace id (persisted messages, `caught-up`) belong to the
/// workspace addressed most recently. `only` drops every other workspace.
pub fn fold_events(events: &[ChatEvent], only: Option<&str>, window_ms: i64) -> Vec<WorkspaceFold> {
    let mut folds: Vec<WorkspaceFold> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut current: Option<String> = None;

    for event in events {
        if let Some(id) = event.workspace_id().filter(|id| !id.is_empty()) {
            current = Some(id.to_string());
        }
        let workspace = current.clone().unwrap_or_default();

        if let Some(only) = only
            && workspace != only
        {
            continue;
        }

        let slot = *index.entry(workspace.clone()).or_insert_with(|| {
            debug!(workspace = %workspace, "new workspace in feed");
            folds.push(WorkspaceFold {
                aggregator: StreamingMessageAggregator::with_window(workspace.clone(), window_ms),
                hints: HintTally::default(),
            });
            folds.len() - 1
        });

        let fold = &mut folds[slot];
        let hint = apply_chat_event(&mut fold.aggregator, event);
        fold.hints.record(hint);
    }

    folds
}
