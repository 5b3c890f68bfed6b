use super::HandlerContext;
use crate::feed::read_messages;
use anyhow::Result;
use chatfold_engine::prepare_for_prompt;
use std::path::Path;
use tracing::info;

/// Always prints JSON: the output is meant to be fed back into a prompt builder
pub fn handle(ctx: &HandlerContext, file: &Path, threshold: Option<usize>) -> Result<()> {
    let messages = read_messages(file)?;

    let mut options = ctx.config.redaction_options();
    if let Some(threshold) = threshold {
        options.large_content_threshold = threshold;
    }

    let sanitized = prepare_for_prompt(&messages, &options);
    let changed = messages
        .iter()
        .zip(&sanitized)
        .filter(|(before, after)| before != after)
        .count();
    info!(messages = messages.len(), changed, "sanitized message history");

    ctx.print_json(&sanitized)
}
