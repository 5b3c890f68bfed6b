use std::io::BufRead;

use super::event::ChatEvent;
use crate::error::{Error, Result};

/// Decode one line of a JSONL event feed. `line` is 1-based and only used for errors.
pub fn parse_event_line(raw: &str, line: usize) -> Result<ChatEvent> {
    serde_json::from_str(raw).map_err(|source| Error::Json { line, source })
}

/// Decode a whole JSONL feed. Blank lines are skipped.
pub fn parse_event_stream(input: &str) -> Result<Vec<ChatEvent>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, raw)| !raw.trim().is_empty())
        .map(|(idx, raw)| parse_event_line(raw, idx + 1))
        .collect()
}

/// Same as [`parse_event_stream`] but reads incrementally from any buffered reader.
pub fn read_event_stream<R: BufRead>(reader: R) -> Result<Vec<ChatEvent>> {
    let mut events = Vec::new();
    for (idx, raw) in reader.lines().enumerate() {
        let raw = raw?;
        if raw.trim().is_empty() {
            continue;
        }
        events.push(parse_event_line(&raw, idx + 1)?);
    }
    Ok(events)
}
