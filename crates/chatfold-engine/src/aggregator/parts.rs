use chatfold_types::{MessagePart, PartKind, PartState, ReasoningPart, TextPart, ToolPart, ToolState};
use serde_json::Value;
use tracing::debug;

// NOTE: Run-length invariant
// Consecutive deltas of one kind extend the last part only while that part is
// still streaming. A part of another kind, or a closed reasoning span, starts a
// new part, so `text, reasoning, text` stays three parts in arrival order.

/// Append a text or reasoning fragment to `parts`.
pub(crate) fn append_delta(parts: &mut Vec<MessagePart>, kind: PartKind, delta: &str, timestamp: i64) {
    if let Some(last) = parts.last_mut() {
        match (kind, last) {
            (PartKind::Text, MessagePart::Text(part)) if part.state == PartState::Streaming => {
                part.text.push_str(delta);
                return;
            }
            (PartKind::Reasoning, MessagePart::Reasoning(part))
                if part.state == PartState::Streaming =>
            {
                part.text.push_str(delta);
                return;
            }
            _ => {}
        }
    }

    let part = match kind {
        PartKind::Reasoning => MessagePart::Reasoning(ReasoningPart {
            text: delta.to_string(),
            timestamp: Some(timestamp),
            state: PartState::Streaming,
        }),
        PartKind::Text | PartKind::Tool => MessagePart::Text(TextPart {
            text: delta.to_string(),
            timestamp: Some(timestamp),
            state: PartState::Streaming,
        }),
    };
    parts.push(part);
}

/// Close the most recent reasoning span, if it is still open
pub(crate) fn close_reasoning(parts: &mut [MessagePart]) {
    let latest = parts.iter_mut().rev().find_map(|part| match part {
        MessagePart::Reasoning(reasoning) => Some(reasoning),
        _ => None,
    });
    if let Some(reasoning) = latest {
        reasoning.state = PartState::Done;
    }
}

pub(crate) fn find_tool<'a>(parts: &'a mut [MessagePart], tool_call_id: &str) -> Option<&'a mut ToolPart> {
    parts.iter_mut().find_map(|part| match part {
        MessagePart::DynamicTool(tool) if tool.tool_call_id == tool_call_id => Some(tool),
        _ => None,
    })
}

/// Insert a tool part, replacing an earlier part with the same call id
pub(crate) fn upsert_tool(parts: &mut Vec<MessagePart>, tool: ToolPart) {
    match find_tool(parts, &tool.tool_call_id) {
        Some(existing) => *existing = tool,
        None => parts.push(MessagePart::DynamicTool(tool)),
    }
}

/// Append an input fragment. Strings go in verbatim, other JSON as compact text.
pub(crate) fn push_input_fragment(buffer: &mut String, fragment: &Value) {
    match fragment {
        Value::String(s) => buffer.push_str(s),
        Value::Null => {}
        other => buffer.push_str(&other.to_string()),
    }
}

/// Final input from accumulated fragments.
///
/// An unparsable buffer is kept as a JSON string; input sanitization repairs it later.
pub(crate) fn parse_input_buffer(tool_call_id: &str, buffer: &str) -> Value {
    match serde_json::from_str(buffer) {
        Ok(value) => value,
        Err(err) => {
            debug!(tool_call_id, error = %err, "tool input fragments are not valid JSON");
            Value::String(buffer.to_string())
        }
    }
}

/// Close everything still open once a stream ends, normally or not.
///
/// Partial content stays. A tool with no end event by now will never get one,
/// so unfinished tools become `interrupted`.
pub(crate) fn finalize(parts: &mut [MessagePart]) {
    for part in parts.iter_mut() {
        match part {
            MessagePart::Text(text) => text.state = PartState::Done,
            MessagePart::Reasoning(reasoning) => reasoning.state = PartState::Done,
            MessagePart::DynamicTool(tool) if !tool.state.is_finished() => {
                tool.state = ToolState::Interrupted;
            }
            MessagePart::DynamicTool(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(parts: &[MessagePart]) -> Vec<(PartKind, String)> {
        parts
            .iter()
            .map(|part| match part {
                MessagePart::Text(t) => (PartKind::Text, t.text.clone()),
                MessagePart::Reasoning(r) => (PartKind::Reasoning, r.text.clone()),
                MessagePart::DynamicTool(t) => (PartKind::Tool, t.tool_call_id.clone()),
            })
            .collect()
    }

    #[test]
    fn test_consecutive_reasoning_merges_keeping_first_timestamp() {
        let mut parts = Vec::new();
        append_delta(&mut parts, PartKind::Reasoning, "Thinking", 10);
        append_delta(&mut parts, PartKind::Reasoning, " about", 20);
        append_delta(&mut parts, PartKind::Reasoning, " this...", 30);

        assert_eq!(parts.len(), 1);
        match &parts[0] {
            MessagePart::Reasoning(r) => {
                assert_eq!(r.text, "Thinking about this...");
                assert_eq!(r.timestamp, Some(10));
            }
            other => panic!("expected reasoning, got {:?}", other),
        }
    }

    #[test]
    fn test_interleaved_kinds_open_new_parts() {
        let mut parts = Vec::new();
        append_delta(&mut parts, PartKind::Reasoning, "a", 1);
        append_delta(&mut parts, PartKind::Text, "b", 2);
        append_delta(&mut parts, PartKind::Reasoning, "c", 3);

        assert_eq!(
            texts(&parts),
            vec![
                (PartKind::Reasoning, "a".to_string()),
                (PartKind::Text, "b".to_string()),
                (PartKind::Reasoning, "c".to_string()),
            ]
        );
    }

    #[test]
    fn test_closed_reasoning_starts_new_span() {
        let mut parts = Vec::new();
        append_delta(&mut parts, PartKind::Reasoning, "first", 1);
        close_reasoning(&mut parts);
        append_delta(&mut parts, PartKind::Reasoning, "second", 2);
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn test_tool_part_breaks_text_run() {
        let mut parts = Vec::new();
        append_delta(&mut parts, PartKind::Text, "before", 1);
        upsert_tool(&mut parts, ToolPart::new("t1", "bash"));
        append_delta(&mut parts, PartKind::Text, "after", 2);
        assert_eq!(parts.len(), 3);
    }

    #[test]
    fn test_input_fragments() {
        let mut buffer = String::new();
        push_input_fragment(&mut buffer, &json!("{\"cmd\": "));
        push_input_fragment(&mut buffer, &json!("\"ls\"}"));
        assert_eq!(parse_input_buffer("t1", &buffer), json!({"cmd": "ls"}));

        assert_eq!(parse_input_buffer("t2", "{\"cmd\": "), json!("{\"cmd\": "));
    }

    #[test]
    fn test_finalize_keeps_finished_tools() {
        let mut done = ToolPart::new("done", "bash");
        done.state = ToolState::OutputAvailable;
        let mut parts = vec![MessagePart::DynamicTool(ToolPart::new("open", "bash"))];
        parts.push(MessagePart::DynamicTool(done));
        append_delta(&mut parts, PartKind::Text, "partial", 1);

        finalize(&mut parts);

        let states: Vec<_> = parts
            .iter()
            .map(|part| match part {
                MessagePart::DynamicTool(t) => format!("{:?}", t.state),
                MessagePart::Text(t) => format!("{:?}", t.state),
                MessagePart::Reasoning(r) => format!("{:?}", r.state),
            })
            .collect();
        assert_eq!(states, vec!["Interrupted", "OutputAvailable", "Done"]);
    }

    #[test]
    fn test_finalize_interrupts_executing_tool() {
        let mut running = ToolPart::new("t1", "bash");
        running.input = json!({"script": "sleep 100"});
        running.state = ToolState::Executing;
        let mut parts = Vec::new();
        append_delta(&mut parts, PartKind::Reasoning, "think", 1);
        upsert_tool(&mut parts, running);

        finalize(&mut parts);

        match &parts[0] {
            MessagePart::Reasoning(r) => assert_eq!(r.state, PartState::Done),
            other => panic!("expected reasoning, got {:?}", other),
        }
        match &parts[1] {
            MessagePart::DynamicTool(t) => {
                assert_eq!(t.state, ToolState::Interrupted);
                assert_eq!(t.input, json!({"script": "sleep 100"}));
            }
            other => panic!("expected tool, got {:?}", other),
        }
    }
}
