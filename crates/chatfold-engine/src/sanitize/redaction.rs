use chatfold_types::{ChatMessage, MessagePart, Role, ToolPart, ToolState};
use serde_json::{Map, Value};

/// Generic safety net: any tool output `content` string longer than this (bytes) is replaced.
pub const DEFAULT_LARGE_CONTENT_THRESHOLD: usize = 50_000;

/// Top-level output field that only the UI reads
const UI_ONLY_FIELD: &str = "ui_only";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedactionOptions {
    pub large_content_threshold: usize,
}

impl Default for RedactionOptions {
    fn default() -> Self {
        Self {
            large_content_threshold: DEFAULT_LARGE_CONTENT_THRESHOLD,
        }
    }
}

/// Produce a copy of `messages` safe to send upstream.
///
/// For every finished tool output on assistant messages:
/// 1. UI-only fields are stripped.
/// 2. Browser screenshots other than the most recent one are replaced by a short summary.
/// 3. Any `content` string over the size threshold is replaced by a truncation notice.
///
/// Applying it twice changes nothing the second time.
pub fn apply_tool_output_redaction(
    messages: &[ChatMessage],
    options: &RedactionOptions,
) -> Vec<ChatMessage> {
    let latest = latest_screenshot(messages);

    messages
        .iter()
        .enumerate()
        .map(|(msg_idx, message)| {
            if message.role != Role::Assistant {
                return message.clone();
            }

            let mut message = message.clone();
            for (part_idx, part) in message.parts.iter_mut().enumerate() {
                let MessagePart::DynamicTool(tool) = part else {
                    continue;
                };
                if tool.state != ToolState::OutputAvailable {
                    continue;
                }
                let Some(output) = tool.output.take() else {
                    continue;
                };

                let mut output = strip_tool_output_ui_only(output);
                if is_browser_screenshot(&output) && latest != Some((msg_idx, part_idx)) {
                    output = redact_screenshot(output);
                }
                tool.output = Some(redact_large_content(output, options.large_content_threshold));
            }
            message
        })
        .collect()
}

/// Position (message, part) of the last screenshot, found by a reverse scan
fn latest_screenshot(messages: &[ChatMessage]) -> Option<(usize, usize)> {
    messages
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, message)| message.role == Role::Assistant)
        .find_map(|(msg_idx, message)| {
            message
                .parts
                .iter()
                .enumerate()
                .rev()
                .find(|(_, part)| match part {
                    MessagePart::DynamicTool(tool) => has_screenshot_output(tool),
                    _ => false,
                })
                .map(|(part_idx, _)| (msg_idx, part_idx))
        })
}

fn has_screenshot_output(tool: &ToolPart) -> bool {
    tool.state == ToolState::OutputAvailable
        && tool
            .output
            .as_ref()
            .is_some_and(is_browser_screenshot)
}

/// Remove the top-level `ui_only` field, looking through the `{type: "json", value}` wrapper.
pub fn strip_tool_output_ui_only(output: Value) -> Value {
    map_record(output, |mut record| {
        record.remove(UI_ONLY_FIELD);
        record
    })
}

/// `{ success: true, content_type: "screenshot", content: "<base64>", url, title }`
fn is_browser_screenshot(output: &Value) -> bool {
    let Some(record) = unwrap_value(output).as_object() else {
        return false;
    };
    record.get("content_type").and_then(Value::as_str) == Some("screenshot")
        && record.get("content").is_some_and(Value::is_string)
        && record.get("success").and_then(Value::as_bool) == Some(true)
}

fn redact_screenshot(output: Value) -> Value {
    map_record(output, |mut record| {
        let size = content_len(&record).unwrap_or(0);
        let url = describe(record.get("url"));
        let title = describe(record.get("title"));

        record.insert("content_type".to_string(), Value::from("text"));
        record.insert(
            "content".to_string(),
            Value::from(format!(
                "[Screenshot redacted ({}KB) - page: {} - title: {}. Use screenshot action again if you need to see the current state.]",
                kilobytes(size),
                url,
                title
            )),
        );
        record
    })
}

fn redact_large_content(output: Value, threshold: usize) -> Value {
    map_record(output, |mut record| {
        if let Some(size) = content_len(&record)
            && size > threshold
        {
            record.insert(
                "content".to_string(),
                Value::from(format!(
                    "[Content redacted ({}KB) to save context. Use the tool again for fresh data.]",
                    kilobytes(size)
                )),
            );
        }
        record
    })
}

fn content_len(record: &Map<String, Value>) -> Option<usize> {
    record.get("content").and_then(Value::as_str).map(str::len)
}

fn kilobytes(size: usize) -> u64 {
    (size as f64 / 1000.0).round() as u64
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "unknown".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn is_json_wrapped(output: &Value) -> bool {
    output
        .as_object()
        .is_some_and(|o| o.get("type").and_then(Value::as_str) == Some("json") && o.contains_key("value"))
}

fn unwrap_value(output: &Value) -> &Value {
    if is_json_wrapped(output) {
        &output["value"]
    } else {
        output
    }
}

/// Apply `f` to the (possibly wrapped) output record, preserving the wrapper.
/// Non-object outputs pass through untouched.
fn map_record(output: Value, f: impl FnOnce(Map<String, Value>) -> Map<String, Value>) -> Value {
    let wrapped = is_json_wrapped(&output);
    match output {
        Value::Object(mut wrapper) if wrapped => {
            let value = match wrapper.remove("value") {
                Some(Value::Object(record)) => Value::Object(f(record)),
                Some(other) => other,
                None => Value::Null,
            };
            wrapper.insert("value".to_string(), value);
            Value::Object(wrapper)
        }
        Value::Object(record) => Value::Object(f(record)),
        other => other,
    }
}
