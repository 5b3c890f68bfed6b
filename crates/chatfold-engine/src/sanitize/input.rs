use chatfold_types::{ChatMessage, MessagePart};
use serde_json::{Map, Value};
use tracing::debug;

/// Replace every non-object tool input (string, array, null, ...) with `{}`.
///
/// Models occasionally emit unparsable arguments; the turn is kept, only the
/// bad input is dropped so the prompt payload stays well-formed.
pub fn sanitize_tool_inputs(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages.iter().map(sanitize_message).collect()
}

fn sanitize_message(message: &ChatMessage) -> ChatMessage {
    let mut message = message.clone();
    for part in &mut message.parts {
        if let MessagePart::DynamicTool(tool) = part
            && !tool.input.is_object()
        {
            debug!(
                message_id = %message.id,
                tool_call_id = %tool.tool_call_id,
                "replacing non-object tool input with empty object"
            );
            tool.input = Value::Object(Map::new());
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatfold_types::{MessageMetadata, Role, TextPart, ToolPart, ToolState};
    use serde_json::json;

    fn tool_message(input: Value) -> ChatMessage {
        let mut tool = ToolPart::new("toolu_01", "bash");
        tool.state = ToolState::OutputAvailable;
        tool.input = input;
        tool.output = Some(json!({"error": "Invalid input"}));

        ChatMessage {
            id: "assistant-1".to_string(),
            role: Role::Assistant,
            parts: vec![
                MessagePart::Text(TextPart::done("Let me run this command")),
                MessagePart::DynamicTool(tool),
                MessagePart::Text(TextPart::done("Done")),
            ],
            metadata: MessageMetadata {
                history_sequence: Some(1),
                partial: Some(true),
                ..Default::default()
            },
        }
    }

    fn input_of(message: &ChatMessage) -> &Value {
        &message.tool_parts().next().unwrap().input
    }

    #[test]
    fn test_malformed_inputs_become_empty_objects() {
        let cases = [
            json!(r#"{"script" timeout_secs="10": "ls"}"#),
            json!("not an object"),
            Value::Null,
            json!(["not", "valid"]),
            json!(42),
        ];
        for case in cases {
            let sanitized = sanitize_tool_inputs(&[tool_message(case.clone())]);
            assert_eq!(input_of(&sanitized[0]), &json!({}), "input {} not repaired", case);
        }
    }

    #[test]
    fn test_object_input_is_unchanged() {
        let input = json!({"script": "ls", "timeout_secs": 10, "display_name": "Test"});
        let original = tool_message(input);
        let sanitized = sanitize_tool_inputs(std::slice::from_ref(&original));
        assert_eq!(sanitized[0], original);
    }

    #[test]
    fn test_other_parts_and_input_list_untouched() {
        let original = vec![
            ChatMessage::text("user-1", Role::User, "Hello"),
            tool_message(json!("bad")),
        ];
        let sanitized = sanitize_tool_inputs(&original);

        assert_eq!(sanitized[0], original[0]);
        assert_eq!(sanitized[1].parts[0], original[1].parts[0]);
        assert_eq!(sanitized[1].parts[2], original[1].parts[2]);
        // Input list is not mutated
        assert_eq!(input_of(&original[1]), &json!("bad"));
    }
}
