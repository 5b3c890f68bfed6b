//! Ready-made feeds used across engine and CLI tests.

use chatfold_types::{
    ChatMessage, LanguageModelUsage, MessageMetadata, MessagePart, ProviderMetadata, Role,
    RuntimePhase, ToolPart, ToolState,
};
use serde_json::{Value, json};

use crate::script::{EventScript, usage};

pub const SONNET: &str = "anthropic:claude-sonnet-4-5";
pub const GPT: &str = "openai:gpt-5.2";

/// Two completed turns on different models with a tool call in between.
///
/// Turn 1 (sonnet): 1,000 input, 200 output, 500 cache-create via two usage steps.
/// Turn 2 (gpt-5.2): 10,000 input of which 4,000 cached, 300 output incl. 100 reasoning.
pub fn two_turn_session(workspace_id: &str) -> EventScript {
    EventScript::new(workspace_id)
        .runtime(RuntimePhase::Starting, "docker")
        .runtime(RuntimePhase::Ready, "docker")
        .user("u1", 1, "List the files")
        .start("a1", 2, SONNET)
        .reasoning("a1", "Need to", 2)
        .reasoning("a1", " run ls", 2)
        .reasoning_end("a1")
        .tool_start("a1", "t1", "bash", None)
        .tool_delta("a1", "t1", "{\"script\":", 2)
        .tool_delta("a1", "t1", "\"ls\"}", 2)
        .tool_end("a1", "t1", json!({"success": true, "output": "a.txt"}))
        .usage_step("a1", usage(600, 120), Some(cache_create(300)))
        .text("a1", "Found ", 2)
        .text("a1", "a.txt", 2)
        .usage_step("a1", usage(400, 80), Some(cache_create(200)))
        .end("a1", None)
        .user("u2", 3, "Thanks")
        .start("a2", 4, GPT)
        .text("a2", "You're welcome", 3)
        .end(
            "a2",
            Some(LanguageModelUsage {
                input_tokens: Some(10_000),
                cached_input_tokens: Some(4_000),
                output_tokens: Some(300),
                reasoning_tokens: Some(100),
                total_tokens: Some(10_300),
            }),
        )
        .caught_up()
}

pub fn cache_create(tokens: u64) -> ProviderMetadata {
    match json!({"anthropic": {"cacheCreationInputTokens": tokens}}) {
        Value::Object(map) => map,
        _ => ProviderMetadata::new(),
    }
}

/// History with a malformed tool input and two browser screenshots
pub fn history_needing_sanitization() -> Vec<ChatMessage> {
    let screenshot = |call_id: &str, bytes: usize, url: &str| {
        let mut tool = ToolPart::new(call_id, "browser");
        tool.state = ToolState::OutputAvailable;
        tool.input = json!({"action": "screenshot"});
        tool.output = Some(json!({
            "type": "json",
            "value": {
                "success": true,
                "content_type": "screenshot",
                "content": "A".repeat(bytes),
                "url": url,
                "title": "Docs"
            }
        }));
        MessagePart::DynamicTool(tool)
    };

    let mut broken = ToolPart::new("t0", "bash");
    broken.state = ToolState::OutputAvailable;
    broken.input = Value::String("{\"script\": \"ls".to_string());
    broken.output = Some(json!({"success": true, "ui_only": {"diff": "+a"}}));

    vec![
        ChatMessage::text("u1", Role::User, "look at the docs"),
        assistant("a1", vec![MessagePart::DynamicTool(broken), screenshot("t1", 20_000, "https://docs/one")]),
        assistant("a2", vec![screenshot("t2", 4_000, "https://docs/two")]),
    ]
}

fn assistant(id: &str, parts: Vec<MessagePart>) -> ChatMessage {
    ChatMessage {
        id: id.to_string(),
        role: Role::Assistant,
        parts,
        metadata: MessageMetadata::default(),
    }
}
