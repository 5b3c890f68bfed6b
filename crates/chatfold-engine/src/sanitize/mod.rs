//! Passes run over persisted messages before they are fed back into a prompt.
//!
//! Both passes are pure: they take a message list and return a repaired copy.

pub mod input;
pub mod redaction;

pub use input::sanitize_tool_inputs;
pub use redaction::{
    DEFAULT_LARGE_CONTENT_THRESHOLD, RedactionOptions, apply_tool_output_redaction,
    strip_tool_output_ui_only,
};
