use chatfold_types::{ChatMessage, LanguageModelUsage, MessagePart, ProviderMetadata, Role};
use serde::{Deserialize, Serialize};

/// Lifecycle of a message as seen by the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Streaming,
    Complete,
    /// Stopped by an abort; partial content is kept
    Aborted,
    Errored,
}

impl MessageStatus {
    pub fn is_final(self) -> bool {
        !matches!(self, MessageStatus::Streaming)
    }

    /// Status of a message installed from persisted history
    pub(crate) fn of_persisted(message: &ChatMessage) -> Self {
        if message.metadata.error.is_some() {
            MessageStatus::Errored
        } else if message.metadata.partial == Some(true) {
            MessageStatus::Aborted
        } else {
            MessageStatus::Complete
        }
    }
}

/// Render-ready view of one message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayedMessage {
    pub id: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_sequence: Option<u64>,
    pub status: MessageStatus,
    pub parts: Vec<MessagePart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    /// Final usage, or the running total while streaming
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<LanguageModelUsage>,
    /// Side-channel figures (cache writes, reasoning) that go with `usage`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_metadata: Option<ProviderMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub compacted: bool,
}

impl DisplayedMessage {
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect()
    }
}
