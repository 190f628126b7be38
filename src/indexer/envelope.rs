use crate::indexer::error::IndexerError;
use serde::Deserialize;

/// Category of envelopes carrying a chat message
pub const MESSAGE_CATEGORY: &str = "message";

/// Tagged unit of inbound data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub category: String,
    pub body: Vec<u8>,
}

/// Wire form of an envelope: `{"category": "...", "body": <json>}`
#[derive(Debug, Deserialize)]
struct Frame {
    category: String,
    #[serde(default)]
    body: serde_json::Value,
}

impl Envelope {
    pub fn new(category: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            category: category.into(),
            body: body.into(),
        }
    }

    /// Envelope carrying a message body
    pub fn message(body: impl Into<Vec<u8>>) -> Self {
        Self::new(MESSAGE_CATEGORY, body)
    }

    /// Decode a text frame; the body is re-encoded to bytes as-is
    pub fn from_frame(text: &str) -> Result<Self, IndexerError> {
        let frame: Frame = serde_json::from_str(text)
            .map_err(|e| IndexerError::Decode(format!("Invalid envelope frame: {}", e)))?;

        let body = serde_json::to_vec(&frame.body)
            .map_err(|e| IndexerError::Decode(format!("Invalid envelope body: {}", e)))?;

        Ok(Self::new(frame.category, body))
    }

    pub fn is_message(&self) -> bool {
        self.category == MESSAGE_CATEGORY
    }
}
