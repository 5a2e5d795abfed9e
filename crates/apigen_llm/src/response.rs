//! Messages API reply decoding and JSON recovery.

use serde::{Deserialize, Serialize};

/// Reply from the Messages API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message id.
    #[serde(default)]
    pub id: String,
    /// Model that produced the reply.
    #[serde(default)]
    pub model: String,
    /// Why generation stopped (`end_turn`, `max_tokens`, ...).
    pub stop_reason: Option<String>,
    /// Reply blocks in order.
    pub content: Vec<ContentBlock>,
    /// Token accounting.
    #[serde(default)]
    pub usage: Usage,
}

/// One block of a reply. Only text is ever requested; anything else is kept
/// as [`ContentBlock::Other`] and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Generated text.
    Text {
        /// The text.
        text: String,
    },
    /// A block type this client does not use.
    #[serde(other)]
    Other,
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Prompt tokens.
    pub input_tokens: u64,
    /// Generated tokens.
    pub output_tokens: u64,
}

impl MessageResponse {
    /// Concatenated text of all text blocks.
    #[must_use]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect()
    }

    /// True when generation hit the token limit, so any JSON is likely cut.
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }

    /// Recovers the JSON object embedded in the reply.
    ///
    /// Models wrap JSON in prose or code fences despite instructions. The
    /// span from the first `{` to the last `}` is returned; without such a
    /// span the trimmed text is returned as is and left for the decoder to
    /// reject.
    #[must_use]
    pub fn extract_json(&self) -> String {
        let text = self.text();
        let text = text.trim();

        match (text.find('{'), text.rfind('}')) {
            (Some(open), Some(close)) if open < close => text[open..=close].to_string(),
            _ => text.to_string(),
        }
    }
}
