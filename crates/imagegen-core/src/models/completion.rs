use serde::{Deserialize, Serialize};

use super::attachment::AttachmentDescriptor;
use super::message::Role;

/// Structured chat-completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub custom_content: Option<CustomContent>,
}

/// DIAL extension carrying attachments next to the text content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomContent {
    #[serde(default)]
    pub attachments: Option<Vec<AttachmentDescriptor>>,
}

impl Completion {
    pub fn message(&self) -> Option<&CompletionMessage> {
        self.choices.first().map(|choice| &choice.message)
    }

    /// Text content of the first choice.
    pub fn content(&self) -> Option<&str> {
        self.message()
            .and_then(|m| m.content.as_deref())
            .filter(|c| !c.is_empty())
    }

    /// Attachments of the first choice in response order; empty when the
    /// response has no attachment section.
    pub fn attachments(&self) -> &[AttachmentDescriptor] {
        self.message()
            .and_then(|m| m.custom_content.as_ref())
            .and_then(|c| c.attachments.as_deref())
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_attachments_in_order() {
        let json = r#"{
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "finish_reason": "stop",
                "message": {
                    "role": "assistant",
                    "content": "Here you go",
                    "custom_content": {
                        "attachments": [
                            {"type": "text/markdown", "title": "Revised prompt"},
                            {"type": "image/png", "url": "files/b/1.png", "title": "Image"}
                        ]
                    }
                }
            }]
        }"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert_eq!(completion.content(), Some("Here you go"));
        let attachments = completion.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[0].retrieval_reference(), None);
        assert_eq!(attachments[1].retrieval_reference(), Some("files/b/1.png"));
    }

    #[test]
    fn missing_custom_content_yields_no_attachments() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"no image"}}]}"#;
        let completion: Completion = serde_json::from_str(json).unwrap();
        assert!(completion.attachments().is_empty());
    }

    #[test]
    fn empty_choices_yield_nothing() {
        let completion: Completion = serde_json::from_str("{}").unwrap();
        assert!(completion.content().is_none());
        assert!(completion.attachments().is_empty());
    }
}
