use serde::{Deserialize, Serialize};

/// Metadata for one attachment referenced by a completion.
///
/// `url` is the retrieval reference; an absent or blank value means the
/// attachment cannot be downloaded and is skipped by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,
}

impl AttachmentDescriptor {
    pub fn new(url: Option<&str>, title: Option<&str>, content_type: Option<&str>) -> Self {
        Self {
            url: url.map(String::from),
            title: title.map(String::from),
            content_type: content_type.map(String::from),
            ..Default::default()
        }
    }

    /// The retrieval reference, if the attachment can be downloaded.
    pub fn retrieval_reference(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    /// Declared title, ignoring blank values.
    pub fn declared_title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }
}
