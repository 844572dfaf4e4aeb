use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::message::Message;

/// Output resolution of the generated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[serde(rename = "1024x1024")]
    Square,
    #[serde(rename = "1024x1792")]
    Portrait,
    #[serde(rename = "1792x1024")]
    Landscape,
}

/// Rendering quality. `Hd` gives finer detail and more consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    Standard,
    Hd,
}

/// Stylistic bias: `Vivid` leans hyper-real and dramatic, `Natural` does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStyle {
    Natural,
    Vivid,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square => "1024x1024",
            ImageSize::Portrait => "1024x1792",
            ImageSize::Landscape => "1792x1024",
        }
    }
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }
}

impl ImageStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Natural => "natural",
            ImageStyle::Vivid => "vivid",
        }
    }
}

impl FromStr for ImageSize {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "square" | "1024x1024" => Ok(ImageSize::Square),
            "portrait" | "1024x1792" => Ok(ImageSize::Portrait),
            "landscape" | "1792x1024" => Ok(ImageSize::Landscape),
            _ => Err(anyhow::anyhow!("Invalid image size: {}", s)),
        }
    }
}

impl FromStr for ImageQuality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ImageQuality::Standard),
            "hd" => Ok(ImageQuality::Hd),
            _ => Err(anyhow::anyhow!("Invalid image quality: {}", s)),
        }
    }
}

impl FromStr for ImageStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "natural" => Ok(ImageStyle::Natural),
            "vivid" => Ok(ImageStyle::Vivid),
            _ => Err(anyhow::anyhow!("Invalid image style: {}", s)),
        }
    }
}

impl Display for ImageSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Display for ImageQuality {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl Display for ImageStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Prompt, deployment and opaque generation options for one run.
///
/// Built once through the `with_*` methods and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    deployment: String,
    options: Map<String, JsonValue>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, deployment: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            deployment: deployment.into(),
            options: Map::new(),
        }
    }

    /// Set an arbitrary service-defined option, replacing any previous value.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_size(self, size: ImageSize) -> Self {
        self.with_option("size", size.as_str())
    }

    pub fn with_quality(self, quality: ImageQuality) -> Self {
        self.with_option("quality", quality.as_str())
    }

    pub fn with_style(self, style: ImageStyle) -> Self {
        self.with_option("style", style.as_str())
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    pub fn options(&self) -> &Map<String, JsonValue> {
        &self.options
    }

    /// Conversation sent to the service: a single user message with the prompt.
    pub fn messages(&self) -> Vec<Message> {
        vec![Message::user(self.prompt.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn builder_collects_options() {
        let request = GenerationRequest::new("Sunny day on Bali", "dall-e-3")
            .with_size(ImageSize::Square)
            .with_quality(ImageQuality::Standard)
            .with_style(ImageStyle::Vivid)
            .with_option("seed", 42);

        assert_eq!(request.options()["size"], "1024x1024");
        assert_eq!(request.options()["quality"], "standard");
        assert_eq!(request.options()["style"], "vivid");
        assert_eq!(request.options()["seed"], 42);

        let messages = request.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].content, "Sunny day on Bali");
    }

    #[test]
    fn option_enums_parse_case_insensitively() {
        assert_eq!("HD".parse::<ImageQuality>().unwrap(), ImageQuality::Hd);
        assert_eq!("landscape".parse::<ImageSize>().unwrap(), ImageSize::Landscape);
        assert_eq!("1024x1792".parse::<ImageSize>().unwrap(), ImageSize::Portrait);
        assert_eq!("Natural".parse::<ImageStyle>().unwrap(), ImageStyle::Natural);
        assert!("huge".parse::<ImageSize>().is_err());
    }

    #[test]
    fn enums_serialize_to_wire_strings() {
        assert_eq!(serde_json::to_value(ImageSize::Landscape).unwrap(), "1792x1024");
        assert_eq!(serde_json::to_value(ImageQuality::Hd).unwrap(), "hd");
        assert_eq!(ImageStyle::Vivid.to_string(), "vivid");
    }
}
