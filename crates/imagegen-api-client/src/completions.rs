//! Chat-completion requests against a DIAL deployment.
//!
//! The prompt goes out as a single user message; generation options ride in
//! `custom_fields.configuration`, which image deployments read as their
//! rendering parameters.

use imagegen_core::{CompositionError, Completion, GenerationRequest, Message};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::{error_body, ApiClient};

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_fields: Option<CustomFields<'a>>,
}

#[derive(Debug, Serialize)]
struct CustomFields<'a> {
    configuration: &'a Map<String, JsonValue>,
}

/// Path of the chat-completions endpoint for a deployment.
pub fn completion_path(deployment: &str) -> String {
    format!("/openai/deployments/{}/chat/completions", deployment)
}

impl ApiClient {
    /// Send the generation request and parse the structured completion.
    ///
    /// Every failure here is fatal for the run: without a completion there are
    /// no attachments to persist.
    pub async fn get_completion(
        &self,
        request: &GenerationRequest,
    ) -> Result<Completion, CompositionError> {
        let url = self.build_url(&completion_path(request.deployment()));

        let body = ChatCompletionBody {
            messages: request.messages(),
            custom_fields: (!request.options().is_empty()).then(|| CustomFields {
                configuration: request.options(),
            }),
        };

        tracing::info!(
            deployment = %request.deployment(),
            options = %JsonValue::Object(request.options().clone()),
            "Sending generation request"
        );

        let start = std::time::Instant::now();

        let response = self
            .apply_auth(self.client().post(&url))
            .query(&[("api-version", self.api_version())])
            .json(&body)
            .send()
            .await
            .map_err(|e| CompositionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = error_body(response).await;
            tracing::error!(
                status = status.as_u16(),
                deployment = %request.deployment(),
                "Generation request failed"
            );
            return Err(CompositionError::Status {
                status: status.as_u16(),
                body: error_text,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CompositionError::Transport(e.to_string()))?;

        let completion: Completion = serde_json::from_slice(&bytes)?;
        if completion.choices.is_empty() {
            return Err(CompositionError::EmptyResponse);
        }

        tracing::info!(
            deployment = %request.deployment(),
            attachments = completion.attachments().len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Generation request completed"
        );

        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ApiKey;
    use imagegen_core::{ImageQuality, ImageSize, ImageStyle};
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn client(base_url: String) -> ApiClient {
        ApiClient::new(
            base_url,
            ApiKey("test-key".to_string()),
            "2025-01-01-preview".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("Sunny day on Bali", "dall-e-3")
            .with_size(ImageSize::Square)
            .with_quality(ImageQuality::Standard)
            .with_style(ImageStyle::Vivid)
    }

    #[tokio::test]
    async fn test_get_completion_sends_prompt_and_options() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/dall-e-3/chat/completions")
            .match_query(Matcher::UrlEncoded(
                "api-version".into(),
                "2025-01-01-preview".into(),
            ))
            .match_header("api-key", "test-key")
            .match_body(Matcher::PartialJson(json!({
                "messages": [{"role": "user", "content": "Sunny day on Bali"}],
                "custom_fields": {"configuration": {
                    "size": "1024x1024",
                    "quality": "standard",
                    "style": "vivid"
                }}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "index": 0,
                        "message": {
                            "role": "assistant",
                            "content": "",
                            "custom_content": {"attachments": [
                                {"type": "image/png", "url": "files/b/img.png", "title": "Image"}
                            ]}
                        }
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let completion = client(server.url()).get_completion(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(completion.attachments().len(), 1);
        assert_eq!(
            completion.attachments()[0].retrieval_reference(),
            Some("files/b/img.png")
        );
    }

    #[tokio::test]
    async fn test_get_completion_without_options_omits_custom_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/openai/deployments/imagegeneration@005/chat/completions")
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "messages": [{"role": "user", "content": "cat"}]
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#)
            .create_async()
            .await;

        let request = GenerationRequest::new("cat", "imagegeneration@005");
        let completion = client(server.url()).get_completion(&request).await.unwrap();

        mock.assert_async().await;
        assert!(completion.attachments().is_empty());
        assert_eq!(completion.content(), Some("ok"));
    }

    #[tokio::test]
    async fn test_get_completion_status_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/openai/deployments/dall-e-3/chat/completions")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"error":{"message":"bad key"}}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .get_completion(&request())
            .await
            .unwrap_err();

        match err {
            CompositionError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_completion_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/openai/deployments/dall-e-3/chat/completions")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("<html>proxy error</html>")
            .create_async()
            .await;

        let err = client(server.url())
            .get_completion(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, CompositionError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_get_completion_without_choices() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/openai/deployments/dall-e-3/chat/completions")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let err = client(server.url())
            .get_completion(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, CompositionError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_get_completion_transport_error() {
        // Nothing listens on port 9 (discard) in test environments.
        let err = client("http://127.0.0.1:9".to_string())
            .get_completion(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, CompositionError::Transport(_)));
    }
}
