use crate::config::AppConfig;
use async_trait::async_trait;
use reqwest::multipart;
use serde::Deserialize;
use thiserror::Error;

/// One audio payload to transcribe
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub filename: String,
    pub audio: Vec<u8>,
    pub model: String,
    pub language: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Transcript {
    pub text: String,
}

#[derive(Error, Debug)]
pub enum TranscriberError {
    #[error("Error code: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// External speech-to-text capability
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, request: TranscriptionRequest)
    -> Result<Transcript, TranscriberError>;
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Groq's OpenAI-compatible `/audio/transcriptions` endpoint
pub struct GroqTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqTranscriber {
    pub fn new(api_key: String, base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, base_url)
    }

    pub fn with_client(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(
            builder.build()?,
            config.api_key.clone(),
            config.api_base_url.clone(),
        ))
    }
}

fn provider_message(body: &str) -> String {
    serde_json::from_str::<ProviderErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl Transcriber for GroqTranscriber {
    async fn transcribe(
        &self,
        request: TranscriptionRequest,
    ) -> Result<Transcript, TranscriberError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(request.audio).file_name(request.filename.clone());

        let form = multipart::Form::new()
            .text("model", request.model.clone())
            .text("language", request.language)
            .text("response_format", "json")
            .part("file", file_part);

        tracing::debug!(model = %request.model, filename = %request.filename, "Sending audio to transcription provider");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriberError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranscriberError::Request(e.to_string()))?;

        if !status.is_success() {
            return Err(TranscriberError::Api {
                status: status.as_u16(),
                message: provider_message(&body),
            });
        }

        let transcript: Transcript = serde_json::from_str(&body)
            .map_err(|e| TranscriberError::InvalidResponse(e.to_string()))?;

        tracing::info!(chars = transcript.text.len(), "Transcription completed");

        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_from_json() {
        let body = r#"{"error":{"message":"Invalid API Key","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        assert_eq!(provider_message(body), "Invalid API Key");
    }

    #[test]
    fn test_provider_message_falls_back_to_raw_body() {
        assert_eq!(provider_message("  upstream timeout \n"), "upstream timeout");
    }

    #[test]
    fn test_api_error_display_contains_message() {
        let err = TranscriberError::Api {
            status: 401,
            message: "Invalid API Key".to_string(),
        };
        assert_eq!(err.to_string(), "Error code: 401 - Invalid API Key");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let t = GroqTranscriber::new("k".into(), "http://localhost:1/v1/".into());
        assert_eq!(t.base_url, "http://localhost:1/v1");
    }
}
