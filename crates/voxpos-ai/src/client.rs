//! OpenAI-compatible API client for transcription and chat completion.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::engine::{IntentInterpreter, Transcriber};
use crate::AssistantConfig;

/// Client for an OpenAI-compatible API.
pub struct OpenAIClient {
    client: reqwest::Client,
    config: AssistantConfig,
}

/// Errors from the API client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid API key header")]
    InvalidApiKey,
    #[error("No completion returned")]
    EmptyCompletion,
}

/// Chat completion request.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Transcription response (`response_format = json`).
#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Error response body.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl OpenAIClient {
    /// Create a new client.
    pub fn new(config: AssistantConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| ClientError::InvalidApiKey)?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self { client, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.api_root(), path)
    }

    /// Transcribe an audio file.
    pub async fn transcribe_file(&self, audio: &Path, context: &str) -> Result<String, ClientError> {
        let bytes = tokio::fs::read(audio).await?;
        let file_name = audio
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.mp3".to_string());

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", self.config.transcription_model.clone())
            .text("language", self.config.language.clone())
            .text("prompt", context.to_string())
            .text("temperature", "0")
            .text("response_format", "json");

        debug!("Calling transcription API ({})", self.config.transcription_model);
        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await?;
        let transcription: TranscriptionResponse = response.json().await?;
        Ok(transcription.text)
    }

    /// Ask the chat model for a JSON object.
    pub async fn complete_json(&self, system: &str, user_message: &str) -> Result<String, ClientError> {
        let request = ChatCompletionRequest {
            model: &self.config.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            temperature: 0.0,
        };

        debug!("Calling chat completion API ({})", self.config.chat_model);
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .json(&request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let completion: ChatCompletionResponse = response.json().await?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(ClientError::EmptyCompletion)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error.message)
        .unwrap_or(text);

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Transcriber for OpenAIClient {
    async fn transcribe(&self, audio: &Path, context: &str) -> Result<String, ClientError> {
        self.transcribe_file(audio, context).await
    }
}

#[async_trait]
impl IntentInterpreter for OpenAIClient {
    async fn interpret(&self, system: &str, transcript: &str) -> Result<String, ClientError> {
        self.complete_json(system, transcript).await
    }
}
