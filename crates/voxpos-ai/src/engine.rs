//! Order assistant - turns customer audio into a raw intent payload.

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::client::{ClientError, OpenAIClient};
use crate::config::AssistantConfig;
use crate::prompt::Prompts;

/// Speech-to-text collaborator.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio`, biased by `context`.
    async fn transcribe(&self, audio: &Path, context: &str) -> Result<String, ClientError>;
}

/// Natural-language to intent JSON collaborator.
#[async_trait]
pub trait IntentInterpreter: Send + Sync {
    /// Return the model's raw JSON text for `transcript`.
    async fn interpret(&self, system: &str, transcript: &str) -> Result<String, ClientError>;
}

/// Which collaborator a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Transcription,
    Inference,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Transcription => f.write_str("transcription"),
            Stage::Inference => f.write_str("inference"),
        }
    }
}

/// Errors from the assistant. All of them end the turn.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("{stage} service unavailable: {source}")]
    Unavailable {
        stage: Stage,
        #[source]
        source: ClientError,
    },
    #[error("{stage} service timed out after {secs}s")]
    Timeout { stage: Stage, secs: u64 },
    #[error("failed to stage audio: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty audio upload")]
    EmptyAudio,
    #[error("missing API key - set VOXPOS_API_KEY or OPENAI_API_KEY")]
    MissingApiKey,
    #[error("client error: {0}")]
    Client(#[from] ClientError),
}

/// Output of the collaborators for one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub transcript: String,
    /// Model text, expected to hold the intent JSON object
    pub raw_response: String,
}

/// Runs the transcription and inference collaborators for one turn.
#[derive(Clone)]
pub struct OrderAssistant {
    transcriber: Arc<dyn Transcriber>,
    interpreter: Arc<dyn IntentInterpreter>,
    timeout: Duration,
}

impl OrderAssistant {
    pub fn new(
        transcriber: Arc<dyn Transcriber>,
        interpreter: Arc<dyn IntentInterpreter>,
        timeout: Duration,
    ) -> Self {
        Self {
            transcriber,
            interpreter,
            timeout,
        }
    }

    /// Build an assistant backed by one OpenAI-compatible client.
    pub fn from_config(config: AssistantConfig) -> Result<Self, AssistantError> {
        if !config.is_valid() {
            return Err(AssistantError::MissingApiKey);
        }
        let timeout = config.timeout();
        let client = Arc::new(OpenAIClient::new(config)?);
        Ok(Self::new(client.clone(), client, timeout))
    }

    /// Transcribe and interpret one utterance.
    ///
    /// The audio is staged in a temporary file that is removed on every
    /// path, including errors and cancellation.
    pub async fn listen(
        &self,
        audio: &[u8],
        file_name: Option<&str>,
        prompts: &Prompts,
    ) -> Result<Interpretation, AssistantError> {
        if audio.is_empty() {
            return Err(AssistantError::EmptyAudio);
        }

        let suffix = file_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_else(|| ".mp3".to_string());

        let mut staged = tempfile::Builder::new()
            .prefix("voxpos-")
            .suffix(&suffix)
            .tempfile()?;
        staged.write_all(audio)?;
        staged.flush()?;
        debug!("Staged {} bytes at {}", audio.len(), staged.path().display());

        let transcript = self
            .call(
                Stage::Transcription,
                self.transcriber
                    .transcribe(staged.path(), &prompts.transcription_context),
            )
            .await?;
        info!("Customer said: {}", transcript);

        drop(staged);

        self.interpret_text(&transcript, prompts).await
    }

    /// Interpret an already transcribed utterance.
    pub async fn interpret_text(
        &self,
        transcript: &str,
        prompts: &Prompts,
    ) -> Result<Interpretation, AssistantError> {
        let raw_response = self
            .call(
                Stage::Inference,
                self.interpreter.interpret(&prompts.system, transcript),
            )
            .await?;
        debug!("Model response: {}", raw_response);

        Ok(Interpretation {
            transcript: transcript.to_string(),
            raw_response,
        })
    }

    async fn call<F>(&self, stage: Stage, fut: F) -> Result<String, AssistantError>
    where
        F: Future<Output = Result<String, ClientError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(source)) => {
                warn!("{} call failed: {}", stage, source);
                Err(AssistantError::Unavailable { stage, source })
            }
            Err(_) => {
                warn!("{} call timed out after {:?}", stage, self.timeout);
                Err(AssistantError::Timeout {
                    stage,
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
