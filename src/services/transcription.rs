use crate::config::AppConfig;
use crate::services::staging::StagingArea;
use crate::services::transcriber::{Transcriber, TranscriberError, TranscriptionRequest};
use crate::utils::validation::{
    ContentTypeMatch, FilenamePolicy, ValidationError, looks_like_audio,
    validate_audio_content_type,
};
use bytes::Bytes;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// An inbound audio upload as declared by the client
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("File type not supported: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO Error occurred: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Transcription(#[from] TranscriberError),
}

impl From<ValidationError> for TranscribeError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnsupportedMediaType(declared) => {
                TranscribeError::UnsupportedMediaType(declared)
            }
            ValidationError::InvalidFilename(reason) => TranscribeError::InvalidFilename(reason),
        }
    }
}

/// Validates, stages and transcribes one upload per call
pub struct TranscriptionService {
    transcriber: Arc<dyn Transcriber>,
    staging: StagingArea,
    model: String,
    language: String,
    filename_policy: FilenamePolicy,
    content_type_match: ContentTypeMatch,
    verify_audio_content: bool,
}

impl TranscriptionService {
    pub fn new(transcriber: Arc<dyn Transcriber>, config: &AppConfig) -> Self {
        Self {
            transcriber,
            staging: StagingArea::new(config.upload_dir.clone()),
            model: config.model.clone(),
            language: config.language.clone(),
            filename_policy: config.filename_policy,
            content_type_match: config.content_type_match,
            verify_audio_content: config.verify_audio_content,
        }
    }

    pub fn staging(&self) -> &StagingArea {
        &self.staging
    }

    pub async fn transcribe(&self, upload: Upload) -> Result<String, TranscribeError> {
        let subtype = validate_audio_content_type(
            upload.content_type.as_deref(),
            self.content_type_match,
        )?;

        if self.verify_audio_content && !looks_like_audio(&upload.data) {
            tracing::warn!(
                "Content of {} does not match declared type {}",
                upload.filename,
                subtype
            );
            return Err(TranscribeError::UnsupportedMediaType(
                upload.content_type.unwrap_or_default(),
            ));
        }

        let staged_name = self.filename_policy.apply(&upload.filename)?;

        let written = self.staging.write(&staged_name, &upload.data).await?;
        tracing::debug!("Staged {} bytes at {}", upload.data.len(), written.display());

        let (filename, audio) = match self.staging.read_back(&written).await {
            Ok(staged) => staged,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TranscribeError::FileNotFound(written));
            }
            Err(e) => return Err(e.into()),
        };

        let transcript = self
            .transcriber
            .transcribe(TranscriptionRequest {
                filename,
                audio,
                model: self.model.clone(),
                language: self.language.clone(),
            })
            .await?;

        Ok(transcript.text.trim().to_string())
    }
}
