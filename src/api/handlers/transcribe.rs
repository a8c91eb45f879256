use crate::AppState;
use crate::api::error::AppError;
use crate::services::transcription::Upload;
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
};
use utoipa::ToSchema;

pub const AUDIO_FIELD: &str = "audio_file";

/// Multipart body of the transcription route
#[derive(ToSchema)]
pub struct TranscribeForm {
    /// Audio file (flac, mp3, mp4, mpeg, mpga, m4a, ogg, wav, webm, x-m4a)
    #[schema(value_type = String, format = Binary)]
    pub audio_file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/transcribe/mp3",
    request_body(content = TranscribeForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Transcribed text", body = String),
        (status = 400, description = "Invalid filename or malformed form"),
        (status = 403, description = "File type not supported"),
        (status = 404, description = "File not found"),
        (status = 422, description = "Missing audio_file field"),
        (status = 500, description = "IO or transcription failure")
    ),
    tag = "transcription"
)]
pub async fn transcribe_audio(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<String>, AppError> {
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| {
                AppError::UnprocessableEntity(format!("Expected a file upload: {}", AUDIO_FIELD))
            })?;
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;

        upload = Some(Upload {
            filename,
            content_type,
            data,
        });
        break;
    }

    let upload = upload
        .ok_or_else(|| AppError::UnprocessableEntity(format!("Field required: {}", AUDIO_FIELD)))?;

    tracing::info!(
        "Transcribing {} ({} bytes, {})",
        upload.filename,
        upload.data.len(),
        upload.content_type.as_deref().unwrap_or("no content type")
    );

    let text = state.transcription.transcribe(upload).await?;

    Ok(Json(text))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(e.body_text())
    }
}
