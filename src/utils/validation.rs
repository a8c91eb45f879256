use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Audio subtypes the transcription provider accepts
pub const SUPPORTED_AUDIO_SUBTYPES: &[&str] = &[
    "flac", "mp3", "mp4", "mpeg", "mpga", "m4a", "ogg", "wav", "webm", "x-m4a",
];

/// Characters that never survive into a staged filename
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|', ';'];

const MAX_FILENAME_LEN: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File type not supported")]
    UnsupportedMediaType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// How a client-supplied filename is turned into a staging path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenamePolicy {
    /// Reject traversal and replace reserved characters
    Strict,
    /// Use the client filename as-is
    Permissive,
}

impl FromStr for FilenamePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" => Ok(Self::Permissive),
            other => Err(format!("unknown filename policy '{}'", other)),
        }
    }
}

impl FilenamePolicy {
    pub fn apply(self, filename: &str) -> Result<String, ValidationError> {
        match self {
            Self::Strict => sanitize_filename(filename),
            Self::Permissive => Ok(filename.to_string()),
        }
    }
}

/// Returns the lower-cased subtype of a declared content type, without parameters.
///
/// `audio/x-m4a; codecs=aac` yields `x-m4a`; a value without a `/` yields `None`.
pub fn audio_subtype(content_type: &str) -> Option<String> {
    let mime: mime::Mime = content_type.trim().parse().ok()?;
    Some(mime.subtype().as_str().to_ascii_lowercase())
}

/// How the declared content type is compared with the supported list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTypeMatch {
    /// Parse the MIME type, drop parameters and fold case
    Normalized,
    /// Take the raw text after the first `/` and compare it verbatim
    Exact,
}

impl FromStr for ContentTypeMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "normalized" => Ok(Self::Normalized),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown content type match '{}'", other)),
        }
    }
}

/// Validates a declared content type against the supported subtype list.
///
/// Only the subtype is checked, so `video/mp4` is as acceptable as `audio/mp4`.
pub fn validate_audio_content_type(
    content_type: Option<&str>,
    mode: ContentTypeMatch,
) -> Result<String, ValidationError> {
    let declared = content_type.unwrap_or_default();

    let subtype = match mode {
        ContentTypeMatch::Normalized => audio_subtype(declared),
        ContentTypeMatch::Exact => declared.split('/').nth(1).map(str::to_string),
    };

    match subtype {
        Some(subtype) if SUPPORTED_AUDIO_SUBTYPES.contains(&subtype.as_str()) => Ok(subtype),
        _ => Err(ValidationError::UnsupportedMediaType(declared.to_string())),
    }
}

/// Checks the leading bytes for an audio or video container signature
pub fn looks_like_audio(bytes: &[u8]) -> bool {
    matches!(
        infer::get(bytes).map(|kind| kind.matcher_type()),
        Some(infer::MatcherType::Audio) | Some(infer::MatcherType::Video)
    )
}

/// Sanitizes a filename for the staging directory.
/// Path traversal is rejected outright rather than stripped.
pub fn sanitize_filename(filename: &str) -> Result<String, ValidationError> {
    if filename.contains('/') || filename.contains('\\') {
        tracing::warn!("Path traversal attempt detected: {}", filename);
        return Err(ValidationError::InvalidFilename(
            "path separators are not allowed".to_string(),
        ));
    }

    let name = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim();

    if name.is_empty() {
        return Err(ValidationError::InvalidFilename(
            "filename cannot be empty".to_string(),
        ));
    }

    if name.starts_with('.') {
        return Err(ValidationError::InvalidFilename(
            "hidden files are not allowed".to_string(),
        ));
    }

    let sanitized: String = name
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    if sanitized.len() > MAX_FILENAME_LEN {
        return Ok(truncate_keeping_extension(&sanitized));
    }

    Ok(sanitized)
}

/// Shortens the stem so the whole name fits, keeping the extension the
/// provider relies on to detect the audio format
fn truncate_keeping_extension(name: &str) -> String {
    let suffix = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .filter(|s| s.len() < MAX_FILENAME_LEN)
        .unwrap_or_default();

    let stem = &name[..name.len() - suffix.len()];
    let mut end = MAX_FILENAME_LEN - suffix.len();
    while !stem.is_char_boundary(end) {
        end -= 1;
    }

    format!("{}{}", &stem[..end], suffix)
}
