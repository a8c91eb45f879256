pub mod staging;
pub mod transcriber;
pub mod transcription;
