// Custom error types for better error handling and debugging
//
// Using thiserror for ergonomic error definitions with:
// - Type-safe error matching per pipeline stage
// - Automatic Display/Error trait implementations
// - Source error chaining

use thiserror::Error;

/// Image normalization errors
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("image decoding failed: {0}")]
    InvalidImage(#[source] image::ImageError),

    #[error("image encoding failed: {0}")]
    EncodeFailed(#[source] image::ImageError),

    #[error("normalization task failed: {0}")]
    TaskFailed(String),
}

/// OCR adapter errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("OCR engine unavailable: {0}")]
    Unavailable(String),

    #[error("text recognition failed: {0}")]
    Failed(String),

    #[error("text recognition timed out after {0}s")]
    TimedOut(u64),
}

/// Translator adapter errors
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("translation service returned {status}: {message}")]
    ServiceError { status: u16, message: String },

    #[error("translation service unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("invalid response from translation service: {0}")]
    InvalidResponse(String),
}

/// Pipeline orchestration errors
///
/// Per-target translation failures are captured as outcomes, not as
/// pipeline errors; only validation failures and unexpected collaborator
/// failures surface here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    BadRequest(String),

    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    /// Safety valve for failures no other variant anticipates. The
    /// handler maps it to a 500; every `?` on an `anyhow::Result` inside
    /// the pipeline lands here.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OCR language list is empty (set OCR_LANGS)")]
    NoOcrLanguages,

    #[error("default target language list is empty (set DEFAULT_TARGET)")]
    NoDefaultTargets,

    #[error("max image dimension must be between 320 and 4096, got {0}")]
    InvalidMaxDimension(u32),

    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("invalid translation service URL: {0}")]
    InvalidTranslatorUrl(String),

    #[error("upload limit must be > 0 MB")]
    InvalidUploadLimit,
}

// Convenience type aliases for Results
pub type NormalizeResult<T> = Result<T, NormalizeError>;
pub type RecognitionResult<T> = Result<T, RecognitionError>;
pub type TranslationResult<T> = Result<T, TranslationError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_error_renders_terse_details() {
        let error = PipelineError::from(anyhow::anyhow!("join failure"));
        assert_eq!(error.to_string(), "internal error: join failure");
    }

    #[test]
    fn test_bad_request_message_is_client_facing() {
        let error = PipelineError::BadRequest("no image or text supplied".to_string());
        assert_eq!(error.to_string(), "no image or text supplied");
    }
}
