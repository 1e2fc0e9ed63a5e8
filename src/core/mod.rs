pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::Config;
pub use errors::{
    ConfigError, NormalizeError, PipelineError, RecognitionError, TranslationError,
};
pub use types::{
    NormalizedImage, TranslateRequest, TranslateResponse, TranslatedText, Translation,
};
