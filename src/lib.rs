// Library exports for the photo translation backend

pub mod core;
pub mod orchestration;
pub mod services;

// Re-export commonly used types and functions
pub use crate::core::{
    config::Config,
    errors::{ConfigError, NormalizeError, PipelineError, RecognitionError, TranslationError},
    types::{TranslateRequest, TranslateResponse, TranslatedText},
};

pub use crate::orchestration::Orchestrator;
pub use crate::services::{RecognizerService, TranslationClient};
