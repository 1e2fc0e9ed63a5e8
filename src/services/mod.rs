pub mod language;
pub mod normalizer;
pub mod recognizer;
pub mod translation;

pub use recognizer::RecognizerService;
pub use translation::TranslationClient;
