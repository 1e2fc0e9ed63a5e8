// Text recognizer adapter over a long-lived Tesseract session
//
// The engine is expensive to initialize (trained data load), so a session
// is created lazily on first use and reused for the lifetime of the
// process. The async mutex doubles as the single-flight guard: concurrent
// first requests queue on the lock instead of racing a second
// initialization, and recognition calls on the one session are serialized.

use leptess::LepTess;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::core::config::OcrConfig;
use crate::core::errors::{RecognitionError, RecognitionResult};

struct Engine {
    session: LepTess,
    /// "+"-joined language string the session was initialized with.
    languages: String,
}

pub struct RecognizerService {
    engine: Mutex<Option<Engine>>,
    languages: Vec<String>,
    tessdata_dir: Option<String>,
}

impl RecognizerService {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            engine: Mutex::new(None),
            languages: config.languages.clone(),
            tessdata_dir: config.tessdata_dir.clone(),
        }
    }

    /// Recognize text in `image` (any format Leptonica can read).
    ///
    /// `hints` selects which of the configured language models the session
    /// uses; hints naming models outside the configured list are logged
    /// and skipped, and an empty survivor set falls back to the full
    /// configured list. The returned text is whitespace-trimmed; empty
    /// text means "no text found" and is a valid outcome.
    pub async fn recognize(
        &self,
        image: Vec<u8>,
        hints: &[String],
    ) -> RecognitionResult<String> {
        let wanted = self.accepted_hints(hints).join("+");

        let mut slot = self.engine.lock().await;
        let needs_init = match slot.as_ref() {
            Some(engine) => engine.languages != wanted,
            None => true,
        };
        if needs_init {
            *slot = Some(Self::initialize(self.tessdata_dir.clone(), wanted).await?);
        }
        let mut engine = slot
            .take()
            .ok_or_else(|| RecognitionError::Unavailable("engine slot empty".to_string()))?;

        // Move the session into the blocking pool and hand it back
        // afterwards; the lock guard stays held so other requests wait.
        let (engine, outcome) = tokio::task::spawn_blocking(move || {
            let outcome = recognize_blocking(&mut engine.session, &image);
            (engine, outcome)
        })
        .await
        .map_err(|e| RecognitionError::Failed(format!("recognition task panicked: {e}")))?;

        *slot = Some(engine);
        let text = outcome?;
        Ok(text.trim().to_string())
    }

    /// Drop the engine session. Invoked once on process termination.
    pub async fn shutdown(&self) {
        let mut slot = self.engine.lock().await;
        if slot.take().is_some() {
            info!("OCR engine terminated");
        }
    }

    async fn initialize(
        datapath: Option<String>,
        languages: String,
    ) -> RecognitionResult<Engine> {
        info!("initializing OCR engine (languages: {})", languages);

        tokio::task::spawn_blocking(move || {
            let session = LepTess::new(datapath.as_deref(), &languages)
                .map_err(|e| RecognitionError::Unavailable(e.to_string()))?;
            Ok(Engine { session, languages })
        })
        .await
        .map_err(|e| RecognitionError::Unavailable(format!("init task panicked: {e}")))?
    }

    /// Filter hints down to models in the configured list; an empty
    /// survivor set falls back to the full configured list.
    fn accepted_hints(&self, hints: &[String]) -> Vec<String> {
        let mut accepted = Vec::new();
        for hint in hints {
            if self.languages.iter().any(|l| l == hint) {
                accepted.push(hint.clone());
            } else {
                warn!("ignoring unknown OCR language hint: {}", hint);
            }
        }
        if accepted.is_empty() {
            return self.languages.clone();
        }
        accepted
    }
}

fn recognize_blocking(session: &mut LepTess, image: &[u8]) -> RecognitionResult<String> {
    session
        .set_image_from_mem(image)
        .map_err(|e| RecognitionError::Failed(format!("image rejected by engine: {e}")))?;
    session
        .get_utf8_text()
        .map_err(|e| RecognitionError::Failed(format!("text extraction failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(languages: &[&str]) -> RecognizerService {
        RecognizerService::new(&OcrConfig {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            tessdata_dir: None,
            timeout_secs: 30,
            max_image_dimension: 1600,
        })
    }

    #[test]
    fn test_unknown_hints_are_skipped() {
        let service = service(&["eng", "hin"]);
        let accepted =
            service.accepted_hints(&["hin".to_string(), "klingon".to_string()]);
        assert_eq!(accepted, vec!["hin"]);
    }

    #[test]
    fn test_all_hints_unknown_falls_back_to_configured() {
        let service = service(&["eng"]);
        let accepted = service.accepted_hints(&["xyz".to_string()]);
        assert_eq!(accepted, vec!["eng"]);
    }

    #[tokio::test]
    async fn test_shutdown_without_init_is_noop() {
        let service = service(&["eng"]);
        service.shutdown().await;
        assert!(service.engine.lock().await.is_none());
    }
}
