// Request orchestrator: the one place with sequencing logic
//
// Drives validate -> normalize -> recognize -> detect -> translate for a
// single request. Normalization failures fall back to the raw bytes,
// empty OCR output short-circuits to an empty-but-OK response, and each
// target language is translated independently so one upstream failure
// never voids the others. Nothing is retried.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::core::config::Config;
use crate::core::errors::{PipelineError, PipelineResult, RecognitionError, TranslationError};
use crate::core::types::{
    TranslateRequest, TranslateResponse, TranslatedText, Translation,
};
use crate::services::{language, normalizer, RecognizerService, TranslationClient};

pub struct Orchestrator {
    config: Arc<Config>,
    recognizer: Arc<RecognizerService>,
    translator: TranslationClient,
}

impl Orchestrator {
    pub fn new(config: Arc<Config>) -> anyhow::Result<Self> {
        let recognizer = Arc::new(RecognizerService::new(&config.ocr));
        let translator = TranslationClient::new(&config.translator)?;
        Ok(Self {
            config,
            recognizer,
            translator,
        })
    }

    /// Shared recognizer handle, used for shutdown on process exit.
    pub fn recognizer(&self) -> Arc<RecognizerService> {
        Arc::clone(&self.recognizer)
    }

    /// Run the full pipeline for one request.
    pub async fn handle(&self, request: TranslateRequest) -> PipelineResult<TranslateResponse> {
        let targets = if request.targets.is_empty() {
            self.config.translator.default_targets.clone()
        } else {
            request.targets.clone()
        };

        let text = match (request.image, request.text) {
            (None, None) => {
                return Err(PipelineError::BadRequest(
                    "no image or text supplied".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(PipelineError::BadRequest(
                    "supply either an image or text, not both".to_string(),
                ))
            }
            (Some(image), None) => self.extract_text(image).await?,
            (None, Some(text)) => {
                let text = text.trim().to_string();
                if text.is_empty() {
                    return Err(PipelineError::BadRequest(
                        "text field is empty".to_string(),
                    ));
                }
                text
            }
        };

        Ok(self.respond(text, targets).await)
    }

    /// Post-recognition path: detect, fan out, assemble. Empty text is
    /// the valid "nothing found" outcome and short-circuits before any
    /// upstream call.
    async fn respond(&self, text: String, targets: Vec<String>) -> TranslateResponse {
        if text.is_empty() {
            info!("no text recognized in image");
            return TranslateResponse::empty(&targets);
        }

        let detected = language::detect_language(&text);
        debug!("locally detected source language: {:?}", detected);

        let outcomes = self.translate_all(&text, detected.as_deref(), &targets).await;
        assemble_response(text, detected, &targets, outcomes)
    }

    /// Normalize (best-effort) and recognize, under a bounded timeout.
    async fn extract_text(&self, image: Vec<u8>) -> PipelineResult<String> {
        let max_dimension = self.config.ocr.max_image_dimension;
        let ocr_input = match normalizer::normalize(image.clone(), max_dimension).await {
            Ok(normalized) => normalized.bytes,
            Err(e) => {
                warn!("image normalization failed, using raw bytes: {}", e);
                image
            }
        };

        let budget = self.config.ocr.timeout_secs;
        let recognized = timeout(
            Duration::from_secs(budget),
            self.recognizer
                .recognize(ocr_input, &self.config.ocr.languages),
        )
        .await
        .map_err(|_| RecognitionError::TimedOut(budget))??;

        Ok(recognized)
    }

    /// Fan out one translation call per target, concurrently. Failures
    /// stay per-target.
    async fn translate_all(
        &self,
        text: &str,
        source_hint: Option<&str>,
        targets: &[String],
    ) -> Vec<Result<Translation, TranslationError>> {
        let calls = targets
            .iter()
            .map(|target| self.translator.translate(text, source_hint, target));
        let outcomes = join_all(calls).await;

        for (target, outcome) in targets.iter().zip(&outcomes) {
            if let Err(e) = outcome {
                warn!("translation to '{}' failed: {}", target, e);
            }
        }
        outcomes
    }
}

/// Shape the final response. Detected-language precedence: the upstream
/// service's reported detection wins when present, else the local guess.
fn assemble_response(
    original_text: String,
    local_detected: Option<String>,
    targets: &[String],
    outcomes: Vec<Result<Translation, TranslationError>>,
) -> TranslateResponse {
    let upstream_detected = outcomes
        .iter()
        .filter_map(|o| o.as_ref().ok())
        .find_map(|t| t.detected_source.clone());

    let mut texts = outcomes
        .into_iter()
        .map(|o| o.ok().map(|t| t.text))
        .collect::<Vec<_>>();

    let translated_text = if targets.len() == 1 {
        TranslatedText::Single(texts.pop().flatten())
    } else {
        TranslatedText::Many(
            targets
                .iter()
                .cloned()
                .zip(texts)
                .collect::<BTreeMap<_, _>>(),
        )
    };

    TranslateResponse {
        original_text,
        detected_language: upstream_detected.or(local_detected),
        translated_text,
    }
}
