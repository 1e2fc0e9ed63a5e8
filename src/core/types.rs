// Request/response types for the translation pipeline
//
// Everything here is request-scoped; nothing outlives a single HTTP
// exchange. Wire field names are camelCase to match the frontend.

use std::collections::BTreeMap;

use serde::Serialize;

/// Parsed upload request. Exactly one of `image` or `text` must be
/// present; the orchestrator rejects anything else.
#[derive(Debug, Clone, Default)]
pub struct TranslateRequest {
    /// Raw uploaded image bytes.
    pub image: Option<Vec<u8>>,
    /// Direct text input (dev-mode alternative to an image).
    pub text: Option<String>,
    /// Requested target language codes, in request order.
    pub targets: Vec<String>,
}

/// Image bytes re-encoded to the canonical OCR input format (PNG,
/// grayscale, contrast-stretched, bounded resolution).
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
}

/// One successful upstream translation.
#[derive(Debug, Clone)]
pub struct Translation {
    pub text: String,
    /// Source language as reported by the upstream service, when it
    /// reports one. Takes precedence over the local detector's guess.
    pub detected_source: Option<String>,
}

/// Translated text as it appears on the wire: a bare string when a
/// single target was requested, a map keyed by target code otherwise.
/// `None` entries mark per-target translation failures.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TranslatedText {
    Single(Option<String>),
    Many(BTreeMap<String, Option<String>>),
}

/// Final JSON response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub original_text: String,
    pub detected_language: Option<String>,
    pub translated_text: TranslatedText,
}

impl TranslateResponse {
    /// The "nothing found" response: recognition ran fine but produced
    /// no text. Valid terminal outcome, not an error.
    pub fn empty(targets: &[String]) -> Self {
        let translated_text = if targets.len() == 1 {
            TranslatedText::Single(Some(String::new()))
        } else {
            TranslatedText::Many(
                targets
                    .iter()
                    .map(|t| (t.clone(), Some(String::new())))
                    .collect(),
            )
        };
        Self {
            original_text: String::new(),
            detected_language: None,
            translated_text,
        }
    }
}

/// Split a `target`/`targets` form value into trimmed, non-empty codes.
pub fn parse_targets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_targets() {
        assert_eq!(parse_targets("en"), vec!["en"]);
        assert_eq!(parse_targets("en, hi ,ta"), vec!["en", "hi", "ta"]);
        assert_eq!(parse_targets(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_single_target_serializes_as_string() {
        let response = TranslateResponse {
            original_text: "STOP".to_string(),
            detected_language: Some("en".to_string()),
            translated_text: TranslatedText::Single(Some("STOP".to_string())),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["originalText"], "STOP");
        assert_eq!(json["detectedLanguage"], "en");
        assert_eq!(json["translatedText"], "STOP");
    }

    #[test]
    fn test_multi_target_serializes_as_map_with_null_failures() {
        let mut map = BTreeMap::new();
        map.insert("hi".to_string(), Some("नमस्ते".to_string()));
        map.insert("ta".to_string(), None);

        let response = TranslateResponse {
            original_text: "hello".to_string(),
            detected_language: None,
            translated_text: TranslatedText::Many(map),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["detectedLanguage"], serde_json::Value::Null);
        assert_eq!(json["translatedText"]["hi"], "नमस्ते");
        assert_eq!(json["translatedText"]["ta"], serde_json::Value::Null);
    }

    #[test]
    fn test_empty_response_shape() {
        let single = TranslateResponse::empty(&["en".to_string()]);
        assert_eq!(
            single.translated_text,
            TranslatedText::Single(Some(String::new()))
        );

        let multi = TranslateResponse::empty(&["en".to_string(), "hi".to_string()]);
        match multi.translated_text {
            TranslatedText::Many(map) => {
                assert_eq!(map.len(), 2);
                assert!(map.values().all(|v| v.as_deref() == Some("")));
            }
            _ => panic!("expected map for multiple targets"),
        }
    }
}
