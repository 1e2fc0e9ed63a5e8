// Source-language detection heuristic
//
// Wraps whatlang and maps its ISO 639-3 output to the 2-letter codes the
// translation service expects. The result is a hint, never authoritative
// routing: short or ambiguous input yields None and the translator is
// asked to auto-detect instead.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Detection below this many characters is noise.
const MIN_TEXT_CHARS: usize = 10;

/// ISO 639-3 -> short code table. Covers the Indic languages the service
/// is pointed at, plus codes where first-two-letter truncation would be
/// wrong (cmn -> "cm", jpn -> "jp").
static ISO3_TO_SHORT: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("hin", "hi"),
        ("mar", "mr"),
        ("ben", "bn"),
        ("kan", "kn"),
        ("tel", "te"),
        ("tam", "ta"),
        ("mal", "ml"),
        ("eng", "en"),
        ("cmn", "zh"),
        ("jpn", "ja"),
    ])
});

/// Best-guess short language code for `text`, or None when the input is
/// too short or the detector is not confident.
pub fn detect_language(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    let info = whatlang::detect(trimmed)?;
    if !info.is_reliable() {
        return None;
    }

    Some(short_code(info.lang().code()))
}

/// Map an ISO 639-3 code through the fixed table, truncating unknown
/// codes to their first two characters as a best-effort fallback.
pub fn short_code(iso3: &str) -> String {
    match ISO3_TO_SHORT.get(iso3) {
        Some(short) => short.to_string(),
        None => iso3.chars().take(2).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_is_unknown() {
        assert_eq!(detect_language("STOP"), None);
        assert_eq!(detect_language("   "), None);
        assert_eq!(detect_language(""), None);
    }

    #[test]
    fn test_detects_english_sentence() {
        let text = "The quick brown fox jumps over the lazy dog near the river bank.";
        assert_eq!(detect_language(text), Some("en".to_string()));
    }

    #[test]
    fn test_detects_russian_via_truncation() {
        // "rus" is not in the table; the truncation fallback yields "ru"
        let text = "Привет, как у тебя дела сегодня? Надеюсь, всё хорошо.";
        assert_eq!(detect_language(text), Some("ru".to_string()));
    }

    #[test]
    fn test_devanagari_yields_a_code() {
        let text = "नमस्ते, आप कैसे हैं? मुझे आशा है कि आपका दिन अच्छा चल रहा है।";
        assert!(detect_language(text).is_some());
    }

    #[test]
    fn test_table_mapping_and_truncation_fallback() {
        assert_eq!(short_code("tam"), "ta");
        assert_eq!(short_code("cmn"), "zh");
        // Not in the table: truncated
        assert_eq!(short_code("spa"), "sp");
    }
}
