use crate::core::errors::{ConfigError, ConfigResult};
use std::env;
use tracing::Level;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Bind address. Loopback by default; set SERVER_HOST=0.0.0.0 to
    /// make the service reachable from the LAN (phone testing).
    pub host: String,
    pub log_level: Level,
    pub max_upload_bytes: usize,
}

/// OCR configuration
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// Tesseract language models loaded at engine initialization
    /// (comma-separated in OCR_LANGS, e.g. "eng,hin").
    pub languages: Vec<String>,
    /// Override for the tessdata directory; engine default when unset.
    pub tessdata_dir: Option<String>,
    pub timeout_secs: u64,
    /// Longer image dimension is capped here before recognition.
    pub max_image_dimension: u32,
}

/// Upstream translation service configuration
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Targets used when the request names none.
    pub default_targets: Vec<String>,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub translator: TranslatorConfig,
}

impl Config {
    pub fn new() -> ConfigResult<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> ConfigResult<Self> {
        // Parse log level
        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(Level::INFO);

        Ok(Self {
            server: ServerConfig {
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                log_level,
                max_upload_bytes: env::var("MAX_UPLOAD_MB")
                    .ok()
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(10)
                    * 1024
                    * 1024,
            },
            ocr: OcrConfig {
                languages: split_csv(
                    &env::var("OCR_LANGS").unwrap_or_else(|_| "eng".to_string()),
                ),
                tessdata_dir: env::var("TESSDATA_DIR").ok().filter(|s| !s.is_empty()),
                timeout_secs: env::var("OCR_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
                max_image_dimension: env::var("MAX_IMAGE_DIMENSION")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1600),
            },
            translator: TranslatorConfig {
                base_url: env::var("TRANSLATE_URL")
                    .unwrap_or_else(|_| "http://127.0.0.1:8000".to_string()),
                timeout_secs: env::var("TRANSLATE_TIMEOUT_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
                default_targets: split_csv(
                    &env::var("DEFAULT_TARGET").unwrap_or_else(|_| "en".to_string()),
                ),
            },
        })
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.ocr.languages.is_empty() {
            return Err(ConfigError::NoOcrLanguages);
        }

        if self.translator.default_targets.is_empty() {
            return Err(ConfigError::NoDefaultTargets);
        }

        if !(320..=4096).contains(&self.ocr.max_image_dimension) {
            return Err(ConfigError::InvalidMaxDimension(
                self.ocr.max_image_dimension,
            ));
        }

        if self.ocr.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "OCR_TIMEOUT_SECONDS must be > 0".to_string(),
            ));
        }
        if self.translator.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(
                "TRANSLATE_TIMEOUT_SECONDS must be > 0".to_string(),
            ));
        }

        if !self.translator.base_url.starts_with("http://")
            && !self.translator.base_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidTranslatorUrl(
                self.translator.base_url.clone(),
            ));
        }

        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidUploadLimit);
        }

        Ok(())
    }

    pub fn server_port(&self) -> u16 {
        self.server.port
    }

    pub fn server_host(&self) -> &str {
        &self.server.host
    }

    pub fn log_level(&self) -> Level {
        self.server.log_level
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// Note: No Default implementation because Config::new() can fail
// Users should explicitly call Config::new()? and handle errors

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            server: ServerConfig {
                port: 5000,
                host: "127.0.0.1".to_string(),
                log_level: Level::INFO,
                max_upload_bytes: 10 * 1024 * 1024,
            },
            ocr: OcrConfig {
                languages: vec!["eng".to_string()],
                tessdata_dir: None,
                timeout_secs: 30,
                max_image_dimension: 1600,
            },
            translator: TranslatorConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                timeout_secs: 30,
                default_targets: vec!["en".to_string()],
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_language_list() {
        let mut config = base_config();
        config.ocr.languages.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NoOcrLanguages)
        ));
    }

    #[test]
    fn test_rejects_bad_translator_url() {
        let mut config = base_config();
        config.translator.base_url = "indictrans2:5000".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTranslatorUrl(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_dimension() {
        let mut config = base_config();
        config.ocr.max_image_dimension = 100;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMaxDimension(100))
        ));
    }
}
