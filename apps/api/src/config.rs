use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::analysis::{ExtractionLimits, ServiceLimits};

/// Application configuration loaded from environment variables.
/// Every variable is optional; unparsable values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Request body ceiling for uploads.
    pub max_upload_bytes: usize,
    pub limits: ServiceLimits,
    /// JSON file extending the built-in vocabulary.
    pub vocabulary_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = ServiceLimits::default();
        let extraction = ExtractionLimits {
            max_keywords: env_or("MAX_KEYWORDS", defaults.extraction.max_keywords)?,
            max_phrase_words: env_or("MAX_PHRASE_WORDS", defaults.extraction.max_phrase_words)?,
            min_word_chars: env_or("MIN_WORD_CHARS", defaults.extraction.min_word_chars)?,
            min_phrase_frequency: env_or(
                "MIN_PHRASE_FREQUENCY",
                defaults.extraction.min_phrase_frequency,
            )?,
        };

        Ok(Config {
            port: env_or("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            limits: ServiceLimits {
                extraction,
                max_job_description_chars: env_or(
                    "MAX_JOB_DESCRIPTION_CHARS",
                    defaults.max_job_description_chars,
                )?,
                max_resume_keywords: env_or("MAX_RESUME_KEYWORDS", defaults.max_resume_keywords)?,
                cache_capacity: env_or("EXTRACTION_CACHE_CAPACITY", defaults.cache_capacity)?,
            },
            vocabulary_path: std::env::var_os("VOCABULARY_PATH").map(PathBuf::from),
        })
    }
}

/// Reads `key` and parses it, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} must be a valid {}", std::any::type_name::<T>()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_trims_and_parses() {
        let port: u16 = parse_value("PORT", " 9090 ").unwrap();
        assert_eq!(port, 9090);
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_env_or_uses_default_when_unset() {
        let value: usize = env_or("ANALYZER_TEST_SURELY_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
