use std::time::Duration;

use crate::error::{Result, YttsError};

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const API_BASE_VAR: &str = "YTTS_API_BASE";
pub const TIMEOUT_VAR: &str = "YTTS_TIMEOUT_SECS";

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CAPTION_LANG: &str = "en";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub timeout: Duration,
    pub caption_lang: String,
}

impl Config {
    /// Read configuration from the environment. The API key is required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| YttsError::MissingApiKey {
                env_var: API_KEY_VAR.to_string(),
            })?;

        let api_base = lookup(API_BASE_VAR)
            .map(|b| b.trim().trim_end_matches('/').to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let timeout_secs = match lookup(TIMEOUT_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| YttsError::InvalidConfig {
                    env_var: TIMEOUT_VAR.to_string(),
                    reason: format!("expected a positive number of seconds, got {raw:?}"),
                })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            api_base,
            timeout: Duration::from_secs(timeout_secs),
            caption_lang: DEFAULT_CAPTION_LANG.to_string(),
        })
    }

    pub fn with_caption_lang(mut self, lang: impl Into<String>) -> Self {
        self.caption_lang = lang.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn api_key_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, YttsError::MissingApiKey { .. }));

        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, YttsError::MissingApiKey { .. }));
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[(API_KEY_VAR, "key")])).unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.caption_lang, "en");
    }

    #[test]
    fn overrides_are_read() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "key"),
            (API_BASE_VAR, "http://localhost:8080/v3/"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap()
        .with_caption_lang("de");
        assert_eq!(config.api_base, "http://localhost:8080/v3");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.caption_lang, "de");
    }

    #[test]
    fn rejects_bad_timeout() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "key"), (TIMEOUT_VAR, "soon")]))
            .unwrap_err();
        assert!(matches!(err, YttsError::InvalidConfig { .. }));
    }
}
