//! Centralized configuration for the shortcode CLI.
//!
//! All environment variables are loaded and validated at startup to fail fast
//! on misconfiguration rather than halfway through a command.

use std::env;
use std::fmt;

use domain::sanitize::Sanitizer;
use domain::trim::{DEFAULT_TRIM_LENGTH, DEFAULT_TRIM_SUFFIX};
use domain::Alphabet;

/// Built-in charset selected by `URL_CONVERT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlConvert {
    /// `0-9a-z`
    Base36,
    /// `0-9a-zA-Z`
    Base62,
}

impl UrlConvert {
    fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "36" => Some(Self::Base36),
            "62" => Some(Self::Base62),
            _ => None,
        }
    }

    fn alphabet(self) -> Alphabet {
        match self {
            Self::Base36 => Alphabet::base36(),
            Self::Base62 => Alphabet::base62(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Pretty
        }
    }
}

/// Configuration error.
#[derive(Debug)]
pub struct ConfigError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration error for {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// CLI configuration loaded from environment variables.
///
/// All fields are validated at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Short-code alphabet (`SHORTURL_CHARSET`, else the `URL_CONVERT` preset)
    pub alphabet: Alphabet,
    /// Preset in effect when no explicit charset is given (default: 36)
    pub url_convert: UrlConvert,
    /// Default `trim` length (default: 60)
    pub trim_length: usize,
    /// Default `trim` suffix (default: "[...]")
    pub trim_suffix: String,
    /// Log format
    pub log_format: LogFormat,
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// Fails fast on invalid configuration.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with a caller-supplied variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // URL_CONVERT preset
        let url_convert = match lookup("URL_CONVERT") {
            None => UrlConvert::Base36,
            Some(raw) => UrlConvert::parse(&raw).ok_or_else(|| ConfigError {
                field: "URL_CONVERT",
                message: format!("expected 36 or 62, got '{}'", raw),
            })?,
        };

        // Explicit charset wins over the preset
        let alphabet = match lookup("SHORTURL_CHARSET").filter(|s| !s.is_empty()) {
            Some(charset) => Alphabet::new(&charset).map_err(|e| ConfigError {
                field: "SHORTURL_CHARSET",
                message: e.to_string(),
            })?,
            None => url_convert.alphabet(),
        };

        // Trim length
        let trim_length = match lookup("TRIM_LENGTH") {
            None => DEFAULT_TRIM_LENGTH,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError {
                        field: "TRIM_LENGTH",
                        message: format!("expected a positive integer, got '{}'", raw),
                    })
                }
            },
        };

        // Trim suffix
        let trim_suffix = lookup("TRIM_SUFFIX").unwrap_or_else(|| DEFAULT_TRIM_SUFFIX.into());

        // Log format
        let log_format =
            LogFormat::from_str(&lookup("LOG_FORMAT").unwrap_or_else(|| "pretty".into()));

        Ok(Self {
            alphabet,
            url_convert,
            trim_length,
            trim_suffix,
            log_format,
        })
    }

    /// Build the process-wide sanitizer. A pattern that fails to compile is a
    /// configuration fault.
    pub fn sanitizer(&self) -> Result<Sanitizer, ConfigError> {
        Sanitizer::new(self.alphabet.clone()).map_err(|e| ConfigError {
            field: "SHORTURL_CHARSET",
            message: e.to_string(),
        })
    }

    /// Log notes about configuration that is legal but unusual.
    pub fn warn_if_unusual(&self) {
        if self.alphabet.len() < 10 {
            tracing::warn!(
                radix = self.alphabet.len(),
                "SHORTURL_CHARSET is very small: short codes will be long."
            );
        }
        if self.trim_suffix.chars().count() >= self.trim_length {
            tracing::warn!(
                trim_length = self.trim_length,
                "TRIM_SUFFIX is not shorter than TRIM_LENGTH: trimmed strings will be suffix only."
            );
        }
    }
}
