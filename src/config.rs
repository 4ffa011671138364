//! Configuration file support for ferro-wcs.
//!
//! This module provides loading of `.ferro-wcs.toml` configuration files
//! which can set the simplification tolerance and channel defaults.
//!
//! # Example Configuration
//!
//! ```toml
//! [tolerance]
//! epsilon = 1e-10
//!
//! [channel]
//! encoding = "native"
//! indent = 3
//! comments = true
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-wcs.toml` in current directory
//! 2. `~/.config/ferro-wcs/config.toml`
//!
//! The tolerance governs when two mappings count as equal during
//! simplification cancellation; it is deliberately a configurable value,
//! not a universal constant. Callers needing a different tolerance for a
//! single comparison use `Mapping::same_as_with`.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use once_cell::sync::Lazy;

/// Default simplification/equality tolerance
pub const DEFAULT_EPSILON: f64 = 1e-12;

/// Default channel indent step, in spaces
pub const DEFAULT_INDENT: usize = 3;

/// Parsed configuration from a .ferro-wcs.toml file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WcsConfig {
    /// Tolerance section.
    pub tolerance: ToleranceConfig,
    /// Channel defaults section.
    pub channel: ChannelConfig,
}

/// Tolerance section of the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToleranceConfig {
    /// Float comparison tolerance for mapping equality.
    pub epsilon: Option<f64>,
}

/// Channel section of the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelConfig {
    /// Default encoding name: "native", "cards" or "markup".
    pub encoding: Option<String>,
    /// Indent step for the native encoding.
    pub indent: Option<usize>,
    /// Whether writers emit descriptive comments.
    pub comments: Option<bool>,
}

impl WcsConfig {
    /// Load configuration from the default locations.
    ///
    /// Returns the default configuration when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd_config = PathBuf::from(".ferro-wcs.toml");
        if cwd_config.exists() {
            return Self::load_from(&cwd_config);
        }
        if let Some(home) = std::env::var_os("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("ferro-wcs")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from(&home_config);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    ///
    /// Only the small subset of TOML this file uses is understood:
    /// `[section]` headers and `key = value` lines with numeric, boolean
    /// or quoted-string values.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut section = String::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = strip_comment(raw).trim().to_string();
            if line.is_empty() {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = name.trim().to_string();
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| {
                ConfigError::Parse(format!("line {}: expected `key = value`", lineno + 1))
            })?;
            let key = key.trim();
            let value = value.trim();
            match (section.as_str(), key) {
                ("tolerance", "epsilon") => {
                    let eps: f64 = value.parse().map_err(|_| {
                        ConfigError::Parse(format!("line {}: invalid epsilon `{value}`", lineno + 1))
                    })?;
                    if !(eps.is_finite() && eps >= 0.0) {
                        return Err(ConfigError::Parse(format!(
                            "line {}: epsilon must be finite and non-negative",
                            lineno + 1
                        )));
                    }
                    config.tolerance.epsilon = Some(eps);
                }
                ("channel", "encoding") => {
                    let name = unquote(value);
                    match name.as_str() {
                        "native" | "cards" | "markup" => {
                            config.channel.encoding = Some(name);
                        }
                        other => {
                            return Err(ConfigError::Parse(format!(
                                "line {}: unknown encoding `{other}`",
                                lineno + 1
                            )))
                        }
                    }
                }
                ("channel", "indent") => {
                    let indent: usize = value.parse().map_err(|_| {
                        ConfigError::Parse(format!("line {}: invalid indent `{value}`", lineno + 1))
                    })?;
                    config.channel.indent = Some(indent);
                }
                ("channel", "comments") => {
                    let comments = match value {
                        "true" => true,
                        "false" => false,
                        other => {
                            return Err(ConfigError::Parse(format!(
                                "line {}: invalid boolean `{other}`",
                                lineno + 1
                            )))
                        }
                    };
                    config.channel.comments = Some(comments);
                }
                // Unknown keys are ignored so configs stay forward-compatible
                _ => {}
            }
        }
        Ok(config)
    }

    /// Effective epsilon, falling back to the built-in default.
    pub fn epsilon(&self) -> f64 {
        self.tolerance.epsilon.unwrap_or(DEFAULT_EPSILON)
    }

    /// Effective channel indent step.
    pub fn indent(&self) -> usize {
        self.channel.indent.unwrap_or(DEFAULT_INDENT)
    }
}

fn strip_comment(line: &str) -> &str {
    // A `#` outside quotes starts a comment
    let mut in_quotes = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

fn unquote(value: &str) -> String {
    value
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

/// Errors from config loading.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config IO error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

static GLOBAL: Lazy<WcsConfig> = Lazy::new(|| match WcsConfig::load() {
    Ok(config) => config,
    Err(e) => {
        log::warn!("ignoring unreadable ferro-wcs config: {e}");
        WcsConfig::default()
    }
});

/// The process-wide configuration, loaded once on first use.
pub fn global() -> &'static WcsConfig {
    &GLOBAL
}

/// The configured default tolerance for mapping equality.
pub fn default_epsilon() -> f64 {
    global().epsilon()
}
