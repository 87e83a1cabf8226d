//! Configuration loading and config file resolution
//!
//! Config file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`TUNER_CONFIG`)
//! 3. `<user config dir>/tuner/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! Every key is optional; a partial file is merged over the defaults.

use crate::{AudioFormat, Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "TUNER_CONFIG";

/// Placeholder replaced by the track path in the library-add template
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Configuration loaded from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Transcoder output format
    pub target_format: AudioFormat,

    /// Regex matched against file names to find source tracks
    pub source_pattern: String,

    /// Regex matched against file names to find files removed by `clean`
    ///
    /// The completion marker is always included in addition to this pattern.
    pub clean_pattern: String,

    /// Supported cover images, in priority order
    pub cover_names: Vec<String>,

    /// File name of the generated thumbnail
    pub thumbnail_name: String,

    /// Width in pixels the cover is resampled to
    pub thumbnail_width: u32,

    /// File name of the completion marker
    pub marker_name: String,

    /// Maximum directory depth visited by discovery
    pub max_depth: usize,

    /// Per-invocation timeout for external tools; 0 disables
    pub tool_timeout_secs: u64,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// External tool configuration
    pub tools: ToolsConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

/// External tool programs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Transcoder program
    pub transcoder: String,
    /// Artwork resize program
    pub resizer: String,
    /// Artwork embed program
    pub embedder: String,
    /// Library-add argv template; `{file}` is replaced by the track path
    pub library_add: Vec<String>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            target_format: AudioFormat::Alac,
            source_pattern: r"(?i)\.flac$".to_string(),
            clean_pattern: r"(?i)(\.flac|\.m3u8?|\.cue)$".to_string(),
            cover_names: vec![
                "cover.jpg".to_string(),
                "cover.jpeg".to_string(),
                "cover.png".to_string(),
                "folder.jpg".to_string(),
            ],
            thumbnail_name: "cover500.jpg".to_string(),
            thumbnail_width: 500,
            marker_name: ".processed".to_string(),
            max_depth: 16,
            tool_timeout_secs: 1800,
            logging: LoggingConfig::default(),
            tools: ToolsConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            transcoder: "xld".to_string(),
            resizer: "sips".to_string(),
            embedder: "mp4art".to_string(),
            library_add: vec![
                "osascript".to_string(),
                "-e".to_string(),
                format!(
                    "tell application \"Music\" to add POSIX file \"{}\"",
                    FILE_PLACEHOLDER
                ),
            ],
        }
    }
}

impl TomlConfig {
    /// Parse a TOML document, validating patterns and tool settings
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check every value that can only be validated after parsing
    pub fn validate(&self) -> Result<()> {
        self.source_regex()?;
        self.clean_regex()?;
        validate_file_name("marker_name", &self.marker_name)?;
        validate_file_name("thumbnail_name", &self.thumbnail_name)?;

        if self.cover_names.is_empty() {
            return Err(Error::Config("cover_names must not be empty".to_string()));
        }
        if self.thumbnail_width == 0 {
            return Err(Error::Config("thumbnail_width must be positive".to_string()));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max_depth must be at least 1".to_string()));
        }
        if self.tools.library_add.is_empty() {
            return Err(Error::Config("tools.library_add must name a program".to_string()));
        }
        Ok(())
    }

    /// Compiled source-track pattern
    pub fn source_regex(&self) -> Result<Regex> {
        compile_pattern("source_pattern", &self.source_pattern)
    }

    /// Compiled clean pattern, extended with the completion marker name
    pub fn clean_regex(&self) -> Result<Regex> {
        let pattern = format!(
            "(?:{})|^{}$",
            self.clean_pattern,
            regex::escape(&self.marker_name)
        );
        compile_pattern("clean_pattern", &pattern)
    }

    /// Pattern matching the transcoder's output files
    pub fn target_regex(&self) -> Result<Regex> {
        let pattern = format!(r"(?i)\.{}$", regex::escape(self.target_format.extension()));
        compile_pattern("target_format", &pattern)
    }

    /// Tool timeout, `None` when disabled
    pub fn tool_timeout(&self) -> Option<Duration> {
        match self.tool_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

/// A name that must stay a single entry inside the album directory
fn validate_file_name(key: &str, name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::Config(format!(
            "{} must be a plain file name, got '{}'",
            key, name
        ))),
    }
}

fn compile_pattern(key: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Config(format!("Invalid {} '{}': {}", key, pattern, e)))
}

/// Where a config file path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config` argument
    CommandLine,
    /// `TUNER_CONFIG` environment variable
    Environment,
    /// Per-user default location
    UserDefault,
}

/// Resolve the config file path following the documented priority order
///
/// Returns `None` when no candidate exists; callers then use compiled defaults.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<(PathBuf, ConfigSource)> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some((path.to_path_buf(), ConfigSource::CommandLine));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some((PathBuf::from(path), ConfigSource::Environment));
        }
    }

    // Priority 3: Per-user config file
    default_config_path()
        .filter(|path| path.exists())
        .map(|path| (path, ConfigSource::UserDefault))
}

/// Per-user config file location (`~/.config/tuner/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tuner").join("config.toml"))
}

/// Load configuration following the resolution order
///
/// An explicitly named file (CLI or environment) must exist and parse. With no
/// candidate file the compiled defaults are returned.
pub fn load_config(cli_arg: Option<&Path>) -> Result<TomlConfig> {
    match resolve_config_path(cli_arg) {
        Some((path, source)) => {
            let config = TomlConfig::load(&path)?;
            info!(path = %path.display(), ?source, "Loaded configuration");
            Ok(config)
        }
        None => {
            warn!("No config file found, using compiled defaults");
            Ok(TomlConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        config.validate().unwrap();
        assert_eq!(config.target_format, AudioFormat::Alac);
        assert_eq!(config.marker_name, ".processed");
        assert_eq!(config.tool_timeout(), Some(Duration::from_secs(1800)));
    }

    #[test]
    fn test_partial_toml_merges_over_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            target_format = "aac"
            tool_timeout_secs = 0

            [tools]
            transcoder = "/opt/xld/xld"
            "#,
        )
        .unwrap();

        assert_eq!(config.target_format, AudioFormat::Aac);
        assert_eq!(config.tool_timeout(), None);
        assert_eq!(config.tools.transcoder, "/opt/xld/xld");
        assert_eq!(config.tools.embedder, "mp4art");
        assert_eq!(config.thumbnail_width, 500);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = TomlConfig::from_toml_str(r#"source_pattern = "(unclosed""#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("source_pattern"));
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(TomlConfig::from_toml_str(r#"target_format = "opus""#).is_err());
    }

    #[test]
    fn test_clean_regex_includes_marker() {
        let config = TomlConfig::default();
        let clean = config.clean_regex().unwrap();
        assert!(clean.is_match(".processed"));
        assert!(clean.is_match("01 Track.FLAC"));
        assert!(clean.is_match("album.m3u8"));
        assert!(clean.is_match("album.cue"));
        assert!(!clean.is_match("01 Track.m4a"));
        assert!(!clean.is_match("cover.jpg"));
        assert!(!clean.is_match("x.processed.bak"));
    }

    #[test]
    fn test_marker_and_thumbnail_must_be_plain_names() {
        for bad in ["", ".", "..", "../escape", "sub/.processed", "/abs"] {
            let err = TomlConfig::from_toml_str(&format!("marker_name = {:?}", bad)).unwrap_err();
            assert!(err.to_string().contains("marker_name"), "accepted {:?}", bad);

            let err = TomlConfig::from_toml_str(&format!("thumbnail_name = {:?}", bad)).unwrap_err();
            assert!(err.to_string().contains("thumbnail_name"), "accepted {:?}", bad);
        }
        TomlConfig::from_toml_str(r#"marker_name = ".done""#).unwrap();
    }

    #[test]
    fn test_target_regex_follows_format() {
        let config = TomlConfig::default();
        let target = config.target_regex().unwrap();
        assert!(target.is_match("01 Track.m4a"));
        assert!(!target.is_match("01 Track.flac"));
    }
}
