// JobSleuth - platform/config.rs
//
// Platform-specific configuration, data directory resolution, and config.toml
// loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Output formats accepted by `[output] format`.
pub const OUTPUT_FORMATS: &[&str] = &["text", "json", "csv"];

/// Resolved platform paths for JobSleuth data and configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/jobsleuth/ or %APPDATA%\JobSleuth\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the analysis history.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    /// Default location of the analysis history.
    pub fn history_file(&self) -> PathBuf {
        self.data_dir.join(constants::HISTORY_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[analysis]` section.
    pub analysis: AnalysisSection,
    /// `[input]` section.
    pub input: InputSection,
    /// `[output]` section.
    pub output: OutputSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[store]` section.
    pub store: StoreSection,
}

/// `[analysis]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct AnalysisSection {
    /// Brand used when `--brand` is not given.
    pub default_brand: Option<String>,
    /// Join all inputs into one multi-page capture.
    pub join_pages: Option<bool>,
}

/// `[input]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Filename globs applied inside directories.
    pub include_patterns: Option<Vec<String>>,
    /// Maximum directory recursion depth.
    pub max_depth: Option<usize>,
    /// Maximum size of one input file in bytes.
    pub max_file_size_bytes: Option<u64>,
}

/// `[output]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// "text", "json" or "csv".
    pub format: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// `[store]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// History file path; empty or absent = platform data directory.
    pub path: Option<String>,
}

/// Validated application configuration derived from `config.toml`.
///
/// Invalid values produce actionable warnings and fall back to defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Analysis --
    /// Brand name as written in the file; parsed by the caller.
    pub default_brand: Option<String>,
    pub join_pages: bool,

    // -- Input --
    pub include_patterns: Vec<String>,
    pub max_depth: usize,
    pub max_file_size: u64,

    // -- Output --
    /// One of `OUTPUT_FORMATS`.
    pub output_format: String,

    // -- Logging --
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,

    // -- Store --
    pub store_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_brand: None,
            join_pages: false,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_file_size: constants::DEFAULT_MAX_INPUT_FILE_SIZE,
            output_format: "text".to_string(),
            log_level: None,
            store_path: None,
        }
    }
}

/// Load and validate `config.toml` from the given config directory.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings (first run).
/// If the file is unreadable or unparseable, returns defaults with a warning.
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    let config_path = config_dir.join(constants::CONFIG_FILE_NAME);
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), warnings);
    }

    let raw = match read_raw_config(&config_path) {
        Ok(r) => r,
        Err(e) => {
            let msg = format!("{e}. Using defaults.");
            tracing::warn!("{}", msg);
            warnings.push(msg);
            return (AppConfig::default(), warnings);
        }
    };

    tracing::info!(path = %config_path.display(), "Loaded config.toml");
    let (config, mut field_warnings) = validate(raw);
    warnings.append(&mut field_warnings);

    if !warnings.is_empty() {
        tracing::warn!(count = warnings.len(), "Config validation produced warnings");
    }

    (config, warnings)
}

fn read_raw_config(path: &Path) -> Result<RawConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })
}

fn out_of_range(field: &str, value: impl ToString, expected: String) -> String {
    ConfigError::ValueOutOfRange {
        field: field.to_string(),
        value: value.to_string(),
        expected,
    }
    .to_string()
}

/// Validate each field against named constants, accumulating all problems.
fn validate(raw: RawConfig) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    // -- Analysis --
    if let Some(brand) = raw.analysis.default_brand {
        if !brand.trim().is_empty() {
            config.default_brand = Some(brand);
        }
    }
    if let Some(join) = raw.analysis.join_pages {
        config.join_pages = join;
    }

    // -- Input: include_patterns --
    if let Some(patterns) = raw.input.include_patterns {
        let (valid, invalid): (Vec<String>, Vec<String>) = patterns
            .into_iter()
            .partition(|p| glob::Pattern::new(p).is_ok());
        for p in &invalid {
            warnings.push(format!(
                "[input] include_patterns entry \"{p}\" is not a valid glob. Ignoring it."
            ));
        }
        config.include_patterns = valid;
    }

    // -- Input: max_depth --
    if let Some(depth) = raw.input.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(out_of_range(
                "[input] max_depth",
                depth,
                format!(
                    "1-{}. Using default ({})",
                    constants::ABSOLUTE_MAX_DEPTH,
                    constants::DEFAULT_MAX_DEPTH
                ),
            ));
        }
    }

    // -- Input: max_file_size_bytes --
    if let Some(size) = raw.input.max_file_size_bytes {
        if (1..=constants::ABSOLUTE_MAX_INPUT_FILE_SIZE).contains(&size) {
            config.max_file_size = size;
        } else {
            warnings.push(out_of_range(
                "[input] max_file_size_bytes",
                size,
                format!(
                    "1-{}. Using default ({})",
                    constants::ABSOLUTE_MAX_INPUT_FILE_SIZE,
                    constants::DEFAULT_MAX_INPUT_FILE_SIZE
                ),
            ));
        }
    }

    // -- Output: format --
    if let Some(format) = raw.output.format {
        let lower = format.to_lowercase();
        if OUTPUT_FORMATS.contains(&lower.as_str()) {
            config.output_format = lower;
        } else {
            warnings.push(format!(
                "[output] format = \"{format}\" is not recognised. \
                 Valid values: text, json, csv. Using default (text).",
            ));
        }
    }

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    // -- Store: path --
    if let Some(path) = raw.store.path {
        if !path.is_empty() {
            config.store_path = Some(PathBuf::from(path));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(body: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), body).unwrap();
        dir
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert_eq!(config.output_format, "text");
        assert_eq!(config.include_patterns, vec!["*.txt"]);
        assert!(!config.join_pages);
    }

    #[test]
    fn test_valid_config_applied() {
        let dir = write_config(
            r#"
            [analysis]
            default_brand = "mastercard"
            join_pages = true

            [input]
            include_patterns = ["*.txt", "*.ocr"]
            max_file_size_bytes = 1024

            [output]
            format = "JSON"

            [logging]
            level = "debug"

            [store]
            path = "/var/lib/jobsleuth/history.jsonl"
            "#,
        );
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.default_brand.as_deref(), Some("mastercard"));
        assert!(config.join_pages);
        assert_eq!(config.include_patterns, vec!["*.txt", "*.ocr"]);
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.output_format, "json");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(
            config.store_path,
            Some(PathBuf::from("/var/lib/jobsleuth/history.jsonl"))
        );
    }

    #[test]
    fn test_out_of_range_values_fall_back_with_warnings() {
        let dir = write_config(
            r#"
            [input]
            max_depth = 0
            max_file_size_bytes = 0

            [output]
            format = "pdf"

            [logging]
            level = "loud"
            "#,
        );
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 4);
        assert_eq!(config.max_depth, constants::DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_file_size, constants::DEFAULT_MAX_INPUT_FILE_SIZE);
        assert_eq!(config.output_format, "text");
        assert!(config.log_level.is_none());
        assert!(warnings[0].contains("'[input] max_depth' = '0' is out of range"));
    }

    #[test]
    fn test_unparseable_file_gives_defaults_and_warning() {
        let dir = write_config("[analysis\njoin_pages = ");
        let (config, warnings) = load_config(dir.path());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].starts_with("Config parse error"));
        assert!(!config.join_pages);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let dir = write_config("[future]\nsetting = 1\n[analysis]\njoin_pages = true\n");
        let (config, warnings) = load_config(dir.path());
        assert!(warnings.is_empty());
        assert!(config.join_pages);
    }
}
