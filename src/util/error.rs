// JobSleuth - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// The analysis core itself never fails; every error here belongs to an edge
// (reading inputs, config, export, report, persistence).

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all JobSleuth operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum JobSleuthError {
    /// Reading or selecting input text failed.
    Input(InputError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// Export operation failed.
    Export(ExportError),

    /// Report rendering failed.
    Report(ReportError),

    /// Persisting an analysis failed.
    Store(StoreError),
}

impl fmt::Display for JobSleuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(e) => write!(f, "Input error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Report(e) => write!(f, "Report error: {e}"),
            Self::Store(e) => write!(f, "Store error: {e}"),
        }
    }
}

impl std::error::Error for JobSleuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Report(e) => Some(e),
            Self::Store(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Input errors
// ---------------------------------------------------------------------------

/// Errors related to locating and reading OCR text inputs.
#[derive(Debug)]
pub enum InputError {
    /// The input path does not exist.
    NotFound { path: PathBuf },

    /// The input file exceeds the configured size limit.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// Too many input files were selected.
    TooManyFiles { count: usize, max: usize },

    /// A brand name is not one of the supported brands.
    UnknownBrand { value: String },

    /// No brand on the command line and none configured.
    MissingBrand,

    /// Walkdir traversal error while expanding a directory input.
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },

    /// I/O error while reading an input.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { path } => {
                write!(f, "Input path '{}' does not exist", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Input '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::TooManyFiles { count, max } => write!(
                f,
                "{count} input files selected, maximum is {max}. Narrow the input paths."
            ),
            Self::UnknownBrand { value } => write!(
                f,
                "Unknown brand '{value}'. Expected one of: VISA, MASTERCARD, AMEX"
            ),
            Self::MissingBrand => write!(
                f,
                "No brand given: pass -b or set [analysis] default_brand in config.toml"
            ),
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "'{}': I/O error: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for InputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Traversal { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<InputError> for JobSleuthError {
    fn from(e: InputError) -> Self {
        Self::Input(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for JobSleuthError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to export operations.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the export file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV export error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for JobSleuthError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to report rendering. Always fatal to the report action.
#[derive(Debug)]
pub enum ReportError {
    /// I/O error writing the rendered report.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Cannot write report '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

impl From<ReportError> for JobSleuthError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

/// Errors related to persisting analyses.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error reading or writing the store.
    Io { path: PathBuf, source: io::Error },

    /// A batch could not be serialised.
    Serialize {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// All retry attempts for a transient failure were used up.
    RetriesExhausted {
        attempts: u32,
        last: Box<StoreError>,
    },
}

impl StoreError {
    /// Returns true for failures worth retrying (transient I/O).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted | io::ErrorKind::TimedOut
            ),
            Self::Serialize { .. } | Self::RetriesExhausted { .. } => false,
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Store I/O error '{}': {source}", path.display())
            }
            Self::Serialize { path, source } => {
                write!(f, "Cannot serialise analysis for '{}': {source}", path.display())
            }
            Self::RetriesExhausted { attempts, last } => {
                write!(f, "Gave up after {attempts} attempts: {last}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
            Self::RetriesExhausted { last, .. } => Some(last.as_ref()),
        }
    }
}

impl From<StoreError> for JobSleuthError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

/// Convenience type alias for JobSleuth results.
pub type Result<T> = std::result::Result<T, JobSleuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_retry_classification() {
        let transient = StoreError::Io {
            path: PathBuf::from("history.jsonl"),
            source: io::Error::from(io::ErrorKind::Interrupted),
        };
        let permanent = StoreError::Io {
            path: PathBuf::from("history.jsonl"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(transient.is_retryable());
        assert!(!permanent.is_retryable());

        let exhausted = StoreError::RetriesExhausted {
            attempts: 3,
            last: Box::new(transient),
        };
        assert!(!exhausted.is_retryable());
    }

    #[test]
    fn test_error_chain_preserves_source() {
        use std::error::Error;
        let err: JobSleuthError = InputError::Io {
            path: PathBuf::from("screen.txt"),
            source: io::Error::from(io::ErrorKind::NotFound),
        }
        .into();
        assert!(err.to_string().starts_with("Input error:"));
        let input = err.source().expect("top-level error should expose its cause");
        assert!(input.source().is_some());
    }
}
