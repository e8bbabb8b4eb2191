// JobSleuth - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "JobSleuth";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "JobSleuth";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Screen analysis
// =============================================================================

/// Job-name prefixes that identify Mastercard jobs on the shared screen.
/// Compared case-insensitively.
pub const MASTERCARD_JOB_PREFIXES: &[&str] = &["MCC", "L3", "L6"];

/// Job states that mark a monitored subsystem as running.
pub const ACTIVE_SUBSYSTEM_STATES: &[&str] = &["SELW", "DEQA"];

/// Fallback key stored as the primary user when no record has one.
pub const UNKNOWN_USER: &str = "UNKNOWN";

/// Fallback for the primary state / function of an empty analysis.
pub const NOT_AVAILABLE: &str = "N/A";

/// Placeholder row printed by the report for an empty count table.
pub const NO_DATA_LABEL: &str = "(no data)";

// =============================================================================
// Input limits
// =============================================================================

/// Maximum directory recursion depth when an input path is a directory.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Hard upper bound on max depth (prevents runaway traversal).
pub const ABSOLUTE_MAX_DEPTH: usize = 50;

/// Maximum number of input files accepted in one batch.
pub const MAX_INPUT_FILES: usize = 5_000;

/// Maximum size of a single OCR text file. OCR output of a screen capture is
/// a few KB; anything far beyond that is almost certainly the wrong file.
pub const DEFAULT_MAX_INPUT_FILE_SIZE: u64 = 16 * 1024 * 1024; // 16 MB

/// Hard upper bound on the configurable input file size.
pub const ABSOLUTE_MAX_INPUT_FILE_SIZE: u64 = 256 * 1024 * 1024; // 256 MB

/// Default include glob patterns applied to files found inside directories.
pub const DEFAULT_INCLUDE_PATTERNS: &[&str] = &["*.txt"];

/// Retry limits for transient I/O errors when reading inputs.
pub const MAX_READ_RETRIES: u32 = 3;
pub const READ_RETRY_DELAYS_MS: [u64; 3] = [50, 100, 200];

// =============================================================================
// Persistence
// =============================================================================

/// Retry limits for transient failures when writing an analysis.
pub const MAX_STORE_RETRIES: u32 = 3;
pub const STORE_RETRY_DELAYS_MS: [u64; 3] = [100, 250, 500];

/// History file name (stored in the platform data directory).
pub const HISTORY_FILE_NAME: &str = "history.jsonl";

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum length of a screen line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
