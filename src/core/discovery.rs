// JobSleuth - core/discovery.rs
//
// Expansion of command-line input paths into the ordered list of OCR text
// sources to analyse.
//
// Uses `walkdir` for directory traversal as an OS abstraction, reading only
// metadata. File contents are read by platform::fs.
//
//   - `-` stands for standard input.
//   - Explicit files are always taken, whatever their extension.
//   - Directories are walked in file-name order and filtered by the include
//     globs. Unreadable entries below the root become warnings.

use crate::util::constants;
use crate::util::error::InputError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Path argument that selects standard input.
pub const STDIN_ARG: &str = "-";

/// One OCR text to analyse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Limits and patterns for input discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Maximum directory recursion depth.
    pub max_depth: usize,

    /// Maximum number of sources accepted in one run.
    pub max_files: usize,

    /// Filename globs a file found inside a directory must match.
    /// An empty list accepts every file.
    pub include_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_depth: constants::DEFAULT_MAX_DEPTH,
            max_files: constants::MAX_INPUT_FILES,
            include_patterns: constants::DEFAULT_INCLUDE_PATTERNS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Sources selected by a discovery run, in argument order.
#[derive(Debug, Default)]
pub struct InputSet {
    pub sources: Vec<InputSource>,
    /// Non-fatal problems met while walking directories.
    pub warnings: Vec<String>,
}

/// Expand `args` into input sources.
///
/// Fails when an argument does not exist, when a directory root cannot be
/// traversed, or when more than `max_files` sources are selected.
pub fn discover_inputs(args: &[PathBuf], config: &DiscoveryConfig) -> Result<InputSet, InputError> {
    let max_depth = config.max_depth.min(constants::ABSOLUTE_MAX_DEPTH);
    let include_pats = compile_patterns(&config.include_patterns);
    let mut set = InputSet::default();

    for arg in args {
        if arg.as_os_str() == STDIN_ARG {
            if !set.sources.contains(&InputSource::Stdin) {
                set.sources.push(InputSource::Stdin);
            }
            continue;
        }

        let metadata = std::fs::metadata(arg).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => InputError::NotFound { path: arg.clone() },
            _ => InputError::Io {
                path: arg.clone(),
                source: e,
            },
        })?;

        if metadata.is_dir() {
            walk_directory(arg, max_depth, &include_pats, &mut set)?;
        } else {
            set.sources.push(InputSource::File(arg.clone()));
        }
    }

    if set.sources.len() > config.max_files {
        return Err(InputError::TooManyFiles {
            count: set.sources.len(),
            max: config.max_files,
        });
    }

    tracing::debug!(
        args = args.len(),
        sources = set.sources.len(),
        warnings = set.warnings.len(),
        "Input discovery complete"
    );
    Ok(set)
}

fn walk_directory(
    root: &Path,
    max_depth: usize,
    include_pats: &[glob::Pattern],
    set: &mut InputSet,
) -> Result<(), InputError> {
    let walker = walkdir::WalkDir::new(root)
        .max_depth(max_depth)
        .follow_links(false)
        .sort_by_file_name();

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(InputError::Traversal {
                    path: root.to_path_buf(),
                    source: e,
                });
            }
            Err(e) => {
                let path_str = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string());
                let msg = format!("Cannot access '{path_str}': {e}");
                tracing::debug!(warning = %msg, "Discovery warning");
                set.warnings.push(msg);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str() else {
            set.warnings.push(format!(
                "Skipping '{}': non-UTF-8 filename",
                entry.path().display()
            ));
            continue;
        };

        if !is_included(file_name, include_pats) {
            tracing::trace!(file = file_name, "Not matched by include patterns");
            continue;
        }

        set.sources.push(InputSource::File(entry.into_path()));
    }
    Ok(())
}

// =============================================================================
// Glob helpers
// =============================================================================

/// Compile glob strings, skipping (and logging) any that fail.
fn compile_patterns(patterns: &[String]) -> Vec<glob::Pattern> {
    patterns
        .iter()
        .filter_map(|p| match glob::Pattern::new(p) {
            Ok(compiled) => Some(compiled),
            Err(e) => {
                tracing::warn!(pattern = p, error = %e, "Invalid include pattern, skipping");
                None
            }
        })
        .collect()
}

fn is_included(file_name: &str, patterns: &[glob::Pattern]) -> bool {
    let options = glob::MatchOptions {
        case_sensitive: false,
        ..glob::MatchOptions::default()
    };
    patterns.is_empty() || patterns.iter().any(|p| p.matches_with(file_name, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_temp_tree() -> TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("b_screen.txt"), "VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW").unwrap();
        fs::write(root.join("a_screen.TXT"), "L3JOB1 USERA BCH 1.2 RUN L3 SELW").unwrap();
        fs::write(root.join("capture.png"), [0u8, 1, 2]).unwrap();
        fs::create_dir(root.join("night")).unwrap();
        fs::write(root.join("night").join("c_screen.txt"), "").unwrap();
        dir
    }

    fn names(set: &InputSet) -> Vec<String> {
        set.sources
            .iter()
            .map(|s| match s {
                InputSource::Stdin => "-".to_string(),
                InputSource::File(p) => p.file_name().unwrap().to_string_lossy().into_owned(),
            })
            .collect()
    }

    #[test]
    fn test_directory_walk_filters_and_sorts() {
        let dir = make_temp_tree();
        let set = discover_inputs(&[dir.path().to_path_buf()], &DiscoveryConfig::default()).unwrap();
        assert_eq!(names(&set), vec!["a_screen.TXT", "b_screen.txt", "c_screen.txt"]);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_max_depth_1_excludes_subdirs() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_depth: 1,
            ..DiscoveryConfig::default()
        };
        let set = discover_inputs(&[dir.path().to_path_buf()], &config).unwrap();
        assert_eq!(names(&set), vec!["a_screen.TXT", "b_screen.txt"]);
    }

    #[test]
    fn test_explicit_file_ignores_include_patterns() {
        let dir = make_temp_tree();
        let png = dir.path().join("capture.png");
        let set = discover_inputs(&[png.clone()], &DiscoveryConfig::default()).unwrap();
        assert_eq!(set.sources, vec![InputSource::File(png)]);
    }

    #[test]
    fn test_stdin_argument_kept_in_order_once() {
        let dir = make_temp_tree();
        let file = dir.path().join("b_screen.txt");
        let args = vec![PathBuf::from("-"), file.clone(), PathBuf::from("-")];
        let set = discover_inputs(&args, &DiscoveryConfig::default()).unwrap();
        assert_eq!(set.sources, vec![InputSource::Stdin, InputSource::File(file)]);
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.txt");
        let err = discover_inputs(&[missing], &DiscoveryConfig::default()).unwrap_err();
        assert!(matches!(err, InputError::NotFound { .. }));
    }

    #[test]
    fn test_too_many_files() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            max_files: 2,
            ..DiscoveryConfig::default()
        };
        let err = discover_inputs(&[dir.path().to_path_buf()], &config).unwrap_err();
        assert!(matches!(err, InputError::TooManyFiles { count: 3, max: 2 }));
    }

    #[test]
    fn test_empty_include_list_accepts_everything() {
        let dir = make_temp_tree();
        let config = DiscoveryConfig {
            include_patterns: Vec::new(),
            max_depth: 1,
            ..DiscoveryConfig::default()
        };
        let set = discover_inputs(&[dir.path().to_path_buf()], &config).unwrap();
        assert_eq!(set.sources.len(), 3);
    }
}
