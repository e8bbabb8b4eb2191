// JobSleuth - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use crate::util::error::InputError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Insertion-ordered occurrence counts: unique keys, first-seen order.
pub type CountMap = IndexMap<String, usize>;

// =============================================================================
// Brand
// =============================================================================

/// Payment-network context that decides which inclusion rules and field
/// formats apply. Always chosen by the caller, never inferred from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Brand {
    Visa,
    Mastercard,
    Amex,
}

impl Brand {
    /// Returns all variants in display order.
    pub fn all() -> &'static [Brand] {
        &[Brand::Visa, Brand::Mastercard, Brand::Amex]
    }

    /// Fixed tag written into every result (`VISA`, `MASTERCARD`, `AMEX`).
    pub fn tag(&self) -> &'static str {
        match self {
            Brand::Visa => "VISA",
            Brand::Mastercard => "MASTERCARD",
            Brand::Amex => "AMEX",
        }
    }

    /// Human-readable label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Brand::Visa => "VISA",
            Brand::Mastercard => "MASTERCARD",
            Brand::Amex => "AMERICAN EXPRESS",
        }
    }
}

impl std::fmt::Display for Brand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Brand {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visa" => Ok(Brand::Visa),
            "mastercard" | "mc" => Ok(Brand::Mastercard),
            "amex" | "american express" => Ok(Brand::Amex),
            _ => Err(InputError::UnknownBrand {
                value: s.to_string(),
            }),
        }
    }
}

// =============================================================================
// Job record
// =============================================================================

/// One parsed row of an active-jobs screen.
///
/// A record only exists when all six columns matched a recognised line
/// shape; partial matches are discarded upstream, never stored with blanks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    /// AS400 job name (e.g. `VAPMON01`).
    pub job_name: String,

    /// Owning user id.
    pub user: String,

    /// Three-letter job type (e.g. `BCH`).
    pub job_type: String,

    /// CPU usage exactly as captured (`.0`, `1.2`, `1,5`).
    pub cpu_percent: String,

    /// Function column (`PGM-AUP320`, or a free-form code outside AMEX).
    pub function: String,

    /// Job state (e.g. `DEQW`, `SELW`).
    pub state: String,
}

impl JobRecord {
    /// Numeric view of `cpu_percent`. Accepts `,` as decimal separator and a
    /// missing leading digit. Returns `None` for unusable text such as `1.2.3`.
    pub fn cpu_value(&self) -> Option<f64> {
        let mut text = self.cpu_percent.replace(',', ".");
        if text.starts_with('.') {
            text.insert(0, '0');
        }
        text.parse::<f64>().ok()
    }
}

// =============================================================================
// Subsystem health
// =============================================================================

/// Monitored Mastercard subsystems, identified by job-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubsystemTag {
    L3,
    L6,
}

impl SubsystemTag {
    /// Returns all monitored tags in report order.
    pub fn all() -> &'static [SubsystemTag] {
        &[SubsystemTag::L3, SubsystemTag::L6]
    }

    /// Job-name prefix that identifies members of this subsystem.
    pub fn prefix(&self) -> &'static str {
        match self {
            SubsystemTag::L3 => "L3",
            SubsystemTag::L6 => "L6",
        }
    }
}

impl std::fmt::Display for SubsystemTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Derived health of a monitored subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SubsystemStatus {
    Active,
    Inactive,
    #[default]
    #[serde(rename = "Not-detected")]
    NotDetected,
}

impl SubsystemStatus {
    /// Human-readable label for display.
    pub fn label(&self) -> &'static str {
        match self {
            SubsystemStatus::Active => "Active",
            SubsystemStatus::Inactive => "Inactive",
            SubsystemStatus::NotDetected => "Not-detected",
        }
    }
}

impl std::fmt::Display for SubsystemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Analysis result
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AnalysisSummary {
    /// Number of accepted records.
    pub total: usize,
}

/// Per-line accounting for one pipeline run.
///
/// `lines == chrome_lines + strict_matches + fallback_matches + unparsed_lines`
/// and `strict_matches + fallback_matches - rejected_by_brand` equals the
/// number of accepted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    /// Non-empty normalised lines.
    pub lines: usize,
    /// Lines dropped as screen titles, headers, prompts or key legends.
    pub chrome_lines: usize,
    /// Lines parsed by the strict six-column matcher.
    pub strict_matches: usize,
    /// Lines parsed only by the tolerant matcher.
    pub fallback_matches: usize,
    /// Candidate lines no matcher accepted.
    pub unparsed_lines: usize,
    /// Extracted records discarded by the brand's inclusion rule.
    pub rejected_by_brand: usize,
}

/// Output of one analysis call. Built once, never mutated or merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Brand selected by the caller.
    pub brand: Brand,

    /// Accepted records in source line order.
    pub records: Vec<JobRecord>,

    pub summary: AnalysisSummary,

    /// Records per user, first-seen order.
    pub users_by_count: CountMap,

    /// Records per state, first-seen order.
    pub states_by_count: CountMap,

    /// Mastercard only: status of every monitored subsystem.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_subsystems: Option<IndexMap<SubsystemTag, SubsystemStatus>>,

    pub diagnostics: PipelineStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(cpu: &str) -> JobRecord {
        JobRecord {
            job_name: "VAPMON01".to_string(),
            user: "BCOGBCULA".to_string(),
            job_type: "BCH".to_string(),
            cpu_percent: cpu.to_string(),
            function: "PGM-AUP320".to_string(),
            state: "DEQW".to_string(),
        }
    }

    #[test]
    fn test_brand_from_str_accepts_aliases() {
        assert_eq!("visa".parse::<Brand>().unwrap(), Brand::Visa);
        assert_eq!("MC".parse::<Brand>().unwrap(), Brand::Mastercard);
        assert_eq!(" Mastercard ".parse::<Brand>().unwrap(), Brand::Mastercard);
        assert_eq!("American Express".parse::<Brand>().unwrap(), Brand::Amex);
        assert!(matches!(
            "discover".parse::<Brand>(),
            Err(InputError::UnknownBrand { .. })
        ));
    }

    #[test]
    fn test_brand_tags_and_labels() {
        assert_eq!(Brand::Amex.tag(), "AMEX");
        assert_eq!(Brand::Amex.label(), "AMERICAN EXPRESS");
        assert_eq!(serde_json::to_string(&Brand::Mastercard).unwrap(), "\"MASTERCARD\"");
    }

    #[test]
    fn test_cpu_value_tolerates_ocr_forms() {
        assert_eq!(record(".0").cpu_value(), Some(0.0));
        assert_eq!(record("1.2").cpu_value(), Some(1.2));
        assert_eq!(record("1,5").cpu_value(), Some(1.5));
        assert_eq!(record("12").cpu_value(), Some(12.0));
        assert_eq!(record("1.2.3").cpu_value(), None);
    }

    #[test]
    fn test_job_record_serialises_camel_case() {
        let json = serde_json::to_value(record(".0")).unwrap();
        assert_eq!(json["jobName"], "VAPMON01");
        assert_eq!(json["cpuPercent"], ".0");
        assert_eq!(json["jobType"], "BCH");
    }

    #[test]
    fn test_subsystem_status_serialises_not_detected_with_dash() {
        let json = serde_json::to_string(&SubsystemStatus::NotDetected).unwrap();
        assert_eq!(json, "\"Not-detected\"");
        assert_eq!(SubsystemStatus::default(), SubsystemStatus::NotDetected);
    }
}
