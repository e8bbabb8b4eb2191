// JobSleuth - core/analyzer.rs
//
// The screen-analysis pipeline:
//   raw text -> normalise -> drop chrome -> extract -> brand filter
//            -> aggregate (+ subsystem health for Mastercard)
//
// Pure and synchronous. Every input, however damaged, yields a result; OCR
// noise degrades to fewer records, never to an error.

use crate::core::aggregate::aggregate;
use crate::core::brand::{rules_for, BrandRules};
use crate::core::extract::MatchKind;
use crate::core::health::detect_subsystems;
use crate::core::model::{AnalysisResult, Brand, PipelineStats};
use crate::core::noise::matching_chrome_pattern;
use crate::core::normalize::normalize_lines;
use crate::util::logging::preview;

/// Analyse OCR text of an active-jobs screen for `brand`.
///
/// `None` models a missing capture and behaves like empty text.
pub fn analyze(raw: Option<&str>, brand: Brand) -> AnalysisResult {
    analyze_with(raw, rules_for(brand))
}

/// Analyse with an explicit strategy.
pub fn analyze_with(raw: Option<&str>, rules: &dyn BrandRules) -> AnalysisResult {
    let lines = normalize_lines(raw, rules.leading_noise());
    let mut stats = PipelineStats {
        lines: lines.len(),
        ..PipelineStats::default()
    };
    let mut records = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        if let Some(pattern) = matching_chrome_pattern(line) {
            stats.chrome_lines += 1;
            tracing::trace!(line = idx + 1, pattern, text = preview(line), "Screen chrome skipped");
            continue;
        }

        let Some(extraction) = rules.extract(line) else {
            stats.unparsed_lines += 1;
            tracing::trace!(line = idx + 1, text = preview(line), "No row shape matched");
            continue;
        };

        match extraction.kind {
            MatchKind::Strict => stats.strict_matches += 1,
            MatchKind::Fallback => stats.fallback_matches += 1,
        }

        if rules.accept(&extraction.record) {
            records.push(extraction.record);
        } else {
            stats.rejected_by_brand += 1;
            tracing::trace!(
                line = idx + 1,
                job = %extraction.record.job_name,
                "Record rejected by brand rule"
            );
        }
    }

    let aggregates = aggregate(&records);
    let brand = rules.brand();
    let special_subsystems = match brand {
        Brand::Mastercard => Some(detect_subsystems(&records)),
        Brand::Visa | Brand::Amex => None,
    };

    tracing::debug!(
        brand = %brand,
        lines = stats.lines,
        chrome = stats.chrome_lines,
        strict = stats.strict_matches,
        fallback = stats.fallback_matches,
        unparsed = stats.unparsed_lines,
        rejected = stats.rejected_by_brand,
        total = aggregates.summary.total,
        "Screen analysis complete"
    );

    AnalysisResult {
        brand,
        records,
        summary: aggregates.summary,
        users_by_count: aggregates.users_by_count,
        states_by_count: aggregates.states_by_count,
        special_subsystems,
        diagnostics: stats,
    }
}
