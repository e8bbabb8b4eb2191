// JobSleuth - core/brand.rs
//
// Per-brand classification strategies over the shared extraction contract.
// A strategy decides how lines are normalised, which matcher chain parses
// them and which extracted records are kept.

use crate::core::extract::{Extraction, Extractor};
use crate::core::model::{Brand, JobRecord};
use crate::core::normalize::LeadingNoise;
use crate::util::constants;

/// Brand-specific rules. Implementations are stateless and shared.
pub trait BrandRules: Send + Sync {
    /// Tag written into every result produced with these rules.
    fn brand(&self) -> Brand;

    /// Leading-noise handling for the normaliser.
    fn leading_noise(&self) -> LeadingNoise;

    /// Parse one filtered line into a record.
    fn extract(&self, line: &str) -> Option<Extraction>;

    /// Whether an extracted record belongs to this brand.
    fn accept(&self, record: &JobRecord) -> bool;
}

/// Baseline: every extracted record counts.
#[derive(Debug, Default)]
pub struct VisaRules;

impl BrandRules for VisaRules {
    fn brand(&self) -> Brand {
        Brand::Visa
    }

    fn leading_noise(&self) -> LeadingNoise {
        LeadingNoise::Strip
    }

    fn extract(&self, line: &str) -> Option<Extraction> {
        Extractor::free_form().extract(line)
    }

    fn accept(&self, _record: &JobRecord) -> bool {
        true
    }
}

/// Shared screen; only `MCC*`, `L3*` and `L6*` jobs are Mastercard's.
#[derive(Debug, Default)]
pub struct MastercardRules;

impl BrandRules for MastercardRules {
    fn brand(&self) -> Brand {
        Brand::Mastercard
    }

    fn leading_noise(&self) -> LeadingNoise {
        LeadingNoise::Strip
    }

    fn extract(&self, line: &str) -> Option<Extraction> {
        Extractor::free_form().extract(line)
    }

    fn accept(&self, record: &JobRecord) -> bool {
        let name = record.job_name.as_bytes();
        constants::MASTERCARD_JOB_PREFIXES.iter().any(|prefix| {
            name.len() >= prefix.len() && name[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        })
    }
}

/// AMEX screens: rows without a `PGM-` function never extract, so every
/// extracted record counts. Lines are not stripped of leading characters.
#[derive(Debug, Default)]
pub struct AmexRules;

impl BrandRules for AmexRules {
    fn brand(&self) -> Brand {
        Brand::Amex
    }

    fn leading_noise(&self) -> LeadingNoise {
        LeadingNoise::Keep
    }

    fn extract(&self, line: &str) -> Option<Extraction> {
        Extractor::program_only().extract(line)
    }

    fn accept(&self, _record: &JobRecord) -> bool {
        true
    }
}

/// The strategy for `brand`.
pub fn rules_for(brand: Brand) -> &'static dyn BrandRules {
    static VISA: VisaRules = VisaRules;
    static MASTERCARD: MastercardRules = MastercardRules;
    static AMEX: AmexRules = AmexRules;

    match brand {
        Brand::Visa => &VISA,
        Brand::Mastercard => &MASTERCARD,
        Brand::Amex => &AMEX,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(name: &str, function: &str) -> JobRecord {
        JobRecord {
            job_name: name.to_string(),
            user: "USERA".to_string(),
            job_type: "BCH".to_string(),
            cpu_percent: ".0".to_string(),
            function: function.to_string(),
            state: "DEQW".to_string(),
        }
    }

    #[test]
    fn test_rules_for_tags_brand() {
        for brand in Brand::all() {
            assert_eq!(rules_for(*brand).brand(), *brand);
        }
    }

    #[test]
    fn test_visa_accepts_everything() {
        let rules = rules_for(Brand::Visa);
        assert!(rules.accept(&job("VAPMON01", "PGM-AUP320")));
        assert!(rules.accept(&job("QZSOSIGN", "QCMD")));
    }

    #[test]
    fn test_mastercard_prefix_filter() {
        let rules = rules_for(Brand::Mastercard);
        assert!(rules.accept(&job("MCCSND01", "PGM-X")));
        assert!(rules.accept(&job("L3JOB1", "RUN")));
        assert!(rules.accept(&job("L6RCV", "RUN")));
        assert!(rules.accept(&job("mccsnd01", "RUN")));
        assert!(!rules.accept(&job("VAPMON01", "PGM-AUP320")));
        assert!(!rules.accept(&job("L", "RUN")));
        assert!(!rules.accept(&job("XL3JOB", "RUN")));
    }

    #[test]
    fn test_amex_constrains_function_at_extraction() {
        let rules = rules_for(Brand::Amex);
        assert!(rules.extract("AUC306AMX BCOGHLUN BCH .0 QCMD DEQW").is_none());
        assert!(rules_for(Brand::Visa)
            .extract("AUC306AMX BCOGHLUN BCH .0 QCMD DEQW")
            .is_some());
    }

    #[test]
    fn test_leading_noise_per_brand() {
        assert_eq!(rules_for(Brand::Visa).leading_noise(), LeadingNoise::Strip);
        assert_eq!(rules_for(Brand::Mastercard).leading_noise(), LeadingNoise::Strip);
        assert_eq!(rules_for(Brand::Amex).leading_noise(), LeadingNoise::Keep);
    }
}
