// JobSleuth - core/noise.rs
//
// Screen chrome detection: titles, column headers, key legends, prompts.
// One brand-independent pattern set shared by every brand.

use regex::RegexSet;
use std::sync::OnceLock;

/// Case-insensitive patterns for AS400 "Trabajar con trabajos activos"
/// screen furniture, in evaluation order.
pub const CHROME_PATTERNS: &[&str] = &[
    r"Trabajar con trabajos activos",
    r"Tiempo transcurrido",
    r"Trab activos",
    r"^Opc",
    r"Subsistema",
    r"Usuario\s+actual",
    r"Tipo",
    r"%?\s*CPU",
    r"Función",
    r"Estado",
    r"^Final$",
    r"^===>",
    r"^F[0-9]{1,2}=",
];

fn chrome_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        // Compiled from constants covered by the tests below.
        RegexSet::new(CHROME_PATTERNS.iter().map(|p| format!("(?i){p}")))
            .expect("chrome patterns: invalid regex")
    })
}

/// True when `line` is screen chrome rather than a job row.
pub fn is_screen_chrome(line: &str) -> bool {
    chrome_set().is_match(line)
}

/// The first chrome pattern that matches `line`, if any.
pub fn matching_chrome_pattern(line: &str) -> Option<&'static str> {
    chrome_set()
        .matches(line)
        .iter()
        .next()
        .map(|idx| CHROME_PATTERNS[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_chrome_patterns_compile() {
        assert_eq!(chrome_set().len(), CHROME_PATTERNS.len());
    }

    #[test]
    fn test_detects_screen_furniture() {
        let chrome = [
            "Trabajar con trabajos activos",
            "TRABAJAR CON TRABAJOS ACTIVOS   SYSPROD",
            "Tiempo transcurrido . . : 00:00:00",
            "Trab activos . . : 312",
            "Opc Subsistema/Trabajo Usuario actual Tipo %CPU Función Estado",
            "Usuario  actual",
            "% CPU",
            "Final",
            "===> ____",
            "F3=Salir F5=Renovar F12=Cancelar",
            "F11=Visualizar tiempo transcurrido",
        ];
        for line in chrome {
            assert!(is_screen_chrome(line), "expected chrome: {line}");
        }
    }

    #[test]
    fn test_passes_job_rows() {
        let rows = [
            "VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW",
            "MCCSND01 MCUSER BCH 1,2 PGM-MCS100 SELW",
            "Finalizado",
            "XF3=",
        ];
        for line in rows {
            assert!(!is_screen_chrome(line), "expected data: {line}");
        }
    }

    #[test]
    fn test_anchored_patterns_only_match_at_start() {
        assert!(!is_screen_chrome("JOB ===> X"));
        assert!(!is_screen_chrome("JOB1 Final"));
        assert!(is_screen_chrome("opciones"));
    }

    #[test]
    fn test_matching_pattern_reports_first_in_order() {
        assert_eq!(
            matching_chrome_pattern("Opc Subsistema Usuario actual"),
            Some(r"^Opc")
        );
        assert_eq!(matching_chrome_pattern("F12=Cancelar"), Some(r"^F[0-9]{1,2}="));
        assert_eq!(matching_chrome_pattern("VAPMON01 USER BCH .0 X DEQW"), None);
    }
}
