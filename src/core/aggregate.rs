// JobSleuth - core/aggregate.rs
//
// Per-user and per-state occurrence counts over accepted records.

use crate::core::model::{AnalysisSummary, CountMap, JobRecord};

/// Derived views over one record set, computed once.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregates {
    pub summary: AnalysisSummary,
    pub users_by_count: CountMap,
    pub states_by_count: CountMap,
}

/// Count records per user and per state in a single pass.
///
/// Keys keep first-seen order. Empty fields are tolerated and skipped for
/// that map only.
pub fn aggregate(records: &[JobRecord]) -> Aggregates {
    let mut users_by_count = CountMap::new();
    let mut states_by_count = CountMap::new();

    for record in records {
        increment(&mut users_by_count, &record.user);
        increment(&mut states_by_count, &record.state);
    }

    Aggregates {
        summary: AnalysisSummary {
            total: records.len(),
        },
        users_by_count,
        states_by_count,
    }
}

fn increment(counts: &mut CountMap, key: &str) {
    if key.is_empty() {
        return;
    }
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(user: &str, state: &str) -> JobRecord {
        JobRecord {
            job_name: "JOB".to_string(),
            user: user.to_string(),
            job_type: "BCH".to_string(),
            cpu_percent: ".0".to_string(),
            function: "PGM-X".to_string(),
            state: state.to_string(),
        }
    }

    #[test]
    fn test_empty_records() {
        let agg = aggregate(&[]);
        assert_eq!(agg.summary.total, 0);
        assert!(agg.users_by_count.is_empty());
        assert!(agg.states_by_count.is_empty());
    }

    #[test]
    fn test_counts_keep_first_seen_order() {
        let records = vec![
            rec("ZED", "DEQW"),
            rec("ALPHA", "SELW"),
            rec("ZED", "DEQW"),
            rec("MIKE", "DEQA"),
        ];
        let agg = aggregate(&records);

        assert_eq!(agg.summary.total, 4);
        let users: Vec<_> = agg.users_by_count.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(users, vec![("ZED", 2), ("ALPHA", 1), ("MIKE", 1)]);
        let states: Vec<_> = agg.states_by_count.keys().map(String::as_str).collect();
        assert_eq!(states, vec!["DEQW", "SELW", "DEQA"]);
    }

    #[test]
    fn test_empty_fields_do_not_create_entries() {
        let records = vec![rec("", "DEQW"), rec("USERA", "")];
        let agg = aggregate(&records);

        assert_eq!(agg.summary.total, 2);
        assert_eq!(agg.users_by_count.len(), 1);
        assert_eq!(agg.users_by_count["USERA"], 1);
        assert_eq!(agg.states_by_count.len(), 1);
        assert_eq!(agg.states_by_count["DEQW"], 1);
    }

    #[test]
    fn test_sums_match_total() {
        let records: Vec<_> = (0..25)
            .map(|i| rec(&format!("U{}", i % 4), if i % 3 == 0 { "SELW" } else { "DEQW" }))
            .collect();
        let agg = aggregate(&records);
        assert_eq!(agg.users_by_count.values().sum::<usize>(), agg.summary.total);
        assert_eq!(agg.states_by_count.values().sum::<usize>(), agg.summary.total);
    }
}
