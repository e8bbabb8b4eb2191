// JobSleuth - core/persist.rs
//
// Persistence payload for an analysis: one parent row plus child rows for
// every state count and user count. The sink that stores it is a trait so
// the core never touches the filesystem; app::store provides the
// on-disk implementation.
//
// Writes are retried on transient failures with capped backoff. Permanent
// failures are returned immediately.

use crate::core::model::{AnalysisResult, Brand, CountMap};
use crate::util::constants;
use crate::util::error::StoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parent row describing one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub brand: Brand,
    /// First user seen, or `UNKNOWN`.
    pub primary_user: String,
    /// Function of the first record, or `N/A`.
    pub primary_function: String,
    /// First state seen, or `N/A`.
    pub primary_state: String,
    pub total: usize,
    pub analysed_at: DateTime<Utc>,
}

/// Child row: one key of a count map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRow {
    pub key: String,
    pub count: usize,
}

/// Everything written for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceBatch {
    pub analysis: AnalysisRow,
    pub states: Vec<CountRow>,
    pub users: Vec<CountRow>,
}

impl PersistenceBatch {
    pub fn from_result(result: &AnalysisResult, analysed_at: DateTime<Utc>) -> Self {
        let first_key = |counts: &CountMap, fallback: &str| {
            counts
                .keys()
                .next()
                .cloned()
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            analysis: AnalysisRow {
                brand: result.brand,
                primary_user: first_key(&result.users_by_count, constants::UNKNOWN_USER),
                primary_function: result
                    .records
                    .first()
                    .map(|r| r.function.clone())
                    .unwrap_or_else(|| constants::NOT_AVAILABLE.to_string()),
                primary_state: first_key(&result.states_by_count, constants::NOT_AVAILABLE),
                total: result.summary.total,
                analysed_at,
            },
            states: count_rows(&result.states_by_count),
            users: count_rows(&result.users_by_count),
        }
    }
}

fn count_rows(counts: &CountMap) -> Vec<CountRow> {
    counts
        .iter()
        .map(|(key, count)| CountRow {
            key: key.clone(),
            count: *count,
        })
        .collect()
}

// =============================================================================
// Sink + retry
// =============================================================================

/// Destination for persistence batches.
pub trait AnalysisSink {
    /// Store `batch` and return the id assigned to the analysis row.
    fn write_batch(&mut self, batch: &PersistenceBatch) -> Result<u64, StoreError>;
}

/// Backoff schedule for retryable store failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay before each retry; its length is the retry count.
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        let retries = constants::MAX_STORE_RETRIES as usize;
        Self {
            delays: constants::STORE_RETRY_DELAYS_MS
                .iter()
                .take(retries)
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }
}

/// Write `batch`, retrying transient failures per `policy`.
pub fn persist_with_retry<S: AnalysisSink + ?Sized>(
    sink: &mut S,
    batch: &PersistenceBatch,
    policy: &RetryPolicy,
) -> Result<u64, StoreError> {
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match sink.write_batch(batch) {
            Ok(id) => {
                tracing::info!(
                    id,
                    brand = %batch.analysis.brand,
                    total = batch.analysis.total,
                    attempt,
                    "Analysis persisted"
                );
                return Ok(id);
            }
            Err(e) if e.is_retryable() => match policy.delays.get(attempt as usize - 1) {
                Some(delay) => {
                    tracing::debug!(attempt, error = %e, "Transient store error, retrying");
                    std::thread::sleep(*delay);
                }
                None => {
                    tracing::warn!(attempts = attempt, error = %e, "Store retries exhausted");
                    return Err(StoreError::RetriesExhausted {
                        attempts: attempt,
                        last: Box::new(e),
                    });
                }
            },
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze;
    use std::io;
    use std::path::PathBuf;

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-03-14T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn no_wait(retries: usize) -> RetryPolicy {
        RetryPolicy {
            delays: vec![Duration::ZERO; retries],
        }
    }

    /// Fails with the queued errors first, then succeeds.
    struct FlakySink {
        failures: Vec<io::ErrorKind>,
        calls: u32,
    }

    impl AnalysisSink for FlakySink {
        fn write_batch(&mut self, _batch: &PersistenceBatch) -> Result<u64, StoreError> {
            self.calls += 1;
            if self.failures.is_empty() {
                return Ok(7);
            }
            let kind = self.failures.remove(0);
            Err(StoreError::Io {
                path: PathBuf::from("history.jsonl"),
                source: io::Error::from(kind),
            })
        }
    }

    #[test]
    fn test_batch_from_result() {
        let result = analyze(
            Some(
                "VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW\n\
                 VAPSND01 OPERADOR BCH .0 PGM-AUP100 SELW\n\
                 VAPRCV01 BCOGBCULA BCH .0 PGM-AUP200 DEQW",
            ),
            Brand::Visa,
        );
        let batch = PersistenceBatch::from_result(&result, at());

        assert_eq!(batch.analysis.brand, Brand::Visa);
        assert_eq!(batch.analysis.primary_user, "BCOGBCULA");
        assert_eq!(batch.analysis.primary_function, "PGM-AUP320");
        assert_eq!(batch.analysis.primary_state, "DEQW");
        assert_eq!(batch.analysis.total, 3);
        assert_eq!(
            batch.states,
            vec![
                CountRow { key: "DEQW".to_string(), count: 2 },
                CountRow { key: "SELW".to_string(), count: 1 },
            ]
        );
        assert_eq!(batch.users.len(), 2);
    }

    #[test]
    fn test_batch_from_empty_result_uses_fallbacks() {
        let batch = PersistenceBatch::from_result(&analyze(None, Brand::Amex), at());
        assert_eq!(batch.analysis.primary_user, "UNKNOWN");
        assert_eq!(batch.analysis.primary_function, "N/A");
        assert_eq!(batch.analysis.primary_state, "N/A");
        assert!(batch.states.is_empty());
        assert!(batch.users.is_empty());
    }

    #[test]
    fn test_retry_recovers_from_transient_errors() {
        let batch = PersistenceBatch::from_result(&analyze(None, Brand::Visa), at());
        let mut sink = FlakySink {
            failures: vec![io::ErrorKind::Interrupted, io::ErrorKind::TimedOut],
            calls: 0,
        };
        let id = persist_with_retry(&mut sink, &batch, &no_wait(3)).unwrap();
        assert_eq!(id, 7);
        assert_eq!(sink.calls, 3);
    }

    #[test]
    fn test_retry_gives_up_after_policy() {
        let batch = PersistenceBatch::from_result(&analyze(None, Brand::Visa), at());
        let mut sink = FlakySink {
            failures: vec![io::ErrorKind::Interrupted; 10],
            calls: 0,
        };
        let err = persist_with_retry(&mut sink, &batch, &no_wait(2)).unwrap_err();
        assert!(matches!(err, StoreError::RetriesExhausted { attempts: 3, .. }));
        assert_eq!(sink.calls, 3);
    }

    #[test]
    fn test_permanent_error_is_not_retried() {
        let batch = PersistenceBatch::from_result(&analyze(None, Brand::Visa), at());
        let mut sink = FlakySink {
            failures: vec![io::ErrorKind::PermissionDenied],
            calls: 0,
        };
        let err = persist_with_retry(&mut sink, &batch, &no_wait(3)).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(sink.calls, 1);
    }

    #[test]
    fn test_default_policy_matches_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delays.len(), constants::MAX_STORE_RETRIES as usize);
        assert_eq!(policy.delays[0], Duration::from_millis(constants::STORE_RETRY_DELAYS_MS[0]));
    }
}
