// JobSleuth - app/store.rs
//
// Analysis history on disk: one JSON object per line (`StoredAnalysis`).
//
// - The data directory is created on first write; no user action required.
// - Each write is a single appended line, so an interrupted write can damage
//   at most the last line. A torn last line is terminated before the next
//   append, and malformed lines are skipped on load with a warning instead
//   of discarding the whole history.
// - Ids are assigned as the highest id on disk plus one.

use crate::core::history::StoredAnalysis;
use crate::core::persist::{AnalysisSink, PersistenceBatch};
use crate::util::error::StoreError;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// JSON Lines history file.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    path: PathBuf,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every well-formed stored analysis, in file order.
    ///
    /// A missing file is an empty history.
    pub fn load_history(&self) -> Result<Vec<StoredAnalysis>, StoreError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No history file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_err(e)),
        };

        let mut rows = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<StoredAnalysis>(line) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %e,
                    "Skipping malformed history line"
                ),
            }
        }

        tracing::debug!(path = %self.path.display(), rows = rows.len(), "History loaded");
        Ok(rows)
    }

    fn next_id(&self) -> Result<u64, StoreError> {
        Ok(self
            .load_history()?
            .iter()
            .map(|r| r.id)
            .max()
            .unwrap_or(0)
            + 1)
    }

    /// True when the file exists, is non-empty and does not end in `\n`.
    fn has_torn_last_line(&self) -> Result<bool, StoreError> {
        let mut file = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(self.io_err(e)),
        };
        let len = file.metadata().map_err(|e| self.io_err(e))?.len();
        if len == 0 {
            return Ok(false);
        }
        let mut last = [0u8; 1];
        file.seek(SeekFrom::End(-1))
            .and_then(|_| file.read_exact(&mut last))
            .map_err(|e| self.io_err(e))?;
        Ok(last[0] != b'\n')
    }

    fn io_err(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl AnalysisSink for JsonlStore {
    fn write_batch(&mut self, batch: &PersistenceBatch) -> Result<u64, StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let id = self.next_id()?;
        let row = StoredAnalysis {
            id,
            batch: batch.clone(),
        };
        let mut line = serde_json::to_string(&row).map_err(|e| StoreError::Serialize {
            path: self.path.clone(),
            source: e,
        })?;
        line.push('\n');
        if self.has_torn_last_line()? {
            tracing::warn!(path = %self.path.display(), "Terminating torn last history line");
            line.insert(0, '\n');
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| self.io_err(e))?;

        tracing::debug!(path = %self.path.display(), id, "History row appended");
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analyzer::analyze;
    use crate::core::model::Brand;
    use crate::core::persist::{persist_with_retry, RetryPolicy};
    use chrono::Utc;
    use tempfile::TempDir;

    fn batch(text: &str, brand: Brand) -> PersistenceBatch {
        PersistenceBatch::from_result(&analyze(Some(text), brand), Utc::now())
    }

    #[test]
    fn test_ids_increase_and_rows_reload() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path().join("data").join("history.jsonl"));

        let first = batch("VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW", Brand::Visa);
        let second = batch("L3JOB1 USERA BCH 1.2 RUN L3 SELW", Brand::Mastercard);
        assert_eq!(store.write_batch(&first).unwrap(), 1);
        assert_eq!(store.write_batch(&second).unwrap(), 2);

        let rows = store.load_history().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].batch, first);
        assert_eq!(rows[1].id, 2);
        assert_eq!(rows[1].batch.analysis.brand, Brand::Mastercard);
    }

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = TempDir::new().unwrap();
        let store = JsonlStore::new(dir.path().join("history.jsonl"));
        assert!(store.load_history().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        let mut store = JsonlStore::new(&path);
        store
            .write_batch(&batch("VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW", Brand::Visa))
            .unwrap();

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"id\": 9, \"batch\": trunc\n").unwrap();
        drop(file);

        let id = store.write_batch(&batch("", Brand::Amex)).unwrap();
        assert_eq!(id, 2);
        let rows = store.load_history().unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_append_after_torn_last_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("history.jsonl");
        let mut store = JsonlStore::new(&path);
        store
            .write_batch(&batch("VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW", Brand::Visa))
            .unwrap();

        // Interrupted write: no trailing newline.
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"id\": 2, \"batch\": {\"analy").unwrap();
        drop(file);

        let id = store.write_batch(&batch("", Brand::Amex)).unwrap();
        assert_eq!(id, 2);
        let rows = store.load_history().unwrap();
        assert_eq!(rows.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(rows[1].batch.analysis.brand, Brand::Amex);
        assert!(std::fs::read_to_string(&path).unwrap().ends_with('\n'));
    }

    #[test]
    fn test_persist_with_retry_through_store() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonlStore::new(dir.path().join("history.jsonl"));
        let id = persist_with_retry(
            &mut store,
            &batch("VAPMON01 BCOGBCULA BCH .0 PGM-AUP320 DEQW", Brand::Visa),
            &RetryPolicy::default(),
        )
        .unwrap();
        assert_eq!(id, 1);
    }
}
