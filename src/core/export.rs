// JobSleuth - core/export.rs
//
// CSV and JSON export of analysis results.
// Core layer: writes to any Write trait object.

use crate::core::model::{AnalysisResult, JobRecord};
use crate::util::error::ExportError;
use std::io::Write;
use std::path::Path;

/// Export job records to CSV format.
///
/// Writes: job_name, user, job_type, cpu_percent, function, state
pub fn export_csv<W: Write>(
    records: &[JobRecord],
    writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    let csv_err = |e| ExportError::Csv {
        path: export_path.to_path_buf(),
        source: e,
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(["job_name", "user", "job_type", "cpu_percent", "function", "state"])
        .map_err(csv_err)?;

    for record in records {
        csv_writer
            .write_record([
                &record.job_name,
                &record.user,
                &record.job_type,
                &record.cpu_percent,
                &record.function,
                &record.state,
            ])
            .map_err(csv_err)?;
    }

    csv_writer.flush().map_err(|e| ExportError::Io {
        path: export_path.to_path_buf(),
        source: e,
    })?;

    Ok(records.len())
}

/// Export a full analysis result as pretty-printed JSON.
///
/// Returns the number of records written.
pub fn export_json<W: Write>(
    result: &AnalysisResult,
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, result).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writeln!(writer)
        .and_then(|_| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })?;
    Ok(result.records.len())
}

/// Export several analysis results as one pretty-printed JSON array.
///
/// Returns the total number of records written.
pub fn export_json_batch<W: Write>(
    results: &[&AnalysisResult],
    mut writer: W,
    export_path: &Path,
) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, results).map_err(|e| ExportError::Json {
        path: export_path.to_path_buf(),
        source: e,
    })?;
    writeln!(writer)
        .and_then(|_| writer.flush())
        .map_err(|e| ExportError::Io {
            path: export_path.to_path_buf(),
            source: e,
        })?;
    Ok(results.iter().map(|r| r.records.len()).sum())
}
