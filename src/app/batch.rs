// JobSleuth - app/batch.rs
//
// Batch orchestration: read every selected input and analyse it.
//
// Files are read and analysed in parallel with rayon; results keep the input
// order. A read failure is reported for that input and never stops the
// rest of the batch.
//
// In join mode the readable inputs are concatenated as pages of a single
// capture (input order) and analysed once. With no readable page there is
// nothing to analyse and only the read failures are reported.

use crate::core::analyzer::analyze;
use crate::core::discovery::InputSource;
use crate::core::model::{AnalysisResult, Brand};
use crate::core::normalize::join_pages;
use crate::platform::fs::{read_input, read_stream};
use crate::util::error::InputError;
use rayon::prelude::*;
use std::io::Read;

/// Batch parameters.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub brand: Brand,
    /// Analyse all inputs as one multi-page capture.
    pub join: bool,
    /// Per-input size cap in bytes.
    pub max_file_size: u64,
}

/// Outcome for one input (or, in join mode, for the joined capture).
#[derive(Debug)]
pub struct FileOutcome {
    /// Display label: the input path, `<stdin>`, or the joined page count.
    pub label: String,
    pub result: Result<AnalysisResult, InputError>,
}

/// Analyse `sources` reading standard input from `stdin` when selected.
///
/// Without join the outcomes match `sources` one to one. With join there is
/// one outcome per unreadable input followed by the joined analysis, which is
/// omitted when no input was readable.
pub fn analyze_sources<R: Read>(
    sources: &[InputSource],
    options: &BatchOptions,
    stdin: R,
) -> Vec<FileOutcome> {
    let texts = read_sources(sources, options.max_file_size, stdin);

    let outcomes = if options.join {
        analyze_joined(texts, options.brand)
    } else {
        texts
            .into_par_iter()
            .map(|(label, text)| FileOutcome {
                result: text.map(|t| analyze(Some(&t), options.brand)),
                label,
            })
            .collect()
    };

    tracing::info!(
        inputs = sources.len(),
        brand = %options.brand,
        join = options.join,
        failed = outcomes.iter().filter(|o| o.result.is_err()).count(),
        "Batch analysis complete"
    );
    outcomes
}

/// Read every source; files in parallel, stdin on the calling thread.
fn read_sources<R: Read>(
    sources: &[InputSource],
    max_file_size: u64,
    stdin: R,
) -> Vec<(String, Result<String, InputError>)> {
    let mut stdin_text = sources
        .contains(&InputSource::Stdin)
        .then(|| read_stream(stdin, max_file_size));

    let texts: Vec<(String, Option<Result<String, InputError>>)> = sources
        .par_iter()
        .map(|source| {
            let text = match source {
                InputSource::Stdin => None,
                InputSource::File(path) => Some(read_input(path, max_file_size)),
            };
            (source.to_string(), text)
        })
        .collect();

    texts
        .into_iter()
        .map(|(label, text)| {
            let text =
                text.unwrap_or_else(|| stdin_text.take().unwrap_or_else(|| Ok(String::new())));
            (label, text)
        })
        .collect()
}

fn analyze_joined(texts: Vec<(String, Result<String, InputError>)>, brand: Brand) -> Vec<FileOutcome> {
    let mut outcomes = Vec::new();
    let mut pages = Vec::new();

    for (label, text) in texts {
        match text {
            Ok(t) => pages.push(t),
            Err(e) => outcomes.push(FileOutcome {
                label,
                result: Err(e),
            }),
        }
    }

    if pages.is_empty() {
        tracing::warn!("No readable page to join");
        return outcomes;
    }

    tracing::debug!(pages = pages.len(), "Joining pages into one capture");
    let label = format!("{} joined page(s)", pages.len());
    let joined = join_pages(pages);
    outcomes.push(FileOutcome {
        label,
        result: Ok(analyze(Some(&joined), brand)),
    });
    outcomes
}
