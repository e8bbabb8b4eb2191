// JobSleuth - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. `analyze`: input discovery, batch analysis, text/JSON/CSV output and
//    optional persistence to the history store
// 4. `history`: summary of stored analyses

use jobsleuth::app::batch::{analyze_sources, BatchOptions, FileOutcome};
use jobsleuth::app::store::JsonlStore;
use jobsleuth::core::discovery::{discover_inputs, DiscoveryConfig};
use jobsleuth::core::history::{summarize_history, HistoryFilter};
use jobsleuth::core::model::{AnalysisResult, Brand, JobRecord};
use jobsleuth::core::persist::{persist_with_retry, PersistenceBatch, RetryPolicy};
use jobsleuth::core::{export, report};
use jobsleuth::platform::config::{load_config, AppConfig, PlatformPaths};
use jobsleuth::util;
use jobsleuth::util::error::{ExportError, InputError, JobSleuthError};

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// JobSleuth - AS400 active-jobs screen analyser.
///
/// Reads OCR text of "Work with Active Jobs" screens, extracts the job table
/// for a card brand and reports job, user and state counts.
#[derive(Parser, Debug)]
#[command(name = "JobSleuth", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Directory holding config.toml (defaults to the platform config dir).
    #[arg(long = "config-dir", global = true)]
    config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse OCR text files (`-` reads standard input).
    Analyze(AnalyzeArgs),
    /// Summarise previously saved analyses.
    History(HistoryArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Files or directories to analyse.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Card brand: visa, mastercard (mc) or amex.
    #[arg(short = 'b', long = "brand", value_parser = parse_brand)]
    brand: Option<Brand>,

    /// Output format.
    #[arg(short = 'f', long = "format", value_enum)]
    format: Option<OutputFormat>,

    /// Write output to this file instead of stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Treat all inputs as pages of one capture.
    #[arg(long = "join")]
    join: bool,

    /// Save each successful analysis to the history store.
    #[arg(long = "save")]
    save: bool,

    /// History file (overrides config and platform default).
    #[arg(long = "store")]
    store: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct HistoryArgs {
    /// Only analyses of this brand.
    #[arg(long = "brand", value_parser = parse_brand)]
    brand: Option<Brand>,

    /// Only analyses whose primary user is this user.
    #[arg(long = "user")]
    user: Option<String>,

    /// First day included (YYYY-MM-DD, local time).
    #[arg(long = "since", value_parser = parse_day)]
    since: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD, local time).
    #[arg(long = "until", value_parser = parse_day)]
    until: Option<NaiveDate>,

    /// Print the summary as JSON.
    #[arg(long = "json")]
    json: bool,

    /// History file (overrides config and platform default).
    #[arg(long = "store")]
    store: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

fn parse_brand(value: &str) -> Result<Brand, InputError> {
    value.parse()
}

fn parse_day(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging so its level can take part in the
    // filter; its warnings are logged once tracing is up.
    let platform_paths = PlatformPaths::resolve();
    let config_dir = cli
        .config_dir
        .clone()
        .unwrap_or_else(|| platform_paths.config_dir.clone());
    let (config, config_warnings) = load_config(&config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "JobSleuth starting"
    );

    let outcome = match &cli.command {
        Command::Analyze(args) => run_analyze(args, &config, &platform_paths),
        Command::History(args) => run_history(args, &config, &platform_paths),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Run `analyze`. Returns `Ok(false)` when some input could not be read.
fn run_analyze(
    args: &AnalyzeArgs,
    config: &AppConfig,
    paths: &PlatformPaths,
) -> Result<bool, JobSleuthError> {
    let brand = resolve_brand(args.brand, config)?;
    let format = args.format.unwrap_or(match config.output_format.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        _ => OutputFormat::Text,
    });

    let discovery = DiscoveryConfig {
        max_depth: config.max_depth,
        include_patterns: config.include_patterns.clone(),
        ..DiscoveryConfig::default()
    };
    let inputs = discover_inputs(&args.paths, &discovery)?;
    for warning in &inputs.warnings {
        tracing::warn!(warning = %warning, "Input discovery warning");
    }

    let options = BatchOptions {
        brand,
        join: args.join || config.join_pages,
        max_file_size: config.max_file_size,
    };
    let outcomes = analyze_sources(&inputs.sources, &options, io::stdin().lock());

    let mut all_ok = true;
    for outcome in &outcomes {
        if let Err(e) = &outcome.result {
            all_ok = false;
            tracing::error!(input = %outcome.label, error = %e, "Input failed");
            eprintln!("Error: {e}");
        }
    }

    let results: Vec<&AnalysisResult> = outcomes
        .iter()
        .filter_map(|o| o.result.as_ref().ok())
        .collect();

    write_output(&outcomes, &results, format, args.output.as_deref())?;

    if args.save {
        let store_path = resolve_store_path(args.store.as_deref(), config, paths);
        let mut store = JsonlStore::new(store_path);
        let analysed_at = Utc::now();
        for result in &results {
            let batch = PersistenceBatch::from_result(result, analysed_at);
            persist_with_retry(&mut store, &batch, &RetryPolicy::default())?;
        }
        tracing::info!(
            saved = results.len(),
            path = %store.path().display(),
            "Analyses saved"
        );
    }

    Ok(all_ok)
}

fn run_history(
    args: &HistoryArgs,
    config: &AppConfig,
    paths: &PlatformPaths,
) -> Result<bool, JobSleuthError> {
    let store = JsonlStore::new(resolve_store_path(args.store.as_deref(), config, paths));
    let rows = store.load_history()?;

    let filter = HistoryFilter {
        since: args.since.map(|d| local_to_utc(d, NaiveTime::MIN)),
        until: args.until.map(|d| local_to_utc(d, end_of_day())),
        brand: args.brand,
        user: args.user.clone(),
    };
    let summary = summarize_history(&rows, &filter);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let path = Path::new("<stdout>");
    if args.json {
        serde_json::to_writer_pretty(&mut out, &summary)
            .map_err(|e| ExportError::Json {
                path: path.to_path_buf(),
                source: e,
            })?;
        writeln!(out).map_err(|e| export_io(path, e))?;
    } else {
        out.write_all(report::render_history(&summary).as_bytes())
            .map_err(|e| export_io(path, e))?;
    }
    Ok(true)
}

/// CLI flag > config default. A brand is required one way or the other.
fn resolve_brand(flag: Option<Brand>, config: &AppConfig) -> Result<Brand, InputError> {
    if let Some(brand) = flag {
        return Ok(brand);
    }
    match config.default_brand.as_deref() {
        Some(name) => name.parse(),
        None => Err(InputError::MissingBrand),
    }
}

fn resolve_store_path(flag: Option<&Path>, config: &AppConfig, paths: &PlatformPaths) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| config.store_path.clone())
        .unwrap_or_else(|| paths.history_file())
}

fn write_output(
    outcomes: &[FileOutcome],
    results: &[&AnalysisResult],
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), JobSleuthError> {
    let label = output.unwrap_or_else(|| Path::new("<stdout>"));
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            std::fs::File::create(path).map_err(|e| export_io(path, e))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        OutputFormat::Text => {
            let generated_at = Local::now().naive_local();
            let mut writer = writer;
            let mut first = true;
            for outcome in outcomes {
                let Ok(result) = &outcome.result else { continue };
                if !first {
                    writer.write_all(b"\n").map_err(|e| export_io(label, e))?;
                }
                first = false;
                if outcomes.len() > 1 {
                    writeln!(writer, "== {} ==", outcome.label).map_err(|e| export_io(label, e))?;
                }
                report::write_report(result, &mut writer, label, generated_at)?;
            }
        }
        OutputFormat::Json => {
            let count = match results {
                [single] => export::export_json(single, writer, label)?,
                many => export::export_json_batch(many, writer, label)?,
            };
            tracing::debug!(records = count, "JSON written");
        }
        OutputFormat::Csv => {
            let records: Vec<JobRecord> = results
                .iter()
                .flat_map(|r| r.records.iter().cloned())
                .collect();
            let count = export::export_csv(&records, writer, label)?;
            tracing::debug!(records = count, "CSV written");
        }
    }
    Ok(())
}

fn export_io(path: &Path, source: io::Error) -> ExportError {
    ExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Last representable instant of a day, so sub-second timestamps still match.
fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN)
}

/// Interpret a local calendar day and time as a UTC instant.
fn local_to_utc(day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    let naive = day.and_time(time);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}
