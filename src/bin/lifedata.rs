//! lifedata CLI - Command-line interface for Life in Data
//!
//! Commands:
//! - report: Run the full pipeline and write the activity report
//! - predict: Predict whether tomorrow will be active
//! - validate: Load each source and report record counts
//! - export: Write the merged event table as CSV
//! - doctor: Diagnose configuration, sources and model

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use life_in_data::config::{parse_timezone, PipelineConfig};
use life_in_data::encoder::ReportEncoder;
use life_in_data::export::write_csv;
use life_in_data::filter::{apply_filters, EventFilter};
use life_in_data::predictor::Predictor;
use life_in_data::types::{PredictionOutcome, Source, SourceSummary};
use life_in_data::{DailyActivitySeries, PipelineError, LIFEDATA_VERSION, PRODUCER_NAME};

/// Environment variable holding the log filter
const LOG_ENV: &str = "LIFEDATA_LOG";

/// lifedata - Personal activity analytics over Takeout exports
#[derive(Parser)]
#[command(name = "lifedata")]
#[command(version = LIFEDATA_VERSION)]
#[command(about = "Turn Chrome, YouTube and Maps activity into insights", long_about = None)]
struct Cli {
    /// Config file (defaults to $LIFEDATA_CONFIG, then ./lifedata.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the activity report
    Report {
        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Embed the filtered events in the report
        #[arg(long)]
        include_events: bool,
    },

    /// Predict whether tomorrow will be active
    Predict {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Load each source and report record counts
    Validate {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write the merged event table as CSV
    Export {
        #[command(flatten)]
        pipeline: PipelineArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Diagnose configuration, sources and model
    Doctor {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Overrides for the config file
#[derive(Args)]
struct PipelineArgs {
    /// Chrome activity export
    #[arg(long)]
    chrome: Option<PathBuf>,

    /// YouTube watch history export
    #[arg(long)]
    youtube: Option<PathBuf>,

    /// Maps activity export
    #[arg(long)]
    maps: Option<PathBuf>,

    /// Input format of the exports
    #[arg(long)]
    input_format: Option<InputFormatArg>,

    /// Display timezone (IANA format, e.g., "Europe/Berlin")
    #[arg(long)]
    timezone: Option<String>,

    /// Logistic model artifact
    #[arg(long)]
    model: Option<PathBuf>,

    /// Pre-computed daily history used for prediction
    #[arg(long)]
    history: Option<PathBuf>,
}

#[derive(Args)]
struct FilterArgs {
    /// Keep only these sources (repeatable)
    #[arg(long = "source")]
    sources: Vec<String>,

    /// Keep only events whose title contains this text
    #[arg(long)]
    keyword: Option<String>,
}

impl FilterArgs {
    fn to_filter(&self) -> EventFilter {
        EventFilter::new(
            self.sources.iter().map(|s| Source::from_name(s)).collect(),
            self.keyword.clone(),
        )
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormatArg {
    /// JSON array of records
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

impl From<InputFormatArg> for life_in_data::InputFormat {
    fn from(arg: InputFormatArg) -> Self {
        match arg {
            InputFormatArg::Json => life_in_data::InputFormat::Json,
            InputFormatArg::Ndjson => life_in_data::InputFormat::Ndjson,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run(cli: Cli) -> Result<(), LifedataCliError> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Report {
            pipeline,
            filter,
            output,
            output_format,
            include_events,
        } => {
            let config = load_config(config_path, &pipeline)?;
            cmd_report(&config, &filter.to_filter(), &output, &output_format, include_events)
        }
        Commands::Predict { pipeline } => cmd_predict(&load_config(config_path, &pipeline)?),
        Commands::Validate { pipeline, json } => {
            cmd_validate(&load_config(config_path, &pipeline)?, json)
        }
        Commands::Export {
            pipeline,
            filter,
            output,
        } => cmd_export(&load_config(config_path, &pipeline)?, &filter.to_filter(), &output),
        Commands::Doctor { pipeline, json } => cmd_doctor(config_path, &pipeline, json),
    }
}

/// Discover the config file and apply command-line overrides
fn load_config(
    config_path: Option<&Path>,
    args: &PipelineArgs,
) -> Result<PipelineConfig, LifedataCliError> {
    let mut config = PipelineConfig::discover(config_path)?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut PipelineConfig, args: &PipelineArgs) {
    if let Some(path) = &args.chrome {
        config.sources.chrome = Some(path.clone());
    }
    if let Some(path) = &args.youtube {
        config.sources.youtube = Some(path.clone());
    }
    if let Some(path) = &args.maps {
        config.sources.maps = Some(path.clone());
    }
    if let Some(format) = args.input_format {
        config.input_format = format.into();
    }
    if let Some(tz) = &args.timezone {
        config.timezone = tz.clone();
    }
    if let Some(path) = &args.model {
        config.model.artifact = Some(path.clone());
    }
    if let Some(path) = &args.history {
        config.model.history = Some(path.clone());
    }
}

fn cmd_report(
    config: &PipelineConfig,
    filter: &EventFilter,
    output: &Path,
    output_format: &OutputFormat,
    include_events: bool,
) -> Result<(), LifedataCliError> {
    let inputs = config.source_inputs();
    if inputs.is_empty() {
        return Err(LifedataCliError::NoSources);
    }

    let result = config.build_pipeline()?.run(inputs);
    let encoder = ReportEncoder::new().include_events(include_events);
    let json = match output_format {
        OutputFormat::Json => encoder.encode_to_json(&result, filter)?,
        OutputFormat::JsonPretty => encoder.encode_to_json_pretty(&result, filter)?,
    };

    write_output(output, |out| writeln!(out, "{json}"))
}

fn cmd_predict(config: &PipelineConfig) -> Result<(), LifedataCliError> {
    let pipeline = config.build_pipeline()?;

    // A history snapshot replaces the live series, so sources are optional
    let outcome = if config.model.history.is_some() {
        pipeline.predict_next_day(&DailyActivitySeries::default())
    } else {
        let inputs = config.source_inputs();
        if inputs.is_empty() {
            return Err(LifedataCliError::NoSources);
        }
        pipeline.run(inputs).prediction
    };

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    match outcome {
        PredictionOutcome::Available { .. } => Ok(()),
        PredictionOutcome::Unavailable { code, reason } => {
            Err(LifedataCliError::PredictionUnavailable { code, reason })
        }
    }
}

fn cmd_validate(config: &PipelineConfig, json: bool) -> Result<(), LifedataCliError> {
    let inputs = config.source_inputs();
    if inputs.is_empty() {
        return Err(LifedataCliError::NoSources);
    }

    let pipeline = config.build_pipeline()?;
    let summaries: Vec<SourceSummary> = inputs
        .into_iter()
        .map(|input| {
            let source = input.source.clone();
            match pipeline.load_source(input) {
                Ok(table) => table.summary(),
                Err(e) => SourceSummary {
                    source,
                    total_records: 0,
                    kept: 0,
                    dropped: 0,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();

    let failed = summaries.iter().filter(|s| s.error.is_some()).count();
    let report = ValidationReport {
        total_sources: summaries.len(),
        failed_sources: failed,
        sources: summaries,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        for summary in &report.sources {
            match &summary.error {
                Some(error) => println!("  [ERR] {}: {}", summary.source, error),
                None => println!(
                    "  [OK]  {}: {} records, {} kept, {} dropped",
                    summary.source, summary.total_records, summary.kept, summary.dropped
                ),
            }
        }
    }

    if failed > 0 {
        Err(LifedataCliError::SourcesFailed(failed))
    } else {
        Ok(())
    }
}

fn cmd_export(
    config: &PipelineConfig,
    filter: &EventFilter,
    output: &Path,
) -> Result<(), LifedataCliError> {
    let inputs = config.source_inputs();
    if inputs.is_empty() {
        return Err(LifedataCliError::NoSources);
    }

    let result = config.build_pipeline()?.run(inputs);
    let table = apply_filters(&result.table, filter);
    write_output(output, |out| write_csv(&table, out))
}

fn cmd_doctor(
    config_path: Option<&Path>,
    args: &PipelineArgs,
    json: bool,
) -> Result<(), LifedataCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck::ok(
        "version",
        format!("{PRODUCER_NAME} version {LIFEDATA_VERSION}"),
    ));

    let config = match PipelineConfig::discover(config_path) {
        Ok(mut config) => {
            checks.push(DoctorCheck::ok("config", "Configuration loaded"));
            apply_overrides(&mut config, args);
            config
        }
        Err(e) => {
            checks.push(DoctorCheck::error("config", e.to_string()));
            let mut config = PipelineConfig::default();
            apply_overrides(&mut config, args);
            config
        }
    };

    checks.push(match parse_timezone(&config.timezone) {
        Ok(tz) => DoctorCheck::ok("timezone", format!("Timezone {}", tz.name())),
        Err(e) => DoctorCheck::error("timezone", e.to_string()),
    });

    let sources = config.source_paths();
    if sources.is_empty() {
        checks.push(DoctorCheck::warning("sources", "No source exports configured"));
    }
    for (source, path) in sources {
        let name = format!("source.{}", source.as_str().to_lowercase());
        checks.push(match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {
                DoctorCheck::ok(name, format!("{} ({} bytes)", path.display(), meta.len()))
            }
            Ok(_) => DoctorCheck::error(name, format!("{} is not a file", path.display())),
            Err(e) => DoctorCheck::error(name, format!("Cannot read {}: {e}", path.display())),
        });
    }

    checks.push(match &config.model.artifact {
        Some(path) => match Predictor::from_artifact_path(path) {
            Ok(_) => DoctorCheck::ok("model", format!("Model artifact {} valid", path.display())),
            Err(e) => DoctorCheck::error("model", e.to_string()),
        },
        None => DoctorCheck::warning("model", "No model artifact configured; predictions disabled"),
    });

    if let Some(path) = &config.model.history {
        let snapshot = fs::read_to_string(path)
            .map_err(PipelineError::from)
            .and_then(|json| DailyActivitySeries::from_snapshot_json(&json));
        checks.push(match snapshot {
            Ok(series) if series.len() >= 2 => {
                DoctorCheck::ok("history", format!("History snapshot valid ({} days)", series.len()))
            }
            Ok(series) => DoctorCheck::warning(
                "history",
                format!("History snapshot has only {} days", series.len()),
            ),
            Err(e) => DoctorCheck::error("history", e.to_string()),
        });
    }

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: LIFEDATA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("lifedata Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(LifedataCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Write to `path`, or stdout for `-`
fn write_output<F>(path: &Path, write: F) -> Result<(), LifedataCliError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write(&mut handle)?;
        handle.flush()?;
    } else {
        let mut file = io::BufWriter::new(fs::File::create(path)?);
        write(&mut file)?;
        file.flush()?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum LifedataCliError {
    Io(io::Error),
    Pipeline(PipelineError),
    Json(serde_json::Error),
    NoSources,
    SourcesFailed(usize),
    PredictionUnavailable { code: String, reason: String },
    DoctorFailed,
}

impl From<io::Error> for LifedataCliError {
    fn from(e: io::Error) -> Self {
        LifedataCliError::Io(e)
    }
}

impl From<PipelineError> for LifedataCliError {
    fn from(e: PipelineError) -> Self {
        LifedataCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for LifedataCliError {
    fn from(e: serde_json::Error) -> Self {
        LifedataCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LifedataCliError> for CliError {
    fn from(e: LifedataCliError) -> Self {
        match e {
            LifedataCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LifedataCliError::Pipeline(e) => {
                let hint = match &e {
                    PipelineError::ConfigError(_) => "Check the lifedata.toml syntax and keys",
                    PipelineError::InvalidTimezone(_) => "Use an IANA name such as \"Europe/Berlin\"",
                    PipelineError::MalformedSource { .. } => "Run 'lifedata validate' for details",
                    _ => "Run 'lifedata doctor' to check the setup",
                };
                CliError {
                    code: e.code().to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            LifedataCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            LifedataCliError::NoSources => CliError {
                code: "NO_SOURCES".to_string(),
                message: "No source exports configured".to_string(),
                hint: Some("Pass --chrome, --youtube or --maps, or set [sources] in lifedata.toml".to_string()),
            },
            LifedataCliError::SourcesFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} sources failed to load"),
                hint: Some("Check that each export is a JSON array or NDJSON of records".to_string()),
            },
            LifedataCliError::PredictionUnavailable { code, reason } => CliError {
                code,
                message: reason,
                hint: Some("Provide a model artifact and at least two active days".to_string()),
            },
            LifedataCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_sources: usize,
    failed_sources: usize,
    sources: Vec<SourceSummary>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

impl DoctorCheck {
    fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Ok, message)
    }

    fn warning(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warning, message)
    }

    fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Error, message)
    }

    fn new(name: impl Into<String>, status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            message: message.into(),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
