//! Pulsefit CLI - Command-line harness for the Pulsefit engine
//!
//! Commands:
//! - summarize: Build a dashboard summary from daily rows
//! - window: Print the current, previous and fetch windows for a period
//! - validate: Validate daily rows against the row schema
//! - doctor: Diagnose configuration

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use pulsefit::encoder::SummaryEncoder;
use pulsefit::schema::{RawDailyRow, RowAdapter, SCHEMA_VERSION};
use pulsefit::{
    EngineConfig, GoalSet, HealthEngine, Period, ReportingCalendar, PRODUCER_NAME, PULSEFIT_VERSION,
};

/// Pulsefit - Aggregation and health-score engine for daily fitness metrics
#[derive(Parser)]
#[command(name = "pulsefit")]
#[command(version = PULSEFIT_VERSION)]
#[command(about = "Aggregate daily fitness rows into dashboard summaries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a dashboard summary for one period
    Summarize {
        /// Rows file path (use - for stdin)
        #[arg(short, long)]
        rows: PathBuf,

        /// Only read rows tagged with this user id
        #[arg(short, long)]
        user: Option<String>,

        /// Goals file (JSON object, missing keys take defaults)
        #[arg(short, long)]
        goals: Option<PathBuf>,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Period to summarize
        #[arg(short, long, default_value = "week")]
        period: Period,

        /// Reference instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Print the windows a period resolves to
    Window {
        /// Period to resolve
        #[arg(short, long, default_value = "week")]
        period: Period,

        /// Reference instant (RFC 3339), defaults to now
        #[arg(long)]
        at: Option<DateTime<Utc>>,

        /// Reporting timezone (IANA format, e.g., "America/Sao_Paulo")
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Validate daily rows
    Validate {
        /// Rows file path (use - for stdin)
        #[arg(short, long)]
        rows: PathBuf,

        /// Only read rows tagged with this user id
        #[arg(short, long)]
        user: Option<String>,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration
    Doctor {
        /// Engine config file to check
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of rows
    Json,
    /// Newline-delimited JSON (one row per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PULSEFIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

fn run(cli: Cli) -> Result<(), PulsefitCliError> {
    match cli.command {
        Commands::Summarize {
            rows,
            user,
            goals,
            config,
            period,
            at,
            input_format,
            output_format,
        } => cmd_summarize(
            &rows,
            user.as_deref(),
            goals.as_deref(),
            config.as_deref(),
            period,
            at.unwrap_or_else(Utc::now),
            input_format,
            output_format,
        ),

        Commands::Window {
            period,
            at,
            timezone,
        } => cmd_window(period, at.unwrap_or_else(Utc::now), timezone),

        Commands::Validate {
            rows,
            user,
            input_format,
            json,
        } => cmd_validate(&rows, user.as_deref(), input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_summarize(
    rows_path: &Path,
    user: Option<&str>,
    goals_path: Option<&Path>,
    config_path: Option<&Path>,
    period: Period,
    at: DateTime<Utc>,
    input_format: InputFormat,
    output_format: OutputFormat,
) -> Result<(), PulsefitCliError> {
    let rows = read_rows(rows_path, user, &input_format)?;
    if rows.is_empty() {
        tracing::info!("no rows in input, summary will be zero-valued");
    }
    let records = RowAdapter::to_records(&rows)?;

    let goals = match goals_path {
        Some(path) => serde_json::from_str::<GoalSet>(&fs::read_to_string(path)?)?.sanitized(),
        None => GoalSet::default(),
    };
    let config = load_config(config_path)?;
    let engine = HealthEngine::new(&config)?;

    let summary = engine.summarize(&records, &goals, period, at);
    let payload = SummaryEncoder::new().encode(&summary);

    let output = match output_format {
        OutputFormat::Json => serde_json::to_string(&payload)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&payload)?,
    };
    println!("{}", output);
    Ok(())
}

fn cmd_window(
    period: Period,
    at: DateTime<Utc>,
    timezone: Option<String>,
) -> Result<(), PulsefitCliError> {
    let config = match timezone {
        Some(tz) => EngineConfig::with_timezone(tz),
        None => EngineConfig::default(),
    };
    let engine = HealthEngine::new(&config)?;

    let report = WindowReport {
        period: period.to_string(),
        reporting_timezone: config.reporting_timezone.clone(),
        current: engine.resolve(period, at).to_string(),
        previous: engine.previous_window(period, at).to_string(),
        fetch: engine.fetch_window(period, at).to_string(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_validate(
    rows_path: &Path,
    user: Option<&str>,
    input_format: InputFormat,
    json: bool,
) -> Result<(), PulsefitCliError> {
    let rows = read_rows(rows_path, user, &input_format)?;
    let failures = RowAdapter::validate_rows(&rows);

    let report = ValidationReport {
        total_rows: rows.len(),
        valid_rows: rows.len() - failures.len(),
        invalid_rows: failures.len(),
        errors: failures
            .iter()
            .map(|f| ValidationErrorDetail {
                index: f.index,
                date: f.date.clone(),
                error: f.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Schema:       {}", SCHEMA_VERSION);
        println!("Total rows:   {}", report.total_rows);
        println!("Valid rows:   {}", report.valid_rows);
        println!("Invalid rows: {}", report.invalid_rows);
        for err in &report.errors {
            println!("  [{}] {}: {}", err.index, err.date, err.error);
        }
    }

    if report.invalid_rows > 0 {
        Err(PulsefitCliError::ValidationFailed(report.invalid_rows))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), PulsefitCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "pulsefit_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Pulsefit version {}", PULSEFIT_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    match config_path {
        Some(path) if !path.exists() => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Warning,
            message: "Config file does not exist, defaults apply".to_string(),
        }),
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => match EngineConfig::from_json(&content) {
                Ok(config) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Ok,
                    message: format!(
                        "Config valid (reporting timezone {})",
                        config.reporting_timezone
                    ),
                }),
                Err(e) => checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Invalid config: {}", e),
                }),
            },
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: format!("Cannot read config file: {}", e),
            }),
        },
        None => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "No config file, using reporting timezone {}",
                EngineConfig::default().reporting_timezone
            ),
        }),
    }

    let timezone = config_path
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|content| serde_json::from_str::<EngineConfig>(&content).ok())
        .unwrap_or_default()
        .reporting_timezone;
    let timezone_check = match ReportingCalendar::from_name(&timezone) {
        Ok(calendar) => DoctorCheck {
            name: "reporting_timezone".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "{} (today is {})",
                timezone,
                calendar.local_date(Utc::now()).format("%Y-%m-%d")
            ),
        },
        Err(e) => DoctorCheck {
            name: "reporting_timezone".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    };
    checks.push(timezone_check);

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass rows with --rows <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--rows - will read it)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PULSEFIT_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Pulsefit Doctor Report");
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

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PulsefitCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn read_input(path: &Path) -> Result<String, PulsefitCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn read_rows(
    path: &Path,
    user: Option<&str>,
    format: &InputFormat,
) -> Result<Vec<RawDailyRow>, PulsefitCliError> {
    let input = read_input(path)?;
    let rows = match format {
        InputFormat::Json => RowAdapter::parse_array(&input)?,
        InputFormat::Ndjson => RowAdapter::parse_ndjson(&input)?,
    };
    Ok(match user {
        Some(user_id) => RowAdapter::rows_for_user(&rows, user_id),
        None => rows,
    })
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig, PulsefitCliError> {
    match path {
        Some(path) => Ok(EngineConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(EngineConfig::default()),
    }
}

#[derive(Debug)]
enum PulsefitCliError {
    Io(io::Error),
    Engine(pulsefit::EngineError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PulsefitCliError {
    fn from(e: io::Error) -> Self {
        PulsefitCliError::Io(e)
    }
}

impl From<pulsefit::EngineError> for PulsefitCliError {
    fn from(e: pulsefit::EngineError) -> Self {
        PulsefitCliError::Engine(e)
    }
}

impl From<serde_json::Error> for PulsefitCliError {
    fn from(e: serde_json::Error) -> Self {
        PulsefitCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PulsefitCliError> for CliError {
    fn from(e: PulsefitCliError) -> Self {
        match e {
            PulsefitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PulsefitCliError::Engine(e) => {
                let hint = match &e {
                    pulsefit::EngineError::InvalidTimezone(_) => {
                        "Use an IANA timezone name such as America/Sao_Paulo"
                    }
                    pulsefit::EngineError::Validation(_)
                    | pulsefit::EngineError::DuplicateDate(_) => {
                        "Run 'pulsefit validate' for details"
                    }
                    pulsefit::EngineError::MixedUsers { .. } => {
                        "Pass --user to summarize one user's rows"
                    }
                    _ => "Ensure input matches pulsefit.daily_row.v1 schema",
                };
                CliError {
                    code: "ENGINE_ERROR".to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PulsefitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PulsefitCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PulsefitCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct WindowReport {
    period: String,
    reporting_timezone: String,
    current: String,
    previous: String,
    fetch: String,
}

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    valid_rows: usize,
    invalid_rows: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    date: String,
    error: String,
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

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
