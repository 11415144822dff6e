//! Cradle CLI - Command-line interface for Cradle Insights
//!
//! Commands:
//! - stats: Compute a report comparing two periods
//! - validate: Validate activity records against the input schema
//! - schema: Print input or output schema information

use chrono::{DateTime, Local};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cradle_insights::encoder::REPORT_VERSION;
use cradle_insights::schema::{RawActivity, RawActivityAdapter, SCHEMA_VERSION};
use cradle_insights::{
    InMemorySource, InsightsError, InsightsProcessor, PeriodSelector, Settings,
    SettingsSource, VolumeUnit, INSIGHTS_VERSION,
};

/// Cradle - On-device statistics for infant care activity logs
#[derive(Parser)]
#[command(name = "cradle")]
#[command(version = INSIGHTS_VERSION)]
#[command(about = "Summarize sleep, feeding and diaper logs", long_about = None)]
struct Cli {
    /// Log pipeline details to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute a report for a main period compared against another
    Stats {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Subject (baby) identifier
        #[arg(long)]
        subject: String,

        /// Main period in days (2, 7, 14 or 30)
        #[arg(long, default_value = "7")]
        period: u32,

        /// Comparison period in days (2, 7, 14 or 30)
        #[arg(long, default_value = "14")]
        compare: u32,

        /// Reference time (RFC 3339); defaults to the current local time
        #[arg(long)]
        now: Option<String>,

        /// Display unit for feed volumes (OZ or ML); overrides --settings
        #[arg(long)]
        unit: Option<String>,

        /// Subject timezone (IANA format, e.g., "America/Denver")
        #[arg(long)]
        timezone: Option<String>,

        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Validate activity records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "auto")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Detect from the first character
    Auto,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
    /// JSON array of records
    Json,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (activity records)
    Input,
    /// Output schema (insights report)
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

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

fn init_tracing(verbose: bool) {
    let default_directive = if verbose {
        "cradle_insights=debug,cradle=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CradleCliError> {
    match cli.command {
        Commands::Stats {
            input,
            input_format,
            subject,
            period,
            compare,
            now,
            unit,
            timezone,
            settings,
        } => cmd_stats(StatsArgs {
            input: &input,
            input_format,
            subject: &subject,
            period,
            compare,
            now: now.as_deref(),
            unit: unit.as_deref(),
            timezone: timezone.as_deref(),
            settings: settings.as_deref(),
        }),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

struct StatsArgs<'a> {
    input: &'a Path,
    input_format: InputFormat,
    subject: &'a str,
    period: u32,
    compare: u32,
    now: Option<&'a str>,
    unit: Option<&'a str>,
    timezone: Option<&'a str>,
    settings: Option<&'a Path>,
}

fn cmd_stats(args: StatsArgs<'_>) -> Result<(), CradleCliError> {
    let main_period = PeriodSelector::try_from(args.period)?;
    let compare_period = PeriodSelector::try_from(args.compare)?;

    let settings = match args.settings {
        Some(path) => Settings::from_json(&fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    let display_unit = match args.unit {
        Some(unit) => unit.parse::<VolumeUnit>()?,
        None => settings.bottle_unit(),
    };

    let mut now = match args.now {
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map_err(|_| InsightsError::InvalidTimestamp(s.to_string()))?,
        None => Local::now().fixed_offset(),
    };

    let raw = parse_input(&read_input(args.input)?, &args.input_format)?;
    let mut records = RawActivityAdapter::to_records(&raw)?;

    if let Some(tz) = args.timezone {
        records = RawActivityAdapter::localize(records, tz)?;
        now = RawActivityAdapter::localize_instant(now, tz)?;
    }
    debug!(records = records.len(), %now, unit = display_unit.as_str(), "loaded activity log");

    let source = InMemorySource::new(records);
    let mut processor = InsightsProcessor::with_display_unit(display_unit);
    let cached = processor.refresh(&source, args.subject, now)?;
    info!(subject = args.subject, cached, "computing report");

    println!("{}", processor.report(main_period, compare_period, now)?);
    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), CradleCliError> {
    let records = parse_input(&read_input(input)?, &input_format)?;

    // Validate each record
    let results = RawActivityAdapter::validate_records(&records);

    let report = ValidationReport {
        total_records: records.len(),
        valid_records: records.len() - results.len(),
        invalid_records: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                record_id: r.record_id.clone(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total records:   {}", report.total_records);
        println!("Valid records:   {}", report.valid_records);
        println!("Invalid records: {}", report.invalid_records);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Record {} (index {}): {}",
                    err.record_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_records > 0 {
        Err(CradleCliError::ValidationFailed(report.invalid_records))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), CradleCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("Activity records are JSON objects (array or NDJSON), camelCase.");
                println!("Every record needs babyId. An optional kind (sleep, feed, diaper)");
                println!("overrides inference from the fields present:");
                println!();
                println!("1. sleep - startTime present");
                println!("   - startTime, endTime (absent while in progress), duration (minutes)");
                println!();
                println!("2. feed - type is BOTTLE, BREAST or SOLIDS");
                println!("   - time, amount, unitAbbr (OZ, ML, TBSP, G)");
                println!();
                println!("3. diaper - type is WET, DIRTY or BOTH");
                println!("   - time");
                println!();
                println!("Timestamps are RFC 3339 with a UTC offset.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: insights report {}", REPORT_VERSION);
                println!();
                println!("- report_version, subject_id, computed_at");
                println!("- producer: {{ name, version, instance_id }}");
                println!("- main, compare: {{ period_days, start, end, stats, empty }}");
                println!("  - stats: {{ avg_wake_window_minutes, avg_nap_minutes, avg_night_sleep_minutes,");
                println!("             avg_night_wakings, avg_feedings_per_day, avg_feed_amount,");
                println!("             avg_diaper_changes_per_day, avg_poops_per_day }}");
                println!("- trends: metric name -> positive | negative | neutral");
                println!("- quality: {{ empty, activity_count }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &Path) -> Result<String, CradleCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_input(data: &str, format: &InputFormat) -> Result<Vec<RawActivity>, CradleCliError> {
    let records = match format {
        InputFormat::Auto => RawActivityAdapter::parse_auto(data)?,
        InputFormat::Ndjson => RawActivityAdapter::parse_ndjson(data)?,
        InputFormat::Json => RawActivityAdapter::parse_array(data)?,
    };
    Ok(records)
}

fn get_input_json_schema() -> String {
    let timestamp = serde_json::json!({ "type": "string", "format": "date-time" });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": SCHEMA_VERSION,
        "description": "Infant care activity record",
        "type": "object",
        "required": ["babyId"],
        "properties": {
            "id": { "type": "string" },
            "kind": { "type": "string", "enum": ["sleep", "feed", "diaper"] },
            "babyId": { "type": "string" },
            "startTime": timestamp,
            "endTime": timestamp,
            "duration": { "type": "number" },
            "time": timestamp,
            "type": {
                "type": "string",
                "enum": ["BOTTLE", "BREAST", "SOLIDS", "WET", "DIRTY", "BOTH"]
            },
            "amount": { "type": "number" },
            "unitAbbr": { "type": "string", "enum": ["OZ", "ML", "TBSP", "G"] }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    let period = serde_json::json!({
        "type": "object",
        "required": ["period_days", "start", "end", "stats", "empty"],
        "properties": {
            "period_days": { "type": "integer", "enum": [2, 7, 14, 30] },
            "start": { "type": "string", "format": "date-time" },
            "end": { "type": "string", "format": "date-time" },
            "stats": { "type": "object", "additionalProperties": { "type": "number" } },
            "empty": { "type": "boolean" }
        }
    });
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "cradle.insights_report",
        "description": "Cradle insights report",
        "type": "object",
        "required": ["report_version", "producer", "subject_id", "computed_at", "main", "compare", "trends", "quality"],
        "properties": {
            "report_version": { "type": "string", "const": REPORT_VERSION },
            "producer": {
                "type": "object",
                "required": ["name", "version", "instance_id"],
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string", "format": "uuid" }
                }
            },
            "subject_id": { "type": "string" },
            "computed_at": { "type": "string", "format": "date-time" },
            "main": period,
            "compare": period,
            "trends": {
                "type": "object",
                "additionalProperties": { "type": "string", "enum": ["positive", "negative", "neutral"] }
            },
            "quality": {
                "type": "object",
                "properties": {
                    "empty": { "type": "boolean" },
                    "activity_count": { "type": "integer" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum CradleCliError {
    Io(io::Error),
    Insights(InsightsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for CradleCliError {
    fn from(e: io::Error) -> Self {
        CradleCliError::Io(e)
    }
}

impl From<InsightsError> for CradleCliError {
    fn from(e: InsightsError) -> Self {
        CradleCliError::Insights(e)
    }
}

impl From<serde_json::Error> for CradleCliError {
    fn from(e: serde_json::Error) -> Self {
        CradleCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CradleCliError> for CliError {
    fn from(e: CradleCliError) -> Self {
        match e {
            CradleCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CradleCliError::Insights(e) => {
                let (code, hint) = match &e {
                    InsightsError::InvalidPeriod(_) => ("INVALID_PERIOD", "Use 2, 7, 14 or 30"),
                    InsightsError::InvalidTimezone(_) => {
                        ("INVALID_TIMEZONE", "Use an IANA name such as America/Denver")
                    }
                    InsightsError::InvalidTimestamp(_) => {
                        ("INVALID_TIMESTAMP", "Use RFC 3339, e.g. 2024-06-20T12:00:00-07:00")
                    }
                    InsightsError::Validation(_) => {
                        ("VALIDATION_ERROR", "Run 'cradle validate' for details")
                    }
                    _ => ("PARSE_ERROR", "Run 'cradle schema input' for the expected format"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            CradleCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CradleCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} records failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_records: usize,
    valid_records: usize,
    invalid_records: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    record_id: Option<String>,
    error: String,
}
