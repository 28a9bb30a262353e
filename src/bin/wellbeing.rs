//! Wellbeing CLI - Command-line interface for the student wellbeing pipeline
//!
//! Commands:
//! - process: Score a dataset and write the augmented table
//! - summary: Aggregate a filtered view for dashboards and reports
//! - validate: Check required columns and report data-quality issues
//! - schema: Print input or output column schemas

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

use student_wellbeing::aggregate::DayFilter;
use student_wellbeing::report::{productivity_kpi, render_text};
use student_wellbeing::types::{
    QualityIssue, Table, COL_BURNOUT_RISK, COL_DAY_TYPE, COL_PRODUCTIVITY_LEVEL,
    COL_PRODUCTIVITY_SCORE, REQUIRED_COLUMNS,
};
use student_wellbeing::writer::format_float;
use student_wellbeing::{
    PipelineConfig, QualityPolicy, WellbeingError, WellbeingPipeline, VERSION,
};

/// Wellbeing - productivity and burnout-risk indicators from student behavior data
#[derive(Parser)]
#[command(name = "wellbeing")]
#[command(version = VERSION)]
#[command(about = "Compute student productivity and burnout-risk indicators", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Pipeline configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a dataset and write the augmented table
    Process {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "processed_student_behavior.csv")]
        output: PathBuf,

        /// Leave out the productivity_level column
        #[arg(long)]
        no_level: bool,

        /// Fail the run on any record with missing or non-numeric scoring inputs
        #[arg(long)]
        strict: bool,

        /// Number of input rows to preview
        #[arg(long, default_value = "5")]
        preview: usize,
    },

    /// Aggregate a filtered view of the scored dataset
    Summary {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Day type filter
        #[arg(long, value_enum, default_value = "all")]
        day_type: DayTypeArg,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: SummaryFormat,

        /// Number of productivity score histogram bins
        #[arg(long)]
        bins: Option<usize>,

        /// Write the summary to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check required columns and report data-quality issues
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print column schemas
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DayTypeArg {
    All,
    Weekday,
    Weekend,
}

impl From<DayTypeArg> for DayFilter {
    fn from(arg: DayTypeArg) -> Self {
        match arg {
            DayTypeArg::All => DayFilter::All,
            DayTypeArg::Weekday => DayFilter::Weekday,
            DayTypeArg::Weekend => DayFilter::Weekend,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SummaryFormat {
    /// Plain-text report with charts
    Text,
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemaType {
    /// Columns the input file must carry
    Input,
    /// Columns of the augmented output file
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
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .init();

    debug!("wellbeing started with verbosity level: {}", verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());
}

fn run(cli: Cli) -> Result<(), WellbeingCliError> {
    let config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };

    match cli.command {
        Commands::Process {
            input,
            output,
            no_level,
            strict,
            preview,
        } => {
            let mut config = config;
            if no_level {
                config.include_productivity_level = false;
            }
            if strict {
                config.quality_policy = QualityPolicy::Fail;
            }
            cmd_process(config, &input, &output, preview)
        }

        Commands::Summary {
            input,
            day_type,
            format,
            bins,
            output,
        } => {
            let mut config = config;
            if let Some(bins) = bins {
                config.histogram_bins = bins;
            }
            cmd_summary(config, &input, day_type.into(), format, output.as_deref())
        }

        Commands::Validate { input, json } => cmd_validate(config, &input, json),

        Commands::Schema { schema_type, json } => cmd_schema(schema_type, json),
    }
}

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn load_table(pipeline: &WellbeingPipeline, input: &Path) -> Result<Table, WellbeingError> {
    if is_stdio(input) {
        pipeline.load(io::stdin().lock())
    } else {
        pipeline.load_path(input)
    }
}

fn cmd_process(
    config: PipelineConfig,
    input: &Path,
    output: &Path,
    preview: usize,
) -> Result<(), WellbeingCliError> {
    let pipeline = WellbeingPipeline::with_config(config)?;
    let table = load_table(&pipeline, input)?;
    let to_stdout = is_stdio(output);

    if !to_stdout && preview > 0 {
        print!("{}", format_preview(&table, preview));
    }

    let scored = pipeline.score(table)?;

    if to_stdout {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        pipeline.write(&scored, &mut handle)?;
        handle.flush()?;
        return Ok(());
    }

    pipeline.write_path(&scored, output)?;
    let summary = pipeline.summarize(&scored, DayFilter::All);

    println!();
    println!(
        "Average Productivity Score: {}",
        summary
            .mean_productivity_display
            .map(format_float)
            .unwrap_or_else(|| "n/a".to_string())
    );
    println!("Students with High Burnout Risk: {}", summary.high_risk_count);
    if summary.excluded_records > 0 {
        println!(
            "Records excluded for data quality issues: {}",
            summary.excluded_records
        );
    }
    println!();
    println!("Processed dataset saved to {}", output.display());

    Ok(())
}

fn cmd_summary(
    config: PipelineConfig,
    input: &Path,
    filter: DayFilter,
    format: SummaryFormat,
    output: Option<&Path>,
) -> Result<(), WellbeingCliError> {
    let pipeline = WellbeingPipeline::with_config(config)?;
    let table = pipeline.score(load_table(&pipeline, input)?)?;

    let source = if is_stdio(input) {
        None
    } else {
        Some(input.to_string_lossy().into_owned())
    };
    let report = pipeline.report(&table, filter, source.as_deref());
    debug!(
        filter = filter.as_str(),
        kpi = %productivity_kpi(&report.summary),
        "summary computed"
    );

    let rendered = match format {
        SummaryFormat::Text => render_text(&report),
        SummaryFormat::Json => serde_json::to_string(&report)? + "\n",
        SummaryFormat::JsonPretty => serde_json::to_string_pretty(&report)? + "\n",
    };

    match output {
        Some(path) => fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }

    Ok(())
}

fn cmd_validate(
    config: PipelineConfig,
    input: &Path,
    json: bool,
) -> Result<(), WellbeingCliError> {
    let pipeline = WellbeingPipeline::with_config(config)?;
    let table = load_table(&pipeline, input)?;

    let rows: Vec<RowIssues> = table
        .rows
        .iter()
        .filter(|row| !row.issues.is_empty())
        .map(|row| RowIssues {
            row: row.row,
            excluded: row.issues.iter().any(QualityIssue::is_blocking),
            issues: row.issues.clone(),
        })
        .collect();

    let report = ValidationReport {
        total_rows: table.len(),
        rows_with_issues: rows.len(),
        excluded_rows: rows.iter().filter(|r| r.excluded).count(),
        rows,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total rows:       {}", report.total_rows);
        println!("Rows with issues: {}", report.rows_with_issues);
        println!("Excluded rows:    {}", report.excluded_rows);

        if !report.rows.is_empty() {
            println!("\nIssues:");
            for row in &report.rows {
                for issue in &row.issues {
                    println!("  - Row {}: {}", row.row, issue);
                }
            }
        }
    }

    if report.rows_with_issues > 0 {
        Err(WellbeingCliError::ValidationFailed(report.rows_with_issues))
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json: bool) -> Result<(), WellbeingCliError> {
    let mut columns: Vec<SchemaColumn> = REQUIRED_COLUMNS
        .iter()
        .map(|&name| SchemaColumn {
            name,
            kind: if name == COL_DAY_TYPE {
                "string (Weekday | Weekend)"
            } else {
                "number"
            },
            derived: false,
        })
        .collect();

    if matches!(schema_type, SchemaType::Output) {
        columns.extend([
            SchemaColumn {
                name: COL_PRODUCTIVITY_SCORE,
                kind: "number (empty when inputs are missing)",
                derived: true,
            },
            SchemaColumn {
                name: COL_BURNOUT_RISK,
                kind: "string (High Risk | Low Risk)",
                derived: true,
            },
            SchemaColumn {
                name: COL_PRODUCTIVITY_LEVEL,
                kind: "string (High | Medium | Low), optional",
                derived: true,
            },
        ]);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&columns)?);
        return Ok(());
    }

    match schema_type {
        SchemaType::Input => {
            println!("Input Schema");
            println!();
            println!("Delimited text with a header row. Extra columns are preserved.");
        }
        SchemaType::Output => {
            println!("Output Schema");
            println!();
            println!("Input columns unchanged, followed by the derived columns. No index column.");
        }
    }
    println!();
    for column in &columns {
        let marker = if column.derived { " (derived)" } else { "" };
        println!("  {:<22} {}{}", column.name, column.kind, marker);
    }

    Ok(())
}

// Helper functions

/// Render the first `limit` rows as an aligned table
fn format_preview(table: &Table, limit: usize) -> String {
    let mut grid: Vec<Vec<String>> = vec![table.headers.iter().map(str::to_string).collect()];
    grid.extend(
        table
            .rows
            .iter()
            .take(limit)
            .map(|row| row.raw.iter().map(str::to_string).collect()),
    );

    let columns = grid.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            grid.iter()
                .filter_map(|r| r.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut output = String::new();
    for row in &grid {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:>width$}"))
            .collect::<Vec<_>>()
            .join("  ");
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

// Error types

#[derive(Debug)]
enum WellbeingCliError {
    Io(io::Error),
    Pipeline(WellbeingError),
    Json(serde_json::Error),
    ValidationFailed(usize),
}

impl From<io::Error> for WellbeingCliError {
    fn from(e: io::Error) -> Self {
        WellbeingCliError::Io(e)
    }
}

impl From<WellbeingError> for WellbeingCliError {
    fn from(e: WellbeingError) -> Self {
        WellbeingCliError::Pipeline(e)
    }
}

impl From<serde_json::Error> for WellbeingCliError {
    fn from(e: serde_json::Error) -> Self {
        WellbeingCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<WellbeingCliError> for CliError {
    fn from(e: WellbeingCliError) -> Self {
        match e {
            WellbeingCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            WellbeingCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            WellbeingCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} rows have data quality issues", count),
                hint: Some("Rows with scoring issues are left out of aggregates that need those cells; fix the listed cells".to_string()),
            },
            WellbeingCliError::Pipeline(e) => {
                let (code, hint) = match &e {
                    WellbeingError::Input(_) => ("INPUT_ERROR", Some("Check the input path")),
                    WellbeingError::MissingColumns(_) => (
                        "MISSING_COLUMNS",
                        Some("Run 'wellbeing schema input' for the required columns"),
                    ),
                    WellbeingError::Csv(_) => ("PARSE_ERROR", Some("Check delimiter and row lengths")),
                    WellbeingError::DataQuality { .. } => (
                        "DATA_QUALITY",
                        Some("Run 'wellbeing validate' for details, or drop --strict"),
                    ),
                    WellbeingError::Output(_) => {
                        ("OUTPUT_ERROR", Some("Check the output directory exists and is writable"))
                    }
                    WellbeingError::Io(_) => ("IO_ERROR", Some("Check file paths and permissions")),
                    WellbeingError::Json(_) => ("JSON_ERROR", None),
                    WellbeingError::Config(_) => ("CONFIG_ERROR", Some("Check the --config file")),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: hint.map(str::to_string),
                }
            }
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_rows: usize,
    rows_with_issues: usize,
    excluded_rows: usize,
    rows: Vec<RowIssues>,
}

#[derive(serde::Serialize)]
struct RowIssues {
    row: usize,
    excluded: bool,
    issues: Vec<QualityIssue>,
}

#[derive(serde::Serialize)]
struct SchemaColumn {
    name: &'static str,
    kind: &'static str,
    derived: bool,
}
