//! Pipeline orchestration
//!
//! This module provides the public API for processing a dataset. It runs the
//! stages in order: load → score → write, with summaries computed on demand
//! from the scored table.

use crate::aggregate::{project, summarize, AggregateOptions, DayFilter, Summary};
use crate::config::PipelineConfig;
use crate::error::WellbeingError;
use crate::loader;
use crate::report::{ReportEncoder, SummaryReport};
use crate::scorer::RecordScorer;
use crate::types::{ScoredTable, Table};
use crate::writer::{self, WriteOptions};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Score a delimited dataset and return the augmented table as text
/// (stateless, one-shot, default configuration).
///
/// # Example
/// ```
/// let input = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type\n\
///              4,2,1,5,1,72,Weekday\n";
/// let output = student_wellbeing::process_csv(input).unwrap();
/// assert!(output.ends_with("Weekday,7.5,High Risk,Low\n"));
/// ```
pub fn process_csv(input: &str) -> Result<String, WellbeingError> {
    let pipeline = WellbeingPipeline::new();
    let mut buffer = Vec::new();
    pipeline.run(input.as_bytes(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| WellbeingError::Output(e.to_string()))
}

/// Score a delimited dataset and summarize the rows matching `filter`
pub fn summarize_csv(input: &str, filter: DayFilter) -> Result<Summary, WellbeingError> {
    let pipeline = WellbeingPipeline::new();
    let table = pipeline.score(pipeline.load(input.as_bytes())?)?;
    Ok(pipeline.summarize(&table, filter))
}

/// Result of a full run: the augmented table and its unfiltered summary
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub table: ScoredTable,
    pub summary: Summary,
}

/// Pipeline with an explicit configuration and injected source/sink
pub struct WellbeingPipeline {
    config: PipelineConfig,
    encoder: ReportEncoder,
}

impl Default for WellbeingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl WellbeingPipeline {
    /// Create a pipeline with default settings
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a pipeline with a validated configuration
    pub fn with_config(config: PipelineConfig) -> Result<Self, WellbeingError> {
        config.validate()?;
        Ok(Self {
            config,
            encoder: ReportEncoder::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn delimiter(&self) -> Result<u8, WellbeingError> {
        self.config.delimiter_byte()
    }

    fn write_options(&self) -> Result<WriteOptions, WellbeingError> {
        Ok(WriteOptions {
            delimiter: self.delimiter()?,
            include_productivity_level: self.config.include_productivity_level,
        })
    }

    fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            histogram_bins: self.config.histogram_bins,
        }
    }

    /// Stage 1: load a dataset from a reader
    pub fn load<R: Read>(&self, source: R) -> Result<Table, WellbeingError> {
        loader::load_reader(source, self.delimiter()?)
    }

    /// Stage 1: load a dataset from a file
    pub fn load_path(&self, path: &Path) -> Result<Table, WellbeingError> {
        loader::load_path(path, self.delimiter()?)
    }

    /// Stage 2: derive metrics for every row under the configured quality policy
    pub fn score(&self, table: Table) -> Result<ScoredTable, WellbeingError> {
        RecordScorer::score_table(table, self.config.quality_policy)
    }

    /// Aggregate the rows matching `filter`
    pub fn summarize(&self, table: &ScoredTable, filter: DayFilter) -> Summary {
        summarize(&project(table, filter), &self.aggregate_options())
    }

    /// Aggregate and wrap with producer metadata
    pub fn report(
        &self,
        table: &ScoredTable,
        filter: DayFilter,
        source: Option<&str>,
    ) -> SummaryReport {
        self.encoder
            .encode(self.summarize(table, filter), filter, source)
    }

    /// Stage 3: write the augmented table to a sink
    pub fn write<W: Write>(&self, table: &ScoredTable, sink: W) -> Result<(), WellbeingError> {
        writer::write_table_to(table, sink, &self.write_options()?)
    }

    /// Stage 3: replace the file at `path` with the augmented table
    pub fn write_path(&self, table: &ScoredTable, path: &Path) -> Result<(), WellbeingError> {
        writer::write_table_atomic(table, path, &self.write_options()?)
    }

    /// Load from `source`, score, and write the augmented table to `sink`.
    ///
    /// Nothing is written unless loading and scoring both succeed.
    pub fn run<R: Read, W: Write>(&self, source: R, sink: W) -> Result<RunOutcome, WellbeingError> {
        let table = self.score(self.load(source)?)?;
        self.write(&table, sink)?;
        Ok(self.finish(table))
    }

    /// File-to-file variant of [`run`](Self::run); the output is replaced atomically
    pub fn run_paths(&self, input: &Path, output: &Path) -> Result<RunOutcome, WellbeingError> {
        let table = self.score(self.load_path(input)?)?;
        self.write_path(&table, output)?;
        Ok(self.finish(table))
    }

    fn finish(&self, table: ScoredTable) -> RunOutcome {
        let summary = self.summarize(&table, DayFilter::All);
        info!(
            rows = table.len(),
            excluded = summary.excluded_records,
            high_risk = summary.high_risk_count,
            "pipeline run complete"
        );
        RunOutcome { table, summary }
    }
}
