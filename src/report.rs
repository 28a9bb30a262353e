//! Summary reports
//!
//! Wraps a [`Summary`] with producer metadata for JSON output and renders a
//! plain-text report with the KPIs, bar charts, histogram, and advisories.

use crate::aggregate::{AdvisorySeverity, DayFilter, Summary};
use crate::error::WellbeingError;
use crate::writer::format_float;
use crate::{PRODUCER_NAME, VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use uuid::Uuid;

/// Current summary report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Widest bar drawn in text charts
const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub run_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    /// Input the summary was computed from, when known
    pub source: Option<String>,
    pub computed_at_utc: String,
}

/// A summary plus the metadata describing how it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub filter: DayFilter,
    pub summary: Summary,
}

/// Report encoder; one run id per encoder
pub struct ReportEncoder {
    run_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a fresh run id
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific run id
    pub fn with_run_id(run_id: String) -> Self {
        Self { run_id }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn encode(&self, summary: Summary, filter: DayFilter, source: Option<&str>) -> SummaryReport {
        SummaryReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: VERSION.to_string(),
                run_id: self.run_id.clone(),
            },
            provenance: ReportProvenance {
                source: source.map(str::to_string),
                computed_at_utc: Utc::now().to_rfc3339(),
            },
            filter,
            summary,
        }
    }

    pub fn encode_to_json(
        &self,
        summary: Summary,
        filter: DayFilter,
        source: Option<&str>,
        pretty: bool,
    ) -> Result<String, WellbeingError> {
        let report = self.encode(summary, filter, source);
        let json = if pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(json)
    }
}

/// Mean productivity KPI, e.g. `"11.3 pts"`
pub fn productivity_kpi(summary: &Summary) -> String {
    match summary.mean_productivity_display {
        Some(mean) => format!("{} pts", format_float(mean)),
        None => "n/a".to_string(),
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.max(1))
}

/// Render a plain-text report
pub fn render_text(report: &SummaryReport) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    let _ = writeln!(output, "Student Digital Wellbeing Report");
    let _ = writeln!(output, "================================");
    let _ = writeln!(
        output,
        "Day type: {}  |  run {}",
        report.filter.as_str(),
        report.producer.run_id
    );
    if summary.excluded_records > 0 {
        let _ = writeln!(
            output,
            "{} of {} records excluded for data quality issues",
            summary.excluded_records, summary.total_records
        );
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "{:<28}{}", "Avg Productivity Score", productivity_kpi(summary));
    let _ = writeln!(
        output,
        "{:<28}{} students",
        "Students at Burnout Risk", summary.high_risk_count
    );
    let _ = writeln!(
        output,
        "{:<28}{} students",
        "Total Students", summary.total_records
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "Average Daily Time Distribution (hrs/day)");
    let activities = [
        ("Study", summary.activity_means.study_hours),
        ("Social Media", summary.activity_means.social_media_hours),
        ("Entertainment", summary.activity_means.entertainment_hours),
    ];
    let max_hours = activities
        .iter()
        .filter_map(|(_, hours)| *hours)
        .fold(0.0, f64::max);
    for (label, hours) in activities {
        match hours {
            Some(hours) => {
                let _ = writeln!(
                    output,
                    "  {:<14} {:<w$} {:.2}",
                    label,
                    bar(hours, max_hours),
                    hours,
                    w = BAR_WIDTH
                );
            }
            None => {
                let _ = writeln!(output, "  {:<14} n/a", label);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Burnout Risk Distribution (student count)");
    for share in &summary.risk_breakdown {
        let _ = writeln!(
            output,
            "  {:<10} {:>5} ({:.1}%)",
            share.risk.as_str(),
            share.count,
            share.proportion * 100.0
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Productivity Levels");
    for level in &summary.level_breakdown {
        let _ = writeln!(output, "  {:<10} {:>5}", level.level.as_str(), level.count);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Productivity Score Distribution (score index)");
    if summary.histogram.is_empty() {
        let _ = writeln!(output, "  No scored records.");
    } else {
        let max_count = summary.histogram.iter().map(|b| b.count).max().unwrap_or(0);
        for bin in &summary.histogram {
            let _ = writeln!(
                output,
                "  [{:>7.2}, {:>7.2}] {:<w$} {}",
                bin.lower,
                bin.upper,
                bar(bin.count as f64, max_count as f64),
                bin.count,
                w = BAR_WIDTH
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "Sleep (hrs/day) vs Academic Score");
    let correlation = summary
        .sleep_academic_correlation
        .map(|r| format!("{r:.3}"))
        .unwrap_or_else(|| "n/a".to_string());
    let _ = writeln!(
        output,
        "  {} points, Pearson r = {}",
        summary.correlation_points.len(),
        correlation
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "Insights");
    for advisory in &summary.advisories {
        let tag = match advisory.severity {
            AdvisorySeverity::Warning => "[WARN]",
            AdvisorySeverity::Info => "[INFO]",
        };
        let _ = writeln!(output, "  {} {}", tag, advisory.message);
    }

    output
}
