//! Core types for the student wellbeing pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: loaded records, derived metrics, scored rows, and the tables that
//! hold them.

use csv::StringRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const COL_STUDY_HOURS: &str = "study_hours";
pub const COL_SOCIAL_MEDIA_HOURS: &str = "social_media_hours";
pub const COL_ENTERTAINMENT_HOURS: &str = "entertainment_hours";
pub const COL_SLEEP_HOURS: &str = "sleep_hours";
pub const COL_BREAKS_COUNT: &str = "breaks_count";
pub const COL_ACADEMIC_SCORE: &str = "academic_score";
pub const COL_DAY_TYPE: &str = "day_type";

pub const COL_PRODUCTIVITY_SCORE: &str = "productivity_score";
pub const COL_BURNOUT_RISK: &str = "burnout_risk";
pub const COL_PRODUCTIVITY_LEVEL: &str = "productivity_level";

/// Columns every input file must carry, in canonical order
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_STUDY_HOURS,
    COL_SOCIAL_MEDIA_HOURS,
    COL_ENTERTAINMENT_HOURS,
    COL_SLEEP_HOURS,
    COL_BREAKS_COUNT,
    COL_ACADEMIC_SCORE,
    COL_DAY_TYPE,
];

/// Columns read by the productivity score or the burnout classifier.
///
/// A problem in any of these excludes the record from aggregates.
pub const SCORING_COLUMNS: [&str; 5] = [
    COL_STUDY_HOURS,
    COL_SOCIAL_MEDIA_HOURS,
    COL_ENTERTAINMENT_HOURS,
    COL_SLEEP_HOURS,
    COL_BREAKS_COUNT,
];

/// Weekday/weekend partition of observations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayType::Weekday => "Weekday",
            DayType::Weekend => "Weekend",
        }
    }

    /// Parse the exact labels used in the dataset
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Weekday" => Some(DayType::Weekday),
            "Weekend" => Some(DayType::Weekend),
            _ => None,
        }
    }
}

impl fmt::Display for DayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Burnout classification from the three-condition vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BurnoutRisk {
    #[serde(rename = "High Risk")]
    HighRisk,
    #[serde(rename = "Low Risk")]
    LowRisk,
}

impl BurnoutRisk {
    pub const ALL: [BurnoutRisk; 2] = [BurnoutRisk::HighRisk, BurnoutRisk::LowRisk];

    pub fn as_str(&self) -> &'static str {
        match self {
            BurnoutRisk::HighRisk => "High Risk",
            BurnoutRisk::LowRisk => "Low Risk",
        }
    }
}

impl fmt::Display for BurnoutRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-band classification of the productivity score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductivityLevel {
    High,
    Medium,
    Low,
}

impl ProductivityLevel {
    pub const ALL: [ProductivityLevel; 3] = [
        ProductivityLevel::High,
        ProductivityLevel::Medium,
        ProductivityLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductivityLevel::High => "High",
            ProductivityLevel::Medium => "Medium",
            ProductivityLevel::Low => "Low",
        }
    }
}

impl fmt::Display for ProductivityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student-day observation as read from the input file.
///
/// `None` marks a cell that was empty or could not be parsed; the matching
/// [`QualityIssue`] is kept alongside the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Study time (hours/day)
    pub study_hours: Option<f64>,
    /// Social media time (hours/day)
    pub social_media_hours: Option<f64>,
    /// Entertainment time (hours/day)
    pub entertainment_hours: Option<f64>,
    /// Sleep time (hours/day)
    pub sleep_hours: Option<f64>,
    /// Breaks taken (count/day)
    pub breaks_count: Option<f64>,
    /// Academic score (0-100)
    pub academic_score: Option<f64>,
    /// Weekday or weekend
    pub day_type: Option<DayType>,
}

/// A problem found in a single cell at load time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QualityIssue {
    /// Empty or NaN cell
    Missing { column: String },
    /// Cell present but not a number
    NonNumeric { column: String, value: String },
    /// `day_type` outside Weekday/Weekend
    UnknownDayType { value: String },
}

impl QualityIssue {
    pub fn column(&self) -> &str {
        match self {
            QualityIssue::Missing { column } | QualityIssue::NonNumeric { column, .. } => {
                column.as_str()
            }
            QualityIssue::UnknownDayType { .. } => COL_DAY_TYPE,
        }
    }

    /// Whether the issue prevents scoring or classification
    pub fn is_blocking(&self) -> bool {
        SCORING_COLUMNS.contains(&self.column())
    }
}

impl fmt::Display for QualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityIssue::Missing { column } => write!(f, "{column} is missing"),
            QualityIssue::NonNumeric { column, value } => {
                write!(f, "{column} is not numeric ({value:?})")
            }
            QualityIssue::UnknownDayType { value } => {
                write!(f, "day_type {value:?} is neither Weekday nor Weekend")
            }
        }
    }
}

/// Derived fields appended to every record
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    /// `2*study - (social + entertainment) + 0.5*sleep`
    pub productivity_score: Option<f64>,
    pub burnout_risk: Option<BurnoutRisk>,
    pub productivity_level: Option<ProductivityLevel>,
}

/// A loaded input row: original cells plus the parsed record
#[derive(Debug, Clone)]
pub struct LoadedRow {
    /// 1-based data row number (header excluded)
    pub row: usize,
    /// Cells exactly as read, including columns the pipeline does not use
    pub raw: StringRecord,
    pub record: StudentRecord,
    pub issues: Vec<QualityIssue>,
}

/// In-memory dataset produced by the loader
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: StringRecord,
    pub rows: Vec<LoadedRow>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A row after scoring
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub row: usize,
    pub raw: StringRecord,
    pub record: StudentRecord,
    pub derived: DerivedMetrics,
    pub issues: Vec<QualityIssue>,
}

impl ScoredRecord {
    /// Records with a blocking issue are left out of aggregates
    pub fn is_excluded(&self) -> bool {
        self.issues.iter().any(QualityIssue::is_blocking)
    }
}

/// The augmented table: original columns plus derived metrics per row
#[derive(Debug, Clone)]
pub struct ScoredTable {
    pub headers: StringRecord,
    pub rows: Vec<ScoredRecord>,
}

impl ScoredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows with a blocking data-quality issue
    pub fn excluded(&self) -> impl Iterator<Item = &ScoredRecord> {
        self.rows.iter().filter(|r| r.is_excluded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_type_parse_is_exact() {
        assert_eq!(DayType::parse("Weekday"), Some(DayType::Weekday));
        assert_eq!(DayType::parse("Weekend"), Some(DayType::Weekend));
        assert_eq!(DayType::parse("weekend"), None);
        assert_eq!(DayType::parse(""), None);
    }

    #[test]
    fn test_burnout_risk_serializes_as_label() {
        let json = serde_json::to_string(&BurnoutRisk::HighRisk).unwrap();
        assert_eq!(json, "\"High Risk\"");
        assert_eq!(BurnoutRisk::LowRisk.to_string(), "Low Risk");
    }

    #[test]
    fn test_blocking_issues_cover_scoring_columns_only() {
        let study = QualityIssue::Missing {
            column: COL_STUDY_HOURS.to_string(),
        };
        let academic = QualityIssue::NonNumeric {
            column: COL_ACADEMIC_SCORE.to_string(),
            value: "n/a".to_string(),
        };
        let day = QualityIssue::UnknownDayType {
            value: "Holiday".to_string(),
        };

        assert!(study.is_blocking());
        assert!(!academic.is_blocking());
        assert!(!day.is_blocking());
        assert_eq!(day.column(), COL_DAY_TYPE);
    }

    #[test]
    fn test_quality_issue_serializes_with_kind_tag() {
        let issue = QualityIssue::NonNumeric {
            column: COL_SLEEP_HOURS.to_string(),
            value: "abc".to_string(),
        };
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["kind"], "non_numeric");
        assert_eq!(value["column"], "sleep_hours");
    }
}
