//! Dataset loader
//!
//! Reads a delimited file with a header row into an in-memory [`Table`]. Every
//! required column must be present; cells that are empty or non-numeric are
//! recorded as [`QualityIssue`]s rather than failing the load.

use crate::error::WellbeingError;
use crate::types::{
    DayType, LoadedRow, QualityIssue, StudentRecord, Table, COL_ACADEMIC_SCORE, COL_BREAKS_COUNT,
    COL_DAY_TYPE, COL_ENTERTAINMENT_HOURS, COL_SLEEP_HOURS, COL_SOCIAL_MEDIA_HOURS,
    COL_STUDY_HOURS, REQUIRED_COLUMNS,
};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Cell values treated as missing, following common spreadsheet/pandas conventions
const MISSING_MARKERS: [&str; 10] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A",
];

/// Positions of the required columns within the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    study_hours: usize,
    social_media_hours: usize,
    entertainment_hours: usize,
    sleep_hours: usize,
    breaks_count: usize,
    academic_score: usize,
    day_type: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, WellbeingError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(WellbeingError::MissingColumns(missing));
        }

        let index = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            study_hours: index(COL_STUDY_HOURS),
            social_media_hours: index(COL_SOCIAL_MEDIA_HOURS),
            entertainment_hours: index(COL_ENTERTAINMENT_HOURS),
            sleep_hours: index(COL_SLEEP_HOURS),
            breaks_count: index(COL_BREAKS_COUNT),
            academic_score: index(COL_ACADEMIC_SCORE),
            day_type: index(COL_DAY_TYPE),
        })
    }
}

/// Load a dataset from a file path.
///
/// A missing or unreadable file is an input error; nothing is computed.
pub fn load_path(path: &Path, delimiter: u8) -> Result<Table, WellbeingError> {
    if !path.exists() {
        return Err(WellbeingError::Input(format!(
            "{} does not exist",
            path.display()
        )));
    }
    let file = File::open(path)
        .map_err(|e| WellbeingError::Input(format!("{}: {}", path.display(), e)))?;

    debug!(path = %path.display(), "loading dataset");
    load_reader(file, delimiter)
}

/// Load a dataset from any reader
pub fn load_reader<R: Read>(reader: R, delimiter: u8) -> Result<Table, WellbeingError> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    if headers.is_empty() {
        return Err(WellbeingError::Input("header row is empty".to_string()));
    }
    let columns = ColumnIndex::resolve(&headers)?;

    let mut rows = Vec::new();
    for (i, result) in csv_reader.records().enumerate() {
        let raw = result?;
        let (record, issues) = parse_record(&raw, &columns);
        let row = i + 1;

        if !issues.is_empty() {
            warn!(row, issues = ?issues, "data quality issues in input row");
        }

        rows.push(LoadedRow {
            row,
            raw,
            record,
            issues,
        });
    }

    debug!(rows = rows.len(), columns = headers.len(), "dataset loaded");
    Ok(Table { headers, rows })
}

fn parse_record(raw: &StringRecord, columns: &ColumnIndex) -> (StudentRecord, Vec<QualityIssue>) {
    let mut issues = Vec::new();
    let mut numeric = |index: usize, column: &str| -> Option<f64> {
        match parse_numeric(raw.get(index).unwrap_or_default(), column) {
            Ok(value) => Some(value),
            Err(issue) => {
                issues.push(issue);
                None
            }
        }
    };

    let study_hours = numeric(columns.study_hours, COL_STUDY_HOURS);
    let social_media_hours = numeric(columns.social_media_hours, COL_SOCIAL_MEDIA_HOURS);
    let entertainment_hours = numeric(columns.entertainment_hours, COL_ENTERTAINMENT_HOURS);
    let sleep_hours = numeric(columns.sleep_hours, COL_SLEEP_HOURS);
    let breaks_count = numeric(columns.breaks_count, COL_BREAKS_COUNT);
    let academic_score = numeric(columns.academic_score, COL_ACADEMIC_SCORE);

    let day_cell = raw.get(columns.day_type).unwrap_or_default().trim();
    let day_type = DayType::parse(day_cell);
    if day_type.is_none() {
        if is_missing(day_cell) {
            issues.push(QualityIssue::Missing {
                column: COL_DAY_TYPE.to_string(),
            });
        } else {
            issues.push(QualityIssue::UnknownDayType {
                value: day_cell.to_string(),
            });
        }
    }

    let record = StudentRecord {
        study_hours,
        social_media_hours,
        entertainment_hours,
        sleep_hours,
        breaks_count,
        academic_score,
        day_type,
    };
    (record, issues)
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

/// Parse a numeric cell; only finite values are accepted
fn parse_numeric(cell: &str, column: &str) -> Result<f64, QualityIssue> {
    if is_missing(cell) {
        return Err(QualityIssue::Missing {
            column: column.to_string(),
        });
    }
    match cell.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(QualityIssue::NonNumeric {
            column: column.to_string(),
            value: cell.to_string(),
        }),
    }
}
