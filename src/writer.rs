//! Augmented table writer
//!
//! Writes the original columns unchanged followed by the derived columns. A
//! derived column that already exists in the input (for example when an output
//! file is processed again) is overwritten in place instead of duplicated.

use crate::error::WellbeingError;
use crate::types::{
    ScoredRecord, ScoredTable, COL_BURNOUT_RISK, COL_PRODUCTIVITY_LEVEL, COL_PRODUCTIVITY_SCORE,
};
use csv::{StringRecord, WriterBuilder};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    pub delimiter: u8,
    pub include_productivity_level: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_productivity_level: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DerivedColumn {
    Score,
    Risk,
    Level,
}

impl DerivedColumn {
    fn name(&self) -> &'static str {
        match self {
            DerivedColumn::Score => COL_PRODUCTIVITY_SCORE,
            DerivedColumn::Risk => COL_BURNOUT_RISK,
            DerivedColumn::Level => COL_PRODUCTIVITY_LEVEL,
        }
    }

    fn cell(&self, row: &ScoredRecord) -> String {
        match self {
            DerivedColumn::Score => row
                .derived
                .productivity_score
                .map(format_float)
                .unwrap_or_default(),
            DerivedColumn::Risk => row
                .derived
                .burnout_risk
                .map(|r| r.as_str().to_string())
                .unwrap_or_default(),
            DerivedColumn::Level => row
                .derived
                .productivity_level
                .map(|l| l.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Where each derived column goes: replacing an existing input column, or appended
struct OutputLayout {
    headers: StringRecord,
    replaced: Vec<(usize, DerivedColumn)>,
    appended: Vec<DerivedColumn>,
}

impl OutputLayout {
    fn new(input_headers: &StringRecord, options: &WriteOptions) -> Self {
        let mut columns = vec![DerivedColumn::Score, DerivedColumn::Risk];
        if options.include_productivity_level {
            columns.push(DerivedColumn::Level);
        }

        let mut headers = input_headers.clone();
        let mut replaced = Vec::new();
        let mut appended = Vec::new();
        for column in columns {
            match input_headers.iter().position(|h| h == column.name()) {
                Some(index) => replaced.push((index, column)),
                None => {
                    headers.push_field(column.name());
                    appended.push(column);
                }
            }
        }

        Self {
            headers,
            replaced,
            appended,
        }
    }

    fn row(&self, row: &ScoredRecord) -> StringRecord {
        let mut cells: Vec<String> = row.raw.iter().map(str::to_string).collect();
        for (index, column) in &self.replaced {
            if let Some(cell) = cells.get_mut(*index) {
                *cell = column.cell(row);
            }
        }
        cells.extend(self.appended.iter().map(|column| column.cell(row)));
        StringRecord::from(cells)
    }
}

/// Format a float the way pandas writes it: shortest round-trip digits, with
/// whole numbers keeping a trailing `.0`. Magnitudes below `1e-4` or from
/// `1e16` up switch to exponent form (`1e-05`, `1.5e+16`).
pub fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        return format_exponent(value);
    }
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Exponent form with an explicit sign and at least two exponent digits
fn format_exponent(value: f64) -> String {
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Write the augmented table to any sink, with a header row and no index column
pub fn write_table_to<W: Write>(
    table: &ScoredTable,
    sink: W,
    options: &WriteOptions,
) -> Result<(), WellbeingError> {
    let layout = OutputLayout::new(&table.headers, options);
    let mut writer = WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_writer(sink);

    writer
        .write_record(&layout.headers)
        .map_err(|e| WellbeingError::Output(e.to_string()))?;
    for row in &table.rows {
        writer
            .write_record(&layout.row(row))
            .map_err(|e| WellbeingError::Output(e.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| WellbeingError::Output(e.to_string()))?;
    Ok(())
}

/// Write the augmented table to `path`, replacing any existing file.
///
/// Data goes to a temporary file in the destination directory first and is
/// renamed over the destination only once complete; on failure the
/// destination is untouched and the temporary file is removed.
pub fn write_table_atomic(
    table: &ScoredTable,
    path: &Path,
    options: &WriteOptions,
) -> Result<(), WellbeingError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        WellbeingError::Output(format!("{}: {}", dir.display(), e))
    })?;
    debug!(temp = %temp.path().display(), "writing output to temporary file");

    write_table_to(table, temp.as_file_mut(), options)?;
    temp.as_file()
        .sync_all()
        .map_err(|e| WellbeingError::Output(e.to_string()))?;
    temp.persist(path)
        .map_err(|e| WellbeingError::Output(format!("{}: {}", path.display(), e.error)))?;

    info!(path = %path.display(), rows = table.len(), "augmented table written");
    Ok(())
}
