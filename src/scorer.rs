//! Row scoring
//!
//! Applies the metric calculator and both classifiers to each loaded row and
//! enforces the data-quality policy.

use crate::classifier::{burnout_risk, productivity_level};
use crate::config::QualityPolicy;
use crate::error::WellbeingError;
use crate::metrics::productivity_score;
use crate::types::{
    DerivedMetrics, LoadedRow, QualityIssue, ScoredRecord, ScoredTable, StudentRecord, Table,
};
use tracing::{debug, warn};

/// Scorer for loaded rows
pub struct RecordScorer;

impl RecordScorer {
    /// Derive every metric for a single record
    pub fn derive(record: &StudentRecord) -> DerivedMetrics {
        let productivity_score = productivity_score(record);
        DerivedMetrics {
            productivity_score,
            burnout_risk: burnout_risk(record),
            productivity_level: productivity_score.map(productivity_level),
        }
    }

    /// Score one loaded row
    pub fn score(row: LoadedRow) -> ScoredRecord {
        let derived = Self::derive(&row.record);
        ScoredRecord {
            row: row.row,
            raw: row.raw,
            record: row.record,
            derived,
            issues: row.issues,
        }
    }

    /// Score a whole table, preserving row order and count.
    ///
    /// Under [`QualityPolicy::Fail`] the first row with a blocking issue aborts
    /// the run.
    pub fn score_table(table: Table, policy: QualityPolicy) -> Result<ScoredTable, WellbeingError> {
        let mut rows = Vec::with_capacity(table.rows.len());

        for row in table.rows {
            let blocking: Vec<QualityIssue> = row
                .issues
                .iter()
                .filter(|issue| issue.is_blocking())
                .cloned()
                .collect();

            if !blocking.is_empty() {
                match policy {
                    QualityPolicy::Fail => {
                        return Err(WellbeingError::DataQuality {
                            row: row.row,
                            issues: blocking,
                        });
                    }
                    QualityPolicy::Exclude => {
                        warn!(
                            row = row.row,
                            issues = blocking.len(),
                            "record left out of aggregates needing the missing fields"
                        );
                    }
                }
            }

            rows.push(Self::score(row));
        }

        debug!(rows = rows.len(), "table scored");
        Ok(ScoredTable {
            headers: table.headers,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_reader;
    use crate::types::{BurnoutRisk, ProductivityLevel};
    use pretty_assertions::assert_eq;

    const INPUT: &str = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type
4,2,1,5,1,72,Weekday
6,1,1,8,3,88,Weekend
,1,1,8,3,80,Weekend
";

    fn table() -> Table {
        load_reader(INPUT.as_bytes(), b',').unwrap()
    }

    #[test]
    fn test_derive_worked_example() {
        let record = StudentRecord {
            study_hours: Some(4.0),
            social_media_hours: Some(2.0),
            entertainment_hours: Some(1.0),
            sleep_hours: Some(5.0),
            breaks_count: Some(1.0),
            ..StudentRecord::default()
        };

        assert_eq!(
            RecordScorer::derive(&record),
            DerivedMetrics {
                productivity_score: Some(7.5),
                burnout_risk: Some(BurnoutRisk::HighRisk),
                productivity_level: Some(ProductivityLevel::Low),
            }
        );
    }

    #[test]
    fn test_exclude_policy_keeps_every_row() {
        let scored = RecordScorer::score_table(table(), QualityPolicy::Exclude).unwrap();

        assert_eq!(scored.len(), 3);
        assert_eq!(scored.excluded().count(), 1);

        let excluded = &scored.rows[2];
        assert!(excluded.is_excluded());
        assert_eq!(excluded.derived, DerivedMetrics::default());
        assert_eq!(excluded.raw.get(5), Some("80"));
    }

    #[test]
    fn test_fail_policy_reports_first_bad_row() {
        let err = RecordScorer::score_table(table(), QualityPolicy::Fail).unwrap_err();
        match err {
            WellbeingError::DataQuality { row, issues } => {
                assert_eq!(row, 3);
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].column(), "study_hours");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_blocking_issue_does_not_fail_strict_run() {
        let input = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type
4,2,1,5,1,,Holiday
";
        let table = load_reader(input.as_bytes(), b',').unwrap();
        let scored = RecordScorer::score_table(table, QualityPolicy::Fail).unwrap();

        assert_eq!(scored.rows[0].issues.len(), 2);
        assert!(!scored.rows[0].is_excluded());
        assert_eq!(scored.rows[0].derived.productivity_score, Some(7.5));
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let first = RecordScorer::score_table(table(), QualityPolicy::Exclude).unwrap();
        let second = RecordScorer::score_table(table(), QualityPolicy::Exclude).unwrap();

        let derived = |t: &ScoredTable| t.rows.iter().map(|r| r.derived).collect::<Vec<_>>();
        assert_eq!(derived(&first), derived(&second));
    }
}
