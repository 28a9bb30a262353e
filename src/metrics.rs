//! Productivity score derivation
//!
//! Formula:
//! ```text
//! productivity_score = 2.0 * study_hours
//!                    - (social_media_hours + entertainment_hours)
//!                    + 0.5 * sleep_hours
//! ```

use crate::types::StudentRecord;

const STUDY_WEIGHT: f64 = 2.0;
const SLEEP_WEIGHT: f64 = 0.5;

/// Compute the productivity score of a record.
///
/// Returns `None` when any of the four inputs is missing.
pub fn productivity_score(record: &StudentRecord) -> Option<f64> {
    Some(compute_productivity_score(
        record.study_hours?,
        record.social_media_hours?,
        record.entertainment_hours?,
        record.sleep_hours?,
    ))
}

fn compute_productivity_score(
    study_hours: f64,
    social_media_hours: f64,
    entertainment_hours: f64,
    sleep_hours: f64,
) -> f64 {
    study_hours * STUDY_WEIGHT - (social_media_hours + entertainment_hours)
        + sleep_hours * SLEEP_WEIGHT
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(study: f64, social: f64, entertainment: f64, sleep: f64) -> StudentRecord {
        StudentRecord {
            study_hours: Some(study),
            social_media_hours: Some(social),
            entertainment_hours: Some(entertainment),
            sleep_hours: Some(sleep),
            ..StudentRecord::default()
        }
    }

    #[test]
    fn test_worked_examples() {
        let low = productivity_score(&record(4.0, 2.0, 1.0, 5.0)).unwrap();
        assert!((low - 7.5).abs() < 1e-9);

        let medium = productivity_score(&record(6.0, 1.0, 1.0, 8.0)).unwrap();
        assert!((medium - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_formula_over_grid() {
        let values = [0.0, 0.5, 1.25, 3.0, 7.75, 12.0];
        for &study in &values {
            for &social in &values {
                for &sleep in &values {
                    let entertainment = social / 2.0;
                    let score =
                        productivity_score(&record(study, social, entertainment, sleep)).unwrap();
                    let expected = 2.0 * study - (social + entertainment) + 0.5 * sleep;
                    assert!((score - expected).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_score_can_be_negative() {
        let score = productivity_score(&record(0.0, 6.0, 4.0, 2.0)).unwrap();
        assert!((score + 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_input_propagates_none() {
        let mut r = record(4.0, 2.0, 1.0, 5.0);
        r.entertainment_hours = None;
        assert_eq!(productivity_score(&r), None);

        let mut r = record(4.0, 2.0, 1.0, 5.0);
        r.sleep_hours = None;
        assert_eq!(productivity_score(&r), None);
    }

    #[test]
    fn test_breaks_and_academic_score_do_not_affect_score() {
        let mut r = record(4.0, 2.0, 1.0, 5.0);
        let before = productivity_score(&r);
        r.breaks_count = Some(9.0);
        r.academic_score = None;
        assert_eq!(productivity_score(&r), before);
    }
}
