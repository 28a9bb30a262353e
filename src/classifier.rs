//! Burnout risk and productivity level classification
//!
//! Both classifiers are fixed threshold rules over a single record. The
//! thresholds are not configurable.

use crate::types::{BurnoutRisk, ProductivityLevel, StudentRecord};

/// Sleep below this many hours counts as a risk condition
const MIN_HEALTHY_SLEEP_HOURS: f64 = 6.0;

/// Study above this many hours counts as a risk condition
const MAX_HEALTHY_STUDY_HOURS: f64 = 8.0;

/// Fewer breaks than this counts as a risk condition
const MIN_HEALTHY_BREAKS: f64 = 2.0;

/// Conditions needed for a High Risk classification
const HIGH_RISK_MIN_CONDITIONS: u8 = 2;

const HIGH_LEVEL_MIN_SCORE: f64 = 15.0;
const MEDIUM_LEVEL_MIN_SCORE: f64 = 8.0;

/// Count the burnout risk conditions that hold for a record.
///
/// Conditions: `sleep_hours < 6`, `study_hours > 8`, `breaks_count < 2`.
/// Returns `None` if any of the three fields is missing.
pub fn risk_condition_count(record: &StudentRecord) -> Option<u8> {
    let sleep_hours = record.sleep_hours?;
    let study_hours = record.study_hours?;
    let breaks_count = record.breaks_count?;

    let conditions = [
        sleep_hours < MIN_HEALTHY_SLEEP_HOURS,
        study_hours > MAX_HEALTHY_STUDY_HOURS,
        breaks_count < MIN_HEALTHY_BREAKS,
    ];
    Some(conditions.iter().filter(|&&held| held).count() as u8)
}

/// Classify burnout risk: two or more conditions is High Risk
pub fn burnout_risk(record: &StudentRecord) -> Option<BurnoutRisk> {
    risk_condition_count(record).map(|count| {
        if count >= HIGH_RISK_MIN_CONDITIONS {
            BurnoutRisk::HighRisk
        } else {
            BurnoutRisk::LowRisk
        }
    })
}

/// Band a productivity score.
///
/// Bands are checked from high to low: `>= 15` is High, then `>= 8` is
/// Medium, anything else (NaN included) is Low.
pub fn productivity_level(score: f64) -> ProductivityLevel {
    if score >= HIGH_LEVEL_MIN_SCORE {
        ProductivityLevel::High
    } else if score >= MEDIUM_LEVEL_MIN_SCORE {
        ProductivityLevel::Medium
    } else {
        ProductivityLevel::Low
    }
}
