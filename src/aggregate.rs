//! Filtered projection and summary statistics
//!
//! A presentation layer picks a [`DayFilter`], projects the scored table with
//! [`project`], and recomputes every aggregate with [`summarize`]. Both steps
//! are pure; the table itself is never modified.

use crate::config::DEFAULT_HISTOGRAM_BINS;
use crate::types::{BurnoutRisk, DayType, ProductivityLevel, ScoredRecord, ScoredTable};
use serde::{Deserialize, Serialize};

/// Mean social media usage above this triggers an advisory (hours/day)
const SOCIAL_MEDIA_ADVISORY_HOURS: f64 = 3.0;

/// Mean sleep below this triggers an advisory (hours/day)
const SLEEP_ADVISORY_HOURS: f64 = 7.0;

/// Day-type selection applied before aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayFilter {
    #[default]
    All,
    Weekday,
    Weekend,
}

impl DayFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayFilter::All => "All",
            DayFilter::Weekday => "Weekday",
            DayFilter::Weekend => "Weekend",
        }
    }

    /// Rows with a missing or unknown day type only match `All`
    pub fn matches(&self, day_type: Option<DayType>) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Weekday => day_type == Some(DayType::Weekday),
            DayFilter::Weekend => day_type == Some(DayType::Weekend),
        }
    }
}

/// Project the scored table down to the rows matching `filter`, in input order
pub fn project(table: &ScoredTable, filter: DayFilter) -> Vec<&ScoredRecord> {
    table
        .rows
        .iter()
        .filter(|row| filter.matches(row.record.day_type))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    pub histogram_bins: usize,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
        }
    }
}

/// Mean daily hours per activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityMeans {
    pub study_hours: Option<f64>,
    pub social_media_hours: Option<f64>,
    pub entertainment_hours: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskShare {
    pub risk: BurnoutRisk,
    pub count: usize,
    /// Share of classified records (0-1)
    pub proportion: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCount {
    pub level: ProductivityLevel,
    pub count: usize,
}

/// One equal-width productivity score bucket.
///
/// Buckets are half-open `[lower, upper)` except the last, which also holds
/// the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Per-record joint view for sleep vs academic score inspection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationPoint {
    pub sleep_hours: f64,
    pub academic_score: f64,
    pub study_hours: f64,
    pub breaks_count: f64,
    pub burnout_risk: BurnoutRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryKind {
    SocialMediaUsage,
    InsufficientSleep,
    BalancedRoutine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisorySeverity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advisory {
    pub kind: AdvisoryKind,
    pub severity: AdvisorySeverity,
    pub message: String,
}

/// Aggregates over a projected view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Rows in the view
    pub total_records: usize,
    /// Rows contributing to aggregates
    pub scored_records: usize,
    /// Rows with a blocking data-quality issue
    pub excluded_records: usize,
    pub mean_productivity_score: Option<f64>,
    /// Mean score rounded to 2 decimal places
    pub mean_productivity_display: Option<f64>,
    pub high_risk_count: usize,
    pub activity_means: ActivityMeans,
    pub mean_sleep_hours: Option<f64>,
    pub risk_breakdown: Vec<RiskShare>,
    pub level_breakdown: Vec<LevelCount>,
    pub histogram: Vec<HistogramBin>,
    pub correlation_points: Vec<CorrelationPoint>,
    /// Pearson r between sleep hours and academic score
    pub sleep_academic_correlation: Option<f64>,
    pub advisories: Vec<Advisory>,
}

/// Compute every aggregate over a view.
///
/// Each aggregate uses the rows where its own inputs are defined, so a record
/// with a data-quality issue drops out only of the aggregates that need the
/// missing field.
pub fn summarize(view: &[&ScoredRecord], options: &AggregateOptions) -> Summary {
    let scores: Vec<f64> = view
        .iter()
        .filter_map(|r| r.derived.productivity_score)
        .collect();
    let mean_productivity_score = mean(scores.iter().copied());

    let activity_means = ActivityMeans {
        study_hours: mean(view.iter().filter_map(|r| r.record.study_hours)),
        social_media_hours: mean(view.iter().filter_map(|r| r.record.social_media_hours)),
        entertainment_hours: mean(view.iter().filter_map(|r| r.record.entertainment_hours)),
    };
    let mean_sleep_hours = mean(view.iter().filter_map(|r| r.record.sleep_hours));

    let risk_breakdown = risk_breakdown(view);
    let high_risk_count = risk_breakdown
        .iter()
        .find(|share| share.risk == BurnoutRisk::HighRisk)
        .map(|share| share.count)
        .unwrap_or(0);

    let correlation_points = correlation_points(view);
    let sleep_academic_correlation = pearson(
        &correlation_points
            .iter()
            .map(|p| (p.sleep_hours, p.academic_score))
            .collect::<Vec<_>>(),
    );

    let advisories = advisories(activity_means.social_media_hours, mean_sleep_hours);

    Summary {
        total_records: view.len(),
        scored_records: scores.len(),
        excluded_records: view.iter().filter(|r| r.is_excluded()).count(),
        mean_productivity_score,
        mean_productivity_display: mean_productivity_score.map(round2),
        high_risk_count,
        activity_means,
        mean_sleep_hours,
        risk_breakdown,
        level_breakdown: level_breakdown(view),
        histogram: histogram(&scores, options.histogram_bins),
        correlation_points,
        sleep_academic_correlation,
        advisories,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Round to 2 dp with exact ties going to the even neighbour
fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

fn risk_breakdown(rows: &[&ScoredRecord]) -> Vec<RiskShare> {
    let classified: Vec<BurnoutRisk> = rows.iter().filter_map(|r| r.derived.burnout_risk).collect();

    BurnoutRisk::ALL
        .iter()
        .map(|&risk| {
            let count = classified.iter().filter(|&&r| r == risk).count();
            let proportion = if classified.is_empty() {
                0.0
            } else {
                count as f64 / classified.len() as f64
            };
            RiskShare {
                risk,
                count,
                proportion,
            }
        })
        .collect()
}

fn level_breakdown(rows: &[&ScoredRecord]) -> Vec<LevelCount> {
    ProductivityLevel::ALL
        .iter()
        .map(|&level| LevelCount {
            level,
            count: rows
                .iter()
                .filter(|r| r.derived.productivity_level == Some(level))
                .count(),
        })
        .collect()
}

/// Bucket values into `bins` equal-width bins spanning the observed range.
///
/// A constant series yields one zero-width bin holding every value.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max <= min {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut counts = vec![0usize; bins];
    for &value in values {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

fn correlation_points(rows: &[&ScoredRecord]) -> Vec<CorrelationPoint> {
    rows.iter()
        .filter_map(|r| {
            Some(CorrelationPoint {
                sleep_hours: r.record.sleep_hours?,
                academic_score: r.record.academic_score?,
                study_hours: r.record.study_hours?,
                breaks_count: r.record.breaks_count?,
                burnout_risk: r.derived.burnout_risk?,
            })
        })
        .collect()
}

/// Pearson correlation coefficient; `None` for fewer than two points or zero variance
fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

fn advisories(mean_social_media_hours: Option<f64>, mean_sleep_hours: Option<f64>) -> Vec<Advisory> {
    let mut advisories = Vec::new();

    if mean_social_media_hours.is_some_and(|hours| hours > SOCIAL_MEDIA_ADVISORY_HOURS) {
        advisories.push(Advisory {
            kind: AdvisoryKind::SocialMediaUsage,
            severity: AdvisorySeverity::Warning,
            message: format!(
                "Average social media usage exceeds {SOCIAL_MEDIA_ADVISORY_HOURS} hrs/day; reducing it may improve focus."
            ),
        });
    }

    if mean_sleep_hours.is_some_and(|hours| hours < SLEEP_ADVISORY_HOURS) {
        advisories.push(Advisory {
            kind: AdvisoryKind::InsufficientSleep,
            severity: AdvisorySeverity::Warning,
            message: format!(
                "Average sleep is below {SLEEP_ADVISORY_HOURS} hrs/day, which increases burnout risk."
            ),
        });
    }

    advisories.push(Advisory {
        kind: AdvisoryKind::BalancedRoutine,
        severity: AdvisorySeverity::Info,
        message: "Maintaining balanced study hours with breaks improves long-term productivity."
            .to_string(),
    });

    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QualityPolicy;
    use crate::loader::load_reader;
    use crate::scorer::RecordScorer;
    use pretty_assertions::assert_eq;

    const INPUT: &str = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type
4,2,1,5,1,72,Weekday
6,1,1,8,3,88,Weekend
9,4,2,5,1,65,Weekday
8,0.5,0.5,9,4,91,Weekend
3,5,3,6,2,58,Weekday
";

    fn scored(input: &str) -> ScoredTable {
        let table = load_reader(input.as_bytes(), b',').unwrap();
        RecordScorer::score_table(table, QualityPolicy::Exclude).unwrap()
    }

    #[test]
    fn test_projection_by_day_type() {
        let table = scored(INPUT);

        assert_eq!(project(&table, DayFilter::All).len(), 5);

        let weekend = project(&table, DayFilter::Weekend);
        assert_eq!(weekend.len(), 2);
        assert!(weekend
            .iter()
            .all(|r| r.record.day_type == Some(DayType::Weekend)));

        let weekday = project(&table, DayFilter::Weekday);
        assert_eq!(weekday.iter().map(|r| r.row).collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_weekend_mean_uses_only_weekend_rows() {
        let table = scored(INPUT);
        let summary = summarize(&project(&table, DayFilter::Weekend), &AggregateOptions::default());

        // scores: 14.0 and 19.5
        assert_eq!(summary.total_records, 2);
        assert!((summary.mean_productivity_score.unwrap() - 16.75).abs() < 1e-9);
        assert_eq!(summary.mean_productivity_display, Some(16.75));
        assert_eq!(summary.high_risk_count, 0);
    }

    #[test]
    fn test_full_summary_counts() {
        let table = scored(INPUT);
        let summary = summarize(&project(&table, DayFilter::All), &AggregateOptions::default());

        // scores: 7.5, 14.0, 14.5, 19.5, 1.0
        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.scored_records, 5);
        assert_eq!(summary.excluded_records, 0);
        assert!((summary.mean_productivity_score.unwrap() - 11.3).abs() < 1e-9);
        assert_eq!(summary.high_risk_count, 2);
        assert_eq!(
            summary.risk_breakdown,
            vec![
                RiskShare {
                    risk: BurnoutRisk::HighRisk,
                    count: 2,
                    proportion: 0.4,
                },
                RiskShare {
                    risk: BurnoutRisk::LowRisk,
                    count: 3,
                    proportion: 0.6,
                },
            ]
        );
        assert_eq!(
            summary.level_breakdown,
            vec![
                LevelCount {
                    level: ProductivityLevel::High,
                    count: 1
                },
                LevelCount {
                    level: ProductivityLevel::Medium,
                    count: 2
                },
                LevelCount {
                    level: ProductivityLevel::Low,
                    count: 2
                },
            ]
        );
        assert!((summary.activity_means.study_hours.unwrap() - 6.0).abs() < 1e-9);
        assert!((summary.activity_means.social_media_hours.unwrap() - 2.5).abs() < 1e-9);
        assert!((summary.activity_means.entertainment_hours.unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(summary.correlation_points.len(), 5);
        assert_eq!(summary.histogram.iter().map(|b| b.count).sum::<usize>(), 5);
    }

    #[test]
    fn test_display_mean_rounds_to_two_places() {
        let input = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type
1,0,0,0,3,50,Weekday
1,0,0,0,3,50,Weekday
1.01,0,0,0,3,50,Weekday
";
        let table = scored(input);
        let summary = summarize(&project(&table, DayFilter::All), &AggregateOptions::default());
        // mean = (2 + 2 + 2.02) / 3 = 2.00666...
        assert_eq!(summary.mean_productivity_display, Some(2.01));
    }

    #[test]
    fn test_incomplete_rows_drop_out_only_where_a_field_is_missing() {
        let input = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type
4,2,1,5,1,72,Weekday
4,,1,5,1,72,Weekday
";
        let table = scored(input);
        let summary = summarize(&project(&table, DayFilter::All), &AggregateOptions::default());

        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.scored_records, 1);
        assert_eq!(summary.excluded_records, 1);
        assert_eq!(summary.mean_productivity_score, Some(7.5));

        // both rows are classified, so both count toward risk
        assert_eq!(summary.high_risk_count, 2);
        assert_eq!(summary.risk_breakdown[0].proportion, 1.0);
        assert_eq!(summary.activity_means.study_hours, Some(4.0));
        assert_eq!(summary.activity_means.social_media_hours, Some(2.0));
        assert_eq!(summary.correlation_points.len(), 2);
    }

    #[test]
    fn test_high_risk_count_matches_written_labels() {
        let input = "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type
4,2,1,5,1,72,Weekday
4,,1,5,1,72,Weekday
9,1,1,,1,60,Weekend
";
        let table = scored(input);
        let summary = summarize(&project(&table, DayFilter::All), &AggregateOptions::default());

        let labelled = table
            .rows
            .iter()
            .filter(|r| r.derived.burnout_risk == Some(BurnoutRisk::HighRisk))
            .count();
        assert_eq!(labelled, 2);
        assert_eq!(summary.high_risk_count, labelled);
    }

    #[test]
    fn test_display_rounding_sends_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(10.125), 10.12);
        assert_eq!(round2(-0.125), -0.12);
        assert_eq!(round2(2.0066666), 2.01);
    }

    #[test]
    fn test_display_mean_tie_rounds_to_even() {
        let mut input = String::from(
            "study_hours,social_media_hours,entertainment_hours,sleep_hours,breaks_count,academic_score,day_type\n",
        );
        input.push_str("0.5,0,0,0,3,50,Weekday\n");
        for _ in 0..7 {
            input.push_str("0,0,0,0,3,50,Weekday\n");
        }
        let table = scored(&input);
        let summary = summarize(&project(&table, DayFilter::All), &AggregateOptions::default());

        assert_eq!(summary.mean_productivity_score, Some(0.125));
        assert_eq!(summary.mean_productivity_display, Some(0.12));
    }

    #[test]
    fn test_empty_view() {
        let table = scored(INPUT);
        let view: Vec<&ScoredRecord> = table.rows.iter().filter(|_| false).collect();
        let summary = summarize(&view, &AggregateOptions::default());

        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.mean_productivity_score, None);
        assert_eq!(summary.mean_productivity_display, None);
        assert!(summary.histogram.is_empty());
        assert!(summary.risk_breakdown.iter().all(|s| s.proportion == 0.0));
        assert_eq!(summary.advisories.len(), 1);
        assert_eq!(summary.advisories[0].kind, AdvisoryKind::BalancedRoutine);
    }

    #[test]
    fn test_histogram_equal_width_bins() {
        let bins = histogram(&[0.0, 1.0, 2.5, 5.0, 10.0], 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins.iter().map(|b| b.count).collect::<Vec<_>>(), vec![2, 1, 1, 1]);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[1].lower, 2.5);
        assert_eq!(bins[3].upper, 10.0);
    }

    #[test]
    fn test_histogram_max_lands_in_last_bin() {
        let bins = histogram(&[-5.0, 19.5], 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins[0].count, 1);
        assert_eq!(bins[9].count, 1);
    }

    #[test]
    fn test_histogram_constant_series() {
        let bins = histogram(&[7.5, 7.5, 7.5], 10);
        assert_eq!(
            bins,
            vec![HistogramBin {
                lower: 7.5,
                upper: 7.5,
                count: 3
            }]
        );
    }

    #[test]
    fn test_advisories_trigger_on_thresholds() {
        let kinds = |social, sleep| {
            advisories(social, sleep)
                .into_iter()
                .map(|a| a.kind)
                .collect::<Vec<_>>()
        };

        assert_eq!(
            kinds(Some(3.5), Some(6.5)),
            vec![
                AdvisoryKind::SocialMediaUsage,
                AdvisoryKind::InsufficientSleep,
                AdvisoryKind::BalancedRoutine,
            ]
        );
        // Boundaries are strict
        assert_eq!(kinds(Some(3.0), Some(7.0)), vec![AdvisoryKind::BalancedRoutine]);
        assert_eq!(kinds(None, None), vec![AdvisoryKind::BalancedRoutine]);
    }

    #[test]
    fn test_pearson() {
        let perfect = pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]).unwrap();
        assert!((perfect - 1.0).abs() < 1e-9);

        let inverse = pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]).unwrap();
        assert!((inverse + 1.0).abs() < 1e-9);

        assert_eq!(pearson(&[(1.0, 2.0)]), None);
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0)]), None);
    }
}
