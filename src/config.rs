//! Pipeline configuration
//!
//! Settings can be loaded from a TOML file; any key left out keeps its default.
//!
//! ```toml
//! delimiter = ","
//! histogram_bins = 10
//! include_productivity_level = true
//! quality_policy = "exclude"
//! ```

use crate::error::WellbeingError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default number of equal-width productivity score bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// Upper bound on `histogram_bins`
pub const MAX_HISTOGRAM_BINS: usize = 1000;

/// What to do with a record whose scoring inputs are missing or non-numeric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPolicy {
    /// Keep the row with empty derived cells, leave it out of aggregates that need the
    /// missing field, and log a warning
    #[default]
    Exclude,
    /// Abort the run on the first such record
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Field delimiter for both input and output
    pub delimiter: char,
    pub histogram_bins: usize,
    /// Append the `productivity_level` column to the output file
    pub include_productivity_level: bool,
    pub quality_policy: QualityPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            include_productivity_level: true,
            quality_policy: QualityPolicy::Exclude,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, WellbeingError> {
        let config: PipelineConfig =
            toml::from_str(content).map_err(|e| WellbeingError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, WellbeingError> {
        let content = fs::read_to_string(path).map_err(|e| {
            WellbeingError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), WellbeingError> {
        self.delimiter_byte()?;
        if !(1..=MAX_HISTOGRAM_BINS).contains(&self.histogram_bins) {
            return Err(WellbeingError::Config(format!(
                "histogram_bins must be between 1 and {MAX_HISTOGRAM_BINS}, got {}",
                self.histogram_bins
            )));
        }
        Ok(())
    }

    /// The delimiter as the single byte the csv reader and writer expect
    pub fn delimiter_byte(&self) -> Result<u8, WellbeingError> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(WellbeingError::Config(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delimiter
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_partial_toml_overrides_keys() {
        let config = PipelineConfig::from_toml_str(
            r#"
            delimiter = ";"
            quality_policy = "fail"
            include_productivity_level = false
            "#,
        )
        .unwrap();

        assert_eq!(
            config,
            PipelineConfig {
                delimiter: ';',
                histogram_bins: DEFAULT_HISTOGRAM_BINS,
                include_productivity_level: false,
                quality_policy: QualityPolicy::Fail,
            }
        );
    }

    #[test]
    fn test_zero_bins_rejected() {
        let err = PipelineConfig::from_toml_str("histogram_bins = 0").unwrap_err();
        assert!(matches!(err, WellbeingError::Config(_)));
    }

    #[test]
    fn test_oversized_bins_rejected() {
        let config = PipelineConfig {
            histogram_bins: usize::MAX,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(WellbeingError::Config(_))));

        let config = PipelineConfig {
            histogram_bins: MAX_HISTOGRAM_BINS,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let config = PipelineConfig {
            delimiter: '§',
            ..PipelineConfig::default()
        };
        assert!(config.delimiter_byte().is_err());
    }

    #[test]
    fn test_unknown_policy_rejected() {
        assert!(PipelineConfig::from_toml_str(r#"quality_policy = "ignore""#).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wellbeing.toml");
        fs::write(&path, "histogram_bins = 4\n").unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.histogram_bins, 4);

        let missing = PipelineConfig::load(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(WellbeingError::Config(_))));
    }
}
