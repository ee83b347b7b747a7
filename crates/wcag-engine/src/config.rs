//! Engine settings
//!
//! Settings are an explicit, immutable parameter of every validation call.
//! They can be built in code or loaded from TOML:
//!
//! ```toml
//! target_level = "AA"
//!
//! [checks]
//! color_contrast = false
//!
//! [heuristics]
//! column_gap = 36.0
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared_types::{CheckId, Criterion, WcagLevel};

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Conformance level to validate against (default: AA)
    pub target_level: WcagLevel,
    /// Per-check enable flags. Checks not listed are enabled.
    pub checks: BTreeMap<CheckId, bool>,
    pub heuristics: Heuristics,
    pub batch: BatchSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            target_level: WcagLevel::AA,
            checks: BTreeMap::new(),
            heuristics: Heuristics::default(),
            batch: BatchSettings::default(),
        }
    }
}

impl EngineSettings {
    pub fn for_level(level: WcagLevel) -> Self {
        Self {
            target_level: level,
            ..Self::default()
        }
    }

    /// Load settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(s: &str) -> anyhow::Result<Self> {
        let settings: Self = toml::from_str(s).context("Failed to parse engine settings")?;
        settings.check()?;
        Ok(settings)
    }

    /// Reject tolerances the heuristics cannot work with
    pub fn check(&self) -> Result<()> {
        self.heuristics.check()
    }

    pub fn with_check(mut self, check: CheckId, enabled: bool) -> Self {
        self.checks.insert(check, enabled);
        self
    }

    pub fn is_enabled(&self, check: CheckId) -> bool {
        self.checks.get(&check).copied().unwrap_or(true)
    }

    pub fn includes_level(&self, level: WcagLevel) -> bool {
        level <= self.target_level
    }

    /// A check runs when enabled and at least one of its criteria is in scope
    pub fn runs(&self, check: CheckId) -> bool {
        self.is_enabled(check) && self.includes_level(check.min_level())
    }

    /// Criteria in scope for scoring, in catalogue order
    pub fn applicable_criteria(&self) -> Vec<Criterion> {
        Criterion::ALL
            .into_iter()
            .filter(|criterion| self.includes_level(criterion.level()))
            .filter(|criterion| {
                CheckId::ALL
                    .iter()
                    .any(|check| self.is_enabled(*check) && check.criteria().contains(criterion))
            })
            .collect()
    }
}

/// Geometric and typographic tolerances used by the heuristic checks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Heuristics {
    /// Horizontal gap (pt) between left edges that separates two columns
    pub column_gap: f64,
    /// Vertical distance (pt) within which text runs share a line
    pub line_tolerance: f64,
    /// Fewest text runs on a page before reading order is analysed
    pub min_reading_order_elements: usize,
    pub multi_column_match_ratio: f64,
    pub single_column_match_ratio: f64,
    /// Vertical tolerance (pt) for grouping cells into a table row
    pub table_row_tolerance: f64,
    /// Horizontal tolerance (pt) for aligning cells into a table column
    pub table_column_tolerance: f64,
    pub table_min_rows: usize,
    pub table_min_columns: usize,
    /// Heading candidates are this much larger than the average font size
    pub heading_size_ratio: f64,
    /// Large text threshold (pt)
    pub large_text_size: f64,
    /// Large text threshold for bold text (pt)
    pub large_bold_text_size: f64,
}

impl Heuristics {
    pub fn check(&self) -> Result<()> {
        let lengths = [
            ("column_gap", self.column_gap),
            ("line_tolerance", self.line_tolerance),
            ("table_row_tolerance", self.table_row_tolerance),
            ("table_column_tolerance", self.table_column_tolerance),
            ("large_text_size", self.large_text_size),
            ("large_bold_text_size", self.large_bold_text_size),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::Settings(format!(
                    "{} must be a non-negative length, got {}",
                    name, value
                )));
            }
        }

        let ratios = [
            ("multi_column_match_ratio", self.multi_column_match_ratio),
            ("single_column_match_ratio", self.single_column_match_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::Settings(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if !self.heading_size_ratio.is_finite() || self.heading_size_ratio < 1.0 {
            return Err(EngineError::Settings(format!(
                "heading_size_ratio must be at least 1, got {}",
                self.heading_size_ratio
            )));
        }
        if self.table_min_rows == 0 || self.table_min_columns == 0 {
            return Err(EngineError::Settings(
                "table_min_rows and table_min_columns must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            column_gap: 40.0,
            line_tolerance: 3.0,
            min_reading_order_elements: 4,
            multi_column_match_ratio: 0.7,
            single_column_match_ratio: 0.8,
            table_row_tolerance: 3.0,
            table_column_tolerance: 10.0,
            table_min_rows: 2,
            table_min_columns: 3,
            heading_size_ratio: 1.2,
            large_text_size: 18.0,
            large_bold_text_size: 14.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Documents processed concurrently (default: 4)
    pub max_parallel: usize,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self { max_parallel: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EngineSettings::default();
        assert_eq!(settings.target_level, WcagLevel::AA);
        assert!(CheckId::ALL.iter().all(|c| settings.is_enabled(*c)));
        assert_eq!(settings.batch.max_parallel, 4);
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            target_level = "AAA"

            [checks]
            color_contrast = false

            [heuristics]
            column_gap = 36.0
        "#;
        let settings = EngineSettings::from_toml(toml).unwrap();
        assert_eq!(settings.target_level, WcagLevel::AAA);
        assert!(!settings.is_enabled(CheckId::ColorContrast));
        assert!(settings.is_enabled(CheckId::Title));
        assert_eq!(settings.heuristics.column_gap, 36.0);
        assert_eq!(settings.heuristics.line_tolerance, 3.0);
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(EngineSettings::from_toml("target_level = \"AAAA\"").is_err());
    }

    #[test]
    fn test_rejects_out_of_range_heuristics() {
        let err = EngineSettings::from_toml("[heuristics]\nsingle_column_match_ratio = 1.5")
            .unwrap_err();
        assert!(err.to_string().contains("single_column_match_ratio"));

        let mut settings = EngineSettings::default();
        settings.heuristics.column_gap = -4.0;
        assert!(matches!(settings.check(), Err(EngineError::Settings(_))));

        settings.heuristics.column_gap = 40.0;
        settings.heuristics.table_min_columns = 0;
        assert!(settings.check().is_err());
    }

    #[test]
    fn test_default_heuristics_are_valid() {
        assert!(EngineSettings::default().check().is_ok());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(EngineSettings::from_file("/nonexistent/engine.toml").is_err());
    }

    #[test]
    fn test_applicable_criteria_follow_level_and_flags() {
        let a = EngineSettings::for_level(WcagLevel::A);
        assert_eq!(a.applicable_criteria().len(), 8);

        let aa = EngineSettings::default();
        assert_eq!(aa.applicable_criteria().len(), 11);

        let aaa = EngineSettings::for_level(WcagLevel::AAA);
        assert_eq!(aaa.applicable_criteria().len(), 12);

        let no_contrast = EngineSettings::for_level(WcagLevel::AAA)
            .with_check(CheckId::ColorContrast, false);
        let criteria = no_contrast.applicable_criteria();
        assert!(!criteria.contains(&Criterion::ContrastMinimum));
        assert!(!criteria.contains(&Criterion::ContrastEnhanced));
    }

    #[test]
    fn test_contrast_check_runs_only_from_aa() {
        assert!(!EngineSettings::for_level(WcagLevel::A).runs(CheckId::ColorContrast));
        assert!(EngineSettings::default().runs(CheckId::ColorContrast));
    }
}
