//! Configuration for the resurface engine
//!
//! Every component gets an explicit configuration struct with documented
//! defaults applied by `Default` impls; the composition root validates the
//! aggregate once at construction time and fails fast on programmer error.
//! No ad-hoc per-call option merging.

use crate::error::{ResurfaceError, Result};
use crate::types::DisplayStyle;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relevance scorer weights; the five dimensions must sum to 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// URL/domain similarity weight
    pub url_weight: f32,

    /// Category equality weight
    pub category_weight: f32,

    /// Keyword/tag overlap weight
    pub keyword_weight: f32,

    /// Concept overlap weight
    pub concept_weight: f32,

    /// Content-text similarity weight
    pub content_weight: f32,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            url_weight: 0.15,
            category_weight: 0.20,
            keyword_weight: 0.25,
            concept_weight: 0.25,
            content_weight: 0.15,
        }
    }
}

impl ScorerConfig {
    pub fn validate(&self) -> Result<()> {
        let weights = [
            self.url_weight,
            self.category_weight,
            self.keyword_weight,
            self.concept_weight,
            self.content_weight,
        ];
        if weights.iter().any(|w| !(0.0..=1.0).contains(w)) {
            return Err(config_error("scorer weights must each be in [0.0, 1.0]"));
        }
        let sum: f32 = weights.iter().sum();
        if (sum - 1.0).abs() > 1e-4 {
            return Err(config_error(format!(
                "scorer weights must sum to 1.0, got {sum:.4}"
            )));
        }
        Ok(())
    }
}

/// Candidate ranking thresholds and caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankerConfig {
    /// Matches scoring below this are filtered out
    pub min_score: f32,

    /// Maximum matches returned per analysis
    pub max_results: usize,

    /// Optional pre-filter: only items updated within this many days are scored
    pub recency_window_days: Option<u32>,

    /// Importance rating above which priority is boosted one tier
    pub high_importance: u8,

    /// Access count above which priority is boosted one tier
    pub frequent_access: u32,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            min_score: 0.3,
            max_results: 5,
            recency_window_days: None,
            high_importance: 7,
            frequent_access: 5,
        }
    }
}

impl RankerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(config_error("ranker min_score must be in [0.0, 1.0]"));
        }
        if self.max_results == 0 {
            return Err(config_error("ranker max_results must be at least 1"));
        }
        Ok(())
    }
}

/// Delivery timing and resurfacing throttle parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed delay for immediate-tier suggestions
    pub immediate_delay_secs: i64,

    /// Fallback offset for delayed-tier suggestions when history is sparse
    pub delayed_fallback_hours: i64,

    /// Default offset for background-tier suggestions
    pub background_offset_hours: i64,

    /// An item suggested or engaged within this interval is not re-suggested
    pub min_resurface_interval_minutes: i64,

    /// Deliveries are never scheduled past this horizon
    pub schedule_horizon_hours: i64,

    /// Sample count below which confidence stays low and affinities default
    pub min_confidence_samples: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            immediate_delay_secs: 30,
            delayed_fallback_hours: 2,
            background_offset_hours: 4,
            min_resurface_interval_minutes: 60,
            schedule_horizon_hours: 24,
            min_confidence_samples: 5,
        }
    }
}

impl TimingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.immediate_delay_secs < 0
            || self.delayed_fallback_hours <= 0
            || self.background_offset_hours <= 0
            || self.min_resurface_interval_minutes <= 0
            || self.schedule_horizon_hours <= 0
        {
            return Err(config_error("timing offsets and intervals must be positive"));
        }
        Ok(())
    }
}

/// Session lifecycle caps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Per-session suggestion cap
    pub max_suggestions: usize,

    /// Completed sessions retained in the history ring
    pub history_cap: usize,

    /// Advisory only: no timer enforces auto-completion on timeout
    pub session_timeout_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_suggestions: 5,
            history_cap: 50,
            session_timeout_minutes: 30,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_suggestions == 0 {
            return Err(config_error("session max_suggestions must be at least 1"));
        }
        if self.history_cap == 0 {
            return Err(config_error("session history_cap must be at least 1"));
        }
        Ok(())
    }
}

/// Feedback retention and trend detection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    /// Feedback records retained in the history ring
    pub history_cap: usize,

    /// Trend comparison window
    pub trend_window_days: i64,

    /// Dead zone around "stable", as a rate delta
    pub trend_dead_zone: f64,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            history_cap: 1000,
            trend_window_days: 7,
            trend_dead_zone: 0.05,
        }
    }
}

impl FeedbackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.history_cap == 0 {
            return Err(config_error("feedback history_cap must be at least 1"));
        }
        if self.trend_window_days <= 0 {
            return Err(config_error("feedback trend_window_days must be positive"));
        }
        if !(0.0..=1.0).contains(&self.trend_dead_zone) {
            return Err(config_error("feedback trend_dead_zone must be in [0.0, 1.0]"));
        }
        Ok(())
    }
}

/// Options forwarded to the page content source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    /// Pages with less content than this fail extraction
    pub min_content_len: usize,

    pub include_metadata: bool,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            min_content_len: 200,
            include_metadata: true,
        }
    }
}

/// Presentation parameters forwarded to the notification layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub style: DisplayStyle,

    /// Maximum suggestions shown concurrently
    pub max_concurrent: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            style: DisplayStyle::Contextual,
            max_concurrent: 3,
        }
    }
}

impl NotificationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrent == 0 {
            return Err(config_error("notification max_concurrent must be at least 1"));
        }
        Ok(())
    }
}

/// Aggregate engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scorer: ScorerConfig,
    pub ranker: RankerConfig,
    pub timing: TimingConfig,
    pub session: SessionConfig,
    pub feedback: FeedbackConfig,
    pub extraction: ExtractionOptions,
    pub notification: NotificationConfig,
}

impl EngineConfig {
    /// Validate every component config; invalid values fail fast here
    pub fn validate(&self) -> Result<()> {
        self.scorer.validate()?;
        self.ranker.validate()?;
        self.timing.validate()?;
        self.session.validate()?;
        self.feedback.validate()?;
        self.notification.validate()?;
        Ok(())
    }

    /// Load configuration from a file, layered with `RESURFACE__`-prefixed
    /// environment variables
    pub fn from_file(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("RESURFACE").separator("__"))
            .build()?;

        let cfg: EngineConfig = settings
            .try_deserialize()
            .map_err(ResurfaceError::Config)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

fn config_error(msg: impl Into<String>) -> ResurfaceError {
    ResurfaceError::Config(config::ConfigError::Message(msg.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        EngineConfig::default().validate().expect("defaults must be valid");
    }

    #[test]
    fn test_scorer_weights_must_sum_to_one() {
        let mut cfg = ScorerConfig::default();
        cfg.url_weight = 0.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_caps_rejected() {
        let mut cfg = SessionConfig::default();
        cfg.history_cap = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = RankerConfig::default();
        cfg.max_results = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_negative_intervals_rejected() {
        let mut cfg = TimingConfig::default();
        cfg.min_resurface_interval_minutes = -5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_from_file_applies_defaults_for_missing_sections() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[ranker]\nmin_score = 0.4\nmax_results = 2").unwrap();

        let cfg = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(cfg.ranker.min_score, 0.4);
        assert_eq!(cfg.ranker.max_results, 2);
        // Untouched sections keep their defaults
        assert_eq!(cfg.session.history_cap, 50);
        assert_eq!(cfg.feedback.history_cap, 1000);
    }

    #[test]
    fn test_invalid_file_values_fail_fast() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "[session]\nhistory_cap = 0").unwrap();

        assert!(EngineConfig::from_file(file.path()).is_err());
    }
}
