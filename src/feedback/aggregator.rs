//! Feedback aggregation and analytics.
//!
//! Ingests interaction feedback into a capped ring buffer and maintains a
//! derived analytics snapshot recomputed from the full retained history on
//! every new record. The recompute is a pure fold: identical history yields
//! an identical snapshot, and optional fields missing from a record are
//! excluded from averages rather than treated as zero.
//!
//! Trend classification compares the engagement rate over the trailing
//! window (anchored at the newest record so the fold stays pure) against the
//! all-time rate, with a dead zone around "stable".

use crate::config::FeedbackConfig;
use crate::types::{DismissalReason, InteractionAction, PageCategory};
use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// One feedback data point as the aggregator ingests it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub action: InteractionAction,
    pub at: DateTime<Utc>,
    pub category: PageCategory,
    pub dismissal_reason: Option<DismissalReason>,

    /// Explicit rating (1-5), when the user gave one
    pub rating: Option<u8>,

    pub engagement_ms: Option<i64>,

    /// Device class reported by the host, free-form
    pub device: Option<String>,

    /// Position of the suggestion in the presented list
    pub position: Option<u32>,
}

/// Seven-day trend relative to all-time engagement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl std::fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendDirection::Improving => write!(f, "improving"),
            TrendDirection::Stable => write!(f, "stable"),
            TrendDirection::Declining => write!(f, "declining"),
        }
    }
}

/// Derived analytics over the retained feedback history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackAnalyticsSnapshot {
    pub total_records: usize,

    /// How often each action occurred
    pub action_counts: HashMap<InteractionAction, u64>,

    /// Dismissal reason histogram
    pub dismissal_reasons: HashMap<DismissalReason, u64>,

    /// Mean explicit rating; `None` when no record carried one
    pub mean_rating: Option<f64>,

    /// Mean engagement duration; `None` when no record carried one
    pub mean_engagement_ms: Option<f64>,

    /// Engagement actions over all records
    pub engagement_rate: f64,

    /// Engagement rate per hour of day
    pub hourly_engagement: [f64; 24],

    /// Engagement rate per weekday, Monday-first
    pub daily_engagement: [f64; 7],

    pub device_engagement: HashMap<String, f64>,
    pub position_engagement: HashMap<u32, f64>,

    pub trend: TrendDirection,
}

impl Default for FeedbackAnalyticsSnapshot {
    fn default() -> Self {
        Self {
            total_records: 0,
            action_counts: HashMap::new(),
            dismissal_reasons: HashMap::new(),
            mean_rating: None,
            mean_engagement_ms: None,
            engagement_rate: 0.0,
            hourly_engagement: [0.0; 24],
            daily_engagement: [0.0; 7],
            device_engagement: HashMap::new(),
            position_engagement: HashMap::new(),
            trend: TrendDirection::Stable,
        }
    }
}

/// Capped feedback history with a continuously refreshed snapshot
pub struct FeedbackAggregator {
    config: FeedbackConfig,
    history: VecDeque<FeedbackRecord>,
    snapshot: FeedbackAnalyticsSnapshot,
}

impl FeedbackAggregator {
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            snapshot: FeedbackAnalyticsSnapshot::default(),
        }
    }

    /// Append a record (evicting the oldest beyond the cap) and refresh the
    /// snapshot
    pub fn record(&mut self, record: FeedbackRecord) {
        while self.history.len() >= self.config.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(record);
        self.snapshot = self.recompute();
        debug!(records = self.history.len(), "feedback recorded");
    }

    pub fn snapshot(&self) -> &FeedbackAnalyticsSnapshot {
        &self.snapshot
    }

    /// Retained history, oldest first
    pub fn history(&self) -> &VecDeque<FeedbackRecord> {
        &self.history
    }

    /// Replace history from an import, truncating to the cap (oldest
    /// evicted), and refresh the snapshot
    pub fn import(&mut self, records: Vec<FeedbackRecord>) {
        for record in records {
            while self.history.len() >= self.config.history_cap {
                self.history.pop_front();
            }
            self.history.push_back(record);
        }
        self.snapshot = self.recompute();
    }

    /// Pure fold over the retained history
    pub fn recompute(&self) -> FeedbackAnalyticsSnapshot {
        let mut snapshot = FeedbackAnalyticsSnapshot {
            total_records: self.history.len(),
            ..FeedbackAnalyticsSnapshot::default()
        };
        if self.history.is_empty() {
            return snapshot;
        }

        let mut rating_sum = 0u64;
        let mut rating_count = 0u64;
        let mut engagement_sum = 0i64;
        let mut engagement_count = 0u64;
        let mut engaged_total = 0u64;

        let mut hourly = [(0u64, 0u64); 24];
        let mut daily = [(0u64, 0u64); 7];
        let mut devices: HashMap<String, (u64, u64)> = HashMap::new();
        let mut positions: HashMap<u32, (u64, u64)> = HashMap::new();

        for record in &self.history {
            *snapshot.action_counts.entry(record.action).or_insert(0) += 1;
            if let Some(reason) = record.dismissal_reason {
                *snapshot.dismissal_reasons.entry(reason).or_insert(0) += 1;
            }
            if let Some(rating) = record.rating {
                rating_sum += u64::from(rating);
                rating_count += 1;
            }
            if let Some(ms) = record.engagement_ms {
                engagement_sum += ms;
                engagement_count += 1;
            }

            let engaged = record.action.is_engagement();
            if engaged {
                engaged_total += 1;
            }

            let hour = record.at.hour() as usize;
            hourly[hour].0 += 1;
            if engaged {
                hourly[hour].1 += 1;
            }

            let day = record.at.weekday().num_days_from_monday() as usize;
            daily[day].0 += 1;
            if engaged {
                daily[day].1 += 1;
            }

            if let Some(device) = &record.device {
                let entry = devices.entry(device.clone()).or_insert((0, 0));
                entry.0 += 1;
                if engaged {
                    entry.1 += 1;
                }
            }
            if let Some(position) = record.position {
                let entry = positions.entry(position).or_insert((0, 0));
                entry.0 += 1;
                if engaged {
                    entry.1 += 1;
                }
            }
        }

        if rating_count > 0 {
            snapshot.mean_rating = Some(rating_sum as f64 / rating_count as f64);
        }
        if engagement_count > 0 {
            snapshot.mean_engagement_ms = Some(engagement_sum as f64 / engagement_count as f64);
        }
        snapshot.engagement_rate = engaged_total as f64 / self.history.len() as f64;

        for (hour, (samples, engaged)) in hourly.iter().enumerate() {
            snapshot.hourly_engagement[hour] = rate(*samples, *engaged);
        }
        for (day, (samples, engaged)) in daily.iter().enumerate() {
            snapshot.daily_engagement[day] = rate(*samples, *engaged);
        }
        snapshot.device_engagement = devices
            .into_iter()
            .map(|(device, (samples, engaged))| (device, rate(samples, engaged)))
            .collect();
        snapshot.position_engagement = positions
            .into_iter()
            .map(|(position, (samples, engaged))| (position, rate(samples, engaged)))
            .collect();

        snapshot.trend = self.classify_trend(snapshot.engagement_rate);
        snapshot
    }

    /// Trailing-window engagement vs all-time, anchored at the newest record
    fn classify_trend(&self, all_time_rate: f64) -> TrendDirection {
        let Some(newest) = self.history.back() else {
            return TrendDirection::Stable;
        };
        let window_start = newest.at - Duration::days(self.config.trend_window_days);

        let mut samples = 0u64;
        let mut engaged = 0u64;
        for record in self.history.iter().filter(|r| r.at >= window_start) {
            samples += 1;
            if record.action.is_engagement() {
                engaged += 1;
            }
        }
        if samples == 0 {
            return TrendDirection::Stable;
        }

        let recent_rate = engaged as f64 / samples as f64;
        let delta = recent_rate - all_time_rate;
        if delta > self.config.trend_dead_zone {
            TrendDirection::Improving
        } else if delta < -self.config.trend_dead_zone {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    }
}

fn rate(samples: u64, engaged: u64) -> f64 {
    if samples == 0 {
        0.0
    } else {
        engaged as f64 / samples as f64
    }
}
