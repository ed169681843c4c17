//! Accumulated user engagement patterns.
//!
//! The profile tracks per-hour-of-day and per-weekday engagement rates,
//! per-category affinity, and per-item throttle timestamps. It is mutated
//! incrementally by every recorded interaction and never reset except by
//! explicit data import. Accuracy degrades gracefully with sparse data; the
//! consumers fall back to neutral defaults below a minimum sample count.

use crate::types::{DismissalReason, ItemId, PageCategory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Running engagement tally for one bucket (hour, weekday, or category)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementStat {
    pub samples: u32,
    pub engaged: u32,
}

impl EngagementStat {
    pub fn record(&mut self, engaged: bool) {
        self.samples += 1;
        if engaged {
            self.engaged += 1;
        }
    }

    /// Engagement rate, or `None` with no samples
    pub fn rate(&self) -> Option<f32> {
        if self.samples == 0 {
            None
        } else {
            Some(self.engaged as f32 / self.samples as f32)
        }
    }

    /// Engagement rate, falling back to `default` under `min_samples`
    pub fn rate_or(&self, default: f32, min_samples: u32) -> f32 {
        if self.samples >= min_samples {
            self.rate().unwrap_or(default)
        } else {
            default
        }
    }
}

/// Per-user behavioral statistics owned by the timing engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserBehaviorProfile {
    /// Engagement per hour of day (0-23)
    pub hourly: [EngagementStat; 24],

    /// Engagement per weekday, Monday-first (0-6)
    pub daily: [EngagementStat; 7],

    /// Per-category affinity
    pub categories: HashMap<PageCategory, EngagementStat>,

    /// When each item was last suggested (resurfacing throttle state)
    pub last_suggested: HashMap<ItemId, DateTime<Utc>>,

    /// When each item was last engaged with
    pub last_engaged: HashMap<ItemId, DateTime<Utc>>,

    /// Dismissal reason tallies
    pub dismissals: HashMap<DismissalReason, u32>,
}

impl UserBehaviorProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Incremental update from one recorded interaction
    pub fn record_interaction(
        &mut self,
        hour: usize,
        weekday: usize,
        engaged: bool,
        category: PageCategory,
        dismissal_reason: Option<DismissalReason>,
    ) {
        self.hourly[hour % 24].record(engaged);
        self.daily[weekday % 7].record(engaged);
        self.categories.entry(category).or_default().record(engaged);
        if let Some(reason) = dismissal_reason {
            *self.dismissals.entry(reason).or_insert(0) += 1;
        }
    }

    pub fn mark_suggested(&mut self, item: ItemId, at: DateTime<Utc>) {
        self.last_suggested.insert(item, at);
    }

    pub fn mark_engaged(&mut self, item: ItemId, at: DateTime<Utc>) {
        self.last_engaged.insert(item, at);
    }

    /// Most recent suggestion or engagement timestamp for an item
    pub fn last_activity(&self, item: ItemId) -> Option<DateTime<Utc>> {
        match (
            self.last_suggested.get(&item).copied(),
            self.last_engaged.get(&item).copied(),
        ) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(a), None) => Some(a),
            (None, Some(b)) => Some(b),
            (None, None) => None,
        }
    }

    /// Hours with enough history, best engagement rate first
    ///
    /// Ties break toward the earlier hour so the ordering is deterministic.
    pub fn best_hours(&self, min_samples: u32) -> Vec<usize> {
        let mut hours: Vec<(usize, f32)> = self
            .hourly
            .iter()
            .enumerate()
            .filter(|(_, stat)| stat.samples >= min_samples)
            .filter_map(|(hour, stat)| stat.rate().map(|rate| (hour, rate)))
            .collect();
        hours.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        hours.into_iter().map(|(hour, _)| hour).collect()
    }

    /// Category affinity with a neutral fallback under sparse data
    pub fn category_rate_or(
        &self,
        category: PageCategory,
        default: f32,
        min_samples: u32,
    ) -> f32 {
        self.categories
            .get(&category)
            .map(|stat| stat.rate_or(default, min_samples))
            .unwrap_or(default)
    }

    /// Total recorded interactions across all hours
    pub fn total_samples(&self) -> u32 {
        self.hourly.iter().map(|stat| stat.samples).sum()
    }

    /// Samples backing a specific hour/category pairing
    pub fn samples_for(&self, hour: usize, category: PageCategory) -> u32 {
        let hour_samples = self.hourly[hour % 24].samples;
        let category_samples = self
            .categories
            .get(&category)
            .map(|stat| stat.samples)
            .unwrap_or(0);
        hour_samples + category_samples
    }
}
