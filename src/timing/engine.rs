//! Delivery-time resolution for ranked candidates.
//!
//! Combines the match's coarse timing hint with the user's best-performing
//! hours and a per-item minimum resurfacing interval. The interval is a hard
//! suppression, not a scoring penalty: an item suggested or engaged with
//! inside the interval is withheld entirely. Confidence reflects how much
//! behavioral history backs the chosen moment and follows a sigmoid over the
//! relevant sample count.

use crate::config::TimingConfig;
use crate::timing::profile::UserBehaviorProfile;
use crate::types::{ItemId, RelevanceMatch, ResurfacingTiming, StoredItem, TimingHint};
use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use tracing::debug;

/// Outcome of timing resolution for one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum TimingDecision {
    Scheduled(ResurfacingTiming),

    /// Withheld by the minimum resurfacing interval
    Suppressed { until: DateTime<Utc> },
}

/// Resolves suggestion delivery instants against the behavior profile
pub struct TimingEngine {
    config: TimingConfig,
    profile: UserBehaviorProfile,
}

impl TimingEngine {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            profile: UserBehaviorProfile::new(),
        }
    }

    /// Rebuild around an imported profile
    pub fn with_profile(config: TimingConfig, profile: UserBehaviorProfile) -> Self {
        Self { config, profile }
    }

    pub fn profile(&self) -> &UserBehaviorProfile {
        &self.profile
    }

    /// Replace the profile wholesale; only data import does this
    pub fn replace_profile(&mut self, profile: UserBehaviorProfile) {
        self.profile = profile;
    }

    /// Resolve a delivery instant, or suppress the candidate
    pub fn calculate_optimal_timing(
        &self,
        item: &StoredItem,
        m: &RelevanceMatch,
        now: DateTime<Utc>,
    ) -> TimingDecision {
        let interval = Duration::minutes(self.config.min_resurface_interval_minutes);
        if let Some(last) = self.profile.last_activity(item.id) {
            let until = last + interval;
            if until > now {
                debug!(item = %item.id, %until, "suppressed by resurfacing interval");
                return TimingDecision::Suppressed { until };
            }
        }

        let (suggested_at, reason) = match m.timing_hint {
            TimingHint::Immediate => (
                now + Duration::seconds(self.config.immediate_delay_secs),
                "Highly relevant to the page you are viewing".to_string(),
            ),
            TimingHint::Delayed => self.next_receptive_slot(now),
            TimingHint::Background => (
                now + Duration::hours(self.config.background_offset_hours),
                "Queued for a quieter moment".to_string(),
            ),
        };

        let suggested_at = self.clamp_to_horizon(suggested_at, now);
        let samples = self
            .profile
            .samples_for(suggested_at.hour() as usize, item.category);

        TimingDecision::Scheduled(ResurfacingTiming {
            suggested_at,
            confidence: confidence_from_samples(samples),
            reason,
            urgency: m.timing_hint.urgency(),
        })
    }

    /// Fallback when every candidate in an analysis was suppressed: schedule
    /// the best one at its suppression expiry instead of dropping everything
    pub fn timing_at_expiry(
        &self,
        m: &RelevanceMatch,
        until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ResurfacingTiming {
        let suggested_at = self.clamp_to_horizon(until.max(now), now);
        ResurfacingTiming {
            suggested_at,
            confidence: confidence_from_samples(self.profile.total_samples().min(10)),
            reason: "Waiting out the resurfacing interval".to_string(),
            urgency: m.timing_hint.urgency(),
        }
    }

    /// Record the throttle timestamp when a suggestion is created
    pub fn mark_suggested(&mut self, item: ItemId, at: DateTime<Utc>) {
        self.profile.mark_suggested(item, at);
    }

    /// Sole mutator of the behavior profile, called once per interaction
    pub fn update_user_behavior(
        &mut self,
        at: DateTime<Utc>,
        engaged: bool,
        category: crate::types::PageCategory,
        dismissal_reason: Option<crate::types::DismissalReason>,
        item: ItemId,
    ) {
        let hour = at.hour() as usize;
        let weekday = at.weekday().num_days_from_monday() as usize;
        self.profile
            .record_interaction(hour, weekday, engaged, category, dismissal_reason);
        if engaged {
            self.profile.mark_engaged(item, at);
        }
    }

    /// Next occurrence of the best-performing hour within 24h, with a fixed
    /// fallback offset when history is too sparse to choose one
    fn next_receptive_slot(&self, now: DateTime<Utc>) -> (DateTime<Utc>, String) {
        let best = self.profile.best_hours(self.config.min_confidence_samples);
        if let Some(&hour) = best.first() {
            if let Some(at) = next_occurrence_of_hour(now, hour) {
                return (
                    at,
                    format!("You tend to engage with suggestions around {hour:02}:00"),
                );
            }
        }
        (
            now + Duration::hours(self.config.delayed_fallback_hours),
            "Scheduled for later today".to_string(),
        )
    }

    fn clamp_to_horizon(&self, at: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
        let horizon = now + Duration::hours(self.config.schedule_horizon_hours);
        at.min(horizon)
    }
}

/// Sigmoid confidence over sample count: ~0.12 at 0 samples, 0.5 at 10,
/// ~0.88 at 20, approaching 1.0 past 50
fn confidence_from_samples(samples: u32) -> f32 {
    let x = (samples as f32 - 10.0) / 5.0;
    1.0 / (1.0 + (-x).exp())
}

fn next_occurrence_of_hour(now: DateTime<Utc>, hour: usize) -> Option<DateTime<Utc>> {
    let naive = now.date_naive().and_hms_opt(hour as u32, 0, 0)?;
    let mut at = Utc.from_utc_datetime(&naive);
    if at <= now {
        at += Duration::days(1);
    }
    Some(at)
}
