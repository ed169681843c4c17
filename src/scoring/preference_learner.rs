//! Preference-driven re-ranking of scored candidates.
//!
//! A pure transform over a ranked match list: each score is multiplied by an
//! affinity factor blended from the user's per-category engagement and the
//! engagement rate of the current hour, then the list is re-sorted. Set
//! membership never changes; only ordering and score magnitude do, which
//! keeps the pass composable and independently testable.

use crate::scoring::relevance_scorer::round2;
use crate::timing::profile::UserBehaviorProfile;
use crate::types::{ItemId, RelevanceMatch, StoredItem};
use chrono::{DateTime, Timelike, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Neutral affinity assumed under sparse data
const NEUTRAL_AFFINITY: f32 = 0.5;

/// Category affinity carries more weight than time-of-day affinity
const CATEGORY_BLEND: f32 = 0.6;
const HOUR_BLEND: f32 = 0.4;

/// Adjusts ranked candidates using accumulated engagement statistics
pub struct PreferenceLearner {
    min_samples: u32,
}

impl PreferenceLearner {
    pub fn new(min_samples: u32) -> Self {
        Self { min_samples }
    }

    /// Re-score and re-sort matches; membership is preserved
    ///
    /// The multiplier spans [0.7, 1.3]: a fully disengaged category/hour
    /// dampens a score by 30%, a fully engaged one boosts it by 30%.
    pub fn adjust(
        &self,
        matches: &[RelevanceMatch],
        corpus: &[StoredItem],
        profile: &UserBehaviorProfile,
        now: DateTime<Utc>,
    ) -> Vec<RelevanceMatch> {
        let by_id: HashMap<ItemId, &StoredItem> =
            corpus.iter().map(|item| (item.id, item)).collect();

        let hour_rate = profile.hourly[now.hour() as usize % 24]
            .rate_or(NEUTRAL_AFFINITY, self.min_samples);

        let mut adjusted: Vec<RelevanceMatch> = matches
            .iter()
            .map(|m| {
                let category_rate = by_id
                    .get(&m.item_id)
                    .map(|item| {
                        profile.category_rate_or(item.category, NEUTRAL_AFFINITY, self.min_samples)
                    })
                    .unwrap_or(NEUTRAL_AFFINITY);

                let blend = CATEGORY_BLEND * category_rate + HOUR_BLEND * hour_rate;
                let multiplier = 0.7 + 0.6 * blend;
                let score = round2((m.score * multiplier).clamp(0.0, 1.0));

                debug!(item = %m.item_id, from = m.score, to = score, "adjusted score");

                RelevanceMatch {
                    score,
                    ..m.clone()
                }
            })
            .collect();

        adjusted.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        adjusted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PageCategory, Priority, TimingHint};
    use chrono::Utc;
    use proptest::prelude::*;

    fn test_item(category: PageCategory) -> StoredItem {
        StoredItem {
            id: ItemId::new(),
            url: "https://example.com/page".to_string(),
            title: "A page".to_string(),
            content: String::new(),
            category,
            tags: vec![],
            concepts: vec![],
            importance: 5,
            access_count: 0,
            last_accessed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            size_bytes: 64,
        }
    }

    fn match_for(item: &StoredItem, score: f32) -> RelevanceMatch {
        RelevanceMatch {
            item_id: item.id,
            score,
            reasons: vec![],
            timing_hint: TimingHint::from_score(score),
            priority: Priority::from_score(score),
        }
    }

    #[test]
    fn test_neutral_profile_is_identity_on_scores() {
        let learner = PreferenceLearner::new(5);
        let profile = UserBehaviorProfile::new();
        let item = test_item(PageCategory::Article);
        let matches = vec![match_for(&item, 0.6)];

        let adjusted = learner.adjust(&matches, &[item], &profile, Utc::now());
        // Neutral blend of 0.5 gives a multiplier of exactly 1.0
        assert_eq!(adjusted[0].score, 0.6);
    }

    #[test]
    fn test_engaged_category_boosts_score() {
        let learner = PreferenceLearner::new(5);
        let mut profile = UserBehaviorProfile::new();
        for _ in 0..10 {
            profile.record_interaction(3, 0, true, PageCategory::Documentation, None);
        }

        let doc_item = test_item(PageCategory::Documentation);
        let other_item = test_item(PageCategory::Social);
        let matches = vec![match_for(&other_item, 0.6), match_for(&doc_item, 0.6)];

        let adjusted = learner.adjust(
            &matches,
            &[doc_item.clone(), other_item],
            &profile,
            Utc::now(),
        );

        // The engaged category overtakes the tied neutral one
        assert_eq!(adjusted[0].item_id, doc_item.id);
        assert!(adjusted[0].score > adjusted[1].score);
    }

    #[test]
    fn test_disengaged_category_dampens_score() {
        let learner = PreferenceLearner::new(5);
        let mut profile = UserBehaviorProfile::new();
        for _ in 0..10 {
            profile.record_interaction(3, 0, false, PageCategory::Social, None);
        }

        let item = test_item(PageCategory::Social);
        let matches = vec![match_for(&item, 0.8)];
        let adjusted = learner.adjust(&matches, &[item], &profile, Utc::now());
        assert!(adjusted[0].score < 0.8);
    }

    #[test]
    fn test_missing_corpus_item_stays_neutral() {
        let learner = PreferenceLearner::new(5);
        let profile = UserBehaviorProfile::new();
        let item = test_item(PageCategory::Article);
        let matches = vec![match_for(&item, 0.5)];

        // Corpus lookup misses; the match keeps its neutral-adjusted score
        let adjusted = learner.adjust(&matches, &[], &profile, Utc::now());
        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].score, 0.5);
    }

    proptest! {
        #[test]
        fn prop_membership_preserved(scores in proptest::collection::vec(0.0f32..=1.0, 0..12)) {
            let learner = PreferenceLearner::new(5);
            let profile = UserBehaviorProfile::new();

            let items: Vec<StoredItem> =
                scores.iter().map(|_| test_item(PageCategory::Other)).collect();
            let matches: Vec<RelevanceMatch> = items
                .iter()
                .zip(&scores)
                .map(|(item, &score)| match_for(item, score))
                .collect();

            let adjusted = learner.adjust(&matches, &items, &profile, Utc::now());

            prop_assert_eq!(adjusted.len(), matches.len());
            let mut before: Vec<ItemId> = matches.iter().map(|m| m.item_id).collect();
            let mut after: Vec<ItemId> = adjusted.iter().map(|m| m.item_id).collect();
            before.sort_by_key(|id| id.0);
            after.sort_by_key(|id| id.0);
            prop_assert_eq!(before, after);
        }

        #[test]
        fn prop_adjusted_scores_in_unit_range(scores in proptest::collection::vec(0.0f32..=1.0, 0..12)) {
            let learner = PreferenceLearner::new(5);
            let mut profile = UserBehaviorProfile::new();
            for i in 0..20 {
                profile.record_interaction(i % 24, i % 7, i % 2 == 0, PageCategory::Other, None);
            }

            let items: Vec<StoredItem> =
                scores.iter().map(|_| test_item(PageCategory::Other)).collect();
            let matches: Vec<RelevanceMatch> = items
                .iter()
                .zip(&scores)
                .map(|(item, &score)| match_for(item, score))
                .collect();

            for m in learner.adjust(&matches, &items, &profile, Utc::now()) {
                prop_assert!((0.0..=1.0).contains(&m.score));
            }
        }
    }
}
