//! Candidate ranking over the stored-item corpus.
//!
//! Applies the relevance scorer across every corpus item, filters by the
//! minimum score threshold, orders descending (stable, so ties keep corpus
//! order), and truncates to the configured result cap. An optional recency window
//! pre-filters the corpus before any scoring happens; it bounds cost and is
//! never a scoring factor.

use crate::config::RankerConfig;
use crate::scoring::relevance_scorer::RelevanceScorer;
use crate::types::{BrowsingContext, Priority, RelevanceMatch, StoredItem, TimingHint};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

/// Threshold/sort/truncate ranking pass
pub struct CandidateRanker {
    config: RankerConfig,
}

impl CandidateRanker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Rank the corpus against a browsing context
    ///
    /// A malformed item is skipped with a warning; one bad item never fails
    /// the batch. An empty corpus yields an empty ranking.
    pub fn rank(
        &self,
        scorer: &RelevanceScorer,
        context: &BrowsingContext,
        corpus: &[StoredItem],
        now: DateTime<Utc>,
    ) -> Vec<RelevanceMatch> {
        let mut matches = Vec::new();

        for item in corpus {
            if let Some(window_days) = self.config.recency_window_days {
                let cutoff = now - Duration::days(i64::from(window_days));
                if item.updated_at < cutoff {
                    continue;
                }
            }

            let scored = match scorer.score(context, item) {
                Ok(scored) => scored,
                Err(e) => {
                    warn!(item = %item.id, error = %e, "skipping unscorable item");
                    continue;
                }
            };

            if scored.score < self.config.min_score {
                continue;
            }

            let mut priority = Priority::from_score(scored.score);
            if item.importance > self.config.high_importance
                || item.access_count > self.config.frequent_access
            {
                priority = priority.boosted();
            }

            matches.push(RelevanceMatch {
                item_id: item.id,
                score: scored.score,
                reasons: scored.reasons,
                timing_hint: TimingHint::from_score(scored.score),
                priority,
            });
        }

        // Stable sort: ties keep corpus iteration order
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(self.config.max_results);

        debug!(
            candidates = corpus.len(),
            ranked = matches.len(),
            "ranked corpus"
        );

        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScorerConfig;
    use crate::types::{ItemId, PageCategory, PageMetadata};

    fn test_context() -> BrowsingContext {
        BrowsingContext {
            url: "https://docs.example.com/api/auth".to_string(),
            title: "Authentication guide".to_string(),
            content: "Authenticating requests against the service".to_string(),
            metadata: PageMetadata::default(),
            keywords: vec!["api".to_string(), "auth".to_string()],
            concepts: vec!["authentication".to_string()],
            category: PageCategory::Documentation,
            captured_at: Utc::now(),
            confidence: 0.9,
        }
    }

    fn test_item(tags: &[&str], category: PageCategory) -> StoredItem {
        StoredItem {
            id: ItemId::new(),
            url: "https://docs.example.com/api/tokens".to_string(),
            title: "Token reference".to_string(),
            content: "Token lifetimes and endpoint authentication".to_string(),
            category,
            tags: tags.iter().map(|s| s.to_string()).collect(),
            concepts: vec!["authentication".to_string()],
            importance: 5,
            access_count: 0,
            last_accessed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            size_bytes: 512,
        }
    }

    fn ranker() -> CandidateRanker {
        CandidateRanker::new(RankerConfig::default())
    }

    fn scorer() -> RelevanceScorer {
        RelevanceScorer::new(ScorerConfig::default())
    }

    #[test]
    fn test_empty_corpus_returns_empty() {
        let matches = ranker().rank(&scorer(), &test_context(), &[], Utc::now());
        assert!(matches.is_empty());
    }

    #[test]
    fn test_output_sorted_descending_and_capped() {
        let corpus: Vec<StoredItem> = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    test_item(&["api", "auth"], PageCategory::Documentation)
                } else {
                    test_item(&["api"], PageCategory::Documentation)
                }
            })
            .collect();

        let matches = ranker().rank(&scorer(), &test_context(), &corpus, Utc::now());

        assert!(matches.len() <= RankerConfig::default().max_results);
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_threshold_filters_low_scores() {
        let mut unrelated = test_item(&["cooking"], PageCategory::Article);
        unrelated.url = "https://food.example.org/pasta".to_string();
        unrelated.concepts = vec!["cuisine".to_string()];
        unrelated.content = "Boil pasta until tender".to_string();

        let config = RankerConfig {
            min_score: 0.5,
            ..RankerConfig::default()
        };
        let matches = CandidateRanker::new(config).rank(
            &scorer(),
            &test_context(),
            &[unrelated],
            Utc::now(),
        );
        assert!(matches.is_empty());
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let first = test_item(&["api", "auth"], PageCategory::Documentation);
        let second = test_item(&["api", "auth"], PageCategory::Documentation);
        let first_id = first.id;
        let second_id = second.id;

        let matches = ranker().rank(
            &scorer(),
            &test_context(),
            &[first, second],
            Utc::now(),
        );
        assert_eq!(matches[0].item_id, first_id);
        assert_eq!(matches[1].item_id, second_id);
    }

    #[test]
    fn test_importance_boosts_priority() {
        let plain = test_item(&["api"], PageCategory::Documentation);
        let mut important = test_item(&["api"], PageCategory::Documentation);
        important.importance = 9;

        let matches = ranker().rank(
            &scorer(),
            &test_context(),
            &[plain.clone(), important.clone()],
            Utc::now(),
        );

        let plain_match = matches.iter().find(|m| m.item_id == plain.id).unwrap();
        let important_match = matches.iter().find(|m| m.item_id == important.id).unwrap();
        assert_eq!(important_match.priority, plain_match.priority.boosted());
    }

    #[test]
    fn test_frequent_access_boosts_priority() {
        let mut frequent = test_item(&["api"], PageCategory::Documentation);
        frequent.access_count = 12;

        let matches = ranker().rank(&scorer(), &test_context(), &[frequent], Utc::now());
        let baseline = Priority::from_score(matches[0].score);
        assert_eq!(matches[0].priority, baseline.boosted());
    }

    #[test]
    fn test_recency_window_prefilters() {
        let fresh = test_item(&["api", "auth"], PageCategory::Documentation);
        let mut stale = test_item(&["api", "auth"], PageCategory::Documentation);
        stale.updated_at = Utc::now() - Duration::days(90);

        let config = RankerConfig {
            recency_window_days: Some(30),
            ..RankerConfig::default()
        };
        let matches = CandidateRanker::new(config).rank(
            &scorer(),
            &test_context(),
            &[fresh.clone(), stale.clone()],
            Utc::now(),
        );

        assert!(matches.iter().any(|m| m.item_id == fresh.id));
        assert!(!matches.iter().any(|m| m.item_id == stale.id));
    }

    #[test]
    fn test_malformed_item_skipped_not_fatal() {
        let good = test_item(&["api", "auth"], PageCategory::Documentation);
        let mut bad = test_item(&["api", "auth"], PageCategory::Documentation);
        bad.url = String::new();
        bad.title = String::new();

        let matches = ranker().rank(
            &scorer(),
            &test_context(),
            &[bad, good.clone()],
            Utc::now(),
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].item_id, good.id);
    }

    #[test]
    fn test_timing_hint_follows_score_band() {
        let corpus = vec![test_item(&["api", "auth"], PageCategory::Documentation)];
        let matches = ranker().rank(&scorer(), &test_context(), &corpus, Utc::now());
        let m = &matches[0];
        assert_eq!(m.timing_hint, TimingHint::from_score(m.score));
    }
}
