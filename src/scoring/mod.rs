//! Relevance scoring, candidate ranking, and preference-driven re-ranking

pub mod preference_learner;
pub mod ranker;
pub mod relevance_scorer;

pub use preference_learner::PreferenceLearner;
pub use ranker::CandidateRanker;
pub use relevance_scorer::{RelevanceScorer, ScoredRelevance};
