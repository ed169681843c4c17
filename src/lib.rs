//! Resurface - Context-Relevance and Resurfacing-Timing Engine
//!
//! A Rust engine for content-capture hosts (browser extensions and similar)
//! that provides:
//! - Multi-factor relevance scoring of stored items against the current page
//! - Threshold/ranking/truncation of candidate suggestions
//! - Adaptive delivery timing driven by accumulated engagement patterns
//! - Single-active-session lifecycle with bounded history retention
//! - Feedback analytics with trend detection
//!
//! # Architecture
//!
//! The system is organized into several layers:
//! - **Types**: Core data structures (BrowsingContext, StoredItem, etc.)
//! - **Scoring**: Relevance scorer, candidate ranker, preference learner
//! - **Timing**: Behavior profile and delivery-time resolution
//! - **Session/Feedback**: Lifecycle state machines and analytics
//! - **Services**: Collaborator contracts (content source, repository, sink)
//!
//! # Example
//!
//! ```ignore
//! use resurface_core::{EngineConfig, InMemoryRepository, ResurfaceEngine};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = ResurfaceEngine::new(
//!         EngineConfig::default(),
//!         Arc::new(my_content_source),
//!         Arc::new(InMemoryRepository::new()),
//!         Arc::new(my_notification_sink),
//!     )?;
//!
//!     // Analyze the current page and schedule suggestions
//!     let report = engine.start_analysis().await;
//!     println!("{} suggestions", report.suggestion_count);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod feedback;
pub mod scoring;
pub mod services;
pub mod session;
pub mod timing;
pub mod types;

// Re-export commonly used types
pub use config::{
    EngineConfig, ExtractionOptions, FeedbackConfig, NotificationConfig, RankerConfig,
    ScorerConfig, SessionConfig, TimingConfig,
};
pub use engine::{AnalysisReport, InteractionAck, InteractionDetails, ResurfaceEngine};
pub use error::{ResurfaceError, Result};
pub use export::EngineSnapshot;
pub use feedback::{FeedbackAggregator, FeedbackAnalyticsSnapshot, FeedbackRecord, TrendDirection};
pub use scoring::{CandidateRanker, PreferenceLearner, RelevanceScorer, ScoredRelevance};
pub use services::{
    ContentRepository, InMemoryRepository, ItemFilter, NotificationOutcome, NotificationSink,
    PageContentSource,
};
pub use session::SessionManager;
pub use timing::{EngagementStat, TimingDecision, TimingEngine, UserBehaviorProfile};
pub use types::{
    BrowsingContext, ContextAnalysisSession, ContextualSuggestion, DismissalReason, DisplayStyle,
    HostEvent, InteractionAction, InteractionEvent, InteractionSnapshot, ItemId, PageCategory,
    PageMetadata, Priority, RelevanceMatch, ResurfacingTiming, SessionId, SessionStatus,
    StoredItem, SuggestionId, TimingHint, Urgency,
};
