//! Export/import surface for the engine's mutable state.
//!
//! The whole engine state serializes to a single versionless document: a
//! plain nested record of the session history, the active session, the
//! behavior profile, the feedback history, and the derived analytics. Date
//! fields serialize as ISO-8601 strings (chrono's RFC3339 serde form).
//! Import merges histories and truncates to the configured caps; analytics
//! are recomputed from the imported feedback history.

use crate::feedback::{FeedbackAnalyticsSnapshot, FeedbackRecord};
use crate::timing::UserBehaviorProfile;
use crate::types::ContextAnalysisSession;
use serde::{Deserialize, Serialize};

/// Complete serializable engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub active_session: Option<ContextAnalysisSession>,

    /// Completed/abandoned sessions, oldest first
    pub session_history: Vec<ContextAnalysisSession>,

    pub behavior_profile: UserBehaviorProfile,

    /// Feedback records, oldest first
    pub feedback_history: Vec<FeedbackRecord>,

    /// Derived analytics at export time; recomputed on import
    pub analytics: FeedbackAnalyticsSnapshot,
}
