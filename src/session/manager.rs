//! Session lifecycle management.
//!
//! Owns the single active-session slot and a capped history ring. At most one
//! session is active at any time: beginning a new analysis completes the
//! prior one first. Completion is idempotent and moves the session into the
//! ring, evicting the oldest entry beyond the cap. Discarding is the explicit
//! abandonment path; supersession by a new analysis always routes through
//! completion.

use crate::config::SessionConfig;
use crate::types::{
    BrowsingContext, ContextAnalysisSession, ContextualSuggestion, InteractionEvent, SessionId,
    SessionStatus,
};
use chrono::Utc;
use std::collections::VecDeque;
use tracing::{debug, info};

/// Active-slot plus ring-buffered session history
pub struct SessionManager {
    config: SessionConfig,
    active: Option<ContextAnalysisSession>,
    history: VecDeque<ContextAnalysisSession>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            active: None,
            history: VecDeque::new(),
        }
    }

    /// Begin a new session, completing any active one first
    pub fn begin(&mut self, context: BrowsingContext) -> SessionId {
        if self.active.is_some() {
            self.complete_active();
        }
        let session = ContextAnalysisSession::new(context);
        let id = session.id;
        info!(session = %id, "analysis session started");
        self.active = Some(session);
        id
    }

    /// Attach ranked suggestions (truncated to the per-session cap) and an
    /// optional failure diagnostic to the active session
    pub fn install_suggestions(
        &mut self,
        mut suggestions: Vec<ContextualSuggestion>,
        diagnostic: Option<String>,
    ) {
        if let Some(session) = self.active.as_mut() {
            suggestions.truncate(self.config.max_suggestions);
            session.suggestions = suggestions;
            session.diagnostic = diagnostic;
        }
    }

    pub fn active(&self) -> Option<&ContextAnalysisSession> {
        self.active.as_ref()
    }

    pub fn active_mut(&mut self) -> Option<&mut ContextAnalysisSession> {
        self.active.as_mut()
    }

    /// Append an interaction to the active session
    ///
    /// Returns false (and logs at debug) when there is no active session or
    /// the referenced suggestion is unknown; late-arriving UI events after
    /// navigation must not crash the pipeline.
    pub fn record_interaction(&mut self, event: InteractionEvent) -> bool {
        let Some(session) = self.active.as_mut() else {
            debug!(suggestion = %event.suggestion_id, "interaction ignored: no active session");
            return false;
        };
        if session.find_suggestion(event.suggestion_id).is_none() {
            debug!(suggestion = %event.suggestion_id, "interaction ignored: unknown suggestion");
            return false;
        }
        session.interactions.push(event);
        true
    }

    /// Complete the active session and move it into history; idempotent
    pub fn complete_active(&mut self) -> Option<SessionId> {
        self.finish_active(SessionStatus::Completed)
    }

    /// Explicitly abandon the active session; it still enters history
    pub fn discard_active(&mut self) -> Option<SessionId> {
        self.finish_active(SessionStatus::Abandoned)
    }

    fn finish_active(&mut self, status: SessionStatus) -> Option<SessionId> {
        let mut session = self.active.take()?;
        session.status = status;
        session.completed_at = Some(Utc::now());
        let id = session.id;
        info!(session = %id, %status, "analysis session finished");
        self.push_history(session);
        Some(id)
    }

    /// History, oldest first
    pub fn history(&self) -> &VecDeque<ContextAnalysisSession> {
        &self.history
    }

    /// Replace the active slot and merge imported history, truncating to the
    /// cap (oldest evicted first); only data import calls this
    pub fn import(
        &mut self,
        active: Option<ContextAnalysisSession>,
        sessions: Vec<ContextAnalysisSession>,
    ) {
        if self.active.is_some() {
            self.complete_active();
        }
        for session in sessions {
            self.push_history(session);
        }
        self.active = active;
    }

    fn push_history(&mut self, session: ContextAnalysisSession) {
        while self.history.len() >= self.config.history_cap {
            self.history.pop_front();
        }
        self.history.push_back(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BrowsingContext;

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig::default())
    }

    fn context() -> BrowsingContext {
        BrowsingContext::empty("https://example.com")
    }

    #[test]
    fn test_single_active_session() {
        let mut mgr = manager();
        let first = mgr.begin(context());
        let second = mgr.begin(context());

        assert_ne!(first, second);
        assert_eq!(mgr.active().unwrap().id, second);
        assert_eq!(mgr.history().len(), 1);
        assert_eq!(mgr.history()[0].id, first);
        assert_eq!(mgr.history()[0].status, SessionStatus::Completed);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let mut mgr = manager();
        mgr.begin(context());

        assert!(mgr.complete_active().is_some());
        assert!(mgr.complete_active().is_none());
        assert_eq!(mgr.history().len(), 1);
    }

    #[test]
    fn test_discard_marks_abandoned() {
        let mut mgr = manager();
        mgr.begin(context());
        mgr.discard_active();

        assert!(mgr.active().is_none());
        assert_eq!(mgr.history()[0].status, SessionStatus::Abandoned);
        assert!(mgr.history()[0].completed_at.is_some());
    }

    #[test]
    fn test_history_ring_evicts_oldest() {
        let config = SessionConfig {
            history_cap: 3,
            ..SessionConfig::default()
        };
        let mut mgr = SessionManager::new(config);

        let ids: Vec<SessionId> = (0..5)
            .map(|_| {
                let id = mgr.begin(context());
                mgr.complete_active();
                id
            })
            .collect();

        assert_eq!(mgr.history().len(), 3);
        let kept: Vec<SessionId> = mgr.history().iter().map(|s| s.id).collect();
        assert_eq!(kept, ids[2..].to_vec());
    }

    #[test]
    fn test_suggestions_truncated_to_cap() {
        use crate::types::{
            ContextualSuggestion, ItemId, PageCategory, Priority, RelevanceMatch,
            ResurfacingTiming, StoredItem, TimingHint, Urgency,
        };

        let config = SessionConfig {
            max_suggestions: 2,
            ..SessionConfig::default()
        };
        let mut mgr = SessionManager::new(config);
        mgr.begin(context());

        let suggestions: Vec<ContextualSuggestion> = (0..4)
            .map(|_| {
                let item = StoredItem {
                    id: ItemId::new(),
                    url: "https://example.com/x".to_string(),
                    title: "x".to_string(),
                    content: String::new(),
                    category: PageCategory::Other,
                    tags: vec![],
                    concepts: vec![],
                    importance: 1,
                    access_count: 0,
                    last_accessed_at: None,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                    size_bytes: 0,
                };
                let m = RelevanceMatch {
                    item_id: item.id,
                    score: 0.5,
                    reasons: vec![],
                    timing_hint: TimingHint::Delayed,
                    priority: Priority::Medium,
                };
                ContextualSuggestion::from_match(
                    item,
                    &m,
                    ResurfacingTiming {
                        suggested_at: Utc::now(),
                        confidence: 0.5,
                        reason: String::new(),
                        urgency: Urgency::Medium,
                    },
                )
            })
            .collect();

        mgr.install_suggestions(suggestions, None);
        assert_eq!(mgr.active().unwrap().suggestions.len(), 2);
    }

    #[test]
    fn test_interaction_without_active_session_is_noop() {
        use crate::types::{
            InteractionAction, InteractionEvent, InteractionSnapshot, ItemId, Priority,
            SuggestionId, Urgency,
        };

        let mut mgr = manager();
        let event = InteractionEvent {
            item_id: ItemId::new(),
            suggestion_id: SuggestionId::new(),
            action: InteractionAction::Viewed,
            at: Utc::now(),
            snapshot: InteractionSnapshot {
                url: String::new(),
                time_on_page_secs: 0,
                relevance_score: 0.0,
                urgency: Urgency::Low,
                priority: Priority::Low,
            },
            dismissal_reason: None,
            engagement_ms: None,
        };
        assert!(!mgr.record_interaction(event.clone()));

        mgr.begin(context());
        // Unknown suggestion id is equally a no-op
        assert!(!mgr.record_interaction(event));
        assert!(mgr.active().unwrap().interactions.is_empty());
    }
}
