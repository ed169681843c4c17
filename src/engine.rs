//! Engine composition root.
//!
//! `ResurfaceEngine` owns explicit single instances of the scorer, ranker,
//! and learner, plus all mutable state (session manager, timing engine,
//! feedback aggregator) behind one mutex: execution on the host is
//! cooperative and single-threaded, so a single owner lock is enough to
//! preserve the active-session and ring-buffer invariants on a
//! multi-threaded runtime.
//!
//! Every public entry point returns a report object with a success flag and
//! an optional diagnostic instead of propagating errors; only construction
//! with an invalid configuration fails fast.

use crate::config::EngineConfig;
use crate::error::Result;
use crate::export::EngineSnapshot;
use crate::feedback::{FeedbackAggregator, FeedbackAnalyticsSnapshot, FeedbackRecord};
use crate::scoring::{CandidateRanker, PreferenceLearner, RelevanceScorer};
use crate::services::{ContentRepository, NotificationOutcome, NotificationSink, PageContentSource};
use crate::session::SessionManager;
use crate::timing::{TimingDecision, TimingEngine};
use crate::types::{
    BrowsingContext, ContextAnalysisSession, ContextualSuggestion, DismissalReason, HostEvent,
    InteractionAction, InteractionEvent, InteractionSnapshot, SessionId, SuggestionId,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Outcome of one analysis request
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub success: bool,

    /// A newer analysis started while this one was in flight; its result was
    /// discarded
    pub superseded: bool,

    pub session_id: Option<SessionId>,
    pub suggestion_count: usize,
    pub diagnostic: Option<String>,
}

/// Outcome of one interaction-recording request
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionAck {
    pub recorded: bool,
    pub diagnostic: Option<String>,
}

/// Optional detail accompanying an interaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionDetails {
    pub time_on_page_secs: u32,
    pub dismissal_reason: Option<DismissalReason>,
    pub engagement_ms: Option<i64>,
    pub rating: Option<u8>,
    pub device: Option<String>,
    pub position: Option<u32>,
}

struct EngineState {
    sessions: SessionManager,
    timing: TimingEngine,
    feedback: FeedbackAggregator,

    /// Bumped at the start of every analysis; an in-flight analysis whose
    /// ticket no longer matches discards its result
    generation: u64,
}

/// Context-relevance and resurfacing-timing engine
pub struct ResurfaceEngine {
    config: EngineConfig,
    scorer: RelevanceScorer,
    ranker: CandidateRanker,
    learner: PreferenceLearner,
    source: Arc<dyn PageContentSource>,
    repository: Arc<dyn ContentRepository>,
    sink: Arc<dyn NotificationSink>,
    state: Mutex<EngineState>,
}

impl ResurfaceEngine {
    /// Build the engine; an invalid configuration fails fast here
    pub fn new(
        config: EngineConfig,
        source: Arc<dyn PageContentSource>,
        repository: Arc<dyn ContentRepository>,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scorer: RelevanceScorer::new(config.scorer.clone()),
            ranker: CandidateRanker::new(config.ranker.clone()),
            learner: PreferenceLearner::new(config.timing.min_confidence_samples),
            state: Mutex::new(EngineState {
                sessions: SessionManager::new(config.session.clone()),
                timing: TimingEngine::new(config.timing.clone()),
                feedback: FeedbackAggregator::new(config.feedback.clone()),
                generation: 0,
            }),
            config,
            source,
            repository,
            sink,
        })
    }

    /// Analyze the current page against the stored corpus and schedule
    /// suggestions
    ///
    /// Fails closed: extraction errors produce a completed session with zero
    /// suggestions and the error attached as a diagnostic; a corpus read
    /// error yields zero candidates with the session completing normally.
    /// Errors never propagate to the caller.
    pub async fn start_analysis(&self) -> AnalysisReport {
        let ticket = {
            let mut st = self.state.lock().await;
            st.generation += 1;
            st.generation
        };

        let (context, mut diagnostic) = match self
            .source
            .extract_current_context(&self.config.extraction)
            .await
        {
            Ok(context) => (context, None),
            Err(e) => {
                warn!(error = %e, "context extraction failed, failing closed");
                (BrowsingContext::empty(""), Some(e.to_string()))
            }
        };

        let corpus = if diagnostic.is_some() {
            Vec::new()
        } else {
            match self.repository.list(None).await {
                Ok(items) => items,
                Err(e) => {
                    warn!(error = %e, "corpus read failed, continuing with zero candidates");
                    diagnostic = Some(e.to_string());
                    Vec::new()
                }
            }
        };

        let now = Utc::now();
        let mut st = self.state.lock().await;
        if st.generation != ticket {
            debug!(ticket, current = st.generation, "analysis superseded, discarding result");
            return AnalysisReport {
                success: false,
                superseded: true,
                session_id: None,
                suggestion_count: 0,
                diagnostic: Some("superseded by a newer analysis".to_string()),
            };
        }

        let session_id = st.sessions.begin(context.clone());

        let matches = self.ranker.rank(&self.scorer, &context, &corpus, now);
        let matches = self.learner.adjust(&matches, &corpus, st.timing.profile(), now);

        let mut suggestions = Vec::new();
        let mut suppressed = Vec::new();
        for m in matches.iter().take(self.config.session.max_suggestions) {
            let Some(item) = corpus.iter().find(|item| item.id == m.item_id) else {
                continue;
            };
            match st.timing.calculate_optimal_timing(item, m, now) {
                TimingDecision::Scheduled(timing) => {
                    suggestions.push(ContextualSuggestion::from_match(item.clone(), m, timing));
                }
                TimingDecision::Suppressed { until } => suppressed.push((m, item, until)),
            }
        }

        // Every candidate throttled: surface the best one at its suppression
        // expiry rather than dropping the analysis entirely
        if suggestions.is_empty() {
            if let Some((m, item, until)) = suppressed.first() {
                let timing = st.timing.timing_at_expiry(m, *until, now);
                suggestions.push(ContextualSuggestion::from_match((*item).clone(), m, timing));
            }
        }

        for suggestion in &suggestions {
            st.timing.mark_suggested(suggestion.item.id, now);
        }
        st.sessions.install_suggestions(suggestions.clone(), diagnostic.clone());

        let failed = diagnostic.is_some();
        if failed {
            st.sessions.complete_active();
        }
        drop(st);

        if !failed && !suggestions.is_empty() {
            if let Err(e) = self
                .sink
                .present(
                    &suggestions,
                    self.config.notification.style,
                    self.config.notification.max_concurrent,
                )
                .await
            {
                warn!(error = %e, "notification sink rejected suggestions");
            }
        }

        info!(
            session = %session_id,
            suggestions = suggestions.len(),
            failed,
            "analysis finished"
        );

        AnalysisReport {
            success: !failed,
            superseded: false,
            session_id: Some(session_id),
            suggestion_count: suggestions.len(),
            diagnostic,
        }
    }

    /// Record a user interaction against a suggestion in the active session
    ///
    /// A no-op (not an error) when no session is active or the suggestion is
    /// unknown: late-arriving UI events after navigation must not crash the
    /// pipeline. Recording a dismissal that carries no reason asks the
    /// notification layer to prompt for one.
    pub async fn record_interaction(
        &self,
        suggestion_id: SuggestionId,
        action: InteractionAction,
        details: InteractionDetails,
    ) -> InteractionAck {
        let now = Utc::now();
        let needs_reason;
        {
            let mut st = self.state.lock().await;
            let Some(suggestion) = st
                .sessions
                .active()
                .and_then(|session| session.find_suggestion(suggestion_id))
                .cloned()
            else {
                debug!(suggestion = %suggestion_id, "interaction ignored");
                return InteractionAck {
                    recorded: false,
                    diagnostic: Some("no active session or unknown suggestion".to_string()),
                };
            };

            let url = st
                .sessions
                .active()
                .map(|session| session.context.url.clone())
                .unwrap_or_default();

            let event = InteractionEvent {
                item_id: suggestion.item.id,
                suggestion_id,
                action,
                at: now,
                snapshot: InteractionSnapshot {
                    url,
                    time_on_page_secs: details.time_on_page_secs,
                    relevance_score: suggestion.score,
                    urgency: suggestion.timing.urgency,
                    priority: suggestion.priority,
                },
                dismissal_reason: details.dismissal_reason,
                engagement_ms: details.engagement_ms,
            };
            st.sessions.record_interaction(event);

            st.timing.update_user_behavior(
                now,
                action.is_engagement(),
                suggestion.item.category,
                details.dismissal_reason,
                suggestion.item.id,
            );

            st.feedback.record(FeedbackRecord {
                action,
                at: now,
                category: suggestion.item.category,
                dismissal_reason: details.dismissal_reason,
                rating: details.rating,
                engagement_ms: details.engagement_ms,
                device: details.device,
                position: details.position,
            });

            needs_reason =
                action == InteractionAction::Dismissed && details.dismissal_reason.is_none();
        }

        if needs_reason {
            if let Err(e) = self.sink.request_dismissal_reason(suggestion_id).await {
                warn!(error = %e, "dismissal reason prompt failed");
            }
        }

        InteractionAck {
            recorded: true,
            diagnostic: None,
        }
    }

    /// Record a presentation outcome reported by the notification layer
    pub async fn record_notification_outcome(
        &self,
        suggestion_id: SuggestionId,
        outcome: NotificationOutcome,
        details: InteractionDetails,
    ) -> InteractionAck {
        self.record_interaction(suggestion_id, outcome.into_action(), details)
            .await
    }

    /// Complete the active session; idempotent
    pub async fn complete_session(&self) -> Option<SessionId> {
        self.state.lock().await.sessions.complete_active()
    }

    /// Explicitly abandon the active session
    pub async fn discard_session(&self) -> Option<SessionId> {
        self.state.lock().await.sessions.discard_active()
    }

    /// React to a host event with a synchronous state transition
    pub async fn handle_host_event(&self, event: HostEvent) {
        match event {
            HostEvent::Navigated { url } => {
                info!(%url, "navigation event, completing active session");
                self.state.lock().await.sessions.complete_active();
            }
            HostEvent::VisibilityChanged { visible } => {
                debug!(visible, "visibility change");
            }
        }
    }

    pub async fn active_session(&self) -> Option<ContextAnalysisSession> {
        self.state.lock().await.sessions.active().cloned()
    }

    pub async fn session_history(&self) -> Vec<ContextAnalysisSession> {
        self.state
            .lock()
            .await
            .sessions
            .history()
            .iter()
            .cloned()
            .collect()
    }

    pub async fn analytics(&self) -> FeedbackAnalyticsSnapshot {
        self.state.lock().await.feedback.snapshot().clone()
    }

    /// Export all mutable state as one versionless document
    pub async fn export_state(&self) -> EngineSnapshot {
        let st = self.state.lock().await;
        EngineSnapshot {
            active_session: st.sessions.active().cloned(),
            session_history: st.sessions.history().iter().cloned().collect(),
            behavior_profile: st.timing.profile().clone(),
            feedback_history: st.feedback.history().iter().cloned().collect(),
            analytics: st.feedback.snapshot().clone(),
        }
    }

    pub async fn export_json(&self) -> Result<String> {
        let snapshot = self.export_state().await;
        Ok(serde_json::to_string_pretty(&snapshot)?)
    }

    /// Restore state from a snapshot, merging histories and truncating to
    /// the configured caps; the behavior profile is replaced wholesale
    pub async fn import_state(&self, snapshot: EngineSnapshot) {
        let mut st = self.state.lock().await;
        st.sessions
            .import(snapshot.active_session, snapshot.session_history);
        st.timing.replace_profile(snapshot.behavior_profile);
        st.feedback.import(snapshot.feedback_history);
        info!("engine state imported");
    }

    pub async fn import_json(&self, json: &str) -> Result<()> {
        let snapshot: EngineSnapshot = serde_json::from_str(json)?;
        self.import_state(snapshot).await;
        Ok(())
    }
}
