//! Core data types for the resurface engine
//!
//! This module defines the fundamental data structures used throughout the
//! crate: browsing contexts, stored items, relevance matches, suggestions,
//! analysis sessions, and interaction events. These types form the foundation
//! of the context-relevance and resurfacing-timing engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for stored items
///
/// Wraps a UUID to provide type safety and prevent mixing item IDs
/// with other UUID-based identifiers in the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Create a new random item ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an item ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for analysis sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for suggestions within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SuggestionId(pub Uuid);

impl SuggestionId {
    /// Create a new random suggestion ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SuggestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SuggestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed page category classification
///
/// Tags, keywords, and concepts stay open string sets; the page category is
/// deliberately a closed enumeration with `Other` as the fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageCategory {
    Article,
    Documentation,
    Social,
    Video,
    Other,
}

impl PageCategory {
    /// Map a free-form label onto the closed set; unknown labels become `Other`
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "article" => PageCategory::Article,
            "documentation" | "docs" => PageCategory::Documentation,
            "social" => PageCategory::Social,
            "video" => PageCategory::Video,
            _ => PageCategory::Other,
        }
    }
}

impl std::fmt::Display for PageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageCategory::Article => write!(f, "article"),
            PageCategory::Documentation => write!(f, "documentation"),
            PageCategory::Social => write!(f, "social"),
            PageCategory::Video => write!(f, "video"),
            PageCategory::Other => write!(f, "other"),
        }
    }
}

/// Structural metadata captured alongside the page text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Estimated reading time in minutes
    pub reading_time_minutes: u32,

    /// Detected content language (BCP 47 tag, empty when unknown)
    pub language: String,

    pub word_count: u32,
    pub image_count: u32,
    pub link_count: u32,
}

/// Snapshot of the page currently being viewed
///
/// Created once per navigation event by the content source; immutable after
/// creation and owned exclusively by the session that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowsingContext {
    pub url: String,
    pub title: String,

    /// Normalized main-text content (ads/nav already stripped upstream)
    pub content: String,

    pub metadata: PageMetadata,

    /// Extracted keyword set (open string set)
    pub keywords: Vec<String>,

    /// Extracted concept set (open string set)
    pub concepts: Vec<String>,

    /// Inferred page category
    pub category: PageCategory,

    pub captured_at: DateTime<Utc>,

    /// Extraction confidence in [0.0, 1.0]
    pub confidence: f32,
}

impl BrowsingContext {
    /// Zero-confidence placeholder context used when extraction fails
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            content: String::new(),
            metadata: PageMetadata::default(),
            keywords: Vec::new(),
            concepts: Vec::new(),
            category: PageCategory::Other,
            captured_at: Utc::now(),
            confidence: 0.0,
        }
    }
}

/// A previously captured piece of content
///
/// Created on capture; mutated only by access tracking and re-analysis.
/// Deletion is a repository concern, never the engine's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: ItemId,
    pub url: String,
    pub title: String,

    /// Full captured text
    pub content: String,

    pub category: PageCategory,

    /// Free-form tag set
    pub tags: Vec<String>,

    /// Extracted concept set
    pub concepts: Vec<String>,

    /// Importance rating (0-10)
    pub importance: u8,

    pub access_count: u32,
    pub last_accessed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Storage footprint in bytes
    pub size_bytes: u64,
}

impl StoredItem {
    /// A scoreable item carries at least a URL or a title
    pub fn is_well_formed(&self) -> bool {
        !(self.url.trim().is_empty() && self.title.trim().is_empty())
    }
}

/// Coarse timing hint derived from the relevance score band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingHint {
    Immediate,
    Delayed,
    Background,
}

impl TimingHint {
    /// Score band mapping: >0.7 immediate, >0.5 delayed, else background
    pub fn from_score(score: f32) -> Self {
        if score > 0.7 {
            TimingHint::Immediate
        } else if score > 0.5 {
            TimingHint::Delayed
        } else {
            TimingHint::Background
        }
    }

    /// Urgency tier presented to the notification layer
    pub fn urgency(&self) -> Urgency {
        match self {
            TimingHint::Immediate => Urgency::High,
            TimingHint::Delayed => Urgency::Medium,
            TimingHint::Background => Urgency::Low,
        }
    }
}

impl std::fmt::Display for TimingHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingHint::Immediate => write!(f, "immediate"),
            TimingHint::Delayed => write!(f, "delayed"),
            TimingHint::Background => write!(f, "background"),
        }
    }
}

/// Priority tier for a relevance match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Score band mapping, same bands as the timing hint
    pub fn from_score(score: f32) -> Self {
        if score > 0.7 {
            Priority::High
        } else if score > 0.5 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }

    /// One tier up, saturating at high
    pub fn boosted(&self) -> Self {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium | Priority::High => Priority::High,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Urgency communicated with a resolved delivery time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::High => write!(f, "high"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::Low => write!(f, "low"),
        }
    }
}

/// Output of scoring one stored item against one browsing context
///
/// Ephemeral: recomputed per analysis pass and never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceMatch {
    pub item_id: ItemId,

    /// Normalized score in [0.0, 1.0], rounded to 2 decimals
    pub score: f32,

    /// Human-readable match reasons, advisory only
    pub reasons: Vec<String>,

    pub timing_hint: TimingHint,
    pub priority: Priority,
}

/// Resolved delivery instant for one suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResurfacingTiming {
    pub suggested_at: DateTime<Utc>,

    /// How much behavioral history backs this choice, in [0.0, 1.0]
    pub confidence: f32,

    /// Natural-language explanation for the chosen moment
    pub reason: String,

    pub urgency: Urgency,
}

/// A relevance match joined with its source item and resolved timing
///
/// Owned by exactly one analysis session; lifetime bounded by the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextualSuggestion {
    pub id: SuggestionId,
    pub item: StoredItem,
    pub score: f32,
    pub reasons: Vec<String>,
    pub priority: Priority,
    pub timing: ResurfacingTiming,
}

impl ContextualSuggestion {
    /// Join a match with its source item and a resolved timing
    pub fn from_match(item: StoredItem, m: &RelevanceMatch, timing: ResurfacingTiming) -> Self {
        Self {
            id: SuggestionId::new(),
            item,
            score: m.score,
            reasons: m.reasons.clone(),
            priority: m.priority,
            timing,
        }
    }
}

/// Session lifecycle status; terminal once it leaves `Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Completed,
    Abandoned,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStatus::Active => write!(f, "active"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One analysis pass over the current page and the stored corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextAnalysisSession {
    pub id: SessionId,
    pub started_at: DateTime<Utc>,

    /// The context that triggered this analysis
    pub context: BrowsingContext,

    /// Ranked suggestions, length bounded by the per-session cap
    pub suggestions: Vec<ContextualSuggestion>,

    /// Ordered log of interactions recorded against this session
    pub interactions: Vec<InteractionEvent>,

    pub status: SessionStatus,
    pub completed_at: Option<DateTime<Utc>>,

    /// Failure note from a fail-closed analysis, if any
    pub diagnostic: Option<String>,
}

impl ContextAnalysisSession {
    /// Create a fresh active session around a triggering context
    pub fn new(context: BrowsingContext) -> Self {
        Self {
            id: SessionId::new(),
            started_at: Utc::now(),
            context,
            suggestions: Vec::new(),
            interactions: Vec::new(),
            status: SessionStatus::Active,
            completed_at: None,
            diagnostic: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn find_suggestion(&self, id: SuggestionId) -> Option<&ContextualSuggestion> {
        self.suggestions.iter().find(|s| s.id == id)
    }
}

/// User action against one suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionAction {
    Viewed,
    Clicked,
    Dismissed,
    Saved,
    Shared,
    Ignored,
}

impl InteractionAction {
    /// Actions that count as engagement for behavior learning
    pub fn is_engagement(&self) -> bool {
        matches!(
            self,
            InteractionAction::Clicked | InteractionAction::Saved | InteractionAction::Shared
        )
    }
}

impl std::fmt::Display for InteractionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionAction::Viewed => write!(f, "viewed"),
            InteractionAction::Clicked => write!(f, "clicked"),
            InteractionAction::Dismissed => write!(f, "dismissed"),
            InteractionAction::Saved => write!(f, "saved"),
            InteractionAction::Shared => write!(f, "shared"),
            InteractionAction::Ignored => write!(f, "ignored"),
        }
    }
}

/// Why a suggestion was dismissed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissalReason {
    Manual,
    Timeout,
    NewPage,
    UserRequest,
}

impl std::fmt::Display for DismissalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DismissalReason::Manual => write!(f, "manual"),
            DismissalReason::Timeout => write!(f, "timeout"),
            DismissalReason::NewPage => write!(f, "new_page"),
            DismissalReason::UserRequest => write!(f, "user_request"),
        }
    }
}

/// State of the page at the moment an interaction was recorded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSnapshot {
    pub url: String,
    pub time_on_page_secs: u32,
    pub relevance_score: f32,
    pub urgency: Urgency,
    pub priority: Priority,
}

/// One user action against one suggestion; append-only, never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub item_id: ItemId,
    pub suggestion_id: SuggestionId,
    pub action: InteractionAction,
    pub at: DateTime<Utc>,
    pub snapshot: InteractionSnapshot,
    pub dismissal_reason: Option<DismissalReason>,

    /// Time the user spent engaged with the suggestion, when known
    pub engagement_ms: Option<i64>,
}

/// Display style selector passed to the notification layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStyle {
    Minimal,
    Detailed,
    Contextual,
}

impl std::fmt::Display for DisplayStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayStyle::Minimal => write!(f, "minimal"),
            DisplayStyle::Detailed => write!(f, "detailed"),
            DisplayStyle::Contextual => write!(f, "contextual"),
        }
    }
}

/// Host-delivered events the engine reacts to with synchronous transitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum HostEvent {
    /// The page changed; the active session (if any) is completed
    Navigated { url: String },

    /// Tab visibility flipped; recorded but currently inert
    VisibilityChanged { visible: bool },
}
