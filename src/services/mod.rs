//! Collaborator contracts for the resurface engine
//!
//! The engine consumes a page content source and a content repository, and
//! produces suggestions to a notification sink. The collaborators themselves
//! (DOM extraction, persistence engines, notification UI) live in the host;
//! only their contracts are defined here.

pub mod memory;

pub use memory::InMemoryRepository;

use crate::config::ExtractionOptions;
use crate::error::Result;
use crate::types::{
    BrowsingContext, ContextualSuggestion, DisplayStyle, InteractionAction, ItemId, PageCategory,
    StoredItem, SuggestionId,
};
use async_trait::async_trait;

/// Repository listing filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemFilter {
    pub category: Option<PageCategory>,

    /// Only items updated within this many days
    pub updated_within_days: Option<u32>,
}

/// Presentation outcome reported back by the notification layer
///
/// The sink's vocabulary is wider than the interaction log's: hovering maps
/// onto a view, expiry onto an ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationOutcome {
    Viewed,
    Clicked,
    Dismissed,
    Hovered,
    Expired,
}

impl NotificationOutcome {
    pub fn into_action(self) -> InteractionAction {
        match self {
            NotificationOutcome::Viewed | NotificationOutcome::Hovered => {
                InteractionAction::Viewed
            }
            NotificationOutcome::Clicked => InteractionAction::Clicked,
            NotificationOutcome::Dismissed => InteractionAction::Dismissed,
            NotificationOutcome::Expired => InteractionAction::Ignored,
        }
    }
}

/// Produces a normalized snapshot of the page currently being viewed
///
/// Fails with an extraction error when no page is loaded or the content is
/// below the configured minimum length.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageContentSource: Send + Sync {
    async fn extract_current_context(&self, options: &ExtractionOptions)
        -> Result<BrowsingContext>;
}

/// Stores and retrieves captured items
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// List stored items, optionally filtered
    async fn list<'a>(&self, filter: Option<&'a ItemFilter>) -> Result<Vec<StoredItem>>;

    /// Retrieve one item; `None` when not found
    async fn read(&self, id: ItemId) -> Result<Option<StoredItem>>;

    /// Persist a new item and return its id
    async fn create(&self, item: StoredItem) -> Result<ItemId>;
}

/// Renders and times out suggestions on the host side
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Present resolved suggestions for display
    async fn present(
        &self,
        suggestions: &[ContextualSuggestion],
        style: DisplayStyle,
        max_concurrent: usize,
    ) -> Result<()>;

    /// Ask the user why a suggestion was dismissed (no reason was supplied)
    async fn request_dismissal_reason(&self, suggestion: SuggestionId) -> Result<()>;
}
