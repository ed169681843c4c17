//! Common test utilities and helpers

use async_trait::async_trait;
use chrono::Utc;
use resurface_core::{
    BrowsingContext, ContextualSuggestion, DisplayStyle, EngineConfig, InMemoryRepository,
    ItemId, PageCategory, PageContentSource, PageMetadata, ResurfaceEngine, ResurfaceError,
    Result, StoredItem, SuggestionId,
};
use std::sync::{Arc, Mutex};

/// Content source returning a fixed context, or an extraction error
pub struct FakeSource {
    context: Option<BrowsingContext>,
}

impl FakeSource {
    pub fn returning(context: BrowsingContext) -> Self {
        Self {
            context: Some(context),
        }
    }

    pub fn failing() -> Self {
        Self { context: None }
    }
}

#[async_trait]
impl PageContentSource for FakeSource {
    async fn extract_current_context(
        &self,
        _options: &resurface_core::ExtractionOptions,
    ) -> Result<BrowsingContext> {
        self.context
            .clone()
            .ok_or_else(|| ResurfaceError::Extraction("no page loaded".to_string()))
    }
}

/// Notification sink recording every call for later assertions
#[derive(Default)]
pub struct RecordingSink {
    pub presented: Mutex<Vec<Vec<ContextualSuggestion>>>,
    pub reason_requests: Mutex<Vec<SuggestionId>>,
}

#[async_trait]
impl resurface_core::NotificationSink for RecordingSink {
    async fn present(
        &self,
        suggestions: &[ContextualSuggestion],
        _style: DisplayStyle,
        _max_concurrent: usize,
    ) -> Result<()> {
        self.presented.lock().unwrap().push(suggestions.to_vec());
        Ok(())
    }

    async fn request_dismissal_reason(&self, suggestion: SuggestionId) -> Result<()> {
        self.reason_requests.lock().unwrap().push(suggestion);
        Ok(())
    }
}

/// Documentation-flavored browsing context used across tests
pub fn docs_context() -> BrowsingContext {
    BrowsingContext {
        url: "https://docs.example.com/api/auth".to_string(),
        title: "Authentication guide".to_string(),
        content: "Authenticating requests against the service endpoint with tokens".to_string(),
        metadata: PageMetadata {
            reading_time_minutes: 4,
            language: "en".to_string(),
            word_count: 900,
            image_count: 2,
            link_count: 14,
        },
        keywords: vec!["api".to_string(), "auth".to_string()],
        concepts: vec!["authentication".to_string()],
        category: PageCategory::Documentation,
        captured_at: Utc::now(),
        confidence: 0.9,
    }
}

pub fn item(category: PageCategory, tags: &[&str]) -> StoredItem {
    StoredItem {
        id: ItemId::new(),
        url: "https://docs.example.com/api/tokens".to_string(),
        title: "Token reference".to_string(),
        content: "Token lifetimes and endpoint authentication details".to_string(),
        category,
        tags: tags.iter().map(|s| s.to_string()).collect(),
        concepts: vec!["authentication".to_string()],
        importance: 5,
        access_count: 0,
        last_accessed_at: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        size_bytes: 2048,
    }
}

/// Engine wired with a fixed context, a seeded corpus, and a recording sink
pub fn engine_with(
    context: BrowsingContext,
    corpus: Vec<StoredItem>,
) -> (ResurfaceEngine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let engine = ResurfaceEngine::new(
        EngineConfig::default(),
        Arc::new(FakeSource::returning(context)),
        Arc::new(InMemoryRepository::with_items(corpus)),
        sink.clone(),
    )
    .expect("default config must be valid");
    (engine, sink)
}
