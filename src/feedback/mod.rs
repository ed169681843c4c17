//! Feedback ingestion and running analytics

pub mod aggregator;

pub use aggregator::{
    FeedbackAggregator, FeedbackAnalyticsSnapshot, FeedbackRecord, TrendDirection,
};
