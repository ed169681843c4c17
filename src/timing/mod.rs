//! Resurfacing timing: behavioral profile and delivery-time resolution

pub mod engine;
pub mod profile;

pub use engine::{TimingDecision, TimingEngine};
pub use profile::{EngagementStat, UserBehaviorProfile};
