//! Veridoc Core Library
//!
//! Shared functionality for Veridoc Lambda functions including:
//! - Domain models
//! - DynamoDB stores
//! - Request validation
//! - Bedrock prompt handling
//! - Broadcast scheduling logic
//! - Error types

pub mod bedrock;
pub mod broadcast;
pub mod errors;
pub mod manifest;
pub mod models;
pub mod pagination;
pub mod presign;
pub mod store;
pub mod validation;

pub use errors::{Error, Result};
pub use models::*;
pub use store::analysis::AnalysisStore;
pub use store::broadcast::BroadcastStore;
pub use store::onboarding::OnboardingStore;
pub use store::prompt::PromptStore;
