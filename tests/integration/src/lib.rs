//! Veridoc Integration Tests
//!
//! These tests run against a deployed API (set the VERIDOC_API_URL
//! environment variable, or put it in a .env file).
//!
//! Run with: cargo test --package veridoc-integration-tests

pub mod client;
pub mod fixtures;

pub use client::VeridocClient;
pub use fixtures::*;
