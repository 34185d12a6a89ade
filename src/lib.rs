//! Nikah Match - Compatibility Scoring and Candidate Ranking
//!
//! A Rust library for ranking potential matches on a values-based
//! matchmaking platform and keeping the log of who viewed or messaged whom.
//!
//! # Features
//!
//! - Fixed-weight compatibility score (0-100) between two profiles
//! - Candidate ranking over a coarse-filtered pool from a profile store
//! - Append-only interaction log with inbox/outbox views
//! - SQLite and in-memory store adapters behind async traits
//! - Bounded store round-trips with typed errors

/// Configuration management
pub mod config;
/// Database operations and connection pooling
pub mod db;
/// Error types
pub mod error;
/// Logging setup and utilities
pub mod logging;
/// Metrics collection
pub mod metrics;
/// Data models and structures
pub mod models;
/// Candidate ranking
pub mod ranking;
/// Repository pattern for data access
pub mod repository;
/// Database schema definitions
pub mod schema;
/// Compatibility scoring
pub mod scoring;
/// Matching service
pub mod service;
/// Input validation and sanitization
pub mod validation;

// Re-export key components for easier access
pub use db::Database;
pub use error::{MatchError, Result};
pub use models::{ConversationPartner, MatchInteraction, Profile, ScoredProfile};
pub use repository::{InMemoryRepository, InteractionStore, ProfileStore, SqliteRepository};
pub use service::MatchService;
