//! Campus SDK - data layer for the college administration dashboard
//!
//! Talks to the campus admin HTTP API (colleges, programs, gallery images,
//! inquiries and contact-form submissions) behind a cookie session, and keeps
//! the results in a keyed query cache that views read synchronously.
//!
//! # Architecture
//!
//! - **Session store**: startup probe, login/logout, route guarding
//! - **Resource client**: one call per endpoint, normalized errors
//! - **Query cache**: stale-while-revalidate entries with request dedup
//! - **Mutation coordinator**: tracked writes that invalidate affected keys
//!
//! [`AdminContext`] wires the four together.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_sdk::{AdminContext, Credentials, SdkConfig};
//!
//! let context = AdminContext::new(SdkConfig::from_env())?;
//! context.session().initialize().await;
//! context.session().login(&Credentials::new("admin", "secret")).await?;
//!
//! // Cached read; refetched whenever stale
//! let colleges = context.fetch_colleges().await?;
//!
//! // Tracked write; stales ["colleges"], ["programs"] and friends on success
//! let outcome = context.create_college(&input).await;
//! ```

// Error types
pub mod error;

// Configuration
pub mod config;

// Query keys and the write/key dependency table
pub mod keys;

// Domain records
pub mod types;

// Addressing, validation and auth seams
pub mod traits;

// HTTP client
pub mod client;

// Query caching
pub mod cache;

// Write tracking
pub mod mutation;

// Authentication session
pub mod session;

mod context;

pub use cache::{CacheEvent, CacheStats, QueryCache, QueryEntry, QueryOptions, QueryStatus};
pub use client::ResourceClient;
pub use config::{CacheConfig, ClientConfig, MutationConfig, SdkConfig};
pub use context::AdminContext;
pub use error::{ApiError, ConfigError, ErrorKind, Result};
pub use keys::{KeyPart, QueryKey};
pub use mutation::{
    MutationCoordinator, MutationId, MutationOutcome, MutationRecord, MutationStatus,
    MutationTarget, Operation, ResourceKind,
};
pub use session::{AuthStatus, GuardDecision, NavigationIntent, RouteGuard, Session, SessionStore};
pub use traits::{AuthApi, AuthFailureListener, Resource, Validate};
pub use types::*;
