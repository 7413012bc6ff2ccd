//! PartScout Core - Headless library for catalog-backed part matching.
//!
//! This crate provides the client-side orchestration for finding part codes
//! by free-form text or photograph: spreadsheet ingestion into a validated
//! in-memory catalog, and the session state machine that sequences queries
//! against a remote matcher and classifies its responses.
//!
//! The matcher itself is an opaque capability behind the [`PartMatcher`]
//! trait; the HTTP transport lives in the `partscout-matcher` crate so the
//! state machine never touches the network directly.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use partscout_core::{LoadResolution, MatchQuery, SearchSession};
//!
//! #[tokio::main]
//! async fn main() -> partscout_core::Result<()> {
//!     let matcher = Arc::new(partscout_matcher::MatcherClient::new(None));
//!     let session = SearchSession::new(matcher);
//!
//!     if let LoadResolution::Loaded(count) = session.load_catalog("parts.xlsx").await? {
//!         println!("Catalog has {} parts", count);
//!     }
//!
//!     session.search(MatchQuery::text("hydraulic pump 25L")?).await?;
//!     if let Some(outcome) = session.outcome() {
//!         if let Some(primary) = outcome.primary() {
//!             println!("Best match: {}", primary.code);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod matcher;
pub mod session;

// Re-export commonly used types
pub use catalog::{Catalog, PartRecord};
pub use error::{Result, ScoutError};
pub use matcher::{MatchCandidate, MatchQuery, PartMatcher, SearchOutcome, Similarity};
pub use session::{LoadResolution, SearchResolution, SearchSession, SessionState};
