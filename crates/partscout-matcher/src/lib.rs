//! PartScout Matcher - HTTP transport for the remote part matcher.
//!
//! This crate implements the [`partscout_core::PartMatcher`] trait over a
//! single JSON POST per query. It owns everything wire-specific: the request
//! and response shapes, image payload encoding, and HTTP error mapping. The
//! state machine in `partscout-core` never sees any of it.
//!
//! # Modules
//!
//! - `client` - The `reqwest`-backed matcher client
//! - `payload` - Image payload encoding for the wire format

pub mod client;
pub mod payload;

// Re-export commonly used types
pub use client::MatcherClient;
pub use payload::{image_payload, strip_data_uri_prefix};

// Re-export partscout-core types that are commonly needed with the client
pub use partscout_core::error::{Result, ScoutError};
