//! Matcher abstraction and its domain types.
//!
//! The remote matcher is an opaque capability: it receives a query plus the
//! full catalog and returns ranked candidates. The session only depends on
//! the [`PartMatcher`] trait, so the transport (HTTP today) is swappable
//! without touching the state machine.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Result, ScoutError};

/// Confidence tier assigned by the matcher to a candidate.
///
/// The wire values are the matcher's own vocabulary and are kept verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Similarity {
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Baixa")]
    Low,
}

/// One ranked candidate returned by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub code: String,
    pub description: String,
    pub similarity: Similarity,
}

/// Everything a single matching call produced.
///
/// Candidate order is the matcher's own ranking and is never re-sorted
/// locally; element 0 is the primary recommendation, the rest are
/// alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOutcome {
    /// What the matcher believes the query describes, when it says so.
    pub identified_part_type: Option<String>,
    pub candidates: Vec<MatchCandidate>,
}

impl SearchOutcome {
    /// The primary recommendation, if the matcher returned any candidate.
    pub fn primary(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }
}

/// A single query, by text or by photograph.
///
/// Transient: a query exists for the duration of one matching call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchQuery {
    Text(String),
    Image(Vec<u8>),
}

impl MatchQuery {
    /// Build a text query, trimming surrounding whitespace.
    pub fn text(input: impl Into<String>) -> Result<Self> {
        let trimmed = input.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ScoutError::InvalidQuery {
                message: "text query is empty".into(),
            });
        }
        Ok(MatchQuery::Text(trimmed))
    }

    /// Build an image query from raw image bytes.
    pub fn image(bytes: Vec<u8>) -> Result<Self> {
        if bytes.is_empty() {
            return Err(ScoutError::InvalidQuery {
                message: "image payload is empty".into(),
            });
        }
        Ok(MatchQuery::Image(bytes))
    }

    /// The wire `queryType` discriminant.
    pub fn kind(&self) -> &'static str {
        match self {
            MatchQuery::Text(_) => "text",
            MatchQuery::Image(_) => "image",
        }
    }

    /// Re-check the constructor invariants.
    ///
    /// The enum variants are public, so the session re-validates before
    /// dispatching rather than trusting every caller went through the
    /// constructors.
    pub fn validate(&self) -> Result<()> {
        match self {
            MatchQuery::Text(text) if text.trim().is_empty() => Err(ScoutError::InvalidQuery {
                message: "text query is empty".into(),
            }),
            MatchQuery::Image(bytes) if bytes.is_empty() => Err(ScoutError::InvalidQuery {
                message: "image payload is empty".into(),
            }),
            _ => Ok(()),
        }
    }
}

/// The remote matching capability.
///
/// Implementations receive the query and the full catalog on every call;
/// there is no server-side catalog persistence.
#[async_trait::async_trait]
pub trait PartMatcher: Send + Sync {
    /// Rank catalog entries against the query.
    async fn find_matches(&self, query: &MatchQuery, catalog: &Catalog) -> Result<SearchOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_wire_vocabulary() {
        assert_eq!(serde_json::to_string(&Similarity::High).unwrap(), "\"Alta\"");
        assert_eq!(
            serde_json::to_string(&Similarity::Medium).unwrap(),
            "\"Média\""
        );
        assert_eq!(serde_json::to_string(&Similarity::Low).unwrap(), "\"Baixa\"");

        let parsed: Similarity = serde_json::from_str("\"Média\"").unwrap();
        assert_eq!(parsed, Similarity::Medium);
    }

    #[test]
    fn test_text_query_trims() {
        let query = MatchQuery::text("  hydraulic pump  ").unwrap();
        assert_eq!(query, MatchQuery::Text("hydraulic pump".into()));
        assert_eq!(query.kind(), "text");
    }

    #[test]
    fn test_blank_text_query_rejected() {
        assert!(matches!(
            MatchQuery::text("   "),
            Err(ScoutError::InvalidQuery { .. })
        ));
    }

    #[test]
    fn test_empty_image_query_rejected() {
        assert!(matches!(
            MatchQuery::image(Vec::new()),
            Err(ScoutError::InvalidQuery { .. })
        ));
        assert_eq!(MatchQuery::image(vec![0xFF]).unwrap().kind(), "image");
    }

    #[test]
    fn test_validate_catches_hand_built_queries() {
        assert!(MatchQuery::Text("  ".into()).validate().is_err());
        assert!(MatchQuery::Image(Vec::new()).validate().is_err());
        assert!(MatchQuery::Text("pump".into()).validate().is_ok());
    }

    #[test]
    fn test_primary_is_first_candidate() {
        let outcome = SearchOutcome {
            identified_part_type: Some("Pump".into()),
            candidates: vec![
                MatchCandidate {
                    code: "P100".into(),
                    description: "Pump".into(),
                    similarity: Similarity::High,
                },
                MatchCandidate {
                    code: "P200".into(),
                    description: "Valve".into(),
                    similarity: Similarity::Low,
                },
            ],
        };
        assert_eq!(outcome.primary().unwrap().code, "P100");

        let empty = SearchOutcome::default();
        assert!(empty.primary().is_none());
        assert!(!empty.has_candidates());
    }
}
