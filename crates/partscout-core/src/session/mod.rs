//! The query/response state machine that drives one user session.
//!
//! A [`SearchSession`] owns the application state: where the session is in
//! its cycle, the loaded catalog, the latest search outcome, and the last
//! user-facing error. The machine is cyclic and user-driven - there is no
//! terminal state, and every failure leaves the session recoverable.
//!
//! Overlapping operations are resolved last-submitted-wins: every dispatch
//! (ingest or search) takes a fresh generation number, and a resolution
//! whose generation is no longer the newest is discarded without touching
//! state. There is no implicit cancellation; stale calls run to completion
//! and are ignored.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{self, Catalog};
use crate::error::{Result, ScoutError};
use crate::matcher::{MatchQuery, PartMatcher, SearchOutcome};

/// Where the session currently is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No catalog loaded yet.
    Initial,
    /// Catalog loaded, no search outstanding.
    DataLoaded,
    /// An ingest or matching call is in flight.
    Searching,
    /// The latest search returned at least one candidate.
    ResultsFound,
    /// The latest search returned no candidates.
    NoResults,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Initial => "initial",
            SessionState::DataLoaded => "data_loaded",
            SessionState::Searching => "searching",
            SessionState::ResultsFound => "results_found",
            SessionState::NoResults => "no_results",
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Initial
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a `search` call ended from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResolution {
    /// This call was still the newest request when it resolved; its outcome
    /// is now the session's outcome.
    Completed(SearchOutcome),
    /// A newer search (or a reset) was issued before this call resolved.
    /// The result - success or failure alike - was discarded and the
    /// session state was left untouched.
    Superseded,
}

/// How a catalog load ended from the caller's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResolution {
    /// The ingest result was installed; the catalog holds this many parts.
    Loaded(usize),
    /// A reset was invoked while the ingest was in flight. The decoded
    /// catalog - or the ingest error - was discarded and the session was
    /// left as the reset put it.
    Superseded,
}

#[derive(Default)]
struct SessionInner {
    state: SessionState,
    catalog: Catalog,
    outcome: Option<SearchOutcome>,
    last_error: Option<String>,
    /// Monotonically increasing tag for outstanding requests. A resolution
    /// is applied only while its tag is still the newest.
    generation: u64,
}

/// The session orchestrator. Validates preconditions and runs every state
/// transition, dispatching matching calls through the injected matcher.
///
/// All observable state sits behind one mutex, so readers never see a
/// partial transition. The lock is never held across an await point.
pub struct SearchSession {
    matcher: Arc<dyn PartMatcher>,
    inner: Mutex<SessionInner>,
}

impl SearchSession {
    /// Create a session backed by the given matcher.
    pub fn new(matcher: Arc<dyn PartMatcher>) -> Self {
        Self {
            matcher,
            inner: Mutex::new(SessionInner::default()),
        }
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    /// Snapshot of the loaded catalog (empty in `Initial`).
    pub fn catalog(&self) -> Catalog {
        self.lock().catalog.clone()
    }

    pub fn catalog_len(&self) -> usize {
        self.lock().catalog.len()
    }

    /// The latest search outcome, if the session holds one.
    pub fn outcome(&self) -> Option<SearchOutcome> {
        self.lock().outcome.clone()
    }

    /// The last user-facing error message, cleared by the next operation.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Ingest a workbook file and install it as the session catalog.
    ///
    /// Only valid from `Initial`; to replace a catalog, call [`reset`] first.
    /// On success the session moves to `DataLoaded` and the row count is
    /// returned; on failure the error is recorded and the session returns
    /// to `Initial` with no catalog. A reset while the ingest is in flight
    /// wins: the stale result resolves `Superseded` and the session stays
    /// wherever the reset put it.
    ///
    /// [`reset`]: SearchSession::reset
    pub async fn load_catalog(&self, path: impl AsRef<Path>) -> Result<LoadResolution> {
        let generation = self.begin_ingest()?;
        let loaded = catalog::ingest_file(path.as_ref()).await;
        self.finish_ingest(generation, loaded)
    }

    /// Ingest an already-read workbook byte buffer. Same contract as
    /// [`load_catalog`](SearchSession::load_catalog).
    pub async fn load_catalog_bytes(&self, bytes: Vec<u8>) -> Result<LoadResolution> {
        let generation = self.begin_ingest()?;
        let loaded = tokio::task::spawn_blocking(move || catalog::ingest_workbook(&bytes))
            .await
            .map_err(|e| ScoutError::CorruptFile {
                message: format!("Workbook decode task failed: {e}"),
            })
            .and_then(|r| r);
        self.finish_ingest(generation, loaded)
    }

    /// Install a catalog built elsewhere (embedding callers, tests).
    ///
    /// Follows the same transition as a file ingest: `Initial` to
    /// `DataLoaded`, or an error with the state unchanged.
    pub fn install_catalog(&self, catalog: Catalog) -> Result<usize> {
        let mut inner = self.lock();
        if inner.state != SessionState::Initial {
            return Err(ScoutError::CatalogAlreadyLoaded);
        }
        if catalog.is_empty() {
            return Err(ScoutError::EmptyCatalog);
        }
        let count = catalog.len();
        inner.catalog = catalog;
        inner.state = SessionState::DataLoaded;
        inner.last_error = None;
        info!("Catalog installed: {} parts", count);
        Ok(count)
    }

    /// Dispatch a query against the loaded catalog.
    ///
    /// Guards: the catalog must be non-empty (otherwise
    /// [`ScoutError::NoCatalogLoaded`], no network call, state unchanged)
    /// and the query must be non-empty. The full catalog travels with the
    /// call.
    ///
    /// Resolves to exactly one of:
    /// - `Ok(Completed(outcome))` - state is now `ResultsFound` (at least
    ///   one candidate, primary first) or `NoResults`;
    /// - `Err(RemoteCallFailed)` - the error is recorded, the catalog is
    ///   kept, and the state reverts to `DataLoaded` so the search can be
    ///   retried without re-uploading;
    /// - `Ok(Superseded)` - a newer request won; state untouched.
    pub async fn search(&self, query: MatchQuery) -> Result<SearchResolution> {
        let (generation, catalog) = {
            let mut inner = self.lock();
            if inner.catalog.is_empty() {
                let err = ScoutError::NoCatalogLoaded;
                inner.last_error = Some(err.to_string());
                return Err(err);
            }
            if let Err(err) = query.validate() {
                inner.last_error = Some(err.to_string());
                return Err(err);
            }
            inner.generation += 1;
            inner.state = SessionState::Searching;
            inner.outcome = None;
            inner.last_error = None;
            (inner.generation, inner.catalog.clone())
        };

        debug!(
            "Dispatching {} query (generation {}) with {} catalog parts",
            query.kind(),
            generation,
            catalog.len()
        );
        let result = self.matcher.find_matches(&query, &catalog).await;

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Discarding superseded resolution (generation {})", generation);
            return Ok(SearchResolution::Superseded);
        }

        match result {
            Ok(outcome) => {
                inner.state = if outcome.has_candidates() {
                    SessionState::ResultsFound
                } else {
                    SessionState::NoResults
                };
                info!(
                    "Search resolved: {} candidates, state {}",
                    outcome.candidates.len(),
                    inner.state
                );
                inner.outcome = Some(outcome.clone());
                Ok(SearchResolution::Completed(outcome))
            }
            Err(err) => {
                // The catalog survives a remote failure so the user can
                // retry without re-uploading.
                inner.state = SessionState::DataLoaded;
                inner.last_error = Some(err.to_string());
                warn!("Matching call failed: {}", err);
                Err(err)
            }
        }
    }

    /// Return to `Initial`, discarding catalog, outcome, and error.
    ///
    /// Unconditional and idempotent. In-flight requests are invalidated:
    /// the generation advances past them, so whatever they resolve to is
    /// discarded.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let generation = inner.generation + 1;
        *inner = SessionInner::default();
        inner.generation = generation;
        info!("Session reset");
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session lock poisoned")
    }

    fn begin_ingest(&self) -> Result<u64> {
        let mut inner = self.lock();
        if inner.state != SessionState::Initial {
            let err = ScoutError::CatalogAlreadyLoaded;
            inner.last_error = Some(err.to_string());
            return Err(err);
        }
        inner.generation += 1;
        inner.state = SessionState::Searching;
        inner.last_error = None;
        Ok(inner.generation)
    }

    fn finish_ingest(&self, generation: u64, loaded: Result<Catalog>) -> Result<LoadResolution> {
        let mut inner = self.lock();
        if inner.generation != generation {
            debug!("Discarding superseded ingest (generation {})", generation);
            return Ok(LoadResolution::Superseded);
        }
        match loaded {
            Ok(catalog) => {
                let count = catalog.len();
                inner.catalog = catalog;
                inner.state = SessionState::DataLoaded;
                info!("Catalog loaded: {} parts", count);
                Ok(LoadResolution::Loaded(count))
            }
            Err(err) => {
                inner.state = SessionState::Initial;
                inner.catalog = Catalog::default();
                inner.last_error = Some(err.to_string());
                warn!("Catalog ingest failed: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names_match_wire_form() {
        assert_eq!(SessionState::Initial.as_str(), "initial");
        assert_eq!(SessionState::DataLoaded.as_str(), "data_loaded");
        assert_eq!(SessionState::ResultsFound.to_string(), "results_found");
        assert_eq!(
            serde_json::to_string(&SessionState::NoResults).unwrap(),
            "\"no_results\""
        );
    }
}
