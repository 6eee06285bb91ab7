use thiserror::Error;

use lead_triage_core::StoreError;

/// Errors surfaced by a routing decision. Store failures are the only
/// fallible part; everything else degrades to an explicit `None` result.
#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("roster store error: {0}")]
    Roster(StoreError),

    #[error("counter store error: {0}")]
    Counters(StoreError),
}
