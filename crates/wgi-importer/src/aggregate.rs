//! Reduction of joined slots into the list handed to the store.

use wgi_core::{ImportError, TunnelConfig};

use crate::join::JoinResult;

/// The aggregated result of every unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregated {
    /// Parsed configurations in arrival order, empty slots removed.
    pub configs: Vec<TunnelConfig>,
    /// Every slot, filled or not. This is the denominator in summaries.
    pub parsed_count: usize,
    /// The error from the most recently finished failing source.
    pub last_error: Option<ImportError>,
}

/// Drops empty slots while keeping the total.
pub fn aggregate(result: JoinResult) -> Aggregated {
    let parsed_count = result.slots.len();
    let configs = result.slots.into_iter().flatten().collect();
    Aggregated {
        configs,
        parsed_count,
        last_error: result.last_error,
    }
}
