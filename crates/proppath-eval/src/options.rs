//! Per-call evaluation limits and counters.

use serde::{Deserialize, Serialize};

/// Limits applied to one top-level evaluation call.
///
/// Bounded repetition over cyclic graphs is not memoized and can blow up
/// exponentially; these are the knobs that keep such calls finite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalOptions {
    /// Maximum number of triples read from the graph. `None` is unbounded.
    pub max_steps: Option<u64>,
    /// Maximum number of nodes in the final output. `None` is unbounded.
    pub max_results: Option<usize>,
}

impl EvalOptions {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// Work counters for one top-level evaluation call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalStats {
    /// `Graph::find` invocations.
    pub graph_lookups: u64,
    /// Triples consumed from those lookups.
    pub triples_scanned: u64,
    /// Nodes whose one-hop neighbourhood was expanded by unbounded repetition.
    pub closure_expansions: u64,
}
