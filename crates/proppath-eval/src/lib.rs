//! SPARQL property path evaluation.
//!
//! Given a start node and a [`Path`], the evaluator walks any [`Graph`] and
//! returns the nodes at the other end, as an ordered list that keeps one entry
//! per route. Two semantics are available for unbounded repetition:
//!
//! - the default ([`eval_forward`], [`CoreEvaluator`]) uses the
//!   Arbitrary-Length-Path walk;
//! - [`legacy`] keeps the older deduplicating closure.
//!
//! ```
//! use proppath_eval::{eval_forward, Path};
//! use proppath_graph::{MemGraph, Node};
//!
//! let mut g = MemGraph::new();
//! g.add(Node::iri("http://x/a"), Node::iri("http://x/p"), Node::iri("http://x/b"));
//! let out = eval_forward(&g, &Node::iri("http://x/a"), &Path::one_or_more(Path::link(Node::iri("http://x/p")))).unwrap();
//! assert_eq!(out, vec![Node::iri("http://x/b")]);
//! ```

pub mod closure;
pub mod error;
pub mod eval;
pub mod options;
pub mod path;
pub mod rows;
pub mod trace;

pub use closure::{Alp, LegacyClosure, RepetitionStrategy};
pub use error::{PathError, PathResult};
pub use eval::{CoreEvaluator, Evaluator, LegacyEvaluator};
pub use options::{EvalOptions, EvalStats};
pub use path::Path;
pub use rows::{PathRow, PathRows};
pub use trace::{NoTrace, PathEvent, TraceMode, Traced, WithTrace};

pub use proppath_graph::{Graph, Node};

/// Nodes reachable from `start` along `path`.
pub fn eval_forward<G: Graph>(graph: &G, start: &Node, path: &Path) -> PathResult<Vec<Node>> {
    Evaluator::new(graph).eval(start, path, true)
}

/// Nodes from which `end` is reachable along `path`.
pub fn eval_backward<G: Graph>(graph: &G, end: &Node, path: &Path) -> PathResult<Vec<Node>> {
    Evaluator::new(graph).eval(end, path, false)
}

/// [`eval_forward`] / [`eval_backward`] from each input node, concatenated.
pub fn eval_from_many<'n, G: Graph>(
    graph: &G,
    nodes: impl IntoIterator<Item = &'n Node>,
    path: &Path,
    forward: bool,
) -> PathResult<Vec<Node>> {
    Evaluator::new(graph).eval_from_many(nodes, path, forward)
}

/// The same entry points with the legacy closure semantics.
pub mod legacy {
    use super::*;

    pub fn eval_forward<G: Graph>(graph: &G, start: &Node, path: &Path) -> PathResult<Vec<Node>> {
        Evaluator::legacy(graph).eval(start, path, true)
    }

    pub fn eval_backward<G: Graph>(graph: &G, end: &Node, path: &Path) -> PathResult<Vec<Node>> {
        Evaluator::legacy(graph).eval(end, path, false)
    }

    pub fn eval_from_many<'n, G: Graph>(
        graph: &G,
        nodes: impl IntoIterator<Item = &'n Node>,
        path: &Path,
        forward: bool,
    ) -> PathResult<Vec<Node>> {
        Evaluator::legacy(graph).eval_from_many(nodes, path, forward)
    }
}
