//! Graph access for property-path evaluation.
//!
//! The evaluator only ever asks one question of a graph: "which triples match
//! this pattern?", where any position may be a wildcard. [`Graph`] is that
//! question as a trait; [`MemGraph`] is the in-memory store shipped with the
//! workspace, and [`load`] fills one from RDF files.
//!
//! Graphs are read-only from the evaluator's point of view. Callers that
//! mutate a graph concurrently must hand the evaluator a consistent snapshot.

pub mod interner;
pub mod load;
pub mod store;
pub mod term;

pub use interner::{TermId, TermInterner};
pub use load::{load_bytes, load_path, RdfFormat};
pub use store::MemGraph;
pub use term::{Node, Triple};

/// Errors raised while building or loading a graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("invalid RDF term: {0}")]
    InvalidTerm(String),
    #[error("cannot infer RDF format from {0} (expected .nt, .ttl, .rdf, .owl or .xml)")]
    UnknownFormat(String),
    #[error("failed to parse {format}: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Pattern lookup over a set of triples.
///
/// `None` in a position is a wildcard. Implementations must support wildcards
/// in subject and object at the same time. No ordering is promised.
pub trait Graph {
    fn find<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = Triple> + 'a>;
}

impl<G: Graph + ?Sized> Graph for &G {
    fn find<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = Triple> + 'a> {
        (**self).find(subject, predicate, object)
    }
}

impl<G: Graph + ?Sized> Graph for Box<G> {
    fn find<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = Triple> + 'a> {
        (**self).find(subject, predicate, object)
    }
}
