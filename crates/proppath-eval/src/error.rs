//! Evaluation errors.
//!
//! Every failure aborts the evaluation for the start node it occurred on;
//! there is no partial result. Degraded input (a variable start node) is a
//! warning, not an error.

/// Errors raised while evaluating a property path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("path evaluation needs a start node, but the input slot was unbound")]
    MissingStartNode,
    #[error("path operator `{operator}` is not implemented")]
    NotImplemented { operator: &'static str },
    #[error("path operator `{operator}` is not evaluated by this engine")]
    Unsupported { operator: &'static str },
    #[error("bad path element: negated property set with no excluded predicates")]
    EmptyNegatedPropertySet,
    #[error("path evaluation read more than {budget} triples")]
    BudgetExceeded { budget: u64 },
    #[error("path evaluation produced more than {limit} results")]
    TooManyResults { limit: usize },
}

pub type PathResult<T> = Result<T, PathError>;
