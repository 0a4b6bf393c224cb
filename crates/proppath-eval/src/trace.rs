//! Optional evaluation traces.
//!
//! Evaluation is generic over a [`TraceMode`]. Under [`NoTrace`] the log is
//! `()` and no [`PathEvent`] is ever built; under [`WithTrace`] each lookup,
//! closure and repetition appends one.

use proppath_graph::Node;
use serde::{Deserialize, Serialize};

/// Compile-time switch for whether evaluation keeps an event log.
pub trait TraceMode {
    /// `()` when tracing is off, `Vec<E>` when it is on.
    type Log<E>: Default;

    /// Append an event. `event` is never called when tracing is off.
    fn record<E>(log: &mut Self::Log<E>, event: impl FnOnce() -> E);
}

#[derive(Debug)]
pub enum NoTrace {}

impl TraceMode for NoTrace {
    type Log<E> = ();

    #[inline]
    fn record<E>(_log: &mut Self::Log<E>, _event: impl FnOnce() -> E) {}
}

#[derive(Debug)]
pub enum WithTrace {}

impl TraceMode for WithTrace {
    type Log<E> = Vec<E>;

    #[inline]
    fn record<E>(log: &mut Self::Log<E>, event: impl FnOnce() -> E) {
        log.push(event());
    }
}

/// Evaluation output plus the event log of the mode it ran under.
pub struct Traced<M: TraceMode, T> {
    pub value: T,
    pub trace: M::Log<PathEvent>,
}

/// One step of a traced evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PathEvent {
    Link {
        node: Node,
        property: Node,
        forward: bool,
        found: usize,
    },
    NegatedPropertySet {
        node: Node,
        forward: bool,
        found: usize,
    },
    Closure {
        start: Node,
        forward: bool,
        strategy: String,
        at_least_one: bool,
        reached: usize,
    },
    Repeat {
        start: Node,
        min: u64,
        max: Option<u64>,
        forward: bool,
        produced: usize,
    },
    Distinct {
        before: usize,
        after: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_trace_never_builds_events() {
        let mut log: <NoTrace as TraceMode>::Log<u32> = Default::default();
        NoTrace::record(&mut log, || unreachable!("event built without tracing"));
    }

    #[test]
    fn with_trace_keeps_events_in_order() {
        let mut log: <WithTrace as TraceMode>::Log<u32> = Default::default();
        WithTrace::record(&mut log, || 1);
        WithTrace::record(&mut log, || 2);
        assert_eq!(log, vec![1, 2]);
    }

    #[test]
    fn events_serialize_with_op_tag() {
        let ev = PathEvent::Distinct {
            before: 3,
            after: 2,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["op"], "distinct");
        assert_eq!(json["after"], 2);
    }
}
