//! Row-at-a-time evaluation over a stream of start-node bindings.

use proppath_graph::{Graph, Node};
use serde::{Deserialize, Serialize};

use crate::closure::RepetitionStrategy;
use crate::error::{PathError, PathResult};
use crate::eval::Evaluator;
use crate::path::Path;

/// One `(start, end)` binding produced by a path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathRow {
    pub start: Node,
    pub end: Node,
}

/// Lazy iterator of [`PathRow`]s.
///
/// Each input binding is evaluated only when the rows of the previous one are
/// exhausted. An unbound input (`None`) yields [`PathError::MissingStartNode`]
/// and iteration moves on to the next binding; an evaluation error is yielded
/// once for its binding the same way.
pub struct PathRows<'e, G, S, I> {
    evaluator: &'e Evaluator<G, S>,
    inputs: I,
    path: &'e Path,
    forward: bool,
    current: Option<(Node, std::vec::IntoIter<Node>)>,
}

impl<'e, G, S, I> PathRows<'e, G, S, I> {
    pub(crate) fn new(
        evaluator: &'e Evaluator<G, S>,
        inputs: I,
        path: &'e Path,
        forward: bool,
    ) -> Self {
        Self {
            evaluator,
            inputs,
            path,
            forward,
            current: None,
        }
    }
}

impl<G, S, I> Iterator for PathRows<'_, G, S, I>
where
    G: Graph,
    S: RepetitionStrategy,
    I: Iterator<Item = Option<Node>>,
{
    type Item = PathResult<PathRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((start, ends)) = &mut self.current {
                if let Some(end) = ends.next() {
                    return Some(Ok(PathRow {
                        start: start.clone(),
                        end,
                    }));
                }
            }
            self.current = None;

            let start = match self.inputs.next()? {
                Some(node) => node,
                None => return Some(Err(PathError::MissingStartNode)),
            };
            match self.evaluator.eval(&start, self.path, self.forward) {
                Ok(ends) => self.current = Some((start, ends.into_iter())),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proppath_graph::MemGraph;

    fn iri(s: &str) -> Node {
        Node::iri(format!("http://example.org/{s}"))
    }

    #[test]
    fn rows_pair_each_start_with_its_ends() {
        let mut g = MemGraph::new();
        g.add(iri("a"), iri("p"), iri("b"));
        g.add(iri("a"), iri("p"), iri("c"));
        g.add(iri("x"), iri("p"), iri("y"));
        let ev = Evaluator::new(&g);
        let path = Path::link(iri("p"));

        let rows: Vec<_> = ev
            .rows(vec![Some(iri("a")), None, Some(iri("b")), Some(iri("x"))], &path, true)
            .collect();

        assert_eq!(
            rows,
            vec![
                Ok(PathRow { start: iri("a"), end: iri("b") }),
                Ok(PathRow { start: iri("a"), end: iri("c") }),
                Err(PathError::MissingStartNode),
                Ok(PathRow { start: iri("x"), end: iri("y") }),
            ]
        );
    }

    #[test]
    fn rows_are_lazy() {
        let g = MemGraph::new();
        let ev = Evaluator::new(&g);
        let path = Path::multi(Path::link(iri("p")));
        let mut rows = ev.rows(std::iter::repeat(Some(iri("a"))), &path, true);
        assert_eq!(
            rows.next(),
            Some(Err(PathError::NotImplemented { operator: "multi" }))
        );
    }
}
