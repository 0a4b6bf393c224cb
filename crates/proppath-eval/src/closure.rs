//! Unbounded repetition strategies.
//!
//! `p*` and `p+` are the only operators whose two supported semantics differ,
//! so they are pluggable: the evaluator hands a strategy a one-hop function
//! and the strategy decides how to walk its closure.
//!
//! - [`Alp`]: the Arbitrary-Length-Path walk. A node is reported at most once
//!   per invocation; `visited` holds the nodes on the current route and is
//!   unwound on return, while the output set stops re-expansion.
//! - [`LegacyClosure`]: the older closure with one shared visited set and no
//!   unwinding; the visited set is the output.
//!
//! Both walks use an explicit frame stack, so the depth of the reachable graph
//! does not grow the host call stack. Report order is the preorder of the
//! recursive formulation.

use ahash::AHashSet;
use proppath_graph::Node;
use std::fmt;

use crate::error::PathResult;

/// One hop of the repeated sub-path, from a given node.
pub type Step<'a> = dyn FnMut(&Node) -> PathResult<Vec<Node>> + 'a;

/// Insertion-ordered set of nodes.
#[derive(Debug, Default, Clone)]
pub(crate) struct NodeSet {
    order: Vec<Node>,
    seen: AHashSet<Node>,
}

impl NodeSet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when `node` was already present.
    pub(crate) fn insert(&mut self, node: Node) -> bool {
        if self.seen.contains(&node) {
            return false;
        }
        self.seen.insert(node.clone());
        self.order.push(node);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    pub(crate) fn into_vec(self) -> Vec<Node> {
        self.order
    }
}

/// How `p*` / `p+` (and `p{0,}`) are walked.
pub trait RepetitionStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Whether `!(^p)` halves of negated property sets are evaluated.
    fn supports_backward_negation(&self) -> bool;

    /// Nodes reachable from `start` by zero or more hops, `start` included.
    fn zero_or_more(&self, start: &Node, step: &mut Step<'_>) -> PathResult<Vec<Node>>;

    /// Nodes reachable from `start` by one or more hops.
    fn one_or_more(&self, start: &Node, step: &mut Step<'_>) -> PathResult<Vec<Node>>;
}

struct Frame {
    node: Node,
    next: std::vec::IntoIter<Node>,
}

/// Arbitrary-Length-Path walk (current semantics).
#[derive(Debug, Default, Clone, Copy)]
pub struct Alp;

impl Alp {
    fn enter(node: &Node, visited: &mut AHashSet<Node>, output: &mut NodeSet) -> bool {
        if visited.contains(node) {
            return false;
        }
        if !output.insert(node.clone()) {
            return false;
        }
        visited.insert(node.clone());
        true
    }

    /// Walk from `root` with a fresh `visited` set, adding to `output`.
    fn walk(root: &Node, step: &mut Step<'_>, output: &mut NodeSet) -> PathResult<()> {
        let mut visited: AHashSet<Node> = AHashSet::new();
        if !Self::enter(root, &mut visited, output) {
            return Ok(());
        }

        let mut stack = vec![Frame {
            node: root.clone(),
            next: step(root)?.into_iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            match frame.next.next() {
                Some(n2) => {
                    if Self::enter(&n2, &mut visited, output) {
                        let next = step(&n2)?.into_iter();
                        stack.push(Frame { node: n2, next });
                    }
                }
                None => {
                    // Backtrack: the node may be reached again by another route.
                    if let Some(done) = stack.pop() {
                        visited.remove(&done.node);
                    }
                }
            }
        }
        Ok(())
    }
}

impl RepetitionStrategy for Alp {
    fn name(&self) -> &'static str {
        "alp"
    }

    fn supports_backward_negation(&self) -> bool {
        true
    }

    fn zero_or_more(&self, start: &Node, step: &mut Step<'_>) -> PathResult<Vec<Node>> {
        let mut output = NodeSet::new();
        Self::walk(start, step, &mut output)?;
        Ok(output.into_vec())
    }

    fn one_or_more(&self, start: &Node, step: &mut Step<'_>) -> PathResult<Vec<Node>> {
        let mut output = NodeSet::new();
        for n1 in step(start)? {
            Self::walk(&n1, step, &mut output)?;
        }
        Ok(output.into_vec())
    }
}

/// Deduplicating closure kept for compatibility with the previous path
/// algebra.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyClosure;

impl LegacyClosure {
    fn close(root: &Node, step: &mut Step<'_>, visited: &mut NodeSet) -> PathResult<()> {
        if !visited.insert(root.clone()) {
            return Ok(());
        }

        let mut stack = vec![step(root)?.into_iter()];
        while let Some(next) = stack.last_mut() {
            match next.next() {
                Some(n2) => {
                    if visited.insert(n2.clone()) {
                        let more = step(&n2)?.into_iter();
                        stack.push(more);
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(())
    }
}

impl RepetitionStrategy for LegacyClosure {
    fn name(&self) -> &'static str {
        "legacy_closure"
    }

    fn supports_backward_negation(&self) -> bool {
        false
    }

    fn zero_or_more(&self, start: &Node, step: &mut Step<'_>) -> PathResult<Vec<Node>> {
        let mut visited = NodeSet::new();
        Self::close(start, step, &mut visited)?;
        Ok(visited.into_vec())
    }

    fn one_or_more(&self, start: &Node, step: &mut Step<'_>) -> PathResult<Vec<Node>> {
        let mut visited = NodeSet::new();
        for n1 in step(start)? {
            Self::close(&n1, step, &mut visited)?;
        }
        Ok(visited.into_vec())
    }
}
