//! Property path evaluator.
//!
//! [`Evaluator`] interprets a [`Path`] from a fixed start node over any
//! [`Graph`]. The traversal direction is an explicit argument threaded through
//! every call; `Inverse` and `ReverseLink` evaluate their operand with it
//! flipped. All working state (stats, event log, visited sets) lives in a
//! per-call context, so one evaluator can serve many calls, including from
//! several threads when the graph is `Sync`.
//!
//! Output is an ordered, duplicate-preserving `Vec<Node>`: `Alt`, `Seq` and
//! bounded repetition report a node once per route, while unbounded
//! repetition reports each node at most once per invocation.

use proppath_graph::{Graph, Node};

use crate::closure::{Alp, LegacyClosure, NodeSet, RepetitionStrategy};
use crate::error::{PathError, PathResult};
use crate::options::{EvalOptions, EvalStats};
use crate::path::Path;
use crate::rows::PathRows;
use crate::trace::{NoTrace, PathEvent, TraceMode, Traced, WithTrace};

/// Evaluator with the current (ALP) repetition semantics.
pub type CoreEvaluator<G> = Evaluator<G, Alp>;

/// Evaluator with the legacy closure semantics.
pub type LegacyEvaluator<G> = Evaluator<G, LegacyClosure>;

/// Property path evaluator over a graph `G`, parameterized by how unbounded
/// repetition is walked.
#[derive(Debug, Clone)]
pub struct Evaluator<G, S = Alp> {
    graph: G,
    strategy: S,
    options: EvalOptions,
}

impl<G: Graph> Evaluator<G, Alp> {
    pub fn new(graph: G) -> Self {
        Self::with_strategy(graph, Alp)
    }
}

impl<G: Graph> Evaluator<G, LegacyClosure> {
    pub fn legacy(graph: G) -> Self {
        Self::with_strategy(graph, LegacyClosure)
    }
}

impl<G: Graph, S: RepetitionStrategy> Evaluator<G, S> {
    pub fn with_strategy(graph: G, strategy: S) -> Self {
        Self {
            graph,
            strategy,
            options: EvalOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Nodes reached by `path` from `node`, walking forward (subject to
    /// object) or backward (object to subject).
    pub fn eval(&self, node: &Node, path: &Path, forward: bool) -> PathResult<Vec<Node>> {
        self.eval_with_stats(node, path, forward).map(|(out, _)| out)
    }

    pub fn eval_forward(&self, start: &Node, path: &Path) -> PathResult<Vec<Node>> {
        self.eval(start, path, true)
    }

    pub fn eval_backward(&self, end: &Node, path: &Path) -> PathResult<Vec<Node>> {
        self.eval(end, path, false)
    }

    /// Evaluate from each of `nodes` and concatenate, in input order.
    pub fn eval_from_many<'n>(
        &self,
        nodes: impl IntoIterator<Item = &'n Node>,
        path: &Path,
        forward: bool,
    ) -> PathResult<Vec<Node>> {
        let mut cx = self.context::<NoTrace>();
        let mut out = Vec::new();
        for node in nodes {
            cx.top_level(node, path, forward, &mut out)?;
        }
        cx.finish(path, forward, &out)?;
        Ok(out)
    }

    pub fn eval_with_stats(
        &self,
        node: &Node,
        path: &Path,
        forward: bool,
    ) -> PathResult<(Vec<Node>, EvalStats)> {
        let mut cx = self.context::<NoTrace>();
        let mut out = Vec::new();
        cx.top_level(node, path, forward, &mut out)?;
        cx.finish(path, forward, &out)?;
        Ok((out, cx.stats))
    }

    /// Evaluate and, under `WithTrace`, return the event log alongside.
    pub fn eval_traced<M: TraceMode>(
        &self,
        node: &Node,
        path: &Path,
        forward: bool,
    ) -> PathResult<Traced<M, Vec<Node>>> {
        let mut cx = self.context::<M>();
        let mut out = Vec::new();
        cx.top_level(node, path, forward, &mut out)?;
        cx.finish(path, forward, &out)?;
        Ok(Traced {
            value: out,
            trace: cx.log,
        })
    }

    /// Shorthand for `eval_traced::<WithTrace>`.
    pub fn trace(
        &self,
        node: &Node,
        path: &Path,
        forward: bool,
    ) -> PathResult<(Vec<Node>, Vec<PathEvent>)> {
        self.eval_traced::<WithTrace>(node, path, forward)
            .map(|traced| (traced.value, traced.trace))
    }

    /// Lazy `(start, end)` rows, one evaluation per input binding.
    pub fn rows<'e, I>(
        &'e self,
        inputs: I,
        path: &'e Path,
        forward: bool,
    ) -> PathRows<'e, G, S, I::IntoIter>
    where
        I: IntoIterator<Item = Option<Node>>,
    {
        PathRows::new(self, inputs.into_iter(), path, forward)
    }

    fn context<M: TraceMode>(&self) -> EvalContext<'_, G, S, M> {
        EvalContext {
            graph: &self.graph,
            strategy: &self.strategy,
            options: &self.options,
            stats: EvalStats::default(),
            log: Default::default(),
        }
    }
}

/// Working state of one top-level call.
struct EvalContext<'e, G, S, M: TraceMode> {
    graph: &'e G,
    strategy: &'e S,
    options: &'e EvalOptions,
    stats: EvalStats,
    log: M::Log<PathEvent>,
}

fn dec(x: u64) -> u64 {
    x.saturating_sub(1)
}

impl<'e, G: Graph, S: RepetitionStrategy, M: TraceMode> EvalContext<'e, G, S, M> {
    fn top_level(
        &mut self,
        node: &Node,
        path: &Path,
        forward: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        if node.is_variable() {
            tracing::warn!(
                node = %node,
                path = %path,
                "property path evaluated from a variable; treating it as a ground term"
            );
        }
        self.eval_into(node, path, forward, out)?;
        self.check_results(out.len())
    }

    fn finish(&self, path: &Path, forward: bool, out: &[Node]) -> PathResult<()> {
        self.check_results(out.len())?;
        tracing::debug!(
            strategy = self.strategy.name(),
            path = %path,
            depth = path.depth(),
            forward,
            results = out.len(),
            graph_lookups = self.stats.graph_lookups,
            triples_scanned = self.stats.triples_scanned,
            closure_expansions = self.stats.closure_expansions,
            "property path evaluated"
        );
        Ok(())
    }

    fn record(&mut self, event: impl FnOnce() -> PathEvent) {
        M::record(&mut self.log, event);
    }

    fn check_results(&self, produced: usize) -> PathResult<()> {
        match self.options.max_results {
            Some(limit) if produced > limit => Err(PathError::TooManyResults { limit }),
            _ => Ok(()),
        }
    }

    /// Account for one triple read from the graph.
    fn charge(&mut self) -> PathResult<()> {
        self.stats.triples_scanned += 1;
        match self.options.max_steps {
            Some(budget) if self.stats.triples_scanned > budget => {
                Err(PathError::BudgetExceeded { budget })
            }
            _ => Ok(()),
        }
    }

    fn eval(&mut self, node: &Node, path: &Path, forward: bool) -> PathResult<Vec<Node>> {
        let mut out = Vec::new();
        self.eval_into(node, path, forward, &mut out)?;
        Ok(out)
    }

    fn eval_into(
        &mut self,
        node: &Node,
        path: &Path,
        forward: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        tracing::trace!(node = %node, path = %path, forward, "eval");
        match path {
            Path::Link(property) => self.link(node, property, forward, out),
            Path::ReverseLink(property) => self.link(node, property, !forward, out),
            Path::NegPropSet {
                forward: fwd,
                backward: bwd,
            } => self.negated_property_set(node, fwd, bwd, forward, out),
            Path::Inverse(sub) => self.eval_into(node, sub, !forward, out),
            Path::Alt(left, right) => {
                self.eval_into(node, left, forward, out)?;
                self.eval_into(node, right, forward, out)
            }
            Path::Seq(left, right) => {
                let (first, second) = if forward {
                    (left, right)
                } else {
                    (right, left)
                };
                let mids = self.eval(node, first, forward)?;
                for mid in &mids {
                    self.eval_into(mid, second, forward, out)?;
                }
                Ok(())
            }
            Path::Mod { path: sub, min, max } => {
                if *min == 0 && max.is_none() {
                    self.closure(node, sub, forward, false, out)
                } else {
                    self.repeat(node, sub, *min, *max, forward, out)
                }
            }
            Path::FixedLength { path: sub, count } => {
                self.repeat(node, sub, *count, Some(*count), forward, out)
            }
            Path::ZeroOrOne(sub) => {
                out.push(node.clone());
                self.eval_into(node, sub, forward, out)
            }
            Path::ZeroOrMore(sub) => self.closure(node, sub, forward, false, out),
            Path::OneOrMore(sub) => self.closure(node, sub, forward, true, out),
            Path::Distinct(sub) => {
                let inner = self.eval(node, sub, forward)?;
                let before = inner.len();
                let mut seen = NodeSet::new();
                for n in inner {
                    seen.insert(n);
                }
                let after = seen.len();
                out.extend(seen.into_vec());
                self.record(|| PathEvent::Distinct { before, after });
                Ok(())
            }
            Path::Multi(_) => Err(PathError::NotImplemented { operator: "multi" }),
            Path::Shortest(_) => Err(PathError::Unsupported {
                operator: "shortest",
            }),
        }
    }

    fn link(
        &mut self,
        node: &Node,
        property: &Node,
        forward: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let graph = self.graph;
        let triples = if forward {
            graph.find(Some(node), Some(property), None)
        } else {
            graph.find(None, Some(property), Some(node))
        };
        self.stats.graph_lookups += 1;

        let before = out.len();
        for t in triples {
            self.charge()?;
            out.push(if forward { t.object } else { t.subject });
        }

        let found = out.len() - before;
        self.record(|| PathEvent::Link {
            node: node.clone(),
            property: property.clone(),
            forward,
            found,
        });
        Ok(())
    }

    fn negated_property_set(
        &mut self,
        node: &Node,
        fwd: &[Node],
        bwd: &[Node],
        forward: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let walk_backward = !bwd.is_empty() && self.strategy.supports_backward_negation();
        if !bwd.is_empty() && !walk_backward {
            tracing::warn!(
                strategy = self.strategy.name(),
                excluded = bwd.len(),
                "only forward negated property sets are implemented; ignoring the ^ half"
            );
        }
        // Nothing left to walk: an empty set, or a `^`-only set under legacy.
        if fwd.is_empty() && !walk_backward {
            return Err(PathError::EmptyNegatedPropertySet);
        }

        let before = out.len();
        if !fwd.is_empty() {
            self.hop_excluding(node, fwd, forward, out)?;
        }
        if walk_backward {
            self.hop_excluding(node, bwd, !forward, out)?;
        }

        let found = out.len() - before;
        self.record(|| PathEvent::NegatedPropertySet {
            node: node.clone(),
            forward,
            found,
        });
        Ok(())
    }

    /// One hop over any predicate not in `excluded`.
    fn hop_excluding(
        &mut self,
        node: &Node,
        excluded: &[Node],
        forward: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let graph = self.graph;
        let triples = if forward {
            graph.find(Some(node), None, None)
        } else {
            graph.find(None, None, Some(node))
        };
        self.stats.graph_lookups += 1;

        for t in triples {
            self.charge()?;
            if excluded.contains(&t.predicate) {
                continue;
            }
            out.push(if forward { t.object } else { t.subject });
        }
        Ok(())
    }

    /// `sub*` (or `sub+` when `at_least_one`) via the repetition strategy.
    fn closure(
        &mut self,
        node: &Node,
        sub: &Path,
        forward: bool,
        at_least_one: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let strategy = self.strategy;
        let reached = {
            let mut step = |n: &Node| -> PathResult<Vec<Node>> {
                self.stats.closure_expansions += 1;
                self.eval(n, sub, forward)
            };
            if at_least_one {
                strategy.one_or_more(node, &mut step)?
            } else {
                strategy.zero_or_more(node, &mut step)?
            }
        };

        let count = reached.len();
        out.extend(reached);
        self.record(|| PathEvent::Closure {
            start: node.clone(),
            forward,
            strategy: strategy.name().to_string(),
            at_least_one,
            reached: count,
        });
        Ok(())
    }

    /// Bounded repetition `sub{min,max}` (`max: None` is unbounded, `min > 0`).
    fn repeat(
        &mut self,
        node: &Node,
        sub: &Path,
        min: u64,
        max: Option<u64>,
        forward: bool,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let before = out.len();
        if forward {
            self.repeat_step_first(node, sub, min, max, out)?;
        } else {
            self.repeat_remainder_first(node, sub, min, max, out)?;
        }

        let produced = out.len() - before;
        self.record(|| PathEvent::Repeat {
            start: node.clone(),
            min,
            max,
            forward,
            produced,
        });
        Ok(())
    }

    /// Forward: one step from `node`, then the decremented repetition from
    /// each stepped-to node, depth first.
    fn repeat_step_first(
        &mut self,
        node: &Node,
        sub: &Path,
        min: u64,
        max: Option<u64>,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let mut work: Vec<(Node, u64, Option<u64>)> = vec![(node.clone(), min, max)];

        while let Some((n, min, max)) = work.pop() {
            if min == 0 && max.is_none() {
                self.closure(&n, sub, true, false, out)?;
                continue;
            }
            if min == 0 {
                out.push(n.clone());
            }
            if max == Some(0) {
                continue;
            }

            let next = self.eval(&n, sub, true)?;
            let (min2, max2) = (dec(min), max.map(dec));
            // Reversed so the first neighbour is expanded first.
            work.extend(next.into_iter().rev().map(|n2| (n2, min2, max2)));
        }
        Ok(())
    }

    /// Backward: the decremented repetition from `node` first, then one step
    /// from each of its results. Unrolled, level `k` of the output is
    /// `sub^k(node)` for every `k` in `min..=max`, shortest first; an
    /// unbounded tail is `sub^min(sub*(node))`.
    fn repeat_remainder_first(
        &mut self,
        node: &Node,
        sub: &Path,
        min: u64,
        max: Option<u64>,
        out: &mut Vec<Node>,
    ) -> PathResult<()> {
        let mut frontier = match max {
            Some(_) => vec![node.clone()],
            None => self.eval(node, &Path::ZeroOrMore(Box::new(sub.clone())), false)?,
        };
        let levels = match max {
            Some(max) => max,
            None => min,
        };

        let mut k: u64 = 0;
        loop {
            let emit = match max {
                Some(_) => k >= min,
                None => k == levels,
            };
            if emit {
                out.extend(frontier.iter().cloned());
            }
            if k == levels || frontier.is_empty() {
                return Ok(());
            }

            let mut next = Vec::new();
            for n in &frontier {
                self.eval_into(n, sub, false, &mut next)?;
            }
            frontier = next;
            k += 1;
        }
    }
}
