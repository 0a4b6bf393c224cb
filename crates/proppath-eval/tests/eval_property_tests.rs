use std::collections::BTreeSet;

use proppath_eval::{EvalOptions, Evaluator, Path, PathError, PathResult};
use proppath_graph::{MemGraph, Node};
use proptest::prelude::*;

const MAX_NODE: u8 = 5;
const MAX_PRED: u8 = 2;
const STEP_BUDGET: u64 = 20_000;

fn node(i: u8) -> Node {
    Node::iri(format!("http://example.org/n{i}"))
}

fn pred(i: u8) -> Node {
    Node::iri(format!("http://example.org/p{i}"))
}

fn graph_strategy() -> impl Strategy<Value = MemGraph> {
    prop::collection::vec((0..MAX_NODE, 0..MAX_PRED, 0..MAX_NODE), 0..12).prop_map(|raw| {
        let mut g = MemGraph::new();
        for (s, p, o) in raw {
            g.add(node(s), pred(p), node(o));
        }
        g
    })
}

fn neg_prop_set_strategy(with_backward: bool) -> BoxedStrategy<Path> {
    let backward_len = if with_backward { 0..2usize } else { 0..1usize };
    (
        prop::collection::vec(0..MAX_PRED, 0..2),
        prop::collection::vec(0..MAX_PRED, backward_len),
    )
        .prop_filter("at least one excluded predicate", |(f, b)| {
            !f.is_empty() || !b.is_empty()
        })
        .prop_map(|(f, b)| {
            Path::neg_prop_set(f.into_iter().map(pred).collect(), b.into_iter().map(pred).collect())
        })
        .boxed()
}

/// Random paths over every evaluated operator. `with_backward_negation`
/// controls whether negated property sets may carry a `^` half.
fn path_strategy(with_backward_negation: bool) -> impl Strategy<Value = Path> {
    let leaf = prop_oneof![
        (0..MAX_PRED).prop_map(|p| Path::link(pred(p))),
        (0..MAX_PRED).prop_map(|p| Path::reverse_link(pred(p))),
        neg_prop_set_strategy(with_backward_negation),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(Path::inverse),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Path::seq(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Path::alt(l, r)),
            (inner.clone(), 0..3u64, prop::option::of(0..3u64))
                .prop_map(|(p, min, max)| Path::modified(p, min, max)),
            (inner.clone(), 0..3u64).prop_map(|(p, n)| Path::fixed_length(p, n)),
            inner.clone().prop_map(Path::zero_or_one),
            inner.clone().prop_map(Path::zero_or_more),
            inner.clone().prop_map(Path::one_or_more),
            inner.prop_map(Path::distinct),
        ]
    })
}

fn budgeted() -> EvalOptions {
    EvalOptions::default().with_max_steps(STEP_BUDGET)
}

/// `None` when the step budget ran out; any other error is a test failure.
fn within_budget(result: PathResult<Vec<Node>>) -> Result<Option<Vec<Node>>, TestCaseError> {
    match result {
        Ok(out) => Ok(Some(out)),
        Err(PathError::BudgetExceeded { .. }) => Ok(None),
        Err(err) => Err(TestCaseError::fail(format!("unexpected error: {err}"))),
    }
}

fn dec(x: u64) -> u64 {
    x.saturating_sub(1)
}

/// Direct recursive reading of bounded repetition, used as the oracle for the
/// evaluator's work-list implementation.
fn reference_repeat(
    ev: &Evaluator<&MemGraph>,
    start: &Node,
    sub: &Path,
    min: u64,
    max: Option<u64>,
    forward: bool,
) -> PathResult<Vec<Node>> {
    if min == 0 && max.is_none() {
        return ev.eval(start, &Path::zero_or_more(sub.clone()), forward);
    }
    let mut out = Vec::new();
    if min == 0 {
        out.push(start.clone());
    }
    if max == Some(0) {
        return Ok(out);
    }
    if forward {
        for n in ev.eval(start, sub, true)? {
            out.extend(reference_repeat(ev, &n, sub, dec(min), max.map(dec), true)?);
        }
    } else {
        for n in reference_repeat(ev, start, sub, dec(min), max.map(dec), false)? {
            out.extend(ev.eval(&n, sub, false)?);
        }
    }
    Ok(out)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn forward_and_backward_evaluation_are_dual(
        g in graph_strategy(),
        path in path_strategy(true),
    ) {
        let ev = Evaluator::new(&g).with_options(budgeted());
        let mut forward = Vec::new();
        let mut backward = Vec::new();
        for i in 0..MAX_NODE {
            let Some(f) = within_budget(ev.eval_forward(&node(i), &path))? else {
                return Ok(());
            };
            let Some(b) = within_budget(ev.eval_backward(&node(i), &path))? else {
                return Ok(());
            };
            forward.push(f);
            backward.push(b);
        }
        for a in 0..MAX_NODE {
            for b in 0..MAX_NODE {
                let fwd = forward[a as usize].contains(&node(b));
                let bwd = backward[b as usize].contains(&node(a));
                prop_assert_eq!(fwd, bwd, "path {} between n{} and n{}", path, a, b);
            }
        }
    }

    #[test]
    fn zero_length_repetition_contains_start(
        g in graph_strategy(),
        path in path_strategy(true),
        start in 0..MAX_NODE,
        forward in any::<bool>(),
    ) {
        let ev = Evaluator::new(&g).with_options(budgeted());
        for p in [Path::zero_or_more(path.clone()), Path::modified(path.clone(), 0, None)] {
            if let Some(out) = within_budget(ev.eval(&node(start), &p, forward))? {
                prop_assert!(out.contains(&node(start)));
                let distinct: BTreeSet<_> = out.iter().collect();
                prop_assert_eq!(distinct.len(), out.len(), "unbounded repetition repeated a node");
            }
        }
    }

    #[test]
    fn distinct_is_duplicate_free_and_idempotent(
        g in graph_strategy(),
        path in path_strategy(true),
        start in 0..MAX_NODE,
    ) {
        let ev = Evaluator::new(&g).with_options(budgeted());
        let Some(once) = within_budget(ev.eval_forward(&node(start), &Path::distinct(path.clone())))? else {
            return Ok(());
        };
        let set: BTreeSet<_> = once.iter().collect();
        prop_assert_eq!(set.len(), once.len());

        let Some(twice) = within_budget(
            ev.eval_forward(&node(start), &Path::distinct(Path::distinct(path.clone()))),
        )? else {
            return Ok(());
        };
        prop_assert_eq!(&once, &twice);

        let Some(plain) = within_budget(ev.eval_forward(&node(start), &path))? else {
            return Ok(());
        };
        let plain_set: BTreeSet<_> = plain.iter().collect();
        prop_assert_eq!(set, plain_set);
    }

    #[test]
    fn legacy_and_core_agree_as_sets(
        g in graph_strategy(),
        path in path_strategy(false),
        start in 0..MAX_NODE,
        forward in any::<bool>(),
    ) {
        let core = Evaluator::new(&g).with_options(budgeted());
        let legacy = Evaluator::legacy(&g).with_options(budgeted());
        let Some(a) = within_budget(core.eval(&node(start), &path, forward))? else {
            return Ok(());
        };
        let Some(b) = within_budget(legacy.eval(&node(start), &path, forward))? else {
            return Ok(());
        };
        let a: BTreeSet<_> = a.into_iter().collect();
        let b: BTreeSet<_> = b.into_iter().collect();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn bounded_repetition_matches_recursive_definition(
        g in graph_strategy(),
        sub in path_strategy(true),
        start in 0..MAX_NODE,
        min in 0..4u64,
        max in prop::option::of(0..4u64),
        forward in any::<bool>(),
    ) {
        let ev = Evaluator::new(&g).with_options(budgeted());
        let Some(expected) = within_budget(reference_repeat(&ev, &node(start), &sub, min, max, forward))? else {
            return Ok(());
        };
        let Some(actual) = within_budget(ev.eval(&node(start), &Path::modified(sub.clone(), min, max), forward))? else {
            return Ok(());
        };
        prop_assert_eq!(actual, expected);

        if let Some(count) = max {
            let fixed = within_budget(ev.eval(&node(start), &Path::fixed_length(sub.clone(), count), forward))?;
            let exact = within_budget(reference_repeat(&ev, &node(start), &sub, count, Some(count), forward))?;
            if let (Some(fixed), Some(exact)) = (fixed, exact) {
                prop_assert_eq!(fixed, exact);
            }
        }
    }

    #[test]
    fn step_budget_is_never_overrun(
        g in graph_strategy(),
        path in path_strategy(true),
        start in 0..MAX_NODE,
        budget in 0..50u64,
    ) {
        let ev = Evaluator::new(&g).with_options(EvalOptions::default().with_max_steps(budget));
        match ev.eval_with_stats(&node(start), &path, true) {
            Ok((_, stats)) => prop_assert!(stats.triples_scanned <= budget),
            Err(PathError::BudgetExceeded { budget: b }) => prop_assert_eq!(b, budget),
            Err(err) => prop_assert!(false, "unexpected error: {}", err),
        }
    }
}
