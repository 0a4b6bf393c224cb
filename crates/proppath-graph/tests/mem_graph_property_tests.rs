use proppath_graph::{Graph, MemGraph, Node, Triple};
use proptest::prelude::*;

const MAX_NODE: u8 = 8;
const MAX_PRED: u8 = 3;

fn node(i: u8) -> Node {
    Node::iri(format!("http://example.org/n{i}"))
}

fn pred(i: u8) -> Node {
    Node::iri(format!("http://example.org/p{i}"))
}

fn triples_strategy() -> impl Strategy<Value = Vec<(u8, u8, u8)>> {
    prop::collection::vec((0..MAX_NODE, 0..MAX_PRED, 0..MAX_NODE), 0..40)
}

fn pattern_strategy() -> impl Strategy<Value = (Option<u8>, Option<u8>, Option<u8>)> {
    (
        prop::option::of(0..MAX_NODE),
        prop::option::of(0..MAX_PRED),
        prop::option::of(0..MAX_NODE),
    )
}

fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn find_agrees_with_a_linear_scan(
        raw in triples_strategy(),
        (s, p, o) in pattern_strategy(),
    ) {
        let triples: Vec<Triple> = raw
            .iter()
            .map(|&(s, p, o)| Triple::new(node(s), pred(p), node(o)))
            .collect();
        let graph = MemGraph::from_triples(triples.clone());

        let (s, p, o) = (s.map(node), p.map(pred), o.map(node));
        let found: Vec<String> = graph
            .find(s.as_ref(), p.as_ref(), o.as_ref())
            .map(|t| t.to_string())
            .collect();

        let expected: Vec<String> = triples
            .iter()
            .filter(|t| s.as_ref().map_or(true, |s| &t.subject == s))
            .filter(|t| p.as_ref().map_or(true, |p| &t.predicate == p))
            .filter(|t| o.as_ref().map_or(true, |o| &t.object == o))
            .map(|t| t.to_string())
            .collect();

        prop_assert_eq!(sorted(found), sorted(expected));
    }

    #[test]
    fn len_counts_duplicates(raw in triples_strategy()) {
        let graph = MemGraph::from_triples(
            raw.iter().map(|&(s, p, o)| Triple::new(node(s), pred(p), node(o))),
        );
        prop_assert_eq!(graph.len(), raw.len());
        prop_assert_eq!(graph.find(None, None, None).count(), raw.len());
    }
}
