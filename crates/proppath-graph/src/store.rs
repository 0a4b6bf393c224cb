//! In-memory triple store (edge list with indexes).

use roaring::RoaringBitmap;
use std::collections::{BTreeSet, HashMap};

use crate::interner::{TermId, TermInterner};
use crate::term::{Node, Triple};
use crate::Graph;

/// A stored triple, as interned ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct TripleIds {
    s: TermId,
    p: TermId,
    o: TermId,
}

/// Indexed in-memory graph.
///
/// Triples form a multiset: inserting the same triple twice stores it twice
/// and `find` reports it twice.
#[derive(Debug, Default)]
pub struct MemGraph {
    interner: TermInterner,
    triples: Vec<TripleIds>,
    /// (subject, predicate) -> triple ids
    sp_index: HashMap<(TermId, TermId), Vec<u32>>,
    /// (object, predicate) -> triple ids
    op_index: HashMap<(TermId, TermId), Vec<u32>>,
    /// subject -> triple ids
    s_index: HashMap<TermId, Vec<u32>>,
    /// object -> triple ids
    o_index: HashMap<TermId, Vec<u32>>,
    /// predicate -> triple ids
    p_index: HashMap<TermId, RoaringBitmap>,
}

impl MemGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut graph = Self::new();
        for t in triples {
            graph.insert(t);
        }
        graph
    }

    /// Number of stored triples (duplicates included).
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Add a triple, returning its stable id.
    pub fn insert(&mut self, triple: Triple) -> u32 {
        let ids = TripleIds {
            s: self.interner.intern(&triple.subject),
            p: self.interner.intern(&triple.predicate),
            o: self.interner.intern(&triple.object),
        };
        self.insert_ids(ids)
    }

    /// Convenience for building fixtures: `add(s, p, o)`.
    pub fn add(&mut self, subject: Node, predicate: Node, object: Node) -> u32 {
        self.insert(Triple::new(subject, predicate, object))
    }

    fn insert_ids(&mut self, ids: TripleIds) -> u32 {
        let id = self.triples.len() as u32;

        self.sp_index.entry((ids.s, ids.p)).or_default().push(id);
        self.op_index.entry((ids.o, ids.p)).or_default().push(id);
        self.s_index.entry(ids.s).or_default().push(id);
        self.o_index.entry(ids.o).or_default().push(id);
        self.p_index
            .entry(ids.p)
            .or_insert_with(RoaringBitmap::new)
            .insert(id);

        self.triples.push(ids);
        id
    }

    /// Check whether at least one `s -p-> o` triple exists.
    pub fn contains(&self, triple: &Triple) -> bool {
        let (Some(s), Some(p), Some(o)) = (
            self.interner.id_of(&triple.subject),
            self.interner.id_of(&triple.predicate),
            self.interner.id_of(&triple.object),
        ) else {
            return false;
        };
        self.sp_index
            .get(&(s, p))
            .map(|ids| ids.iter().any(|&id| self.triples[id as usize].o == o))
            .unwrap_or(false)
    }

    /// Distinct predicates in use, in term order.
    pub fn predicates(&self) -> BTreeSet<Node> {
        self.p_index
            .keys()
            .filter_map(|&p| self.interner.lookup(p))
            .collect()
    }

    /// Number of triples for a given predicate.
    pub fn predicate_count(&self, predicate: &Node) -> usize {
        self.interner
            .id_of(predicate)
            .and_then(|p| self.p_index.get(&p))
            .map(|ids| ids.len() as usize)
            .unwrap_or(0)
    }

    pub fn interner(&self) -> &TermInterner {
        &self.interner
    }

    /// Candidate triple ids for a pattern, from the most selective index.
    /// Callers still filter on the positions the index did not cover.
    fn candidates(
        &self,
        s: Option<TermId>,
        p: Option<TermId>,
        o: Option<TermId>,
    ) -> Candidates<'_> {
        match (s, p, o) {
            (Some(s), Some(p), _) => Candidates::slice(self.sp_index.get(&(s, p))),
            (None, Some(p), Some(o)) => Candidates::slice(self.op_index.get(&(o, p))),
            (Some(s), None, _) => Candidates::slice(self.s_index.get(&s)),
            (None, None, Some(o)) => Candidates::slice(self.o_index.get(&o)),
            (None, Some(p), None) => match self.p_index.get(&p) {
                Some(bitmap) => Candidates::Bitmap(bitmap.iter()),
                None => Candidates::Empty,
            },
            (None, None, None) => Candidates::All(0..self.triples.len() as u32),
        }
    }

    fn resolve(&self, ids: TripleIds) -> Option<Triple> {
        Some(Triple::new(
            self.interner.lookup(ids.s)?,
            self.interner.lookup(ids.p)?,
            self.interner.lookup(ids.o)?,
        ))
    }
}

enum Candidates<'a> {
    Empty,
    Slice(std::slice::Iter<'a, u32>),
    Bitmap(roaring::bitmap::Iter<'a>),
    All(std::ops::Range<u32>),
}

impl<'a> Candidates<'a> {
    fn slice(ids: Option<&'a Vec<u32>>) -> Self {
        match ids {
            Some(ids) => Candidates::Slice(ids.iter()),
            None => Candidates::Empty,
        }
    }
}

impl Iterator for Candidates<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            Candidates::Empty => None,
            Candidates::Slice(it) => it.next().copied(),
            Candidates::Bitmap(it) => it.next(),
            Candidates::All(range) => range.next(),
        }
    }
}

impl Graph for MemGraph {
    fn find<'a>(
        &'a self,
        subject: Option<&Node>,
        predicate: Option<&Node>,
        object: Option<&Node>,
    ) -> Box<dyn Iterator<Item = Triple> + 'a> {
        // A bound term that was never interned cannot match anything.
        let lookup = |term: Option<&Node>| match term {
            None => Ok(None),
            Some(t) => self.interner.id_of(t).map(Some).ok_or(()),
        };
        let (Ok(s), Ok(p), Ok(o)) = (lookup(subject), lookup(predicate), lookup(object)) else {
            return Box::new(std::iter::empty());
        };

        Box::new(
            self.candidates(s, p, o)
                .filter_map(move |id| self.triples.get(id as usize).copied())
                .filter(move |t| {
                    s.map_or(true, |s| t.s == s)
                        && p.map_or(true, |p| t.p == p)
                        && o.map_or(true, |o| t.o == o)
                })
                .filter_map(move |t| self.resolve(t)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iri(s: &str) -> Node {
        Node::iri(format!("http://example.org/{s}"))
    }

    #[test]
    fn find_uses_every_pattern_shape() {
        let mut g = MemGraph::new();
        g.add(iri("a"), iri("p"), iri("b"));
        g.add(iri("a"), iri("q"), iri("c"));
        g.add(iri("b"), iri("p"), iri("c"));

        let objects = |s: &str, p: &str| -> Vec<Node> {
            g.find(Some(&iri(s)), Some(&iri(p)), None)
                .map(|t| t.object)
                .collect()
        };
        assert_eq!(objects("a", "p"), vec![iri("b")]);

        assert_eq!(g.find(Some(&iri("a")), None, None).count(), 2);
        assert_eq!(g.find(None, None, Some(&iri("c"))).count(), 2);
        assert_eq!(g.find(None, Some(&iri("p")), None).count(), 2);
        assert_eq!(g.find(None, Some(&iri("p")), Some(&iri("c"))).count(), 1);
        assert_eq!(g.find(Some(&iri("a")), None, Some(&iri("c"))).count(), 1);
        assert_eq!(g.find(None, None, None).count(), 3);
    }

    #[test]
    fn unknown_terms_match_nothing() {
        let mut g = MemGraph::new();
        g.add(iri("a"), iri("p"), iri("b"));
        assert_eq!(g.find(Some(&iri("zzz")), None, None).count(), 0);
        assert_eq!(g.find(None, Some(&iri("zzz")), None).count(), 0);
    }

    #[test]
    fn duplicates_are_kept() {
        let mut g = MemGraph::new();
        g.add(iri("a"), iri("p"), iri("b"));
        g.add(iri("a"), iri("p"), iri("b"));
        assert_eq!(g.len(), 2);
        assert_eq!(g.find(Some(&iri("a")), Some(&iri("p")), None).count(), 2);
        assert!(g.contains(&Triple::new(iri("a"), iri("p"), iri("b"))));
        assert_eq!(g.predicate_count(&iri("p")), 2);
    }
}
