//! Term interning (compact term storage).

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::term::Node;

/// Interned term ID (4 bytes instead of a full `Node`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct TermId(u32);

/// Term interner: maps terms to compact IDs and back.
pub struct TermInterner {
    term_to_id: DashMap<Node, TermId>,
    id_to_term: DashMap<TermId, Node>,
    next_id: AtomicU32,
}

impl TermInterner {
    pub fn new() -> Self {
        Self {
            term_to_id: DashMap::new(),
            id_to_term: DashMap::new(),
            next_id: AtomicU32::new(0),
        }
    }

    /// Intern a term, returning its ID.
    pub fn intern(&self, term: &Node) -> TermId {
        if let Some(id) = self.term_to_id.get(term) {
            return *id;
        }

        // `entry` keeps two racing writers from minting two ids for one term.
        *self
            .term_to_id
            .entry(term.clone())
            .or_insert_with(|| {
                let id = TermId(self.next_id.fetch_add(1, Ordering::SeqCst));
                self.id_to_term.insert(id, term.clone());
                id
            })
            .value()
    }

    /// Look up an existing ID without inserting.
    pub fn id_of(&self, term: &Node) -> Option<TermId> {
        self.term_to_id.get(term).map(|id| *id)
    }

    /// Resolve an ID back to its term.
    pub fn lookup(&self, id: TermId) -> Option<Node> {
        self.id_to_term.get(&id).map(|t| t.clone())
    }

    pub fn len(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TermInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TermInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TermInterner")
            .field("terms", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_term_same_id() {
        let interner = TermInterner::new();
        let a = interner.intern(&Node::iri("http://x/a"));
        let b = interner.intern(&Node::iri("http://x/b"));
        let a2 = interner.intern(&Node::iri("http://x/a"));

        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
        assert_eq!(interner.lookup(b), Some(Node::iri("http://x/b")));
        assert_eq!(interner.id_of(&Node::literal("missing")), None);
    }

    #[test]
    fn literals_differ_by_tag() {
        let interner = TermInterner::new();
        let plain = interner.intern(&Node::literal("chat"));
        let fr = interner.intern(&Node::lang_literal("chat", "fr"));
        assert_ne!(plain, fr);
    }
}
