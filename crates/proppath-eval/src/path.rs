//! Property path AST.
//!
//! A [`Path`] is built once (by a parser or by the factory constructors
//! below) and only read afterwards. Equality and hashing are structural, so
//! callers can deduplicate plans that mention the same path twice.

use proppath_graph::Node;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled property path expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Path {
    /// One forward hop over `property`.
    Link(Node),
    /// One hop over `property` with the direction flipped.
    ReverseLink(Node),
    /// The sub-path walked against the current direction.
    Inverse(Box<Path>),
    Seq(Box<Path>, Box<Path>),
    Alt(Box<Path>, Box<Path>),
    /// `path{min,max}`; `max: None` is unbounded.
    Mod {
        path: Box<Path>,
        min: u64,
        max: Option<u64>,
    },
    /// `path{count}`
    FixedLength { path: Box<Path>, count: u64 },
    ZeroOrOne(Box<Path>),
    ZeroOrMore(Box<Path>),
    OneOrMore(Box<Path>),
    Distinct(Box<Path>),
    /// Declared for completeness; evaluation fails with "not implemented".
    Multi(Box<Path>),
    /// `!(fwd1|fwd2|^bwd1|^bwd2)`
    NegPropSet {
        #[serde(default)]
        forward: Vec<Node>,
        #[serde(default)]
        backward: Vec<Node>,
    },
    /// Handled by a different planner; rejected by the evaluator.
    Shortest(Box<Path>),
}

impl Path {
    pub fn link(property: Node) -> Self {
        Path::Link(property)
    }

    pub fn reverse_link(property: Node) -> Self {
        Path::ReverseLink(property)
    }

    pub fn inverse(path: Path) -> Self {
        Path::Inverse(Box::new(path))
    }

    pub fn seq(left: Path, right: Path) -> Self {
        Path::Seq(Box::new(left), Box::new(right))
    }

    pub fn alt(left: Path, right: Path) -> Self {
        Path::Alt(Box::new(left), Box::new(right))
    }

    pub fn modified(path: Path, min: u64, max: Option<u64>) -> Self {
        Path::Mod {
            path: Box::new(path),
            min,
            max,
        }
    }

    pub fn fixed_length(path: Path, count: u64) -> Self {
        Path::FixedLength {
            path: Box::new(path),
            count,
        }
    }

    pub fn zero_or_one(path: Path) -> Self {
        Path::ZeroOrOne(Box::new(path))
    }

    pub fn zero_or_more(path: Path) -> Self {
        Path::ZeroOrMore(Box::new(path))
    }

    pub fn one_or_more(path: Path) -> Self {
        Path::OneOrMore(Box::new(path))
    }

    pub fn distinct(path: Path) -> Self {
        Path::Distinct(Box::new(path))
    }

    pub fn multi(path: Path) -> Self {
        Path::Multi(Box::new(path))
    }

    pub fn neg_prop_set(forward: Vec<Node>, backward: Vec<Node>) -> Self {
        Path::NegPropSet { forward, backward }
    }

    pub fn shortest(path: Path) -> Self {
        Path::Shortest(Box::new(path))
    }

    /// Left-associated sequence of `parts`; `None` when `parts` is empty.
    pub fn seq_all(parts: impl IntoIterator<Item = Path>) -> Option<Self> {
        parts.into_iter().reduce(Path::seq)
    }

    /// Left-associated alternation of `parts`; `None` when `parts` is empty.
    pub fn alt_all(parts: impl IntoIterator<Item = Path>) -> Option<Self> {
        parts.into_iter().reduce(Path::alt)
    }

    /// Nesting depth; a single link has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Path::Link(_) | Path::ReverseLink(_) | Path::NegPropSet { .. } => 1,
            Path::Seq(l, r) | Path::Alt(l, r) => 1 + l.depth().max(r.depth()),
            Path::Inverse(p)
            | Path::ZeroOrOne(p)
            | Path::ZeroOrMore(p)
            | Path::OneOrMore(p)
            | Path::Distinct(p)
            | Path::Multi(p)
            | Path::Shortest(p)
            | Path::Mod { path: p, .. }
            | Path::FixedLength { path: p, .. } => 1 + p.depth(),
        }
    }

    /// Renders without surrounding parentheses.
    fn is_atomic(&self) -> bool {
        matches!(
            self,
            Path::Link(_) | Path::ReverseLink(_) | Path::NegPropSet { .. } | Path::Seq(..) | Path::Alt(..)
        )
    }
}

struct Operand<'a>(&'a Path);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_atomic() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

/// SPARQL property path syntax, for logs and tooling output.
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Path::Link(p) => write!(f, "{p}"),
            Path::ReverseLink(p) => write!(f, "^{p}"),
            Path::Inverse(p) => write!(f, "^{}", Operand(p)),
            Path::Seq(l, r) => write!(f, "({l}/{r})"),
            Path::Alt(l, r) => write!(f, "({l}|{r})"),
            Path::Mod { path, min, max } => match max {
                Some(max) => write!(f, "{}{{{min},{max}}}", Operand(path)),
                None => write!(f, "{}{{{min},}}", Operand(path)),
            },
            Path::FixedLength { path, count } => write!(f, "{}{{{count}}}", Operand(path)),
            Path::ZeroOrOne(p) => write!(f, "{}?", Operand(p)),
            Path::ZeroOrMore(p) => write!(f, "{}*", Operand(p)),
            Path::OneOrMore(p) => write!(f, "{}+", Operand(p)),
            Path::Distinct(p) => write!(f, "distinct({p})"),
            Path::Multi(p) => write!(f, "multi({p})"),
            Path::Shortest(p) => write!(f, "shortest({p})"),
            Path::NegPropSet { forward, backward } => {
                write!(f, "!(")?;
                let mut first = true;
                for p in forward {
                    if !first {
                        write!(f, "|")?;
                    }
                    first = false;
                    write!(f, "{p}")?;
                }
                for p in backward {
                    if !first {
                        write!(f, "|")?;
                    }
                    first = false;
                    write!(f, "^{p}")?;
                }
                write!(f, ")")
            }
        }
    }
}
