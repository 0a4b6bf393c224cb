//! RDF term model.
//!
//! Terms are plain values: two nodes are the same node iff they are equal.
//! The textual form used by `Display` and [`Node::parse`] is the N-Triples
//! term syntax, plus `?name` for variables.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::GraphError;

/// An RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Iri {
        iri: String,
    },
    Blank {
        id: String,
    },
    Literal {
        lexical: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    /// Only meaningful as a (degraded) start node handed in by a caller.
    Variable {
        name: String,
    },
}

impl Node {
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri { iri: iri.into() }
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Node::Blank { id: id.into() }
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Node::Literal {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Node::Literal {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang_literal(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Node::Literal {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::Variable { name: name.into() }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Node::Variable { .. })
    }

    /// Parse a term in N-Triples display form (`<iri>`, `_:b`, `"lex"@en`,
    /// `"lex"^^<dt>`) or a `?var`.
    pub fn parse(term: &str) -> Result<Node, GraphError> {
        let s = term.trim();

        if let Some(rest) = s.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
            return Ok(Node::iri(rest));
        }
        if let Some(rest) = s.strip_prefix("_:") {
            if rest.is_empty() {
                return Err(GraphError::InvalidTerm(s.to_string()));
            }
            return Ok(Node::blank(rest));
        }
        if let Some(rest) = s.strip_prefix('?').or_else(|| s.strip_prefix('$')) {
            if rest.is_empty() {
                return Err(GraphError::InvalidTerm(s.to_string()));
            }
            return Ok(Node::variable(rest));
        }
        if s.starts_with('"') {
            return parse_literal(s);
        }

        Err(GraphError::InvalidTerm(s.to_string()))
    }
}

fn parse_literal(s: &str) -> Result<Node, GraphError> {
    let mut end_quote = None;
    let mut escaped = false;
    for (i, ch) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => {
                end_quote = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(end) = end_quote else {
        return Err(GraphError::InvalidTerm(s.to_string()));
    };

    let lexical = unescape(&s[1..end]);
    let rest = s[end + 1..].trim();

    if rest.is_empty() {
        return Ok(Node::literal(lexical));
    }
    if let Some(lang) = rest.strip_prefix('@') {
        return Ok(Node::lang_literal(lexical, lang));
    }
    if let Some(dt) = rest.strip_prefix("^^") {
        let dt = dt.trim();
        let dt = dt
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .unwrap_or(dt);
        return Ok(Node::typed_literal(lexical, dt));
    }

    Err(GraphError::InvalidTerm(s.to_string()))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Iri { iri } => write!(f, "<{iri}>"),
            Node::Blank { id } => write!(f, "_:{id}"),
            Node::Literal {
                lexical,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape(lexical))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
            Node::Variable { name } => write!(f, "?{name}"),
        }
    }
}

impl std::str::FromStr for Node {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Node::parse(s)
    }
}

/// An ordered `(subject, predicate, object)` fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Node,
    pub predicate: Node,
    pub object: Node,
}

impl Triple {
    pub fn new(subject: Node, predicate: Node, object: Node) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
