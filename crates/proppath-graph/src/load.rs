//! RDF file loading (boundary adapter).
//!
//! Parses RDF serializations with **Sophia** into a [`MemGraph`]:
//! - N-Triples (`.nt`)
//! - Turtle (`.ttl`)
//! - RDF/XML (`.rdf`, `.owl`, `.xml`)
//!
//! Quads formats are not loaded: the evaluator works over a single graph.

use sophia::api::prelude::*;
use std::io::BufRead;
use std::path::Path;

use crate::store::MemGraph;
use crate::term::{self, Node};
use crate::GraphError;

pub const XSD_STRING_IRI: &str = "http://www.w3.org/2001/XMLSchema#string";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    NTriples,
    Turtle,
    RdfXml,
}

impl RdfFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "nt" => Some(RdfFormat::NTriples),
            "ttl" => Some(RdfFormat::Turtle),
            "rdf" | "owl" | "xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RdfFormat::NTriples => "N-Triples",
            RdfFormat::Turtle => "Turtle",
            RdfFormat::RdfXml => "RDF/XML",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct LoadSinkError(GraphError);

/// Load a graph from a file, picking the format from its extension.
pub fn load_path(path: &Path) -> Result<MemGraph, GraphError> {
    let format = RdfFormat::from_path(path)
        .ok_or_else(|| GraphError::UnknownFormat(path.display().to_string()))?;
    let bytes = std::fs::read(path)?;
    let graph = load_bytes(&bytes, format)?;
    tracing::debug!(
        path = %path.display(),
        format = format.name(),
        triples = graph.len(),
        "loaded graph"
    );
    Ok(graph)
}

/// Load a graph from in-memory bytes in the given format.
pub fn load_bytes(bytes: &[u8], format: RdfFormat) -> Result<MemGraph, GraphError> {
    let reader = std::io::BufReader::new(std::io::Cursor::new(bytes));
    load_reader(reader, format)
}

pub fn load_reader<R: BufRead>(reader: R, format: RdfFormat) -> Result<MemGraph, GraphError> {
    let mut graph = MemGraph::new();

    let mut sink = |s: String, p: String, o: String| -> Result<(), LoadSinkError> {
        let triple = term::Triple::new(
            parse_loaded_term(&s).map_err(LoadSinkError)?,
            parse_loaded_term(&p).map_err(LoadSinkError)?,
            parse_loaded_term(&o).map_err(LoadSinkError)?,
        );
        graph.insert(triple);
        Ok(())
    };

    let parse_error = |e: &dyn std::fmt::Display| GraphError::Parse {
        format: format.name(),
        message: e.to_string(),
    };

    match format {
        RdfFormat::NTriples => {
            let mut parser = sophia::turtle::parser::nt::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    sink(t.s().to_string(), t.p().to_string(), t.o().to_string())
                })
                .map_err(|e| parse_error(&e))?;
        }
        RdfFormat::Turtle => {
            let mut parser = sophia::turtle::parser::turtle::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    sink(t.s().to_string(), t.p().to_string(), t.o().to_string())
                })
                .map_err(|e| parse_error(&e))?;
        }
        RdfFormat::RdfXml => {
            let mut parser = sophia::xml::parser::parse_bufread(reader);
            parser
                .try_for_each_triple(|t| {
                    sink(t.s().to_string(), t.p().to_string(), t.o().to_string())
                })
                .map_err(|e| parse_error(&e))?;
        }
    }

    Ok(graph)
}

/// Parse a Sophia-rendered term. `xsd:string` literals are stored as simple
/// literals so `"x"` and `"x"^^xsd:string` are one node.
fn parse_loaded_term(display: &str) -> Result<Node, GraphError> {
    match Node::parse(display)? {
        Node::Literal {
            lexical,
            datatype: Some(dt),
            language: None,
        } if dt == XSD_STRING_IRI => Ok(Node::literal(lexical)),
        other => Ok(other),
    }
}
