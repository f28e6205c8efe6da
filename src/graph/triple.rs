//! Triples - Subject / predicate / object statements
//!
//! Objects are either another entity IRI or a typed literal. Literals keep
//! their lexical form plus an explicit datatype, which makes every triple
//! totally ordered and hashable (needed for set semantics).

use crate::iri::Iri;
use crate::vocab::xsd;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Datatype tag carried by every literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Integer,
    Boolean,
    Double,
    DateTime,
}

impl Datatype {
    /// XSD IRI of the datatype
    pub fn iri(&self) -> &'static str {
        match self {
            Datatype::String => xsd::STRING,
            Datatype::Integer => xsd::INTEGER,
            Datatype::Boolean => xsd::BOOLEAN,
            Datatype::Double => xsd::DOUBLE,
            Datatype::DateTime => xsd::DATE_TIME,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::String => "string",
            Datatype::Integer => "integer",
            Datatype::Boolean => "boolean",
            Datatype::Double => "double",
            Datatype::DateTime => "dateTime",
        }
    }
}

/// A typed literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Literal {
    /// Lexical form
    pub lexical: String,
    pub datatype: Datatype,
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Self {
            lexical: value.into(),
            datatype: Datatype::String,
        }
    }

    pub fn integer(value: i64) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Integer,
        }
    }

    /// Counts and positions; saturates at `i64::MAX`
    pub fn count(value: usize) -> Self {
        Self::integer(i64::try_from(value).unwrap_or(i64::MAX))
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            lexical: value.to_string(),
            datatype: Datatype::Boolean,
        }
    }

    /// `xsd:double`; non-finite values use the `INF`, `-INF` and `NaN` forms
    pub fn double(value: f64) -> Self {
        let lexical = if value.is_nan() {
            "NaN".to_string()
        } else if value == f64::INFINITY {
            "INF".to_string()
        } else if value == f64::NEG_INFINITY {
            "-INF".to_string()
        } else {
            format!("{value:?}")
        };
        Self {
            lexical,
            datatype: Datatype::Double,
        }
    }

    pub fn datetime(value: DateTime<Utc>) -> Self {
        Self {
            lexical: value.to_rfc3339_opts(SecondsFormat::Secs, true),
            datatype: Datatype::DateTime,
        }
    }

    /// Integer value, if this is an integer literal
    pub fn as_integer(&self) -> Option<i64> {
        match self.datatype {
            Datatype::Integer => self.lexical.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.datatype {
            Datatype::Boolean => self.lexical.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\"^^<{}>",
            self.lexical.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n"),
            self.datatype.iri()
        )
    }
}

/// Object position of a triple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Term {
    Iri(Iri),
    Literal(Literal),
}

impl Term {
    pub fn as_iri(&self) -> Option<&Iri> {
        match self {
            Term::Iri(iri) => Some(iri),
            Term::Literal(_) => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Term::Literal(lit) => Some(lit),
            Term::Iri(_) => None,
        }
    }
}

impl From<Iri> for Term {
    fn from(iri: Iri) -> Self {
        Term::Iri(iri)
    }
}

impl From<Literal> for Term {
    fn from(lit: Literal) -> Self {
        Term::Literal(lit)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => write!(f, "<{iri}>"),
            Term::Literal(lit) => write!(f, "{lit}"),
        }
    }
}

/// A single statement in the output graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Iri,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Iri, predicate: impl Into<Iri>, object: impl Into<Term>) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object: object.into(),
        }
    }

    /// True when the object is an entity rather than a literal
    pub fn is_relationship(&self) -> bool {
        matches!(self.object, Term::Iri(_))
    }
}

impl fmt::Display for Triple {
    /// One statement per line, N-Triples style
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}> <{}> {} .", self.subject, self.predicate, self.object)
    }
}
