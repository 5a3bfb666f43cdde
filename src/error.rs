//! The diagnostic taxonomy raised by the evaluator.
//!
//! A small, closed set of `thiserror`-derived variants that carry exactly the
//! context a caller needs to explain *why* a record failed, plus one structural
//! error for directive graphs that don't resolve.

use crate::name::Name;

/// A fatal, structural problem with the directive graph itself: an unresolved
/// reference, an unknown predicate id, or an unknown ignore token. Raised eagerly,
/// before traversal proceeds past the offending directive.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DirectiveError {
    #[error("field \"{from}\" references unknown field \"{to}\" in its {relation}")]
    UnresolvedReference {
        from: Name,
        to: Name,
        relation: &'static str,
    },
    #[error("field \"{field}\" declares unknown predicate \"{predicate}\"")]
    UnknownPredicate { field: Name, predicate: Name },
    #[error("unknown ignore token \"{0}\"")]
    UnknownIgnoreToken(String),
    #[error("field \"{0}\" has no directive and cannot be evaluated")]
    NoDirective(Name),
    #[error("field \"{0}\" has a directive but declares no predicate")]
    MissingPredicate(Name),
}

/// The result of evaluating one record: either every directive-bearing field
/// passed, or the first offending relation is reported here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Diagnostic {
    #[error("directive graph error: {0}")]
    Directive(#[from] DirectiveError),

    /// Leaf predicate rejected the field, or the field is mandatory and absent with
    /// no viable alternative.
    #[error("field \"{field}\" is invalid{}", format_alternatives(.alternatives))]
    InvalidField {
        field: Name,
        alternatives: Vec<Name>,
    },

    /// At least one required field is absent or itself fails to validate.
    #[error("field \"{field}\" requires {}", format_referents(.requirements))]
    Requirements {
        field: Name,
        requirements: Vec<Name>,
        #[source]
        cause: Option<Box<Diagnostic>>,
    },

    /// At least one conflicting field validates alongside this one.
    #[error("field \"{field}\" conflicts with {}", format_referents(.conflicts))]
    ConflictField { field: Name, conflicts: Vec<Name> },

    /// A `requires` edge closes a cycle on the path currently being descended.
    #[error("cyclic requirement: {}", .path.iter().map(Name::as_str).collect::<Vec<_>>().join(" -> "))]
    CyclicRequirement { path: Vec<Name> },
}

fn format_alternatives(alternatives: &[Name]) -> String {
    if alternatives.is_empty() {
        String::new()
    } else {
        format!(
            " (no viable alternative among {})",
            format_referents(alternatives)
        )
    }
}

fn format_referents(names: &[Name]) -> String {
    use itertools::Itertools;

    match names {
        [] => "no fields".to_string(),
        [single] => format!("\"{single}\""),
        many => many.iter().map(|n| format!("\"{n}\"")).join(", "),
    }
}

impl Diagnostic {
    pub fn field(&self) -> Option<&Name> {
        match self {
            Diagnostic::Directive(_) => None,
            Diagnostic::InvalidField { field, .. } => Some(field),
            Diagnostic::Requirements { field, .. } => Some(field),
            Diagnostic::ConflictField { field, .. } => Some(field),
            Diagnostic::CyclicRequirement { .. } => None,
        }
    }

    pub(crate) fn requirements(field: Name, requirements: Vec<Name>, cause: Diagnostic) -> Self {
        Diagnostic::Requirements {
            field,
            requirements,
            cause: Some(Box::new(cause)),
        }
    }
}
