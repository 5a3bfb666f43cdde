#![allow(dead_code)] // TODO: internal helpers grow ahead of their call sites while the built-in predicate/config surface fills out.

pub mod config;
pub mod cycle;
pub mod directive;
pub mod error;
pub mod evaluator;
pub mod field_source;
pub mod index;
pub mod name;
pub mod predicate;

pub use crate::config::EngineConfig;
pub use crate::directive::{Directive, DirectiveBuilder, IgnoreSet, IgnoreToken};
pub use crate::error::{Diagnostic, DirectiveError};
pub use crate::evaluator::Evaluator;
pub use crate::field_source::{FieldRead, FieldSource, FieldValue, MapFieldSource, MapRecord};
pub use crate::index::{DirectiveIndex, DirectiveIndexBuilder};
pub use crate::name::Name;
pub use crate::predicate::{PredicateOutcome, PredicateRegistry, ValuePredicate};
