//! The `ValuePredicate` collaborator and its built-in registry.

use std::sync::Arc;

use indexmap::IndexMap;
use lazy_static::lazy_static;

use crate::error::DirectiveError;
use crate::field_source::FieldValue;
use crate::name::Name;

/// The outcome of a leaf value check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateOutcome {
    Accept,
    RejectFormat,
}

impl PredicateOutcome {
    pub fn is_accepted(self) -> bool {
        matches!(self, PredicateOutcome::Accept)
    }
}

/// External collaborator: decides whether one field value satisfies a named
/// predicate. Built-in predicates are stateless; embedders may register predicates
/// that hold their own state (e.g. a compiled regex) behind `Arc`.
pub trait ValuePredicate: std::fmt::Debug + Send + Sync {
    fn check(&self, value: &FieldValue) -> PredicateOutcome;
}

#[derive(Debug, Clone, Copy)]
struct NonEmptyString;
impl ValuePredicate for NonEmptyString {
    fn check(&self, value: &FieldValue) -> PredicateOutcome {
        match value {
            FieldValue::Str(s) if !s.trim().is_empty() => PredicateOutcome::Accept,
            _ => PredicateOutcome::RejectFormat,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct PositiveNumber;
impl ValuePredicate for PositiveNumber {
    fn check(&self, value: &FieldValue) -> PredicateOutcome {
        match value {
            FieldValue::Number(n) if *n > 0.0 => PredicateOutcome::Accept,
            _ => PredicateOutcome::RejectFormat,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct NonNegativeNumber;
impl ValuePredicate for NonNegativeNumber {
    fn check(&self, value: &FieldValue) -> PredicateOutcome {
        match value {
            FieldValue::Number(n) if *n >= 0.0 => PredicateOutcome::Accept,
            _ => PredicateOutcome::RejectFormat,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct BooleanPredicate;
impl ValuePredicate for BooleanPredicate {
    fn check(&self, value: &FieldValue) -> PredicateOutcome {
        match value {
            FieldValue::Bool(_) => PredicateOutcome::Accept,
            _ => PredicateOutcome::RejectFormat,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Any;
impl ValuePredicate for Any {
    fn check(&self, _value: &FieldValue) -> PredicateOutcome {
        PredicateOutcome::Accept
    }
}

lazy_static! {
    static ref NON_EMPTY_STRING: Arc<dyn ValuePredicate> = Arc::new(NonEmptyString);
    static ref POSITIVE_NUMBER: Arc<dyn ValuePredicate> = Arc::new(PositiveNumber);
    static ref NON_NEGATIVE_NUMBER: Arc<dyn ValuePredicate> = Arc::new(NonNegativeNumber);
    static ref BOOLEAN: Arc<dyn ValuePredicate> = Arc::new(BooleanPredicate);
    static ref ANY: Arc<dyn ValuePredicate> = Arc::new(Any);
}

/// A registry of named predicates, pre-populated with a handful of built-ins and
/// open to caller registration, the way an embedder would extend any small
/// plugin registry with its own definitions.
#[derive(Debug, Clone)]
pub struct PredicateRegistry {
    predicates: IndexMap<Name, Arc<dyn ValuePredicate>>,
}

impl Default for PredicateRegistry {
    fn default() -> Self {
        let mut predicates: IndexMap<Name, Arc<dyn ValuePredicate>> = IndexMap::new();
        predicates.insert(Name::new("non_empty_string"), NON_EMPTY_STRING.clone());
        predicates.insert(Name::new("positive_number"), POSITIVE_NUMBER.clone());
        predicates.insert(Name::new("non_negative_number"), NON_NEGATIVE_NUMBER.clone());
        predicates.insert(Name::new("boolean"), BOOLEAN.clone());
        predicates.insert(Name::new("any"), ANY.clone());
        PredicateRegistry { predicates }
    }
}

impl PredicateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<Name>, predicate: Arc<dyn ValuePredicate>) {
        self.predicates.insert(id.into(), predicate);
    }

    pub fn resolve(&self, id: &Name) -> Option<Arc<dyn ValuePredicate>> {
        self.predicates.get(id).cloned()
    }

    /// Resolves `id`, returning a [`DirectiveError::UnknownPredicate`] attributed to
    /// `field` when the id isn't registered.
    pub fn resolve_for_field(
        &self,
        field: &Name,
        id: &Name,
    ) -> Result<Arc<dyn ValuePredicate>, DirectiveError> {
        self.resolve(id)
            .ok_or_else(|| DirectiveError::UnknownPredicate {
                field: field.clone(),
                predicate: id.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_string_rejects_blank_values() {
        let registry = PredicateRegistry::new();
        let predicate = registry.resolve(&Name::new("non_empty_string")).unwrap();
        assert_eq!(
            predicate.check(&FieldValue::Str("   ".into())),
            PredicateOutcome::RejectFormat
        );
        assert_eq!(
            predicate.check(&FieldValue::Str("ok".into())),
            PredicateOutcome::Accept
        );
    }

    #[test]
    fn positive_number_rejects_zero_and_negatives() {
        let registry = PredicateRegistry::new();
        let predicate = registry.resolve(&Name::new("positive_number")).unwrap();
        assert_eq!(
            predicate.check(&FieldValue::Number(0.0)),
            PredicateOutcome::RejectFormat
        );
        assert_eq!(
            predicate.check(&FieldValue::Number(1.0)),
            PredicateOutcome::Accept
        );
    }

    #[test]
    fn unknown_predicate_id_reports_requesting_field() {
        let registry = PredicateRegistry::new();
        let err = registry
            .resolve_for_field(&Name::new("prop"), &Name::new("bogus"))
            .unwrap_err();
        assert_eq!(
            err,
            DirectiveError::UnknownPredicate {
                field: Name::new("prop"),
                predicate: Name::new("bogus"),
            }
        );
    }
}
