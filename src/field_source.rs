//! The `FieldSource` collaborator: enumerates a record's fields and reads values.
//!
//! The engine never reflects over a record itself; it only ever goes through this
//! trait, keeping the graph-walking logic independent of whatever concrete record
//! type an embedder backs it with.

use indexmap::IndexMap;

use crate::name::Name;

/// One primitive value a built-in [`crate::predicate::ValuePredicate`] understands.
/// Embedders backing `FieldSource` with their own record types are free to ignore
/// this enum entirely and implement `ValuePredicate` over their own value type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Number(f64),
    Bool(bool),
}

/// The result of reading one field from a record.
#[derive(Debug, Clone)]
pub enum FieldRead<V> {
    Present(V),
    Absent,
}

impl<V> FieldRead<V> {
    pub fn is_present(&self) -> bool {
        matches!(self, FieldRead::Present(_))
    }

    pub fn as_ref(&self) -> FieldRead<&V> {
        match self {
            FieldRead::Present(v) => FieldRead::Present(v),
            FieldRead::Absent => FieldRead::Absent,
        }
    }

    pub fn into_option(self) -> Option<V> {
        match self {
            FieldRead::Present(v) => Some(v),
            FieldRead::Absent => None,
        }
    }
}

/// External collaborator: enumerates a record's named fields and reads their
/// current values. Implementations are expected to be cheap and side-effect free;
/// the evaluator may call `read` for the same field more than once per traversal
/// (e.g. once as a top-level visit, again as a requirement of another field).
pub trait FieldSource {
    type Record;

    /// Field names present on the record, in a stable, implementation-defined
    /// order. Ties in the evaluator's traversal order are broken by this order.
    fn fields(&self, record: &Self::Record) -> Vec<Name>;

    fn read(&self, record: &Self::Record, name: &Name) -> FieldRead<FieldValue>;
}

/// A reference `FieldSource` over an ordered map, used by the demo CLI and the
/// integration tests. Production embedders will usually implement `FieldSource`
/// directly over their own generated record types instead, the way a reflective
/// bean accessor or a precomputed field table would.
#[derive(Debug, Clone, Default)]
pub struct MapFieldSource;

/// The record type paired with [`MapFieldSource`]: the declared field order of the
/// record's class (present whether or not a value was ever set, the same way a
/// reflective accessor list doesn't shrink when a property happens to be null)
/// plus the values actually populated.
#[derive(Debug, Clone, Default)]
pub struct MapRecord {
    declared: Vec<Name>,
    values: IndexMap<Name, FieldValue>,
}

impl MapRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field with no value, so it still participates in traversal
    /// (e.g. a mandatory field that's absent).
    pub fn declare(mut self, name: impl Into<Name>) -> Self {
        let name = name.into();
        if !self.declared.contains(&name) {
            self.declared.push(name);
        }
        self
    }

    /// Declares a field and gives it a value in one step.
    pub fn with(mut self, name: impl Into<Name>, value: FieldValue) -> Self {
        let name = name.into();
        if !self.declared.contains(&name) {
            self.declared.push(name.clone());
        }
        self.values.insert(name, value);
        self
    }
}

impl FieldSource for MapFieldSource {
    type Record = MapRecord;

    fn fields(&self, record: &Self::Record) -> Vec<Name> {
        record.declared.clone()
    }

    fn read(&self, record: &Self::Record, name: &Name) -> FieldRead<FieldValue> {
        match record.values.get(name) {
            Some(value) => FieldRead::Present(value.clone()),
            None => FieldRead::Absent,
        }
    }
}
