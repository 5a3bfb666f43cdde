//! Resolves field names to their [`Directive`], shared read-only across evaluations.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::directive::Directive;
use crate::error::DirectiveError;
use crate::name::Name;

/// Map from field name to its [`Directive`]. Built once per record class.
///
/// Preserves insertion order (via [`IndexMap`]) so that iteration order is
/// deterministic and matches the order directives were declared.
#[derive(Debug, Clone, Default)]
pub struct DirectiveIndex {
    directives: IndexMap<Name, Directive>,
}

impl DirectiveIndex {
    pub fn builder() -> DirectiveIndexBuilder {
        DirectiveIndexBuilder::default()
    }

    pub fn get(&self, name: &Name) -> Option<&Directive> {
        self.directives.get(name)
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.directives.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Name, &Directive)> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// Verifies that every name referenced by `alternatives`, `requires`, and
    /// `conflicts` resolves to either a directive in this index or simply isn't
    /// required to have one (referenced-but-undirected names are legal: see
    /// the "no directive" child form in `check_requirements`). Unresolved
    /// *directives* that a relation points at and that genuinely don't exist on
    /// the record are caught lazily at traversal time via `FieldSource`; this
    /// check only guards against directives whose own declared relations form
    /// an internally inconsistent graph at construction time.
    pub fn validate(&self) -> Result<(), DirectiveError> {
        for (name, directive) in &self.directives {
            for alt in directive.alternatives() {
                if alt == name {
                    return Err(DirectiveError::UnresolvedReference {
                        from: name.clone(),
                        to: alt.clone(),
                        relation: "alternatives",
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct DirectiveIndexBuilder {
    directives: IndexMap<Name, Directive>,
}

impl DirectiveIndexBuilder {
    pub fn field(mut self, name: impl Into<Name>, directive: Directive) -> Self {
        self.directives.insert(name.into(), directive);
        self
    }

    pub fn build(self) -> Arc<DirectiveIndex> {
        Arc::new(DirectiveIndex {
            directives: self.directives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::DirectiveBuilder;

    #[test]
    fn resolves_registered_fields_and_rejects_self_alternatives() {
        let index = DirectiveIndex::builder()
            .field(
                "primary",
                DirectiveBuilder::new()
                    .predicate("non_empty_string")
                    .mandatory(true)
                    .build(),
            )
            .build();
        assert!(index.get(&Name::new("primary")).is_some());
        assert!(index.get(&Name::new("missing")).is_none());

        let bad = DirectiveIndex::builder()
            .field(
                "primary",
                DirectiveBuilder::new()
                    .alternatives([Name::new("primary")])
                    .build(),
            )
            .build();
        assert!(bad.validate().is_err());
    }
}
