//! Orchestrates the walk: ordering, cascade, alternatives, requirements, conflicts.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{instrument, trace};

use crate::config::EngineConfig;
use crate::cycle::CycleGuard;
use crate::directive::{Directive, IgnoreSet, IgnoreToken};
use crate::error::{Diagnostic, DirectiveError};
use crate::field_source::{FieldRead, FieldSource, FieldValue};
use crate::index::DirectiveIndex;
use crate::name::Name;
use crate::predicate::{PredicateOutcome, PredicateRegistry};

/// Orchestrates one `evaluate()` call over a single record.
///
/// Built fresh per record; the [`DirectiveIndex`] and [`PredicateRegistry`] it
/// borrows are the only state shared across calls.
pub struct Evaluator<'a, S: FieldSource> {
    record: &'a S::Record,
    field_source: S,
    directives: Arc<DirectiveIndex>,
    predicates: Arc<PredicateRegistry>,
    ignore: IgnoreSet,
    only_contexts: Option<HashSet<Name>>,
    ignore_contexts: Option<HashSet<Name>>,
}

impl<'a, S: FieldSource> Evaluator<'a, S> {
    pub fn new(
        record: &'a S::Record,
        field_source: S,
        directives: Arc<DirectiveIndex>,
        predicates: Arc<PredicateRegistry>,
    ) -> Self {
        Evaluator {
            record,
            field_source,
            directives,
            predicates,
            ignore: IgnoreSet::default(),
            only_contexts: None,
            ignore_contexts: None,
        }
    }

    /// Seeds the `IgnoreSet` and context selectors from an [`EngineConfig`].
    /// Explicit `.ignoring(...)`/`.only_contexts(...)`/`.ignore_contexts(...)` calls
    /// made afterward still override these defaults.
    pub fn from_config(
        record: &'a S::Record,
        field_source: S,
        directives: Arc<DirectiveIndex>,
        predicates: Arc<PredicateRegistry>,
        config: &EngineConfig,
    ) -> Result<Self, DirectiveError> {
        let mut evaluator = Self::new(record, field_source, directives, predicates);
        evaluator.ignore = config.ignore_set()?;
        let only = config.only_contexts();
        if !only.is_empty() {
            evaluator.only_contexts = Some(only.into_iter().collect());
        }
        let ignore_contexts = config.ignore_contexts();
        if !ignore_contexts.is_empty() {
            evaluator.ignore_contexts = Some(ignore_contexts.into_iter().collect());
        }
        Ok(evaluator)
    }

    pub fn ignoring(mut self, tokens: impl IntoIterator<Item = IgnoreToken>) -> Self {
        self.ignore = IgnoreSet::new(tokens);
        self
    }

    pub fn only_contexts(mut self, tags: impl IntoIterator<Item = Name>) -> Self {
        self.only_contexts = Some(tags.into_iter().collect());
        self
    }

    pub fn ignore_contexts(mut self, tags: impl IntoIterator<Item = Name>) -> Self {
        self.ignore_contexts = Some(tags.into_iter().collect());
        self
    }

    fn context_participates(&self, directive: &Directive) -> bool {
        match directive.context() {
            Some(tag) => {
                if let Some(only) = &self.only_contexts {
                    if !only.contains(tag) {
                        return false;
                    }
                }
                if let Some(ignore) = &self.ignore_contexts {
                    if ignore.contains(tag) {
                        return false;
                    }
                }
                true
            }
            None => self.only_contexts.is_none(),
        }
    }

    /// The ordered set of directive-bearing, context-participating fields: mandatory
    /// fields first, ties broken by the order `FieldSource` reports for the record
    /// (fields the source never mentions - e.g. a reflective source that only lists
    /// populated properties - sort after ones it does, in directive declaration
    /// order).
    fn traversal_order(&self) -> Vec<Name> {
        let source_order = self.field_source.fields(self.record);
        let mut fields: Vec<(Name, bool, usize)> = self
            .directives
            .iter()
            .filter(|(_, d)| self.context_participates(d))
            .map(|(name, d)| {
                let position = source_order
                    .iter()
                    .position(|n| n == name)
                    .unwrap_or(source_order.len());
                (name.clone(), d.mandatory(), position)
            })
            .collect();
        fields.sort_by_key(|(_, mandatory, position)| (!*mandatory, *position));
        fields.into_iter().map(|(name, ..)| name).collect()
    }

    fn read(&self, name: &Name) -> FieldRead<FieldValue> {
        self.field_source.read(self.record, name)
    }

    /// Runs the leaf predicate for `name`, inheriting `fallback`'s predicate id when
    /// `name` has no directive of its own or its directive declares none.
    fn run_predicate(
        &self,
        name: &Name,
        directive: Option<&Directive>,
        fallback: &Name,
        value: &FieldValue,
    ) -> Result<PredicateOutcome, Diagnostic> {
        let predicate_id = directive
            .and_then(Directive::predicate)
            .unwrap_or(fallback);
        let predicate = self
            .predicates
            .resolve_for_field(name, predicate_id)
            .map_err(Diagnostic::from)?;
        Ok(predicate.check(value))
    }

    /// Evaluates the record against every directive-bearing, context-participating
    /// field in traversal order, returning the first failure encountered.
    #[instrument(skip(self), level = "debug")]
    pub fn evaluate(&self) -> Result<(), Diagnostic> {
        for name in self.traversal_order() {
            let directive = self
                .directives
                .get(&name)
                .ok_or_else(|| DirectiveError::NoDirective(name.clone()))?;
            trace!(field = %name, mandatory = directive.mandatory(), "visiting field");
            self.visit_top(&name, directive)?;
        }
        Ok(())
    }

    fn visit_top(&self, name: &Name, directive: &Directive) -> Result<(), Diagnostic> {
        match self.read(name) {
            FieldRead::Absent if !directive.mandatory() => {
                trace!(field = %name, "absent and optional, passes vacuously");
                Ok(())
            }
            FieldRead::Absent => {
                trace!(field = %name, "absent and mandatory, resolving alternatives");
                self.resolve_alternatives(name, directive)
            }
            FieldRead::Present(value) => {
                let predicate_id = directive
                    .predicate()
                    .ok_or_else(|| DirectiveError::MissingPredicate(name.clone()))?;
                if self
                    .run_predicate(name, Some(directive), predicate_id, &value)?
                    .is_accepted()
                {
                    let mut guard = CycleGuard::new();
                    // `name` anchors the path so a cycle back to it reads the same
                    // way the record declared it, e.g. `[prop, prop1, prop]`.
                    guard.enter(name)?;
                    let result = self.check_requirements(name, directive, &mut guard);
                    guard.leave(name);
                    result?;
                    self.check_conflicts(name, directive)?;
                    Ok(())
                } else {
                    Err(Diagnostic::InvalidField {
                        field: name.clone(),
                        alternatives: Vec::new(),
                    })
                }
            }
        }
    }

    /// Section 4.2: alternative resolution for an absent, mandatory top-level field.
    fn resolve_alternatives(&self, name: &Name, directive: &Directive) -> Result<(), Diagnostic> {
        let alternatives = directive.alternatives();
        if self.ignore.contains(IgnoreToken::Alternatives) {
            return Err(Diagnostic::InvalidField {
                field: name.clone(),
                alternatives: alternatives.to_vec(),
            });
        }
        if self.ignore.contains(IgnoreToken::Mandatory) {
            return Ok(());
        }
        for candidate in alternatives {
            let FieldRead::Present(value) = self.read(candidate) else {
                continue;
            };
            let candidate_directive = self.directives.get(candidate);
            let requirements_ok = match candidate_directive {
                Some(d) => {
                    let mut guard = CycleGuard::new();
                    let entered = guard.enter(candidate).is_ok();
                    entered && self.check_requirements_child(candidate, d, &mut guard).is_ok()
                }
                None => true,
            };
            if !requirements_ok {
                continue;
            }
            let predicate_id = directive.predicate().unwrap_or(name);
            let accepted = self
                .run_predicate(candidate, candidate_directive, predicate_id, &value)?
                .is_accepted();
            if !accepted {
                continue;
            }
            let conflicts_ok = match candidate_directive {
                Some(d) => self.check_conflicts(candidate, d).is_ok(),
                None => true,
            };
            if conflicts_ok {
                trace!(field = %name, alternative = %candidate, "alternative satisfied field");
                return Ok(());
            }
        }
        Err(Diagnostic::InvalidField {
            field: name.clone(),
            alternatives: alternatives.to_vec(),
        })
    }

    /// Section 4.3, top form: requirements of a field that just passed its own leaf
    /// predicate at the top level.
    fn check_requirements(
        &self,
        name: &Name,
        directive: &Directive,
        guard: &mut CycleGuard,
    ) -> Result<(), Diagnostic> {
        self.check_requirements_inner(name, directive, guard)
    }

    /// Section 4.3, child form. Distinguished from the top form only by caller
    /// context (no alternatives precede it); the requirement semantics are
    /// identical once a field's own presence+predicate have been confirmed.
    fn check_requirements_child(
        &self,
        name: &Name,
        directive: &Directive,
        guard: &mut CycleGuard,
    ) -> Result<(), Diagnostic> {
        self.check_requirements_inner(name, directive, guard)
    }

    fn check_requirements_inner(
        &self,
        name: &Name,
        directive: &Directive,
        guard: &mut CycleGuard,
    ) -> Result<(), Diagnostic> {
        if self.ignore.contains(IgnoreToken::Requirements) {
            return Ok(());
        }
        for required in directive.requires() {
            self.check_one_requirement(name, required, directive, guard)?;
        }
        Ok(())
    }

    /// Checks that `required` validates as a required child of `parent`. On
    /// failure, returns the final `Requirements(parent, [required])` diagnostic
    /// directly for a merely-absent requirement, or that same diagnostic with the
    /// deeper cause chained when `required` has its own directive and fails its own
    /// predicate, requirements, or conflicts.
    fn check_one_requirement(
        &self,
        parent: &Name,
        required: &Name,
        parent_directive: &Directive,
        guard: &mut CycleGuard,
    ) -> Result<(), Diagnostic> {
        let absent = || Diagnostic::Requirements {
            field: parent.clone(),
            requirements: vec![required.clone()],
            cause: None,
        };
        match self.directives.get(required) {
            None => {
                // No directive: the requirement is satisfied by mere presence.
                if self.read(required).is_present() {
                    Ok(())
                } else {
                    Err(absent())
                }
            }
            Some(required_directive) => {
                guard.enter(required)?;
                let result = (|| {
                    let value = match self.read(required) {
                        FieldRead::Present(v) => v,
                        FieldRead::Absent => return Err(absent()),
                    };
                    let fallback = parent_directive.predicate().unwrap_or(parent);
                    let accepted = self
                        .run_predicate(required, Some(required_directive), fallback, &value)?
                        .is_accepted();
                    if !accepted {
                        let cause = Diagnostic::InvalidField {
                            field: required.clone(),
                            alternatives: Vec::new(),
                        };
                        return Err(Diagnostic::requirements(
                            parent.clone(),
                            vec![required.clone()],
                            cause,
                        ));
                    }
                    if let Err(cause) =
                        self.check_requirements_child(required, required_directive, guard)
                    {
                        return Err(Diagnostic::requirements(
                            parent.clone(),
                            vec![required.clone()],
                            cause,
                        ));
                    }
                    if let Err(cause) = self.check_conflicts(required, required_directive) {
                        return Err(Diagnostic::requirements(
                            parent.clone(),
                            vec![required.clone()],
                            cause,
                        ));
                    }
                    Ok(())
                })();
                guard.leave(required);
                result
            }
        }
    }

    /// Section 4.4: conflict checking, one edge deep regardless of top/child form.
    fn check_conflicts(&self, name: &Name, directive: &Directive) -> Result<(), Diagnostic> {
        if self.ignore.contains(IgnoreToken::Conflicts) {
            return Ok(());
        }
        for conflicting in directive.conflicts() {
            let FieldRead::Present(value) = self.read(conflicting) else {
                continue;
            };
            let conflicting_directive = self.directives.get(conflicting);
            let fallback = directive.predicate().unwrap_or(name);
            let accepted = self
                .run_predicate(conflicting, conflicting_directive, fallback, &value)?
                .is_accepted();
            if accepted {
                return Err(Diagnostic::ConflictField {
                    field: name.clone(),
                    conflicts: vec![conflicting.clone()],
                });
            }
        }
        Ok(())
    }
}
