//! Per-field directives and the caller-supplied set of traversal relaxations.

use std::fmt::{self, Display, Formatter};

use strum_macros::{EnumIter, EnumString, IntoStaticStr};

use crate::error::DirectiveError;
use crate::name::Name;

/// The immutable, declarative descriptor attached to one field.
///
/// Built once per record class via [`DirectiveBuilder`] and shared read-only
/// thereafter through a [`crate::index::DirectiveIndex`].
#[derive(Debug, Clone)]
pub struct Directive {
    predicate: Option<Name>,
    mandatory: bool,
    alternatives: Vec<Name>,
    requires: Vec<Name>,
    conflicts: Vec<Name>,
    context: Option<Name>,
}

impl Directive {
    pub fn predicate(&self) -> Option<&Name> {
        self.predicate.as_ref()
    }

    pub fn mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn alternatives(&self) -> &[Name] {
        &self.alternatives
    }

    pub fn requires(&self) -> &[Name] {
        &self.requires
    }

    pub fn conflicts(&self) -> &[Name] {
        &self.conflicts
    }

    pub fn context(&self) -> Option<&Name> {
        self.context.as_ref()
    }
}

/// Builds a [`Directive`]. Mirrors the shape of the language-neutral declaration
/// format: every field but `predicate` defaults to empty/false.
#[derive(Debug, Default, Clone)]
pub struct DirectiveBuilder {
    predicate: Option<Name>,
    mandatory: bool,
    alternatives: Vec<Name>,
    requires: Vec<Name>,
    conflicts: Vec<Name>,
    context: Option<Name>,
}

impl DirectiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicate(mut self, predicate: impl Into<Name>) -> Self {
        self.predicate = Some(predicate.into());
        self
    }

    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn alternatives(mut self, alternatives: impl IntoIterator<Item = Name>) -> Self {
        self.alternatives = alternatives.into_iter().collect();
        self
    }

    pub fn requires(mut self, requires: impl IntoIterator<Item = Name>) -> Self {
        self.requires = requires.into_iter().collect();
        self
    }

    pub fn conflicts(mut self, conflicts: impl IntoIterator<Item = Name>) -> Self {
        self.conflicts = conflicts.into_iter().collect();
        self
    }

    pub fn context(mut self, context: impl Into<Name>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn build(self) -> Directive {
        Directive {
            predicate: self.predicate,
            mandatory: self.mandatory,
            alternatives: self.alternatives,
            requires: self.requires,
            conflicts: self.conflicts,
            context: self.context,
        }
    }
}

/// A single traversal relaxation the caller may enable before evaluating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IgnoreToken {
    Alternatives,
    Mandatory,
    Requirements,
    Conflicts,
}

impl Display for IgnoreToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s: &'static str = self.into();
        f.write_str(s)
    }
}

/// An immutable set of [`IgnoreToken`]s, snapshotted for the duration of one
/// `evaluate()` call. Never shared across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreSet {
    tokens: Vec<IgnoreToken>,
}

impl IgnoreSet {
    pub fn new(tokens: impl IntoIterator<Item = IgnoreToken>) -> Self {
        let mut tokens: Vec<_> = tokens.into_iter().collect();
        tokens.sort_by_key(|t| *t as u8);
        tokens.dedup();
        IgnoreSet { tokens }
    }

    /// Parses ignore tokens from their string form (as they'd arrive from
    /// configuration or an environment variable), rejecting unknown tokens.
    pub fn parse(tokens: impl IntoIterator<Item = impl AsRef<str>>) -> Result<Self, DirectiveError> {
        use std::str::FromStr;

        let mut parsed = Vec::new();
        for raw in tokens {
            let raw = raw.as_ref();
            let token = IgnoreToken::from_str(raw)
                .map_err(|_| DirectiveError::UnknownIgnoreToken(raw.to_string()))?;
            parsed.push(token);
        }
        Ok(IgnoreSet::new(parsed))
    }

    pub fn contains(&self, token: IgnoreToken) -> bool {
        self.tokens.contains(&token)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
