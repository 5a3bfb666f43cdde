//! Caller-facing defaults for traversal relaxations and context selection.
//!
//! Threading an [`IgnoreSet`] and context selectors through every call site gets
//! tedious for an embedder that wants the same relaxations everywhere; `EngineConfig`
//! is a small `serde`-derived settings struct, loadable from a file or environment
//! variables, that seeds an [`crate::evaluator::Evaluator`] with sensible defaults.
//! Explicit builder calls on the evaluator still take precedence.

use serde::Deserialize;

use crate::directive::IgnoreSet;
use crate::error::DirectiveError;
use crate::name::Name;

const ENV_IGNORE: &str = "FIELDGRAPH_IGNORE";
const ENV_ONLY_CONTEXTS: &str = "FIELDGRAPH_ONLY_CONTEXTS";
const ENV_IGNORE_CONTEXTS: &str = "FIELDGRAPH_IGNORE_CONTEXTS";

/// Engine-wide defaults, distinct from any one record's directive graph.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    ignore: Vec<String>,
    only_contexts: Vec<String>,
    ignore_contexts: Vec<String>,
}

impl EngineConfig {
    /// Parses configuration from a TOML document, e.g. the contents of a
    /// `fieldgraph.toml` file.
    pub fn from_toml(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    /// Reads configuration from well-known environment variables: comma-separated
    /// ignore tokens and context tags. Missing variables leave the corresponding
    /// field empty.
    pub fn from_env() -> Self {
        EngineConfig {
            ignore: split_env(ENV_IGNORE),
            only_contexts: split_env(ENV_ONLY_CONTEXTS),
            ignore_contexts: split_env(ENV_IGNORE_CONTEXTS),
        }
    }

    pub fn ignore_set(&self) -> Result<IgnoreSet, DirectiveError> {
        IgnoreSet::parse(&self.ignore)
    }

    pub fn only_contexts(&self) -> Vec<Name> {
        self.only_contexts.iter().map(|s| Name::new(s.as_str())).collect()
    }

    pub fn ignore_contexts(&self) -> Vec<Name> {
        self.ignore_contexts.iter().map(|s| Name::new(s.as_str())).collect()
    }

    pub fn merge(mut self, other: EngineConfig) -> Self {
        if !other.ignore.is_empty() {
            self.ignore = other.ignore;
        }
        if !other.only_contexts.is_empty() {
            self.only_contexts = other.only_contexts;
        }
        if !other.ignore_contexts.is_empty() {
            self.ignore_contexts = other.ignore_contexts;
        }
        self
    }
}

fn split_env(var: &str) -> Vec<String> {
    std::env::var(var)
        .ok()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::IgnoreToken;

    #[test]
    fn parses_ignore_tokens_from_toml() {
        let config = EngineConfig::from_toml(
            r#"
            ignore = ["CONFLICTS", "MANDATORY"]
            only_contexts = ["billing"]
            "#,
        )
        .unwrap();
        let set = config.ignore_set().unwrap();
        assert!(set.contains(IgnoreToken::Conflicts));
        assert!(set.contains(IgnoreToken::Mandatory));
        assert!(!set.contains(IgnoreToken::Requirements));
        assert_eq!(config.only_contexts(), vec![Name::new("billing")]);
    }

    #[test]
    fn rejects_unknown_ignore_tokens_at_resolution_time() {
        let config = EngineConfig::from_toml(r#"ignore = ["NOT_A_TOKEN"]"#).unwrap();
        assert!(config.ignore_set().is_err());
    }

    #[test]
    fn merge_prefers_the_override_when_present() {
        let base = EngineConfig::from_toml(r#"ignore = ["CONFLICTS"]"#).unwrap();
        let override_cfg = EngineConfig::from_toml(r#"ignore = ["REQUIREMENTS"]"#).unwrap();
        let merged = base.merge(override_cfg);
        let set = merged.ignore_set().unwrap();
        assert!(set.contains(IgnoreToken::Requirements));
        assert!(!set.contains(IgnoreToken::Conflicts));
    }
}
