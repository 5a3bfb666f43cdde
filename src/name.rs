use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A field or predicate identifier.
///
/// Cloning a `Name` is a reference-count bump, not a string copy, since the same
/// handful of names (a record's field names, a handful of predicate ids) get cloned
/// repeatedly while walking the requirement/conflict graph.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Name(Arc<str>);

impl Name {
    pub fn new(value: impl Into<Arc<str>>) -> Self {
        Name(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strips a leading accessor prefix (`get`, `is`, `has`) and lower-cases the
    /// leading character, so diagnostics read as field names rather than accessor
    /// names (e.g. `getExternalId` -> `externalId`).
    pub fn normalize_accessor(raw: &str) -> Name {
        for prefix in ["get", "is", "has"] {
            if let Some(rest) = raw.strip_prefix(prefix) {
                if rest.starts_with(|c: char| c.is_ascii_uppercase()) {
                    let mut chars = rest.chars();
                    let first = chars.next().expect("checked non-empty above");
                    let lowered: String =
                        first.to_ascii_lowercase().to_string() + chars.as_str();
                    return Name::new(lowered);
                }
            }
        }
        Name::new(raw)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", self.0)
    }
}

impl From<&str> for Name {
    fn from(value: &str) -> Self {
        Name::new(value)
    }
}

impl From<String> for Name {
    fn from(value: String) -> Self {
        Name::new(value)
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_accessor_prefixes() {
        assert_eq!(Name::normalize_accessor("getExternalId").as_str(), "externalId");
        assert_eq!(Name::normalize_accessor("isRent").as_str(), "rent");
        assert_eq!(Name::normalize_accessor("hasDescription").as_str(), "description");
    }

    #[test]
    fn leaves_plain_names_and_lowercase_prefixes_alone() {
        assert_eq!(Name::normalize_accessor("priceRent").as_str(), "priceRent");
        // "get" with no following uppercase letter isn't treated as an accessor.
        assert_eq!(Name::normalize_accessor("getter").as_str(), "getter");
    }
}
