//! Detects cycles along one `requires` traversal path.

use crate::error::Diagnostic;
use crate::name::Name;

/// Tracks the field names currently on the requirement path being descended.
/// Local to one `evaluate()` invocation; never shared across calls or paths.
#[derive(Debug, Default)]
pub struct CycleGuard {
    path: Vec<Name>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `name` onto the path. If `name` is already present, returns the
    /// cyclic-requirement diagnostic listing the path from the first occurrence of
    /// `name` through the current node (inclusive on both ends), without mutating
    /// the guard.
    pub fn enter(&mut self, name: &Name) -> Result<(), Diagnostic> {
        if let Some(start) = self.path.iter().position(|n| n == name) {
            let mut cycle: Vec<Name> = self.path[start..].to_vec();
            cycle.push(name.clone());
            return Err(Diagnostic::CyclicRequirement { path: cycle });
        }
        self.path.push(name.clone());
        Ok(())
    }

    pub fn leave(&mut self, name: &Name) {
        if self.path.last() == Some(name) {
            self.path.pop();
        }
    }
}
