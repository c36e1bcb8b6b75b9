//! Addressable names of sequence implementations.

use std::fmt;

use orbkit::{NameComponent, NamePath};

/// Directory name of one implementation: the logical sequence id plus the
/// implementation kind, e.g. `fib.naive-rs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name {
    id: String,
    kind: String,
}

impl Name {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// True if `pattern` is either the bare id or the full `id.kind` form.
    #[must_use]
    pub fn matches(&self, pattern: &str) -> bool {
        if pattern == self.id {
            return true;
        }
        pattern
            .strip_prefix(self.id.as_str())
            .and_then(|rest| rest.strip_prefix('.'))
            .is_some_and(|kind| kind == self.kind)
    }

    /// Path of this name relative to the service directory.
    #[must_use]
    pub fn to_path(&self) -> NamePath {
        NamePath::single(NameComponent::new(self.id.clone(), self.kind.clone()))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.kind)
    }
}

impl From<NameComponent> for Name {
    fn from(c: NameComponent) -> Self {
        Self {
            id: c.id,
            kind: c.kind,
        }
    }
}
