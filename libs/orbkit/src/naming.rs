//! Naming contexts and compound names.
//!
//! Names follow the stringified CosNaming convention: components are separated
//! by `/`, the id and kind of one component by `.`, and `\` escapes either
//! separator (or itself).

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BrokerError;
use crate::object::ObjectRef;

/// One component of a compound name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NameComponent {
    pub id: String,
    pub kind: String,
}

impl NameComponent {
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_escaped(f, &self.id)?;
        if !self.kind.is_empty() {
            f.write_str(".")?;
            write_escaped(f, &self.kind)?;
        }
        Ok(())
    }
}

fn write_escaped(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    for c in s.chars() {
        if matches!(c, '/' | '.' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    Ok(())
}

/// A compound name: a non-empty sequence of components.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamePath(Vec<NameComponent>);

impl NamePath {
    /// Builds a path from components.
    ///
    /// # Errors
    /// Returns `BrokerError::InvalidName` when `components` is empty.
    pub fn new(components: Vec<NameComponent>) -> Result<Self, BrokerError> {
        if components.is_empty() {
            return Err(BrokerError::InvalidName("empty name".to_owned()));
        }
        Ok(Self(components))
    }

    #[must_use]
    pub fn single(component: NameComponent) -> Self {
        Self(vec![component])
    }

    /// Parses the stringified form, e.g. `integer-seq` or `apps/fib.rs`.
    ///
    /// # Errors
    /// Returns `BrokerError::InvalidName` for empty names, empty components,
    /// dangling escapes, or components with more than one unescaped `.`.
    pub fn parse(s: &str) -> Result<Self, BrokerError> {
        let invalid = |why: &str| BrokerError::InvalidName(format!("'{s}': {why}"));

        let mut components = Vec::new();
        let mut id = String::new();
        let mut kind = String::new();
        let mut in_kind = false;
        let mut chars = s.chars();

        while let Some(c) = chars.next() {
            match c {
                '\\' => {
                    let escaped = chars.next().ok_or_else(|| invalid("dangling escape"))?;
                    let target = if in_kind { &mut kind } else { &mut id };
                    target.push(escaped);
                }
                '.' if in_kind => return Err(invalid("more than one '.' in a component")),
                '.' => in_kind = true,
                '/' => {
                    let component = finish_component(&mut id, &mut kind)
                        .ok_or_else(|| invalid("empty component"))?;
                    components.push(component);
                    in_kind = false;
                }
                other => {
                    let target = if in_kind { &mut kind } else { &mut id };
                    target.push(other);
                }
            }
        }
        let component =
            finish_component(&mut id, &mut kind).ok_or_else(|| invalid("empty component"))?;
        components.push(component);

        Ok(Self(components))
    }

    #[must_use]
    pub fn components(&self) -> &[NameComponent] {
        &self.0
    }

    /// Splits into the leading context path (if any) and the last component.
    #[must_use]
    pub fn split_last(&self) -> (&[NameComponent], &NameComponent) {
        let (last, init) = self
            .0
            .split_last()
            .unwrap_or_else(|| unreachable!("NamePath is never empty"));
        (init, last)
    }
}

fn finish_component(id: &mut String, kind: &mut String) -> Option<NameComponent> {
    if id.is_empty() && kind.is_empty() {
        return None;
    }
    Some(NameComponent::new(std::mem::take(id), std::mem::take(kind)))
}

impl fmt::Display for NamePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl From<NameComponent> for NamePath {
    fn from(c: NameComponent) -> Self {
        Self::single(c)
    }
}

/// What a binding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingType {
    Object,
    Context,
}

/// One entry returned by [`NamingContext::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: NameComponent,
    pub binding_type: BindingType,
}

/// A naming context: one node of the broker's hierarchical namespace.
///
/// Each call is atomic on its own; there are no cross-call transactions, so
/// callers must expect a name listed a moment ago to be gone on `resolve`.
#[async_trait]
pub trait NamingContext: Send + Sync {
    /// Converts a stringified name into components.
    fn to_name(&self, s: &str) -> Result<NamePath, BrokerError> {
        NamePath::parse(s)
    }

    /// Creates and binds a new sub-context. Fails with `AlreadyBound` if the
    /// name is taken.
    async fn bind_new_context(&self, name: &NamePath)
    -> Result<Arc<dyn NamingContext>, BrokerError>;

    /// Resolves a name bound to an object.
    async fn resolve(&self, name: &NamePath) -> Result<ObjectRef, BrokerError>;

    /// Resolves a name bound to a sub-context.
    async fn resolve_context(&self, name: &NamePath)
    -> Result<Arc<dyn NamingContext>, BrokerError>;

    /// Binds an object, replacing whatever object was bound there before.
    async fn rebind(&self, name: &NamePath, object: ObjectRef) -> Result<(), BrokerError>;

    /// Removes a binding. Fails with `NotFound` if nothing is bound.
    async fn unbind(&self, name: &NamePath) -> Result<(), BrokerError>;

    /// Returns up to `how_many` bindings of this context.
    async fn list(&self, how_many: usize) -> Result<Vec<Binding>, BrokerError>;
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_and_compound() {
        let path = NamePath::parse("integer-seq").unwrap();
        assert_eq!(path.components(), &[NameComponent::new("integer-seq", "")]);

        let path = NamePath::parse("apps/fib.naive-rs").unwrap();
        assert_eq!(
            path.components(),
            &[
                NameComponent::new("apps", ""),
                NameComponent::new("fib", "naive-rs"),
            ]
        );
    }

    #[test]
    fn test_parse_escapes() {
        let path = NamePath::parse(r"a\.b.c\/d").unwrap();
        assert_eq!(path.components(), &[NameComponent::new("a.b", "c/d")]);
        assert_eq!(path.to_string(), r"a\.b.c\/d");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "/", "a//b", "a.b.c", "trailing\\"] {
            assert!(
                matches!(NamePath::parse(bad), Err(BrokerError::InvalidName(_))),
                "expected '{bad}' to be rejected"
            );
        }
    }

    #[test]
    fn test_kind_only_component() {
        let path = NamePath::parse(".rs").unwrap();
        assert_eq!(path.components(), &[NameComponent::new("", "rs")]);
    }

    #[test]
    fn test_split_last() {
        let path = NamePath::parse("a/b/c.d").unwrap();
        let (init, last) = path.split_last();
        assert_eq!(init.len(), 2);
        assert_eq!(last, &NameComponent::new("c", "d"));
    }
}
