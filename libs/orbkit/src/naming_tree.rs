//! In-process naming service state.
//!
//! A [`NamingTree`] holds every context of one naming service, keyed by id.
//! The root context always exists under [`ROOT_CONTEXT`]. Each operation
//! takes the write or read lock of exactly one context, so individual calls
//! are atomic while sequences of calls are not.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{BrokerError, NotFoundReason};
use crate::naming::{Binding, BindingType, NameComponent, NamePath};
use crate::object::ObjectRef;

/// Id of the root context.
pub const ROOT_CONTEXT: Uuid = Uuid::nil();

#[derive(Debug, Clone)]
enum Entry {
    Object(ObjectRef),
    Context(Uuid),
}

#[derive(Debug, Default)]
struct ContextNode {
    bindings: RwLock<BTreeMap<NameComponent, Entry>>,
}

/// All contexts of one naming service.
#[derive(Debug)]
pub struct NamingTree {
    contexts: DashMap<Uuid, Arc<ContextNode>>,
}

impl Default for NamingTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NamingTree {
    #[must_use]
    pub fn new() -> Self {
        let contexts = DashMap::new();
        contexts.insert(ROOT_CONTEXT, Arc::new(ContextNode::default()));
        Self { contexts }
    }

    pub fn contains_context(&self, ctx: Uuid) -> bool {
        self.contexts.contains_key(&ctx)
    }

    pub fn bind_new_context(&self, ctx: Uuid, name: &NamePath) -> Result<Uuid, BrokerError> {
        let (parent, last) = self.parent_of(ctx, name)?;
        let mut bindings = parent.bindings.write();
        if bindings.contains_key(last) {
            return Err(BrokerError::AlreadyBound(name.to_string()));
        }
        let id = Uuid::new_v4();
        self.contexts.insert(id, Arc::new(ContextNode::default()));
        bindings.insert(last.clone(), Entry::Context(id));
        Ok(id)
    }

    pub fn resolve(&self, ctx: Uuid, name: &NamePath) -> Result<ObjectRef, BrokerError> {
        match self.lookup(ctx, name)? {
            Entry::Object(object) => Ok(object),
            Entry::Context(_) => Err(BrokerError::not_found(
                name.to_string(),
                NotFoundReason::NotObject,
            )),
        }
    }

    pub fn resolve_context(&self, ctx: Uuid, name: &NamePath) -> Result<Uuid, BrokerError> {
        match self.lookup(ctx, name)? {
            Entry::Context(id) => Ok(id),
            Entry::Object(_) => Err(BrokerError::not_found(
                name.to_string(),
                NotFoundReason::NotContext,
            )),
        }
    }

    /// Binds `object`, replacing a previous object binding. A context bound
    /// under the same name is not replaced.
    pub fn rebind(&self, ctx: Uuid, name: &NamePath, object: ObjectRef) -> Result<(), BrokerError> {
        let (parent, last) = self.parent_of(ctx, name)?;
        let mut bindings = parent.bindings.write();
        if matches!(bindings.get(last), Some(Entry::Context(_))) {
            return Err(BrokerError::not_found(
                name.to_string(),
                NotFoundReason::NotObject,
            ));
        }
        bindings.insert(last.clone(), Entry::Object(object));
        Ok(())
    }

    /// Removes a binding. Unbinding a context drops it together with every
    /// context nested in it.
    pub fn unbind(&self, ctx: Uuid, name: &NamePath) -> Result<(), BrokerError> {
        let (parent, last) = self.parent_of(ctx, name)?;
        let removed = parent.bindings.write().remove(last);
        match removed {
            Some(Entry::Context(id)) => {
                self.drop_context(id);
                Ok(())
            }
            Some(Entry::Object(_)) => Ok(()),
            None => Err(BrokerError::not_found(
                name.to_string(),
                NotFoundReason::MissingNode,
            )),
        }
    }

    /// Returns up to `how_many` bindings, ordered by name.
    pub fn list(&self, ctx: Uuid, how_many: usize) -> Result<Vec<Binding>, BrokerError> {
        let node = self.node(ctx)?;
        let bindings = node.bindings.read();
        Ok(bindings
            .iter()
            .take(how_many)
            .map(|(name, entry)| Binding {
                name: name.clone(),
                binding_type: match entry {
                    Entry::Object(_) => BindingType::Object,
                    Entry::Context(_) => BindingType::Context,
                },
            })
            .collect())
    }

    fn drop_context(&self, id: Uuid) {
        let mut pending = vec![id];
        while let Some(id) = pending.pop() {
            if let Some((_, node)) = self.contexts.remove(&id) {
                pending.extend(node.bindings.read().values().filter_map(|entry| match entry {
                    Entry::Context(child) => Some(*child),
                    Entry::Object(_) => None,
                }));
            }
        }
    }

    fn node(&self, ctx: Uuid) -> Result<Arc<ContextNode>, BrokerError> {
        self.contexts
            .get(&ctx)
            .map(|n| Arc::clone(n.value()))
            .ok_or_else(|| BrokerError::ObjectNotExist(format!("naming context {ctx}")))
    }

    /// Walks every component but the last and returns the context holding it.
    fn parent_of<'n>(
        &self,
        ctx: Uuid,
        name: &'n NamePath,
    ) -> Result<(Arc<ContextNode>, &'n NameComponent), BrokerError> {
        let (init, last) = name.split_last();
        let mut node = self.node(ctx)?;
        for component in init {
            let next = match node.bindings.read().get(component) {
                Some(Entry::Context(id)) => *id,
                Some(Entry::Object(_)) => {
                    return Err(BrokerError::not_found(
                        name.to_string(),
                        NotFoundReason::NotContext,
                    ));
                }
                None => {
                    return Err(BrokerError::not_found(
                        name.to_string(),
                        NotFoundReason::MissingNode,
                    ));
                }
            };
            node = self.node(next)?;
        }
        Ok((node, last))
    }

    fn lookup(&self, ctx: Uuid, name: &NamePath) -> Result<Entry, BrokerError> {
        let (parent, last) = self.parent_of(ctx, name)?;
        let found = parent.bindings.read().get(last).cloned();
        found.ok_or_else(|| BrokerError::not_found(name.to_string(), NotFoundReason::MissingNode))
    }
}
