//! Typed services handed to nodes while they load.
//!
//! Values are keyed by their concrete type, one value per type per scope.
//! While a subtree loads, each node's [`Behavior::provide`] runs inside a
//! fresh scope, so a node sees everything its ancestors (and the tree root)
//! provided, with the innermost provider winning.
//!
//! ## Storage
//!
//! Each scope is a `Vec<(TypeId, Rc<dyn Any>)>` with linear scan. Scopes hold
//! a handful of values in practice, so this stays within a cache line or two.
//!
//! [`Behavior::provide`]: crate::behavior::Behavior::provide

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

type Scope = Vec<(TypeId, Rc<dyn Any>)>;

#[derive(Clone)]
pub struct Dependencies {
    scopes: Vec<Scope>,
}

impl Default for Dependencies {
    fn default() -> Self {
        Self {
            scopes: vec![Vec::new()],
        }
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("scopes", &self.scopes.len())
            .field("values", &self.scopes.iter().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value in the innermost scope, replacing one of the same type.
    pub fn cache<T: 'static>(&mut self, value: T) {
        self.cache_rc(Rc::new(value));
    }

    pub fn cache_rc<T: 'static>(&mut self, value: Rc<T>) {
        let type_id = TypeId::of::<T>();
        if self.scopes.is_empty() {
            self.scopes.push(Vec::new());
        }
        let Some(scope) = self.scopes.last_mut() else {
            return;
        };
        for entry in scope.iter_mut() {
            if entry.0 == type_id {
                entry.1 = value;
                return;
            }
        }
        scope.push((type_id, value));
    }

    /// Look a value up, innermost scope first.
    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        let type_id = TypeId::of::<T>();
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|entry| entry.0 == type_id)
            .and_then(|entry| Rc::clone(&entry.1).downcast::<T>().ok())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.scopes
            .iter()
            .any(|scope| scope.iter().any(|entry| entry.0 == type_id))
    }

    pub(crate) fn push_scope(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Drop the innermost scope. The outermost scope is never removed.
    pub(crate) fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }
}
