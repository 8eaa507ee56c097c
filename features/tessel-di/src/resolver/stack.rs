use std::{cell::RefCell, collections::HashSet};

use crate::{
    errors::{DiError, ResolutionPath},
    types::DependencyKey,
};

/// Keys currently being resolved, in resolution order
///
/// The set mirrors the list so membership checks don't scan.
#[derive(Debug, Default)]
pub(crate) struct ResolutionStack {
    order: Vec<DependencyKey>,
    members: HashSet<DependencyKey>,
}

impl ResolutionStack {
    /// Pushes `key`, failing if it is already being resolved
    fn push(&mut self, key: &DependencyKey) -> Result<(), DiError> {
        if self.members.contains(key) {
            return Err(DiError::CircularDependency {
                path: self.cycle_to(key),
            });
        }

        self.order.push(key.clone());
        self.members.insert(key.clone());
        Ok(())
    }

    fn pop(&mut self) {
        if let Some(key) = self.order.pop() {
            self.members.remove(&key);
        }
    }

    /// Path from the first occurrence of `key` back to `key`
    fn cycle_to(&self, key: &DependencyKey) -> ResolutionPath {
        let start = self
            .order
            .iter()
            .position(|entry| entry == key)
            .unwrap_or(0);

        let mut path = self.order[start..].to_vec();
        path.push(key.clone());
        ResolutionPath(path)
    }

    pub(crate) fn depth(&self) -> usize {
        self.order.len()
    }
}

/// Pops the key it pushed once dropped, on every exit path
pub(crate) struct StackGuard<'a> {
    stack: &'a RefCell<ResolutionStack>,
}

impl<'a> StackGuard<'a> {
    pub(crate) fn enter(
        stack: &'a RefCell<ResolutionStack>,
        key: &DependencyKey,
    ) -> Result<Self, DiError> {
        stack.borrow_mut().push(key)?;
        Ok(StackGuard { stack })
    }
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.borrow_mut().pop();
    }
}
