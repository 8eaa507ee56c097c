use std::rc::Rc;

use crate::{
    container::Container,
    errors::DiError,
    types::{DependencyKey, Instance},
};

pub mod dependencies;
pub(crate) mod stack;

/// Handle for resolving nested dependencies from inside a factory
///
/// Every call re-enters the container's resolution, so the stack used for
/// cycle detection spans the whole chain.
#[derive(Clone, Copy)]
pub struct Resolver<'c> {
    container: &'c Container,
}

impl<'c> Resolver<'c> {
    pub(crate) fn new(container: &'c Container) -> Self {
        Resolver { container }
    }

    /// Resolves `key` and downcasts it to `T`
    pub fn get<T: 'static>(&self, key: &DependencyKey) -> Result<Rc<T>, DiError> {
        self.container.get(key)
    }

    pub fn get_instance(&self, key: &DependencyKey) -> Result<Instance, DiError> {
        self.container.get_instance(key)
    }

    /// Whether any loaded module binds `key`
    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.container.contains(key)
    }
}
