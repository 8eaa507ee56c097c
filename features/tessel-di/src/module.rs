use std::{cell::RefCell, collections::HashMap, fmt::Debug, rc::Rc};

use crate::{
    errors::DiError,
    factories::{self, Construct, Factory},
    resolver::{dependencies::IntoDependencyShape, Resolver},
    types::{DependencyKey, Instance, Scope},
};

/// A producer paired with the lifecycle of its instances
#[derive(Clone)]
pub struct Binding {
    pub(crate) factory: Factory,
    pub(crate) scope: Scope,
}

impl Binding {
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A set of bindings which can be loaded into a container
///
/// Cloning a module shares its bindings. A module stays mutable after being
/// loaded, rebinding a key is picked up by the next resolution.
#[derive(Clone, Default)]
pub struct Module {
    bindings: Rc<RefCell<HashMap<DependencyKey, Binding>>>,
}

/// Creates an empty [`Module`]
pub fn create_module() -> Module {
    Module::new()
}

impl Module {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts binding `key`, replacing any previous binding once a `to_*` method is called
    pub fn bind(&self, key: impl Into<DependencyKey>) -> Binder {
        Binder {
            module: self.clone(),
            key: key.into(),
            scope: Scope::default(),
        }
    }

    /// Removes the binding for `key`, returns whether there was one
    pub fn unbind(&self, key: &DependencyKey) -> bool {
        self.bindings.borrow_mut().remove(key).is_some()
    }

    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.bindings.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.borrow().is_empty()
    }

    /// Whether both handles share the same bindings
    pub fn ptr_eq(&self, other: &Module) -> bool {
        Rc::ptr_eq(&self.bindings, &other.bindings)
    }

    /// Binding currently registered for `key`
    pub fn binding(&self, key: &DependencyKey) -> Option<Binding> {
        self.bindings.borrow().get(key).cloned()
    }

    fn insert(&self, key: DependencyKey, binding: Binding) {
        self.bindings.borrow_mut().insert(key, binding);
    }
}

impl Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (key, binding) in self.bindings.borrow().iter() {
            map.entry(&key.to_string(), &binding.scope.to_string());
        }
        map.finish()
    }
}

/// Fluent API returned by `bind`
///
/// Nothing is resolved while binding, dependencies are only resolved when
/// the key itself is resolved.
#[must_use = "a binder does nothing until one of its `to_*` methods is called"]
pub struct Binder {
    module: Module,
    key: DependencyKey,
    scope: Scope,
}

impl Binder {
    /// Scope used by `to_higher_order_function`, `to_curry`, `to_factory` and `to_class`
    ///
    /// Defaults to [`Scope::Singleton`]. Values and functions are always singletons.
    pub fn in_scope(mut self, scope: impl Into<Scope>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Binds a constant, every resolution returns the same instance
    pub fn to_value<T: 'static>(self, value: T) {
        self.to_instance(Instance::new(value), "value");
    }

    /// Binds an already shared value, resolutions return this exact `Rc`
    pub fn to_shared<T: 'static>(self, value: Rc<T>) {
        self.to_instance(Instance::from_rc(value), "value");
    }

    /// Binds a callable, the callable itself is resolved rather than its result
    ///
    /// Resolve it with the type it was bound with, e.g. `fn() -> String` or
    /// `Box<dyn Fn(&str) -> String>`.
    pub fn to_function<F: 'static>(self, function: F) {
        self.to_instance(Instance::new(function), "function");
    }

    /// Binds the result of calling `function` with the resolved `dependencies`
    ///
    /// Fails if `dependencies` has an unsupported shape, nothing is bound in that case.
    pub fn to_higher_order_function<T, F>(
        self,
        function: F,
        dependencies: impl IntoDependencyShape,
    ) -> Result<(), DiError>
    where
        T: 'static,
        F: Fn(crate::ResolvedDependencies) -> Result<T, DiError> + 'static,
    {
        let shape = dependencies.into_dependency_shape()?;
        let scope = self.scope.clone();
        self.store(factories::with_dependencies(shape, function), scope, "function");
        Ok(())
    }

    /// Same as [`Binder::to_higher_order_function`]
    pub fn to_curry<T, F>(self, function: F, dependencies: impl IntoDependencyShape) -> Result<(), DiError>
    where
        T: 'static,
        F: Fn(crate::ResolvedDependencies) -> Result<T, DiError> + 'static,
    {
        self.to_higher_order_function(function, dependencies)
    }

    /// Binds a manual factory, dependencies are resolved through the given [`Resolver`]
    ///
    /// The returned value is wrapped in a new instance. Use
    /// [`Binder::to_shared_factory`] to hand out an `Rc` obtained from the resolver.
    pub fn to_factory<T, F>(self, factory: F)
    where
        T: 'static,
        F: Fn(&Resolver<'_>) -> Result<T, DiError> + 'static,
    {
        let scope = self.scope.clone();
        self.store(factories::manual(factory), scope, "factory");
    }

    /// Binds a manual factory returning an already shared value
    ///
    /// The returned `Rc` is stored as is, so a factory returning another resolved
    /// key makes both keys resolve to the same value.
    pub fn to_shared_factory<T, F>(self, factory: F)
    where
        T: 'static,
        F: Fn(&Resolver<'_>) -> Result<Rc<T>, DiError> + 'static,
    {
        let scope = self.scope.clone();
        self.store(factories::shared(factory), scope, "factory");
    }

    /// Binds a manual factory producing type erased instances, stored as returned
    pub fn to_instance_factory<F>(self, factory: F)
    where
        F: Fn(&Resolver<'_>) -> Result<Instance, DiError> + 'static,
    {
        let scope = self.scope.clone();
        self.store(factories::erase(factory), scope, "factory");
    }

    /// Binds `C`, built through [`Construct::construct`] with the resolved `dependencies`
    ///
    /// Fails if `dependencies` has an unsupported shape, nothing is bound in that case.
    pub fn to_class<C: Construct>(self, dependencies: impl IntoDependencyShape) -> Result<(), DiError> {
        let shape = dependencies.into_dependency_shape()?;
        let scope = self.scope.clone();
        self.store(factories::with_dependencies(shape, C::construct), scope, "class");
        Ok(())
    }

    fn to_instance(self, instance: Instance, kind: &'static str) {
        self.store(factories::constant(instance), Scope::Singleton, kind);
    }

    fn store(self, factory: Factory, scope: Scope, kind: &'static str) {
        tracing::debug!("Binding {} to a {kind} ({scope})", self.key);
        self.module.insert(self.key, Binding { factory, scope });
    }
}
