use std::{
    any::type_name,
    cell::{Cell, RefCell},
    fmt::Debug,
    rc::Rc,
};

use crate::{
    builder::ContainerBuilder,
    errors::DiError,
    invalidation::{CachedSingleton, InvalidationPolicy, SingletonCache},
    module::{Binder, Binding, Module},
    resolver::{
        stack::{ResolutionStack, StackGuard},
        Resolver,
    },
    scope::{ScopeGuard, ScopeToken, ScopedInstances},
    types::{DependencyKey, Instance, ModuleKey, Scope},
};

/// Registry of loaded modules and cache of the instances they produced
///
/// The container is single threaded: resolution is a plain nested call and
/// factories may resolve further keys through the [`Resolver`] they receive.
pub struct Container {
    default_key: ModuleKey,
    default_module: Module,
    /// Loaded modules, later entries win on lookup
    modules: RefCell<Vec<(ModuleKey, Module)>>,
    singletons: RefCell<SingletonCache>,
    scoped: RefCell<ScopedInstances>,
    current_scope: Cell<Option<ScopeToken>>,
    resolution_stack: RefCell<ResolutionStack>,
    invalidation: InvalidationPolicy,
}

/// Creates an empty [`Container`]
pub fn create_container() -> Container {
    Container::new()
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    pub(crate) fn with_policy(invalidation: InvalidationPolicy) -> Self {
        let default_key = ModuleKey::symbol("default");
        let default_module = Module::new();

        Container {
            modules: RefCell::new(vec![(default_key.clone(), default_module.clone())]),
            default_key,
            default_module,
            singletons: RefCell::default(),
            scoped: RefCell::default(),
            current_scope: Cell::new(None),
            resolution_stack: RefCell::default(),
            invalidation,
        }
    }

    /// Binds `key` in the container's default module
    ///
    /// The default module is loaded first, so every explicitly loaded module takes precedence.
    pub fn bind(&self, key: impl Into<DependencyKey>) -> Binder {
        self.default_module.bind(key)
    }

    /// Loads `module` under `key`
    ///
    /// Reloading an existing key replaces the module but keeps its position in the load order.
    pub fn load(&self, key: impl Into<ModuleKey>, module: &Module) {
        let key = key.into();
        let mut modules = self.modules.borrow_mut();

        match modules.iter().position(|(loaded, _)| *loaded == key) {
            Some(index) => {
                tracing::debug!("Replacing module {key} with {} bindings", module.len());
                modules[index].1 = module.clone();
            }
            None => {
                tracing::debug!("Loading module {key} with {} bindings", module.len());
                modules.push((key, module.clone()));
            }
        }
    }

    /// Unloads the module under `key`, returns whether it was loaded
    ///
    /// The singleton cache is invalidated according to the container's
    /// [`InvalidationPolicy`] even if no module was loaded under `key`.
    /// Scoped instances are left alone.
    pub fn unload(&self, key: &ModuleKey) -> bool {
        let removed = {
            let mut modules = self.modules.borrow_mut();
            let before = modules.len();
            modules.retain(|(loaded, _)| loaded != key);
            before != modules.len()
        };
        if !removed {
            tracing::warn!("Tried to unload module {key} which is not loaded");
        }

        let dropped = self
            .invalidation
            .apply(&mut self.singletons.borrow_mut(), key);
        tracing::debug!("Unloaded module {key}, dropped {dropped} cached singletons");

        removed
    }

    pub fn is_loaded(&self, key: &ModuleKey) -> bool {
        self.modules.borrow().iter().any(|(loaded, _)| loaded == key)
    }

    /// Whether any loaded module binds `key`
    pub fn contains(&self, key: &DependencyKey) -> bool {
        self.find_binding(key).is_some()
    }

    /// Resolves `key` and downcasts it to `T`
    pub fn get<T: 'static>(&self, key: &DependencyKey) -> Result<Rc<T>, DiError> {
        self.get_instance(key)?
            .downcast()
            .map_err(|actual_type| DiError::DowncastFailed {
                key: key.to_string(),
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Resolves `key` without downcasting
    pub fn get_instance(&self, key: &DependencyKey) -> Result<Instance, DiError> {
        let _guard = StackGuard::enter(&self.resolution_stack, key)?;

        let (provenance, binding) = self
            .find_binding(key)
            .ok_or_else(|| DiError::BindingNotFound(key.clone()))?;

        match &binding.scope {
            Scope::Singleton => self.resolve_singleton(key, provenance, &binding),
            Scope::Transient => {
                tracing::trace!("Creating transient {key}");
                self.construct(&binding)
            }
            Scope::Scoped => self.resolve_scoped(key, &binding),
            Scope::Unrecognized(name) => Err(DiError::UnknownScope(name.clone())),
        }
    }

    /// Runs `callback` inside a fresh scope
    ///
    /// Scoped bindings resolve to one instance per key for the duration of the
    /// callback. Nested calls shadow the outer scope until they return. The
    /// scope's instances are dropped when the callback returns or unwinds.
    pub fn run_in_scope<R>(&self, callback: impl FnOnce() -> R) -> R {
        let _scope = ScopeGuard::enter(&self.current_scope, &self.scoped);
        callback()
    }

    /// Token of the innermost active scope
    pub fn active_scope(&self) -> Option<ScopeToken> {
        self.current_scope.get()
    }

    pub fn invalidation(&self) -> InvalidationPolicy {
        self.invalidation
    }

    /// Last loaded module binding `key`
    fn find_binding(&self, key: &DependencyKey) -> Option<(ModuleKey, Binding)> {
        self.modules
            .borrow()
            .iter()
            .rev()
            .find_map(|(module_key, module)| {
                module
                    .binding(key)
                    .map(|binding| (module_key.clone(), binding))
            })
    }

    // No RefCell borrow may be held here, the factory re-enters the container
    fn construct(&self, binding: &Binding) -> Result<Instance, DiError> {
        (binding.factory)(&Resolver::new(self))
    }

    fn resolve_singleton(
        &self,
        key: &DependencyKey,
        provenance: ModuleKey,
        binding: &Binding,
    ) -> Result<Instance, DiError> {
        if let Some(cached) = self.singletons.borrow().get(key) {
            tracing::trace!("Singleton {key} served from cache");
            return Ok(cached.instance.clone());
        }

        tracing::trace!(
            "Creating singleton {key} from module {provenance} [depth {}]",
            self.resolution_stack.borrow().depth()
        );
        let instance = self.construct(binding)?;
        self.singletons.borrow_mut().insert(
            key.clone(),
            CachedSingleton {
                instance: instance.clone(),
                provenance,
            },
        );

        Ok(instance)
    }

    fn resolve_scoped(&self, key: &DependencyKey, binding: &Binding) -> Result<Instance, DiError> {
        let token = self
            .current_scope
            .get()
            .ok_or_else(|| DiError::ScopeNotActive(key.clone()))?;

        let cached = self
            .scoped
            .borrow()
            .get(&token)
            .and_then(|instances| instances.get(key))
            .cloned();
        if let Some(instance) = cached {
            tracing::trace!("Scoped {key} served from {token}");
            return Ok(instance);
        }

        tracing::trace!("Creating scoped {key} in {token}");
        let instance = self.construct(binding)?;
        self.scoped
            .borrow_mut()
            .entry(token)
            .or_default()
            .insert(key.clone(), instance.clone());

        Ok(instance)
    }
}

impl Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modules: Vec<String> = self
            .modules
            .borrow()
            .iter()
            .map(|(key, module)| {
                if *key == self.default_key {
                    format!("default ({} bindings)", module.len())
                } else {
                    format!("{key} ({} bindings)", module.len())
                }
            })
            .collect();

        f.debug_struct("Container")
            .field("modules", &modules)
            .field("singletons", &self.singletons.borrow().len())
            .field("active_scope", &self.current_scope.get())
            .field("invalidation", &self.invalidation)
            .finish()
    }
}
