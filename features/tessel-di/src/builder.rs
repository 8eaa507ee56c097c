use crate::{
    container::Container,
    invalidation::InvalidationPolicy,
    module::Module,
    types::ModuleKey,
};

/// Configures a [`Container`] before it is created
///
/// ```
/// use tessel_di::{ContainerBuilder, InvalidationPolicy, Module};
///
/// let persistence = Module::new();
/// persistence.bind("DATABASE_URL").to_value("postgres://localhost/app".to_string());
///
/// let container = ContainerBuilder::new()
///     .invalidation(InvalidationPolicy::Provenance)
///     .module("persistence", &persistence)
///     .build();
///
/// assert!(container.contains(&"DATABASE_URL".into()));
/// ```
#[derive(Debug, Default)]
pub struct ContainerBuilder {
    invalidation: InvalidationPolicy,
    modules: Vec<(ModuleKey, Module)>,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy applied to the singleton cache when a module is unloaded
    pub fn invalidation(mut self, policy: InvalidationPolicy) -> Self {
        self.invalidation = policy;
        self
    }

    /// Loads `module` once the container is built, in call order
    pub fn module(mut self, key: impl Into<ModuleKey>, module: &Module) -> Self {
        self.modules.push((key.into(), module.clone()));
        self
    }

    pub fn build(self) -> Container {
        let container = Container::with_policy(self.invalidation);
        for (key, module) in &self.modules {
            container.load(key.clone(), module);
        }
        container
    }
}
