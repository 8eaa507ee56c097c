use std::collections::HashMap;

use crate::types::{DependencyKey, Instance, ModuleKey};

/// A cached singleton and the module whose binding produced it
#[derive(Debug, Clone)]
pub(crate) struct CachedSingleton {
    pub instance: Instance,
    pub provenance: ModuleKey,
}

pub(crate) type SingletonCache = HashMap<DependencyKey, CachedSingleton>;

/// What unloading a module drops from the singleton cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidationPolicy {
    /// Drop every cached singleton on any unload
    #[default]
    ClearAll,
    /// Drop only singletons produced by a binding of the unloaded module
    ///
    /// Singletons of other modules which captured one of the dropped
    /// instances keep their captured copy.
    Provenance,
}

impl InvalidationPolicy {
    /// Applies the policy after `unloaded` was removed, returns the number of dropped instances
    pub(crate) fn apply(&self, cache: &mut SingletonCache, unloaded: &ModuleKey) -> usize {
        let before = cache.len();
        match self {
            InvalidationPolicy::ClearAll => cache.clear(),
            InvalidationPolicy::Provenance => {
                cache.retain(|_, cached| &cached.provenance != unloaded)
            }
        }
        before - cache.len()
    }
}
