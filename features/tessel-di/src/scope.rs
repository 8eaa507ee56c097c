use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    fmt::Display,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::types::{DependencyKey, Instance};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Identifies one `run_in_scope` call
///
/// Tokens are unique for the whole process and can only be created by the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeToken(u64);

impl ScopeToken {
    pub(crate) fn next() -> Self {
        ScopeToken(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for ScopeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

pub(crate) type ScopedInstances = HashMap<ScopeToken, HashMap<DependencyKey, Instance>>;

/// Activates a scope and tears it down when dropped
///
/// Dropping removes the scope's instances and restores the previously active
/// scope, also when the callback unwinds.
pub(crate) struct ScopeGuard<'a> {
    token: ScopeToken,
    previous: Option<ScopeToken>,
    current: &'a Cell<Option<ScopeToken>>,
    instances: &'a RefCell<ScopedInstances>,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn enter(
        current: &'a Cell<Option<ScopeToken>>,
        instances: &'a RefCell<ScopedInstances>,
    ) -> Self {
        let token = ScopeToken::next();
        let previous = current.replace(Some(token));
        tracing::debug!("Entering {token}");

        ScopeGuard {
            token,
            previous,
            current,
            instances,
        }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        let dropped = self
            .instances
            .borrow_mut()
            .remove(&self.token)
            .map_or(0, |instances| instances.len());
        self.current.set(self.previous);
        tracing::debug!("Leaving {}, dropped {dropped} scoped instances", self.token);
    }
}
