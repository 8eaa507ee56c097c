use std::{fmt::Display, sync::Arc};

use thiserror::Error;

use crate::types::{DependencyKey, DynError};

/// Errors when binding or resolving dependencies
///
/// All of these are configuration errors, none of them is retryable.
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// Dependencies of a function or class were described with an unsupported shape
    #[error("Invalid dependency shape: expected a list of keys or a map of names to keys, found {found}")]
    InvalidDependencyShape { found: String },

    /// No loaded module has a binding for the key
    #[error("No binding found for key: {0}")]
    BindingNotFound(DependencyKey),

    /// The key is already being resolved further up the stack
    #[error("Circular dependency detected: {path}")]
    CircularDependency { path: ResolutionPath },

    /// A scoped binding was resolved outside of `run_in_scope`
    #[error("Cannot resolve scoped binding outside of a scope: {0}")]
    ScopeNotActive(DependencyKey),

    /// The binding carries a scope the container does not know
    #[error("Unknown scope: {0}")]
    UnknownScope(String),

    #[error("Failed to downcast '{key}', required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        key: String,
        required_type: &'static str,
        actual_type: &'static str,
    },

    /// A producer asked for an injected argument which was not declared
    #[error("Missing injected argument: {0}")]
    MissingArgument(String),

    /// A user factory failed
    #[error("Construction failed - error: {0}")]
    Construction(Arc<DynError>),
}

impl DiError {
    /// Wraps an arbitrary factory error
    pub fn construction(error: impl Into<DynError>) -> Self {
        DiError::Construction(Arc::new(error.into()))
    }
}

/// Ordered chain of keys, rendered as `A -> B -> A`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionPath(pub Vec<DependencyKey>);

impl Display for ResolutionPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circular_dependency_lists_the_cycle() {
        let a = DependencyKey::symbol("A");
        let b = DependencyKey::symbol("B");
        let error = DiError::CircularDependency {
            path: ResolutionPath(vec![a.clone(), b, a]),
        };

        assert_eq!(
            error.to_string(),
            "Circular dependency detected: Symbol(A) -> Symbol(B) -> Symbol(A)"
        );
    }

    #[test]
    fn construction_keeps_the_source_message() {
        let error = DiError::construction("database offline");
        assert_eq!(
            error.to_string(),
            "Construction failed - error: database offline"
        );
    }
}
