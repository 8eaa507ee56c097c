use std::{
    any::type_name,
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use serde_json::Value;

use crate::{
    errors::DiError,
    resolver::Resolver,
    types::{DependencyKey, Instance},
};

/// How a function or class receives its dependencies
///
/// Validated once when binding, the stored producer only walks the variant.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DependencyShape {
    /// Called without arguments
    #[default]
    None,
    /// Each key is resolved and passed in order
    Positional(Vec<DependencyKey>),
    /// Each key is resolved and passed under its parameter name
    Named(Vec<(String, DependencyKey)>),
}

impl DependencyShape {
    fn positional(keys: Vec<DependencyKey>) -> Self {
        if keys.is_empty() {
            DependencyShape::None
        } else {
            DependencyShape::Positional(keys)
        }
    }

    fn named(entries: Vec<(String, DependencyKey)>) -> Self {
        if entries.is_empty() {
            DependencyShape::None
        } else {
            DependencyShape::Named(entries)
        }
    }

    /// Resolves every declared key
    pub fn resolve(&self, resolver: &Resolver<'_>) -> Result<ResolvedDependencies, DiError> {
        match self {
            DependencyShape::None => Ok(ResolvedDependencies::None),
            DependencyShape::Positional(keys) => keys
                .iter()
                .map(|key| resolver.get_instance(key))
                .collect::<Result<Vec<_>, _>>()
                .map(ResolvedDependencies::Positional),
            DependencyShape::Named(entries) => entries
                .iter()
                .map(|(name, key)| {
                    resolver
                        .get_instance(key)
                        .map(|instance| (name.clone(), instance))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(ResolvedDependencies::Named),
        }
    }
}

/// Anything that can describe the dependencies of a producer
pub trait IntoDependencyShape {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError>;
}

impl IntoDependencyShape for DependencyShape {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(self)
    }
}

impl IntoDependencyShape for () {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::None)
    }
}

impl IntoDependencyShape for Vec<DependencyKey> {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::positional(self))
    }
}

impl IntoDependencyShape for &[DependencyKey] {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::positional(self.to_vec()))
    }
}

impl<const N: usize> IntoDependencyShape for [DependencyKey; N] {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::positional(self.into()))
    }
}

impl<const N: usize> IntoDependencyShape for [(&str, DependencyKey); N] {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::named(
            self.into_iter()
                .map(|(name, key)| (name.to_string(), key))
                .collect(),
        ))
    }
}

impl IntoDependencyShape for Vec<(String, DependencyKey)> {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::named(self))
    }
}

impl IntoDependencyShape for BTreeMap<String, DependencyKey> {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        Ok(DependencyShape::named(self.into_iter().collect()))
    }
}

impl IntoDependencyShape for HashMap<String, DependencyKey> {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        // HashMap has no stable order, sort so argument maps are deterministic
        let mut entries: Vec<_> = self.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        Ok(DependencyShape::named(entries))
    }
}

/// Dynamic descriptions, e.g. read from a manifest
///
/// Strings are taken as named keys. `null`, `[]` and `{}` mean no dependencies.
impl IntoDependencyShape for &Value {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        match self {
            Value::Null => Ok(DependencyShape::None),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(key) => Ok(DependencyKey::named(key.as_str())),
                    other => Err(invalid_shape(&format!("a list holding {}", kind(other)))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(DependencyShape::positional),
            Value::Object(entries) => entries
                .iter()
                .map(|(name, key)| match key {
                    Value::String(key) => Ok((name.clone(), DependencyKey::named(key.as_str()))),
                    other => Err(invalid_shape(&format!(
                        "a map holding {} under '{name}'",
                        kind(other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(DependencyShape::named),
            other => Err(invalid_shape(kind(other))),
        }
    }
}

impl IntoDependencyShape for Value {
    fn into_dependency_shape(self) -> Result<DependencyShape, DiError> {
        (&self).into_dependency_shape()
    }
}

fn invalid_shape(found: &str) -> DiError {
    DiError::InvalidDependencyShape {
        found: found.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}

/// Dependencies after resolution, in the shape they were declared in
#[derive(Debug, Clone, Default)]
pub enum ResolvedDependencies {
    #[default]
    None,
    Positional(Vec<Instance>),
    Named(Vec<(String, Instance)>),
}

impl ResolvedDependencies {
    pub fn len(&self) -> usize {
        match self {
            ResolvedDependencies::None => 0,
            ResolvedDependencies::Positional(instances) => instances.len(),
            ResolvedDependencies::Named(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positional argument at `index`
    pub fn get<T: 'static>(&self, index: usize) -> Result<Rc<T>, DiError> {
        let instance = match self {
            ResolvedDependencies::Positional(instances) => instances.get(index),
            _ => None,
        }
        .ok_or_else(|| DiError::MissingArgument(format!("#{index}")))?;

        downcast_argument(instance, || format!("#{index}"))
    }

    /// Named argument
    pub fn named<T: 'static>(&self, name: &str) -> Result<Rc<T>, DiError> {
        let instance = match self {
            ResolvedDependencies::Named(entries) => entries
                .iter()
                .find(|(entry, _)| entry == name)
                .map(|(_, instance)| instance),
            _ => None,
        }
        .ok_or_else(|| DiError::MissingArgument(name.to_string()))?;

        downcast_argument(instance, || name.to_string())
    }
}

fn downcast_argument<T: 'static>(
    instance: &Instance,
    slot: impl FnOnce() -> String,
) -> Result<Rc<T>, DiError> {
    instance
        .downcast()
        .map_err(|actual_type| DiError::DowncastFailed {
            key: slot(),
            required_type: type_name::<T>(),
            actual_type,
        })
}
