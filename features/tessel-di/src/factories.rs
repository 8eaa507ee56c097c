use std::rc::Rc;

use crate::{
    errors::DiError,
    resolver::{
        dependencies::{DependencyShape, ResolvedDependencies},
        Resolver,
    },
    types::Instance,
};

/// Type erased producer stored in a binding
///
/// Creates a new instance on every call, caching is up to the container.
pub type Factory = Rc<dyn Fn(&Resolver<'_>) -> Result<Instance, DiError>>;

/// A type the container can build from its declared dependencies
///
/// ```
/// use std::rc::Rc;
/// use tessel_di::{Construct, DiError, ResolvedDependencies};
///
/// struct Greeter {
///     greeting: Rc<String>,
/// }
///
/// impl Construct for Greeter {
///     fn construct(deps: ResolvedDependencies) -> Result<Self, DiError> {
///         Ok(Greeter { greeting: deps.get(0)? })
///     }
/// }
/// ```
pub trait Construct: Sized + 'static {
    /// Builds a new instance from the resolved dependencies
    fn construct(deps: ResolvedDependencies) -> Result<Self, DiError>;
}

/// Erases a producer closure into a [`Factory`]
pub(crate) fn erase<F>(factory: F) -> Factory
where
    F: Fn(&Resolver<'_>) -> Result<Instance, DiError> + 'static,
{
    Rc::new(factory)
}

/// Producer returning the same shared instance on every call
pub(crate) fn constant(instance: Instance) -> Factory {
    erase(move |_| Ok(instance.clone()))
}

/// Producer resolving `shape` and handing it to `producer`
pub(crate) fn with_dependencies<T, F>(shape: DependencyShape, producer: F) -> Factory
where
    T: 'static,
    F: Fn(ResolvedDependencies) -> Result<T, DiError> + 'static,
{
    erase(move |resolver| {
        let deps = shape.resolve(resolver)?;
        producer(deps).map(Instance::new)
    })
}

/// Producer calling a manual factory with the resolver
pub(crate) fn manual<T, F>(factory: F) -> Factory
where
    T: 'static,
    F: Fn(&Resolver<'_>) -> Result<T, DiError> + 'static,
{
    erase(move |resolver| factory(resolver).map(Instance::new))
}

/// Producer calling a manual factory which returns an already shared value
pub(crate) fn shared<T, F>(factory: F) -> Factory
where
    T: 'static,
    F: Fn(&Resolver<'_>) -> Result<Rc<T>, DiError> + 'static,
{
    erase(move |resolver| factory(resolver).map(Instance::from_rc))
}
