//! Tessel DI is a small runtime dependency injection container.
//!
//! Keys are bound to producers (values, functions, classes and factories) inside
//! modules. Modules are loaded into a container, which resolves keys on demand,
//! caches instances according to their scope and detects circular dependencies.
//!
//! Tessel DI consists of the following components:
//!
//! 1. Module - a set of bindings built with the fluent [`Binder`] API
//! 2. Container - loads modules, resolves keys and owns the instance caches
//! 3. Resolver - the handle factories use to resolve their own dependencies
//! 4. Errors - everything that can go wrong while binding or resolving
//!
//! # Examples
//!
//! ```rust
//! use std::rc::Rc;
//! use tessel_di::{Construct, Container, DependencyKey, DiError, Module, ResolvedDependencies, Scope};
//!
//! struct Repository {
//!     url: Rc<String>,
//! }
//!
//! impl Construct for Repository {
//!     fn construct(deps: ResolvedDependencies) -> Result<Self, DiError> {
//!         Ok(Repository { url: deps.named("url")? })
//!     }
//! }
//!
//! fn main() -> Result<(), DiError> {
//!     let url = DependencyKey::named("DATABASE_URL");
//!     let repository = DependencyKey::symbol("Repository");
//!
//!     let persistence = Module::new();
//!     persistence.bind(&url).to_value("postgres://localhost/app".to_string());
//!     persistence
//!         .bind(&repository)
//!         .in_scope(Scope::Scoped)
//!         .to_class::<Repository>([("url", url.clone())])?;
//!
//!     let container = Container::new();
//!     container.load("persistence", &persistence);
//!
//!     container.run_in_scope(|| {
//!         let first = container.get::<Repository>(&repository)?;
//!         let second = container.get::<Repository>(&repository)?;
//!         assert!(Rc::ptr_eq(&first, &second));
//!         assert_eq!(first.url.as_str(), "postgres://localhost/app");
//!         Ok(())
//!     })
//! }
//! ```

pub mod builder;
pub mod container;
pub mod errors;
pub mod factories;
pub mod invalidation;
pub mod module;
pub mod resolver;
pub mod scope;
pub mod types;

pub use builder::ContainerBuilder;
pub use container::{create_container, Container};
pub use errors::{DiError, ResolutionPath};
pub use factories::Construct;
pub use invalidation::InvalidationPolicy;
pub use module::{create_module, Binder, Binding, Module};
pub use resolver::{
    dependencies::{DependencyShape, IntoDependencyShape, ResolvedDependencies},
    Resolver,
};
pub use scope::ScopeToken;
pub use types::{DependencyKey, DynError, Instance, ModuleKey, Scope};
