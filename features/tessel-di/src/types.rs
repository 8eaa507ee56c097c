use std::{
    any::{type_name, Any},
    fmt::{Debug, Display},
    hash::{Hash, Hasher},
    rc::Rc,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// Errors raised by user factories
pub type DynError = Box<dyn std::error::Error + Send + Sync>;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(0);

/// Key under which a binding is registered
///
/// There are two flavours of keys:
/// - Named keys are interned by value, `DependencyKey::named("DB")` equals any other key named "DB"
/// - Symbols are unique tokens, two calls to `DependencyKey::symbol("DB")` create two different keys
///
/// Symbols are only equal to clones of themselves. Share the key (e.g. through a `static` or a
/// constants module) instead of recreating it where it is used.
#[derive(Clone)]
pub struct DependencyKey(KeyRepr);

#[derive(Clone)]
enum KeyRepr {
    Named(Arc<str>),
    Symbol { id: u64, description: Arc<str> },
}

/// Modules are addressed with the same kind of keys as bindings
pub type ModuleKey = DependencyKey;

impl DependencyKey {
    /// Key which is equal to every other key with the same name
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        DependencyKey(KeyRepr::Named(name.into()))
    }

    /// Unique key, only equal to its own clones
    pub fn symbol(description: impl Into<Arc<str>>) -> Self {
        DependencyKey(KeyRepr::Symbol {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description: description.into(),
        })
    }

    /// Name or symbol description of this key
    pub fn description(&self) -> &str {
        match &self.0 {
            KeyRepr::Named(name) => name,
            KeyRepr::Symbol { description, .. } => description,
        }
    }

    pub fn is_symbol(&self) -> bool {
        matches!(self.0, KeyRepr::Symbol { .. })
    }
}

impl PartialEq for DependencyKey {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (KeyRepr::Named(a), KeyRepr::Named(b)) => a == b,
            (KeyRepr::Symbol { id: a, .. }, KeyRepr::Symbol { id: b, .. }) => a == b,
            _ => false,
        }
    }
}
impl Eq for DependencyKey {}

impl Hash for DependencyKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &self.0 {
            KeyRepr::Named(name) => {
                state.write_u8(0);
                name.hash(state);
            }
            KeyRepr::Symbol { id, .. } => {
                state.write_u8(1);
                id.hash(state);
            }
        }
    }
}

impl Display for DependencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            KeyRepr::Named(name) => f.write_str(name),
            KeyRepr::Symbol { description, .. } => write!(f, "Symbol({description})"),
        }
    }
}
impl Debug for DependencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            KeyRepr::Named(name) => f.debug_tuple("Named").field(name).finish(),
            KeyRepr::Symbol { id, description } => f
                .debug_struct("Symbol")
                .field("id", id)
                .field("description", description)
                .finish(),
        }
    }
}

impl From<&str> for DependencyKey {
    fn from(name: &str) -> Self {
        DependencyKey::named(name)
    }
}
impl From<String> for DependencyKey {
    fn from(name: String) -> Self {
        DependencyKey::named(name)
    }
}
impl From<&DependencyKey> for DependencyKey {
    fn from(key: &DependencyKey) -> Self {
        key.clone()
    }
}

/// A resolved value
///
/// Cloning an instance clones the pointer, never the value.
#[derive(Clone)]
pub struct Instance {
    pub type_name: &'static str,
    pub value: Rc<dyn Any>,
}

impl Instance {
    pub fn new<T: 'static>(value: T) -> Self {
        Self::from_rc(Rc::new(value))
    }

    /// Wraps an already shared value without copying it
    pub fn from_rc<T: 'static>(value: Rc<T>) -> Self {
        Instance {
            type_name: type_name::<T>(),
            value,
        }
    }

    /// Returns the value as `T` or the name of the stored type
    pub fn downcast<T: 'static>(&self) -> Result<Rc<T>, &'static str> {
        match Rc::downcast::<T>(self.value.clone()) {
            Ok(downcasted) => Ok(downcasted),
            Err(_) => Err(self.type_name),
        }
    }

    /// Whether both instances point to the same value
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.value, &other.value)
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Lifecycle of a binding
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Scope {
    /// One instance per container, until the singleton cache is invalidated
    #[default]
    Singleton,
    /// A new instance on every resolution
    Transient,
    /// One instance per [`run_in_scope`](crate::Container::run_in_scope) call
    Scoped,
    /// Scope name which did not match any known scope
    ///
    /// Only produced by parsing text, resolving a binding with it fails with
    /// [`DiError::UnknownScope`](crate::DiError::UnknownScope).
    Unrecognized(String),
}

impl From<&str> for Scope {
    fn from(name: &str) -> Self {
        match name {
            "singleton" => Scope::Singleton,
            "transient" => Scope::Transient,
            "scoped" => Scope::Scoped,
            other => Scope::Unrecognized(other.to_string()),
        }
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Singleton => f.write_str("singleton"),
            Scope::Transient => f.write_str("transient"),
            Scope::Scoped => f.write_str("scoped"),
            Scope::Unrecognized(name) => f.write_str(name),
        }
    }
}
