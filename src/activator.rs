//! Type-erased activators and the dependency view they receive.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::traits::Container;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

type ActivateFn = dyn for<'a> Fn(&Dependencies<'a>) -> DiResult<AnyArc> + Send + Sync;

/// A shareable activation function.
///
/// Every registration kind is erased to the same shape, so wrapping logic
/// written once applies to constructors and factories alike. Cloning is
/// cheap; clones share the underlying function.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{Activator, Dependencies};
/// use std::sync::Arc;
///
/// struct Config { retries: u32 }
///
/// // The activator owns placing the value in an Arc
/// let ctor = Activator::constructor(|_| Config { retries: 3 });
///
/// // The activator hands back an already shared value
/// let shared = Arc::new(Config { retries: 5 });
/// let factory = Activator::factory(move |_| shared.clone());
///
/// let a = ctor.activate(&Dependencies::none()).unwrap();
/// let b = factory.activate(&Dependencies::none()).unwrap();
/// assert_eq!(a.downcast_ref::<Config>().unwrap().retries, 3);
/// assert_eq!(b.downcast_ref::<Config>().unwrap().retries, 5);
/// ```
#[derive(Clone)]
pub struct Activator {
    func: Arc<ActivateFn>,
}

impl Activator {
    /// Wraps a function that already produces a type-erased value.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&Dependencies<'a>) -> DiResult<AnyArc> + Send + Sync + 'static,
    {
        Self { func: Arc::new(f) }
    }

    /// Constructor-style activator: builds an owned value per call.
    pub fn constructor<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&Dependencies<'a>) -> T + Send + Sync + 'static,
    {
        Self::new(move |deps| Ok(Arc::new(f(deps)) as AnyArc))
    }

    /// Fallible constructor-style activator.
    pub fn try_constructor<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&Dependencies<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self::new(move |deps| Ok(Arc::new(f(deps)?) as AnyArc))
    }

    /// Factory-style activator: returns a value that is already shared.
    pub fn factory<T, F>(f: F) -> Self
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&Dependencies<'a>) -> Arc<T> + Send + Sync + 'static,
    {
        Self::new(move |deps| Ok(f(deps) as AnyArc))
    }

    /// Recovers an activator from a loosely-typed value.
    ///
    /// Anything other than a boxed `Activator` is rejected with
    /// [`DiError::TypeMismatch`].
    ///
    /// ```
    /// use ferrous_lifecycles::{Activator, DiError};
    ///
    /// let ok = Activator::from_any(Box::new(Activator::constructor(|_| 1u8)));
    /// assert!(ok.is_ok());
    ///
    /// let err = Activator::from_any(Box::new("not callable"));
    /// assert!(matches!(err, Err(DiError::TypeMismatch(_))));
    /// ```
    pub fn from_any(raw: Box<dyn Any + Send + Sync>) -> DiResult<Self> {
        raw.downcast::<Activator>()
            .map(|activator| *activator)
            .map_err(|_| DiError::TypeMismatch("activator must be callable"))
    }

    /// Runs the activator.
    pub fn activate(&self, deps: &Dependencies<'_>) -> DiResult<AnyArc> {
        (self.func)(deps)
    }

    /// Whether two handles share the same function.
    pub fn ptr_eq(&self, other: &Activator) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }
}

impl fmt::Debug for Activator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activator").finish_non_exhaustive()
    }
}

/// Lazy access to the dependencies a registration declared.
///
/// Nothing is resolved until the activator asks for it, so an activator that
/// ends up not running (for instance because its singleton is already
/// cached) never touches its dependencies.
pub struct Dependencies<'a> {
    owner: &'a str,
    declared: &'a [String],
    resolver: Option<&'a dyn Container>,
}

impl<'a> Dependencies<'a> {
    /// Creates a view for `owner` resolving `declared` through `resolver`.
    pub fn new(owner: &'a str, declared: &'a [String], resolver: &'a dyn Container) -> Self {
        Self {
            owner,
            declared,
            resolver: Some(resolver),
        }
    }

    /// An empty view with no resolver behind it.
    pub fn none() -> Dependencies<'static> {
        Dependencies {
            owner: "",
            declared: &[],
            resolver: None,
        }
    }

    /// Name of the registration being activated.
    pub fn owner(&self) -> &str {
        self.owner
    }

    /// Declared dependency names, in declaration order.
    pub fn names(&self) -> &[String] {
        self.declared
    }

    pub fn len(&self) -> usize {
        self.declared.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declared.is_empty()
    }

    /// Resolves a declared dependency without downcasting it.
    pub fn get_any(&self, name: &str) -> DiResult<AnyArc> {
        let resolver = match self.resolver {
            Some(resolver) if self.declared.iter().any(|d| d == name) => resolver,
            _ => return Err(self.undeclared(name)),
        };
        resolver.instance(name)
    }

    /// Resolves a declared dependency as `T`.
    pub fn get<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        downcast(self.get_any(name)?)
    }

    /// Resolves the dependency declared at `index` as `T`.
    pub fn at<T: Any + Send + Sync>(&self, index: usize) -> DiResult<Arc<T>> {
        match self.declared.get(index) {
            Some(name) => self.get(name),
            None => Err(self.undeclared(&format!("#{}", index))),
        }
    }

    fn undeclared(&self, dependency: &str) -> DiError {
        DiError::UndeclaredDependency {
            name: self.owner.to_string(),
            dependency: dependency.to_string(),
        }
    }
}

impl fmt::Debug for Dependencies<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependencies")
            .field("owner", &self.owner)
            .field("declared", &self.declared)
            .finish()
    }
}

pub(crate) fn downcast<T: Any + Send + Sync>(value: AnyArc) -> DiResult<Arc<T>> {
    value
        .downcast::<T>()
        .map_err(|_| DiError::TypeMismatch(type_name::<T>()))
}
