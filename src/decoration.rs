//! Lifecycle decoration of containers.
//!
//! A [`LifecycleDecorator`] turns a function that creates containers into a
//! [`DecoratedFactory`] whose containers cache singleton activations. The
//! caching lives at the activator boundary: when a name is registered as a
//! singleton, the activator handed to the underlying container is wrapped so
//! that it runs at most once and returns the cached value afterwards. The
//! underlying container calls that same wrapped activator when the name is
//! resolved as a dependency of something else, so singletons stay shared
//! throughout the dependency graph, not only at top-level `instance` calls.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::activator::{Activator, AnyArc};
use crate::config::LifecycleConfig;
use crate::error::{DiError, DiResult};
use crate::lifecycle::{resolve_effective_lifecycle, Lifecycle};
use crate::observer::LifecycleObserver;
use crate::options::RegistrationOptions;
use crate::registration::ActivatorKind;
use crate::singleton::SingletonCell;
use crate::traits::Container;

/// Shareable function producing fresh underlying containers.
pub type CreateContainer<C> = Arc<dyn Fn() -> C + Send + Sync>;

type Observers = Arc<[Arc<dyn LifecycleObserver>]>;

/// Configured lifecycle decorator.
///
/// Holds the validated default lifecycle and any observers; both are handed
/// to every container it produces.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{configure_lifecycles, Activator, BasicContainer, Container};
/// use std::sync::Arc;
///
/// let decorator = configure_lifecycles("transient")?;
/// let mut container = decorator.decorate(BasicContainer::new).create();
///
/// container.bind("id", Activator::constructor(|_| 1u64), None)?;
/// let a = container.instance("id")?;
/// let b = container.instance("id")?;
/// assert!(!Arc::ptr_eq(&a, &b));
/// # Ok::<(), ferrous_lifecycles::DiError>(())
/// ```
#[derive(Clone, Default)]
pub struct LifecycleDecorator {
    config: LifecycleConfig,
    observers: Vec<Arc<dyn LifecycleObserver>>,
}

impl LifecycleDecorator {
    /// Creates a decorator from an already validated configuration.
    pub fn from_config(config: LifecycleConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Lifecycle applied when registration options do not name one.
    pub fn default_lifecycle(&self) -> Lifecycle {
        self.config.default_lifecycle
    }

    /// Attaches an observer to every container produced from now on.
    pub fn with_observer(mut self, observer: Arc<dyn LifecycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Wraps a container constructor.
    pub fn decorate<C, F>(&self, create_container: F) -> DecoratedFactory<C>
    where
        C: Container,
        F: Fn() -> C + Send + Sync + 'static,
    {
        DecoratedFactory {
            create_container: Arc::new(create_container),
            default_lifecycle: self.config.default_lifecycle,
            observers: Arc::from(self.observers.clone()),
        }
    }

    /// Wraps a container constructor supplied as a loosely-typed value.
    ///
    /// The value must be a boxed [`CreateContainer<C>`]; anything else fails
    /// with [`DiError::TypeMismatch`].
    ///
    /// ```
    /// use ferrous_lifecycles::{lifecycles, BasicContainer, CreateContainer, DiError};
    /// use std::sync::Arc;
    ///
    /// let create: CreateContainer<BasicContainer> = Arc::new(BasicContainer::new);
    /// assert!(lifecycles().decorate_any::<BasicContainer>(Box::new(create)).is_ok());
    ///
    /// let err = lifecycles().decorate_any::<BasicContainer>(Box::new(42)).unwrap_err();
    /// assert!(matches!(err, DiError::TypeMismatch(_)));
    /// ```
    pub fn decorate_any<C>(&self, raw: Box<dyn Any + Send + Sync>) -> DiResult<DecoratedFactory<C>>
    where
        C: Container + 'static,
    {
        let create_container = raw
            .downcast::<CreateContainer<C>>()
            .map_err(|_| DiError::TypeMismatch("createContainer must be callable"))?;

        Ok(DecoratedFactory {
            create_container: *create_container,
            default_lifecycle: self.config.default_lifecycle,
            observers: Arc::from(self.observers.clone()),
        })
    }
}

impl fmt::Debug for LifecycleDecorator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleDecorator")
            .field("default_lifecycle", &self.config.default_lifecycle)
            .field("observers", &format!("{} observers", self.observers.len()))
            .finish()
    }
}

/// Validates `default_lifecycle` and returns a decorator bound to it.
///
/// An invalid default fails here, before any container exists.
///
/// ```
/// use ferrous_lifecycles::{configure_lifecycles, Lifecycle};
///
/// assert!(configure_lifecycles("boop").is_err());
/// assert_eq!(
///     configure_lifecycles("tranSieNt").unwrap().default_lifecycle(),
///     Lifecycle::Transient
/// );
/// ```
pub fn configure_lifecycles(default_lifecycle: impl fmt::Display) -> DiResult<LifecycleDecorator> {
    Ok(LifecycleDecorator::from_config(LifecycleConfig::new(
        default_lifecycle,
    )?))
}

/// Decorator preconfigured with [`Lifecycle::Singleton`] as the default.
pub fn lifecycles() -> LifecycleDecorator {
    LifecycleDecorator::from_config(LifecycleConfig::from(Lifecycle::Singleton))
}

/// Produces lifecycle-aware containers.
pub struct DecoratedFactory<C> {
    create_container: CreateContainer<C>,
    default_lifecycle: Lifecycle,
    observers: Observers,
}

impl<C: Container> DecoratedFactory<C> {
    /// Creates a new underlying container and wraps it.
    ///
    /// Each call yields an independent container with its own singleton
    /// cells.
    pub fn create(&self) -> LifecycleContainer<C> {
        LifecycleContainer {
            inner: (self.create_container)(),
            default_lifecycle: self.default_lifecycle,
            observers: self.observers.clone(),
            singletons: HashMap::new(),
            lifecycles: HashMap::new(),
        }
    }
}

impl<C> Clone for DecoratedFactory<C> {
    fn clone(&self) -> Self {
        Self {
            create_container: self.create_container.clone(),
            default_lifecycle: self.default_lifecycle,
            observers: self.observers.clone(),
        }
    }
}

impl<C> fmt::Debug for DecoratedFactory<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratedFactory")
            .field("default_lifecycle", &self.default_lifecycle)
            .finish_non_exhaustive()
    }
}

/// A container whose singleton registrations are activated once.
///
/// Registration goes through [`Container::bind`] / [`Container::factory`];
/// resolution is forwarded to the wrapped container untouched.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{lifecycles, Activator, BasicContainer, Container, RegistrationOptions};
/// use std::sync::Arc;
///
/// let mut container = lifecycles().decorate(BasicContainer::new).create();
/// container
///     .bind("config", Activator::constructor(|_| String::from("cfg")), None)?
///     .factory(
///         "request",
///         Activator::constructor(|_| 0u32),
///         Some(&RegistrationOptions::new().lifecycle("transient")),
///     )?;
///
/// let c1 = container.instance("config")?;
/// let c2 = container.instance("config")?;
/// assert!(Arc::ptr_eq(&c1, &c2));
/// assert!(container.is_created("config"));
/// assert!(!container.is_created("request"));
/// # Ok::<(), ferrous_lifecycles::DiError>(())
/// ```
pub struct LifecycleContainer<C> {
    inner: C,
    default_lifecycle: Lifecycle,
    observers: Observers,
    singletons: HashMap<String, Arc<SingletonCell>>,
    lifecycles: HashMap<String, Lifecycle>,
}

impl<C: Container> LifecycleContainer<C> {
    /// The wrapped container.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Unwraps the container. Registered caching activators keep working.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Lifecycle of a name registered through this container.
    pub fn lifecycle_of(&self, name: &str) -> Option<Lifecycle> {
        self.lifecycles.get(name).copied()
    }

    /// Whether the singleton registered under `name` has been activated.
    ///
    /// Always `false` for transient or unknown names.
    pub fn is_created(&self, name: &str) -> bool {
        self.singletons
            .get(name)
            .map_or(false, |cell| cell.is_created())
    }

    /// Number of names currently registered as singletons.
    pub fn singleton_count(&self) -> usize {
        self.singletons.len()
    }

    /// `bind` with a loosely-typed activator.
    ///
    /// Fails with [`DiError::TypeMismatch`] unless `activator` is a boxed
    /// [`Activator`].
    pub fn bind_any(
        &mut self,
        name: &str,
        activator: Box<dyn Any + Send + Sync>,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        let activator = Activator::from_any(activator)?;
        self.register(ActivatorKind::Constructor, name, activator, options)
    }

    /// `factory` with a loosely-typed activator.
    pub fn factory_any(
        &mut self,
        name: &str,
        activator: Box<dyn Any + Send + Sync>,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        let activator = Activator::from_any(activator)?;
        self.register(ActivatorKind::Factory, name, activator, options)
    }

    fn register(
        &mut self,
        kind: ActivatorKind,
        name: &str,
        activator: Activator,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        let lifecycle = resolve_effective_lifecycle(options, self.default_lifecycle)?;

        let cell = match lifecycle {
            Lifecycle::Singleton => Some(Arc::new(SingletonCell::named(name))),
            Lifecycle::Transient => None,
        };
        let delegated = match &cell {
            Some(cell) => caching_activator(name, cell.clone(), activator, self.observers.clone()),
            None => activator,
        };

        match kind {
            ActivatorKind::Constructor => {
                self.inner.bind(name, delegated, options)?;
            }
            ActivatorKind::Factory => {
                self.inner.factory(name, delegated, options)?;
            }
        }

        // The underlying container accepted the name, so the old cell (if
        // any) now belongs to an activator nobody can reach.
        match cell {
            Some(cell) => {
                self.singletons.insert(name.to_string(), cell);
            }
            None => {
                self.singletons.remove(name);
            }
        }
        self.lifecycles.insert(name.to_string(), lifecycle);

        tracing::debug!(name, %lifecycle, ?kind, "registered");
        for observer in self.observers.iter() {
            observer.registered(name, lifecycle, kind);
        }

        Ok(self)
    }
}

impl<C: Container> Container for LifecycleContainer<C> {
    fn bind(
        &mut self,
        name: &str,
        activator: Activator,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        self.register(ActivatorKind::Constructor, name, activator, options)
    }

    fn factory(
        &mut self,
        name: &str,
        activator: Activator,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        self.register(ActivatorKind::Factory, name, activator, options)
    }

    fn instance(&self, name: &str) -> DiResult<AnyArc> {
        self.inner.instance(name)
    }

    fn contains(&self, name: &str) -> bool {
        self.inner.contains(name)
    }
}

impl<C: fmt::Debug> fmt::Debug for LifecycleContainer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleContainer")
            .field("inner", &self.inner)
            .field("default_lifecycle", &self.default_lifecycle)
            .field("singletons", &self.singletons)
            .finish()
    }
}

/// Wraps `activator` so it runs at most once successfully per `cell`.
fn caching_activator(
    name: &str,
    cell: Arc<SingletonCell>,
    activator: Activator,
    observers: Observers,
) -> Activator {
    let name = name.to_string();
    Activator::new(move |deps| {
        let started = Instant::now();
        match cell.get_or_try_init(|| activator.activate(deps)) {
            Ok((value, true)) => {
                let elapsed = started.elapsed();
                tracing::debug!(name = %name, ?elapsed, "singleton activated");
                for observer in observers.iter() {
                    observer.activated(&name, elapsed);
                }
                Ok(value)
            }
            Ok((value, false)) => {
                tracing::trace!(name = %name, "singleton cache hit");
                for observer in observers.iter() {
                    observer.cache_hit(&name);
                }
                Ok(value)
            }
            Err(error) => {
                for observer in observers.iter() {
                    observer.activation_failed(&name, &error);
                }
                Err(error)
            }
        }
    })
}
