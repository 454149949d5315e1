//! A minimal name-keyed container implementing [`Container`].
//!
//! `BasicContainer` knows nothing about lifecycles: every `instance` call
//! runs the registered activator. Decorate it with a
//! [`LifecycleDecorator`](crate::LifecycleDecorator) to get singleton caching.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::activator::{Activator, AnyArc, Dependencies};
use crate::error::{DiError, DiResult};
use crate::internal::with_circular_guard;
use crate::options::RegistrationOptions;
use crate::registration::{ActivatorKind, Registration, Registry};
use crate::traits::Container;

static NEXT_CONTAINER_ID: AtomicUsize = AtomicUsize::new(1);

/// Reference implementation of the container contract.
///
/// - Registering a name again replaces the previous registration.
/// - Empty (or whitespace-only) names are rejected with
///   [`DiError::InvalidName`].
/// - Activators see their declared dependencies through a lazy
///   [`Dependencies`] view; each dependency is resolved through this
///   container when the activator asks for it.
/// - Cycles fail with [`DiError::Circular`] and runaway nesting with
///   [`DiError::DepthExceeded`].
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{
///     Activator, BasicContainer, Container, ContainerExt, RegistrationOptions,
/// };
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Client { config: Arc<Config> }
///
/// let mut container = BasicContainer::new();
/// container
///     .bind("config", Activator::constructor(|_| Config { url: "db://local".into() }), None)?
///     .bind(
///         "client",
///         Activator::try_constructor(|deps| Ok(Client { config: deps.get::<Config>("config")? })),
///         Some(&RegistrationOptions::new().depends_on("config")),
///     )?;
///
/// let client = container.get::<Client>("client")?;
/// assert_eq!(client.config.url, "db://local");
/// # Ok::<(), ferrous_lifecycles::DiError>(())
/// ```
#[derive(Debug)]
pub struct BasicContainer {
    id: usize,
    registry: Registry,
}

impl BasicContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            id: NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed),
            registry: Registry::new(),
        }
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// Registered names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    /// Whether `name` was registered through `bind` or `factory`.
    pub fn kind_of(&self, name: &str) -> Option<ActivatorKind> {
        self.registry.get(name).map(|reg| reg.kind)
    }

    fn register(
        &mut self,
        kind: ActivatorKind,
        name: &str,
        activator: Activator,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        if name.trim().is_empty() {
            return Err(DiError::InvalidName(name.to_string()));
        }

        let dependencies = options.map(|o| o.dependencies.clone()).unwrap_or_default();
        self.registry
            .insert(name, Registration::new(kind, activator, dependencies));
        Ok(self)
    }
}

impl Default for BasicContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Container for BasicContainer {
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
        let registration = self
            .registry
            .get(name)
            .ok_or_else(|| DiError::NotFound(name.to_string()))?;

        with_circular_guard(self.id, name, || {
            let deps = Dependencies::new(name, &registration.dependencies, self);
            registration.activator.activate(&deps)
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }
}
