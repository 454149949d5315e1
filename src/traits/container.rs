//! The container contract the lifecycle layer decorates.

use std::any::Any;
use std::sync::Arc;

use crate::activator::{downcast, Activator, AnyArc};
use crate::error::DiResult;
use crate::options::RegistrationOptions;

/// Name-keyed registration and resolution.
///
/// This is the whole surface the lifecycle layer relies on. Storage,
/// dependency ordering, name-collision policy and the mechanics of turning an
/// activator into an instance all belong to the implementor; errors it raises
/// are passed through the lifecycle layer untouched.
///
/// `instance` and `contains` are object-safe so that activators can reach
/// their dependencies through a `&dyn Container`.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{Activator, BasicContainer, Container};
///
/// let mut container = BasicContainer::new();
/// container
///     .bind("greeting", Activator::constructor(|_| "hello".to_string()), None)?
///     .factory("answer", Activator::constructor(|_| 42u32), None)?;
///
/// assert!(container.contains("greeting"));
/// let answer = container.instance("answer")?;
/// assert_eq!(answer.downcast_ref::<u32>(), Some(&42));
/// # Ok::<(), ferrous_lifecycles::DiError>(())
/// ```
pub trait Container {
    /// Registers a constructor-style activator under `name`.
    fn bind(
        &mut self,
        name: &str,
        activator: Activator,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self>
    where
        Self: Sized;

    /// Registers a factory-style activator under `name`.
    fn factory(
        &mut self,
        name: &str,
        activator: Activator,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self>
    where
        Self: Sized;

    /// Resolves the instance registered under `name`.
    fn instance(&self, name: &str) -> DiResult<AnyArc>;

    /// Whether `name` has a registration.
    fn contains(&self, name: &str) -> bool;
}

/// Typed resolution on top of [`Container::instance`].
///
/// Implemented for every container, including trait objects.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{Activator, BasicContainer, Container, ContainerExt};
///
/// let mut container = BasicContainer::new();
/// container.bind("port", Activator::constructor(|_| 8080u16), None)?;
///
/// let port = container.get::<u16>("port")?;
/// assert_eq!(*port, 8080);
/// assert!(container.get::<String>("port").is_err());
/// # Ok::<(), ferrous_lifecycles::DiError>(())
/// ```
pub trait ContainerExt: Container {
    /// Resolves `name` and downcasts it to `T`.
    fn get<T: Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        downcast(self.instance(name)?)
    }
}

impl<C: Container + ?Sized> ContainerExt for C {}
