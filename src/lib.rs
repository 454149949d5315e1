//! # ferrous-lifecycles
//!
//! Singleton and transient lifecycle management layered over a minimal
//! name-keyed dependency injection container.
//!
//! ## Features
//!
//! - **Two lifecycles**: Singleton (created lazily, once per registration) and
//!   Transient (created on every resolution)
//! - **Fail-fast validation**: lifecycle tokens are checked case-insensitively
//!   when the decorator is configured and when each name is registered
//! - **Graph-wide caching**: a singleton resolved as a dependency of another
//!   registration is the same instance a top-level `instance` call returns
//! - **Safe re-registration**: binding a name again discards its cached value
//! - **Container agnostic**: anything implementing [`Container`] can be
//!   decorated; [`BasicContainer`] is provided as a reference implementation
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_lifecycles::{
//!     lifecycles, types, Activator, BasicContainer, Container, RegistrationOptions,
//! };
//! use std::sync::Arc;
//!
//! struct Database {
//!     connection_string: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! // Singleton by default
//! let mut container = lifecycles().decorate(BasicContainer::new).create();
//!
//! container
//!     .bind("db", Activator::constructor(|_| Database {
//!         connection_string: "postgres://localhost".to_string(),
//!     }), None)?
//!     .factory(
//!         "users",
//!         Activator::try_constructor(|deps| Ok(UserService { db: deps.get::<Database>("db")? })),
//!         Some(&RegistrationOptions::new()
//!             .lifecycle(types::TRANSIENT)
//!             .depends_on("db")),
//!     )?;
//!
//! let a = container.instance("users")?;
//! let b = container.instance("users")?;
//! let a = a.downcast_ref::<UserService>().unwrap();
//! let b = b.downcast_ref::<UserService>().unwrap();
//!
//! // Fresh services, shared database
//! assert!(!std::ptr::eq(a, b));
//! assert!(Arc::ptr_eq(&a.db, &b.db));
//! # Ok::<(), ferrous_lifecycles::DiError>(())
//! ```
//!
//! ## Configuring the default
//!
//! ```rust
//! use ferrous_lifecycles::{configure_lifecycles, Lifecycle};
//!
//! // Invalid defaults fail here, not at first registration
//! assert!(configure_lifecycles("boop").is_err());
//!
//! let decorator = configure_lifecycles("TRANSIENT").unwrap();
//! assert_eq!(decorator.default_lifecycle(), Lifecycle::Transient);
//! ```

// Module declarations
pub mod activator;
pub mod config;
pub mod container;
pub mod decoration;
pub mod error;
pub mod lifecycle;
pub mod observer;
pub mod options;
pub mod singleton;
pub mod traits;

#[cfg(feature = "async")]
pub mod async_lifecycle;

// Internal modules
mod internal;
mod registration;

// Re-export core types
pub use activator::{Activator, AnyArc, Dependencies};
pub use config::{LifecycleConfig, DEFAULT_LIFECYCLE_ENV};
pub use container::BasicContainer;
pub use decoration::{
    configure_lifecycles, lifecycles, CreateContainer, DecoratedFactory, LifecycleContainer,
    LifecycleDecorator,
};
pub use error::{DiError, DiResult};
pub use lifecycle::{normalize_lifecycle, resolve_effective_lifecycle, types, Lifecycle};
pub use observer::{LifecycleObserver, LoggingObserver, MetricsObserver};
pub use options::RegistrationOptions;
pub use registration::ActivatorKind;
pub use singleton::SingletonCell;
pub use traits::{Container, ContainerExt};

#[cfg(feature = "async")]
pub use async_lifecycle::{
    async_activator, AsyncActivator, AsyncFnActivator, AsyncLifecycleContainer,
};
