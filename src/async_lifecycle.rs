//! Async activators with coalesced singleton activation.
//!
//! The synchronous decorator activates a singleton once because resolution
//! runs to completion on one thread. With async activators several tasks can
//! ask for the same singleton while its first activation is still pending;
//! here they all await that single in-flight activation instead of racing
//! their own.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use crate::activator::{downcast, AnyArc};
use crate::config::LifecycleConfig;
use crate::error::{DiError, DiResult};
use crate::lifecycle::{resolve_effective_lifecycle, Lifecycle};
use crate::options::RegistrationOptions;

/// Trait for activators that produce instances asynchronously.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{AsyncActivator, AnyArc, DiResult};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct PoolActivator {
///     url: String,
/// }
///
/// #[async_trait]
/// impl AsyncActivator for PoolActivator {
///     async fn activate(&self) -> DiResult<AnyArc> {
///         // connect, handshake, warm up...
///         Ok(Arc::new(self.url.clone()) as AnyArc)
///     }
/// }
/// ```
#[async_trait]
pub trait AsyncActivator: Send + Sync {
    /// Produces one instance.
    async fn activate(&self) -> DiResult<AnyArc>;
}

/// Adapter turning an async closure into an [`AsyncActivator`].
pub struct AsyncFnActivator<F> {
    f: F,
}

/// Wraps `f` as an async activator; each call's output is placed in a fresh `Arc`.
pub fn async_activator<F, Fut, T>(f: F) -> Arc<dyn AsyncActivator>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DiResult<T>> + Send + 'static,
    T: Send + Sync + 'static,
{
    Arc::new(AsyncFnActivator { f })
}

#[async_trait]
impl<F, Fut, T> AsyncActivator for AsyncFnActivator<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DiResult<T>> + Send + 'static,
    T: Send + Sync + 'static,
{
    async fn activate(&self) -> DiResult<AnyArc> {
        Ok(Arc::new((self.f)().await?) as AnyArc)
    }
}

#[derive(Clone)]
enum AsyncEntry {
    Singleton {
        activator: Arc<dyn AsyncActivator>,
        cell: Arc<OnceCell<AnyArc>>,
    },
    Transient(Arc<dyn AsyncActivator>),
}

/// Name-keyed container for async activators.
///
/// Registration is synchronous and validates the lifecycle exactly like the
/// synchronous decorator: options first, configured default otherwise,
/// re-registration replaces the activator and discards any cached value.
/// Resolution is async; share the container (for example in an `Arc`) to
/// resolve from several tasks.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{async_activator, AsyncLifecycleContainer, LifecycleConfig};
/// use std::sync::Arc;
///
/// # #[tokio::main]
/// # async fn main() -> ferrous_lifecycles::DiResult<()> {
/// let mut container = AsyncLifecycleContainer::new(LifecycleConfig::default());
/// container.register("pool", async_activator(|| async { Ok(String::from("pool")) }), None)?;
///
/// let a = container.get::<String>("pool").await?;
/// let b = container.get::<String>("pool").await?;
/// assert!(Arc::ptr_eq(&a, &b));
/// # Ok(())
/// # }
/// ```
pub struct AsyncLifecycleContainer {
    default_lifecycle: Lifecycle,
    entries: HashMap<String, AsyncEntry>,
}

impl AsyncLifecycleContainer {
    /// Creates an empty container using `config`'s default lifecycle.
    pub fn new(config: LifecycleConfig) -> Self {
        Self {
            default_lifecycle: config.default_lifecycle,
            entries: HashMap::new(),
        }
    }

    /// Registers `activator` under `name`.
    pub fn register(
        &mut self,
        name: &str,
        activator: Arc<dyn AsyncActivator>,
        options: Option<&RegistrationOptions>,
    ) -> DiResult<&mut Self> {
        if name.trim().is_empty() {
            return Err(DiError::InvalidName(name.to_string()));
        }

        let lifecycle = resolve_effective_lifecycle(options, self.default_lifecycle)?;
        let entry = match lifecycle {
            Lifecycle::Singleton => AsyncEntry::Singleton {
                activator,
                cell: Arc::new(OnceCell::new()),
            },
            Lifecycle::Transient => AsyncEntry::Transient(activator),
        };

        tracing::debug!(name, %lifecycle, "registered async activator");
        self.entries.insert(name.to_string(), entry);
        Ok(self)
    }

    /// Resolves `name`.
    ///
    /// Concurrent first resolutions of a singleton share one activation. If
    /// it fails, the error goes to the task that ran it and a waiting task
    /// takes over the activation.
    pub async fn instance(&self, name: &str) -> DiResult<AnyArc> {
        let entry = self
            .entries
            .get(name)
            .cloned()
            .ok_or_else(|| DiError::NotFound(name.to_string()))?;

        match entry {
            AsyncEntry::Singleton { activator, cell } => {
                let value = cell
                    .get_or_try_init(|| async move {
                        tracing::debug!(name, "activating async singleton");
                        activator.activate().await
                    })
                    .await?;
                Ok(value.clone())
            }
            AsyncEntry::Transient(activator) => activator.activate().await,
        }
    }

    /// Resolves `name` and downcasts it to `T`.
    pub async fn get<T: std::any::Any + Send + Sync>(&self, name: &str) -> DiResult<Arc<T>> {
        downcast(self.instance(name).await?)
    }

    /// Lifecycle of a registered name.
    pub fn lifecycle_of(&self, name: &str) -> Option<Lifecycle> {
        self.entries.get(name).map(|entry| match entry {
            AsyncEntry::Singleton { .. } => Lifecycle::Singleton,
            AsyncEntry::Transient(_) => Lifecycle::Transient,
        })
    }

    /// Whether the singleton registered under `name` has been activated.
    pub fn is_created(&self, name: &str) -> bool {
        matches!(
            self.entries.get(name),
            Some(AsyncEntry::Singleton { cell, .. }) if cell.initialized()
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }
}

impl fmt::Debug for AsyncLifecycleContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncLifecycleContainer")
            .field("default_lifecycle", &self.default_lifecycle)
            .field("registrations", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn slow_counter(counter: Arc<AtomicUsize>) -> Arc<dyn AsyncActivator> {
        async_activator(move || {
            let counter = counter.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(counter.fetch_add(1, Ordering::SeqCst))
            }
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_resolutions_coalesce() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut container = AsyncLifecycleContainer::new(LifecycleConfig::default());
        container.register("slow", slow_counter(calls.clone()), None).unwrap();
        let container = Arc::new(container);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let container = container.clone();
            handles.push(tokio::spawn(async move {
                container.instance("slow").await.unwrap()
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(values.iter().all(|v| Arc::ptr_eq(v, &values[0])));
        assert!(container.is_created("slow"));
    }

    #[tokio::test]
    async fn test_transient_activates_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut container =
            AsyncLifecycleContainer::new(LifecycleConfig::from(Lifecycle::Transient));
        container.register("t", slow_counter(calls.clone()), None).unwrap();

        let a = container.get::<usize>("t").await.unwrap();
        let b = container.get::<usize>("t").await.unwrap();

        assert_eq!((*a, *b), (0, 1));
        assert_eq!(container.lifecycle_of("t"), Some(Lifecycle::Transient));
        assert!(!container.is_created("t"));
    }

    #[tokio::test]
    async fn test_failed_activation_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let mut container = AsyncLifecycleContainer::new(LifecycleConfig::default());
        container
            .register(
                "flaky",
                async_activator(move || {
                    let attempt = counter.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt == 0 {
                            Err(DiError::Activation("first attempt".to_string()))
                        } else {
                            Ok(attempt)
                        }
                    }
                }),
                None,
            )
            .unwrap();

        assert!(container.instance("flaky").await.is_err());
        assert!(!container.is_created("flaky"));
        assert_eq!(*container.get::<usize>("flaky").await.unwrap(), 1);
        assert_eq!(*container.get::<usize>("flaky").await.unwrap(), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reregistration_discards_cached_value() {
        let mut container = AsyncLifecycleContainer::new(LifecycleConfig::default());
        container
            .register("v", async_activator(|| async { Ok(1u8) }), None)
            .unwrap();
        assert_eq!(*container.get::<u8>("v").await.unwrap(), 1);

        container
            .register("v", async_activator(|| async { Ok(2u8) }), None)
            .unwrap();
        assert!(!container.is_created("v"));
        assert_eq!(*container.get::<u8>("v").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_registration_errors() {
        let mut container = AsyncLifecycleContainer::new(LifecycleConfig::default());
        let bad = RegistrationOptions::new().lifecycle("scoped");

        assert_eq!(
            container
                .register("x", async_activator(|| async { Ok(()) }), Some(&bad))
                .unwrap_err(),
            DiError::InvalidLifecycle("scoped".to_string())
        );
        assert!(matches!(
            container.register("", async_activator(|| async { Ok(()) }), None),
            Err(DiError::InvalidName(_))
        ));
        assert_eq!(
            container.instance("x").await.unwrap_err(),
            DiError::NotFound("x".to_string())
        );
    }
}
