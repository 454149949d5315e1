//! Observers for lifecycle events.
//!
//! Observers are attached to a [`LifecycleDecorator`](crate::LifecycleDecorator)
//! and see every registration it handles and every singleton activation or
//! cache hit in the containers it produces. Transient resolutions go straight
//! to the underlying container and are not observed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::DiError;
use crate::lifecycle::Lifecycle;
use crate::registration::ActivatorKind;

/// Observer trait for lifecycle events.
///
/// All methods default to no-ops so implementors only override what they
/// care about. Calls are made synchronously on the resolving thread; keep
/// implementations cheap.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{lifecycles, Activator, BasicContainer, Container, LifecycleObserver};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct CountingObserver {
///     activations: AtomicUsize,
/// }
///
/// impl LifecycleObserver for CountingObserver {
///     fn activated(&self, _name: &str, _duration: Duration) {
///         self.activations.fetch_add(1, Ordering::SeqCst);
///     }
/// }
///
/// let observer = Arc::new(CountingObserver::default());
/// let mut container = lifecycles()
///     .with_observer(observer.clone())
///     .decorate(BasicContainer::new)
///     .create();
///
/// container.bind("clock", Activator::constructor(|_| 0u64), None).unwrap();
/// container.instance("clock").unwrap();
/// container.instance("clock").unwrap();
/// assert_eq!(observer.activations.load(Ordering::SeqCst), 1);
/// ```
pub trait LifecycleObserver: Send + Sync {
    /// Called after a registration has been accepted by the underlying container.
    fn registered(&self, _name: &str, _lifecycle: Lifecycle, _kind: ActivatorKind) {}

    /// Called after a singleton's activator ran successfully.
    fn activated(&self, _name: &str, _duration: Duration) {}

    /// Called when a singleton resolution is served from its cell.
    fn cache_hit(&self, _name: &str) {}

    /// Called when a singleton's activator failed; nothing was cached.
    fn activation_failed(&self, _name: &str, _error: &DiError) {}
}

/// Built-in observer that emits `tracing` events.
///
/// Registrations and activations are logged at `info`, cache hits at
/// `trace`, failures at `warn`. Install a subscriber to see them.
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{lifecycles, LoggingObserver};
/// use std::sync::Arc;
///
/// let decorator = lifecycles().with_observer(Arc::new(LoggingObserver::with_prefix("[app]")));
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[ferrous-lifecycles]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleObserver for LoggingObserver {
    fn registered(&self, name: &str, lifecycle: Lifecycle, kind: ActivatorKind) {
        tracing::info!(prefix = %self.prefix, name, %lifecycle, ?kind, "registered");
    }

    fn activated(&self, name: &str, duration: Duration) {
        tracing::info!(prefix = %self.prefix, name, ?duration, "singleton activated");
    }

    fn cache_hit(&self, name: &str) {
        tracing::trace!(prefix = %self.prefix, name, "singleton cache hit");
    }

    fn activation_failed(&self, name: &str, error: &DiError) {
        tracing::warn!(prefix = %self.prefix, name, %error, "singleton activation failed");
    }
}

/// Observer that counts lifecycle events.
///
/// Useful for asserting exactly-once activation in tests and for cheap
/// runtime statistics.
#[derive(Debug, Default)]
pub struct MetricsObserver {
    registrations: AtomicU64,
    activations: AtomicU64,
    cache_hits: AtomicU64,
    failures: AtomicU64,
    total_activation_nanos: AtomicU64,
}

impl MetricsObserver {
    /// Creates a new metrics observer.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> u64 {
        self.registrations.load(Ordering::Relaxed)
    }

    pub fn activations(&self) -> u64 {
        self.activations.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Total time spent inside singleton activators.
    pub fn total_activation_time(&self) -> Duration {
        Duration::from_nanos(self.total_activation_nanos.load(Ordering::Relaxed))
    }

    /// Average activation time, if anything was activated.
    pub fn average_activation_time(&self) -> Option<Duration> {
        match self.activations() {
            0 => None,
            count => Some(Duration::from_nanos(
                self.total_activation_nanos.load(Ordering::Relaxed) / count,
            )),
        }
    }

    /// Share of singleton resolutions served from cache.
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.cache_hits() as f64;
        let total = hits + self.activations() as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Resets all counters.
    pub fn reset(&self) {
        self.registrations.store(0, Ordering::Relaxed);
        self.activations.store(0, Ordering::Relaxed);
        self.cache_hits.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.total_activation_nanos.store(0, Ordering::Relaxed);
    }
}

impl LifecycleObserver for MetricsObserver {
    fn registered(&self, _name: &str, _lifecycle: Lifecycle, _kind: ActivatorKind) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    fn activated(&self, _name: &str, duration: Duration) {
        self.activations.fetch_add(1, Ordering::Relaxed);
        self.total_activation_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn cache_hit(&self, _name: &str) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn activation_failed(&self, _name: &str, _error: &DiError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }
}
