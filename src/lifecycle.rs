//! Lifecycle policy definitions and token normalization.

use std::fmt;
use std::str::FromStr;

use crate::error::{DiError, DiResult};
use crate::options::RegistrationOptions;

/// Canonical lifecycle tokens.
///
/// Callers can reference these instead of spelling the literals out; parsing
/// accepts any casing of them.
pub mod types {
    /// Token for [`Lifecycle::Singleton`](super::Lifecycle::Singleton).
    pub const SINGLETON: &str = "singleton";
    /// Token for [`Lifecycle::Transient`](super::Lifecycle::Transient).
    pub const TRANSIENT: &str = "transient";
}

/// Lifecycles controlling instance caching behavior
///
/// Decides whether a registration is activated once and shared, or activated
/// again on every resolution.
///
/// # Examples
///
/// ```rust
/// use ferrous_lifecycles::{lifecycles, Activator, Container, RegistrationOptions};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// let mut container = lifecycles().decorate(ferrous_lifecycles::BasicContainer::new).create();
///
/// // Singleton: one instance for the container's lifetime
/// container.bind("db", Activator::constructor(|_| Database {
///     url: "postgres://localhost".to_string(),
/// }), None).unwrap();
///
/// // Transient: new instance every time
/// container.factory("request", Activator::constructor(|_| RequestModel { id: 7 }),
///     Some(&RegistrationOptions::new().lifecycle("transient"))).unwrap();
///
/// let db1 = container.instance("db").unwrap();
/// let db2 = container.instance("db").unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// let r1 = container.instance("request").unwrap();
/// let r2 = container.instance("request").unwrap();
/// assert!(!Arc::ptr_eq(&r1, &r2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Single instance per registration, created lazily and cached
    ///
    /// The activator runs on the first resolution of the name; every later
    /// resolution, including ones made while activating other registrations,
    /// returns the cached value. Re-registering the name discards the cache.
    Singleton,
    /// New instance per resolution, never cached
    Transient,
}

impl Lifecycle {
    /// Both lifecycles, in declaration order.
    pub const ALL: [Lifecycle; 2] = [Lifecycle::Singleton, Lifecycle::Transient];

    /// Canonical lowercase token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Lifecycle::Singleton => types::SINGLETON,
            Lifecycle::Transient => types::TRANSIENT,
        }
    }

    /// Validates a raw token and returns its lifecycle.
    ///
    /// The value is stringified and compared case-insensitively against the
    /// canonical tokens.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ferrous_lifecycles::Lifecycle;
    ///
    /// assert_eq!(Lifecycle::normalize("SingleTON").unwrap(), Lifecycle::Singleton);
    /// assert_eq!(Lifecycle::normalize(Lifecycle::Transient).unwrap(), Lifecycle::Transient);
    /// assert!(Lifecycle::normalize(42).is_err());
    /// ```
    pub fn normalize(raw: impl fmt::Display) -> DiResult<Lifecycle> {
        let raw = raw.to_string();
        match raw.to_lowercase().as_str() {
            types::SINGLETON => Ok(Lifecycle::Singleton),
            types::TRANSIENT => Ok(Lifecycle::Transient),
            _ => Err(DiError::InvalidLifecycle(raw)),
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lifecycle {
    type Err = DiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Lifecycle::normalize(s)
    }
}

/// Normalizes a possibly absent raw token.
///
/// Absence is not a lifecycle: `None` fails like any unknown token.
pub fn normalize_lifecycle<T: fmt::Display>(raw: Option<T>) -> DiResult<Lifecycle> {
    match raw {
        Some(raw) => Lifecycle::normalize(raw),
        None => Err(DiError::InvalidLifecycle("<none>".to_string())),
    }
}

/// Picks the lifecycle a registration should use.
///
/// The options' own token wins when present; otherwise the configured
/// default applies.
pub fn resolve_effective_lifecycle(
    options: Option<&RegistrationOptions>,
    default: Lifecycle,
) -> DiResult<Lifecycle> {
    match options.and_then(|o| o.lifecycle.as_deref()) {
        Some(raw) => Lifecycle::normalize(raw),
        None => Ok(default),
    }
}

#[cfg(feature = "config")]
impl serde::Serialize for Lifecycle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "config")]
impl<'de> serde::Deserialize<'de> for Lifecycle {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Lifecycle::normalize(&raw).map_err(serde::de::Error::custom)
    }
}
