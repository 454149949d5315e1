//! Lifecycle configuration.
//!
//! The only setting is the default lifecycle applied to registrations that
//! do not name one. It is validated when the configuration is built, never
//! at first use.

use std::env;
use std::fmt;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};
use crate::lifecycle::Lifecycle;

/// Environment variable read by [`LifecycleConfig::from_env`].
pub const DEFAULT_LIFECYCLE_ENV: &str = "FERROUS_LIFECYCLE_DEFAULT";

/// Configuration for a [`LifecycleDecorator`](crate::LifecycleDecorator).
///
/// # Examples
///
/// ```
/// use ferrous_lifecycles::{Lifecycle, LifecycleConfig};
///
/// let config = LifecycleConfig::new("TRANSIENT").unwrap();
/// assert_eq!(config.default_lifecycle, Lifecycle::Transient);
///
/// assert!(LifecycleConfig::new("boop").is_err());
/// assert_eq!(LifecycleConfig::default().default_lifecycle, Lifecycle::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
pub struct LifecycleConfig {
    /// Lifecycle for registrations whose options do not carry one
    #[cfg_attr(feature = "config", serde(default = "default_lifecycle", alias = "lifecycle"))]
    pub default_lifecycle: Lifecycle,
}

#[cfg(feature = "config")]
fn default_lifecycle() -> Lifecycle {
    Lifecycle::Singleton
}

impl LifecycleConfig {
    /// Builds a configuration from a raw default token.
    pub fn new(default_lifecycle: impl fmt::Display) -> DiResult<Self> {
        Ok(Self {
            default_lifecycle: Lifecycle::normalize(default_lifecycle)?,
        })
    }

    /// Reads the default from [`DEFAULT_LIFECYCLE_ENV`].
    pub fn from_env() -> DiResult<Self> {
        Self::from_env_var(DEFAULT_LIFECYCLE_ENV)
    }

    /// Reads the default from `var`.
    ///
    /// An unset variable yields the default configuration; a set but
    /// invalid one is an error.
    pub fn from_env_var(var: &str) -> DiResult<Self> {
        match env::var(var) {
            Ok(raw) => Self::new(raw),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(env::VarError::NotUnicode(raw)) => {
                Err(DiError::InvalidLifecycle(raw.to_string_lossy().into_owned()))
            }
        }
    }

    /// Parses a JSON document such as `{"default_lifecycle": "transient"}`.
    #[cfg(feature = "config")]
    pub fn from_json(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Config(e.to_string()))
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            default_lifecycle: Lifecycle::Singleton,
        }
    }
}

impl From<Lifecycle> for LifecycleConfig {
    fn from(default_lifecycle: Lifecycle) -> Self {
        Self { default_lifecycle }
    }
}
