//! Registration options accepted by `bind` and `factory`.

use std::fmt;

/// Options attached to a single registration.
///
/// `lifecycle` is kept as the raw token so that any casing a caller supplies
/// is validated at registration time rather than at construction of the
/// options. `dependencies` is consumed by the underlying container only.
///
/// # Examples
///
/// ```rust
/// use ferrous_lifecycles::{Lifecycle, RegistrationOptions};
///
/// let options = RegistrationOptions::new()
///     .lifecycle(Lifecycle::Transient)
///     .depends_on("config")
///     .depends_on("clock");
///
/// assert_eq!(options.lifecycle.as_deref(), Some("transient"));
/// assert_eq!(options.dependencies, vec!["config", "clock"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationOptions {
    /// Raw lifecycle token; `None` means the configured default
    pub lifecycle: Option<String>,
    /// Names the activator may resolve, in declaration order
    pub dependencies: Vec<String>,
}

impl RegistrationOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lifecycle token.
    pub fn lifecycle(mut self, lifecycle: impl fmt::Display) -> Self {
        self.lifecycle = Some(lifecycle.to_string());
        self
    }

    /// Declares one dependency.
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// Declares several dependencies at once.
    pub fn dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies.extend(names.into_iter().map(Into::into));
        self
    }
}
