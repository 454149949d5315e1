//! Error types for lifecycle-aware containers.

use std::fmt;

use crate::lifecycle::types::{SINGLETON, TRANSIENT};

/// Lifecycle and container errors
///
/// Represents the error conditions that can occur while configuring
/// lifecycles, registering activators, or resolving instances. Errors raised
/// by the underlying container travel through the lifecycle layer unchanged.
///
/// # Examples
///
/// ```rust
/// use ferrous_lifecycles::{DiError, Lifecycle};
///
/// match Lifecycle::normalize("boop") {
///     Err(DiError::InvalidLifecycle(value)) => assert_eq!(value, "boop"),
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use ferrous_lifecycles::DiError;
///
/// let not_found = DiError::NotFound("database".to_string());
/// let circular = DiError::Circular(vec!["a".to_string(), "b".to_string(), "a".to_string()]);
///
/// println!("Error: {}", not_found);
/// println!("Error: {}", circular);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// Lifecycle token matched neither `singleton` nor `transient`
    InvalidLifecycle(String),
    /// Value was not of the expected shape (non-callable input, failed downcast)
    TypeMismatch(&'static str),
    /// Name not registered
    NotFound(String),
    /// Name rejected by the container
    InvalidName(String),
    /// Activator asked for a dependency it did not declare
    UndeclaredDependency {
        /// Registration whose activator made the request
        name: String,
        /// The dependency that was requested
        dependency: String,
    },
    /// Circular dependency detected (includes path)
    Circular(Vec<String>),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
    /// Activator reported a failure of its own
    Activation(String),
    /// Configuration source could not be read
    Config(String),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::InvalidLifecycle(value) => write!(
                f,
                "lifecycle must be either {} or {} but received {}",
                SINGLETON, TRANSIENT, value
            ),
            DiError::TypeMismatch(what) => write!(f, "Type mismatch for: {}", what),
            DiError::NotFound(name) => write!(f, "Registration not found: {}", name),
            DiError::InvalidName(name) => write!(f, "Invalid registration name: {:?}", name),
            DiError::UndeclaredDependency { name, dependency } => write!(
                f,
                "Registration {} did not declare dependency {}",
                name, dependency
            ),
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::DepthExceeded(depth) => write!(f, "Max depth {} exceeded", depth),
            DiError::Activation(msg) => write!(f, "Activation failed: {}", msg),
            DiError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for lifecycle operations
///
/// A convenience alias for `Result<T, DiError>` used throughout the crate.
///
/// # Examples
///
/// ```rust
/// use ferrous_lifecycles::{DiResult, DiError};
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::NotFound("some_service".to_string()))
/// }
///
/// assert!(failing_operation().is_err());
/// ```
pub type DiResult<T> = Result<T, DiError>;
