//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

pub(crate) const MAX_DEPTH: usize = 1024;

// Thread-local resolution state for circular dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<Vec<(usize, String)>> = const { RefCell::new(Vec::new()) };
}

/// Guard for the thread-local resolution stack.
///
/// Entries carry the id of the container doing the resolving, so two
/// containers resolving the same name on one thread do not look circular.
pub(crate) struct StackGuard {
    owner: usize,
}

impl StackGuard {
    /// Pushes `name` for `owner`, failing if it is already being resolved.
    pub(crate) fn enter(owner: usize, name: &str) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Circular detection BEFORE pushing the new name
            if stack.iter().any(|(o, n)| *o == owner && n == name) {
                let mut path: Vec<String> = stack
                    .iter()
                    .filter(|(o, _)| *o == owner)
                    .map(|(_, n)| n.clone())
                    .collect();
                path.push(name.to_string());
                return Err(DiError::Circular(path));
            }

            if stack.len() >= MAX_DEPTH {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push((owner, name.to_string()));
            Ok(Self { owner })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            if let Some((owner, _)) = tls.borrow_mut().pop() {
                debug_assert_eq!(owner, self.owner);
            }
        });
    }
}

/// Runs `f` with `name` on the resolution stack.
pub(crate) fn with_circular_guard<T, F>(owner: usize, name: &str, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let _guard = StackGuard::enter(owner, name)?;
    f()
}
