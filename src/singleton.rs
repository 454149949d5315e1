//! Per-registration singleton cache cells.

use crate::activator::AnyArc;
use crate::error::{DiError, DiResult};
use std::collections::HashMap;
use std::thread::{self, ThreadId};

#[cfg(feature = "once-cell")]
use once_cell::sync::OnceCell;
#[cfg(not(feature = "once-cell"))]
use std::sync::OnceLock as OnceCell;

#[cfg(feature = "parking-lot")]
use parking_lot::{Condvar, Mutex, MutexGuard};
#[cfg(not(feature = "parking-lot"))]
use std::sync::{Condvar, Mutex, MutexGuard};

/// Cache record for one singleton registration.
///
/// Starts out uncreated. The first successful activation stores its value
/// and every later call hands that value back without locking. A failed
/// activation leaves the cell uncreated. Re-registering a name replaces the
/// cell rather than resetting it.
///
/// Only one thread activates a cell at a time; others wait for it to finish.
/// A thread that would wait on a cell whose activation is itself waiting
/// (directly or through other cells) on that thread gets
/// [`DiError::Circular`] instead of blocking, so mutually dependent
/// singletons first resolved from different threads fail rather than
/// deadlock.
#[derive(Default)]
pub struct SingletonCell {
    name: String,
    value: OnceCell<AnyArc>,
    activating: Mutex<Option<ThreadId>>,
    ready: Condvar,
}

impl SingletonCell {
    /// Creates an uncreated, unnamed cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uncreated cell labelled with its registration name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The registration name used in cycle reports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the cell holds a value.
    pub fn is_created(&self) -> bool {
        self.value.get().is_some()
    }

    /// The cached value, if any.
    pub fn get(&self) -> Option<AnyArc> {
        self.value.get().cloned()
    }

    /// Returns the cached value, activating with `activate` if there is none.
    ///
    /// The boolean is `true` when this call performed the activation.
    pub fn get_or_try_init<F>(&self, activate: F) -> DiResult<(AnyArc, bool)>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        if let Some(value) = self.value.get() {
            return Ok((value.clone(), false));
        }

        let me = thread::current().id();
        let mut activating = lock(&self.activating);
        loop {
            if let Some(value) = self.value.get() {
                return Ok((value.clone(), false));
            }
            let current = *activating;
            match current {
                None => break,
                Some(owner) if owner == me => {
                    return Err(DiError::Circular(vec![self.name.clone(), self.name.clone()]));
                }
                Some(owner) => {
                    self.start_waiting(me, owner)?;
                    activating = wait(&self.ready, activating);
                    lock(wait_graph()).waiting.remove(&me);
                }
            }
        }

        *activating = Some(me);
        lock(wait_graph())
            .owners
            .insert(self.id(), (me, self.name.clone()));
        drop(activating);

        let _release = ActivationGuard { cell: self };
        let value = activate()?;
        Ok((self.value.get_or_init(|| value).clone(), true))
    }

    /// Records that `me` waits on this cell, unless doing so closes a cycle.
    ///
    /// Called with `activating` held.
    fn start_waiting(&self, me: ThreadId, owner: ThreadId) -> DiResult<()> {
        let mut graph = lock(wait_graph());
        let mut path = vec![self.name.clone()];
        let mut current = owner;

        for _ in 0..=graph.waiting.len() {
            let next = match graph.waiting.get(&current) {
                Some(next) => *next,
                None => break,
            };
            let (next_owner, next_name) = match graph.owners.get(&next) {
                Some(entry) => entry.clone(),
                None => break,
            };
            path.push(next_name.clone());
            if next_owner == me {
                path.insert(0, next_name);
                return Err(DiError::Circular(path));
            }
            current = next_owner;
        }

        graph.waiting.insert(me, self.id());
        Ok(())
    }

    fn id(&self) -> usize {
        self as *const Self as usize
    }
}

impl std::fmt::Debug for SingletonCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCell")
            .field("name", &self.name)
            .field("created", &self.is_created())
            .finish()
    }
}

/// Releases activation ownership, including when the activator panics.
struct ActivationGuard<'a> {
    cell: &'a SingletonCell,
}

impl Drop for ActivationGuard<'_> {
    fn drop(&mut self) {
        let mut activating = lock(&self.cell.activating);
        *activating = None;
        lock(wait_graph()).owners.remove(&self.cell.id());
        drop(activating);
        self.cell.ready.notify_all();
    }
}

/// Process-wide record of in-flight activations.
///
/// `owners` maps a cell to the thread activating it; `waiting` maps a blocked
/// thread to the cell it waits on. Always locked after a cell's own lock.
#[derive(Default)]
struct WaitGraph {
    owners: HashMap<usize, (ThreadId, String)>,
    waiting: HashMap<ThreadId, usize>,
}

fn wait_graph() -> &'static Mutex<WaitGraph> {
    static GRAPH: std::sync::OnceLock<Mutex<WaitGraph>> = std::sync::OnceLock::new();
    GRAPH.get_or_init(Mutex::default)
}

#[cfg(feature = "parking-lot")]
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock()
}

// Activators never run under these locks, so poisoning only follows a panic
// between two field writes and the recovered state stays consistent.
#[cfg(not(feature = "parking-lot"))]
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(feature = "parking-lot")]
fn wait<'a, T>(ready: &Condvar, mut guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    ready.wait(&mut guard);
    guard
}

#[cfg(not(feature = "parking-lot"))]
fn wait<'a, T>(ready: &Condvar, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
    ready
        .wait(guard)
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
