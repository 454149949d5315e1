//! Registration storage for the reference container.

use std::collections::HashMap;

use crate::activator::Activator;

/// How a registration was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivatorKind {
    /// Registered through `bind`
    Constructor,
    /// Registered through `factory`
    Factory,
}

/// A name's activator with the dependencies it declared
#[derive(Debug, Clone)]
pub(crate) struct Registration {
    pub(crate) kind: ActivatorKind,
    pub(crate) activator: Activator,
    pub(crate) dependencies: Vec<String>,
}

impl Registration {
    pub(crate) fn new(
        kind: ActivatorKind,
        activator: Activator,
        dependencies: Vec<String>,
    ) -> Self {
        Self {
            kind,
            activator,
            dependencies,
        }
    }
}

/// Name-keyed registry
#[derive(Debug)]
pub(crate) struct Registry {
    /// Fast Vec lookup for the first registrations
    small: Vec<(String, Registration)>,
    /// HashMap fallback for the remainder
    large: HashMap<String, Registration>,
    /// Threshold for Vec vs HashMap
    small_threshold: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            small: Vec::new(),
            large: HashMap::new(),
            small_threshold: 16,
        }
    }
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inserts a registration, replacing any previous one for `name`.
    pub(crate) fn insert(&mut self, name: &str, registration: Registration) {
        if let Some(pos) = self.small.iter().position(|(n, _)| n == name) {
            self.small[pos].1 = registration;
        } else if let Some(existing) = self.large.get_mut(name) {
            *existing = registration;
        } else if self.small.len() < self.small_threshold {
            self.small.push((name.to_string(), registration));
        } else {
            self.large.insert(name.to_string(), registration);
        }
    }

    #[inline]
    pub(crate) fn get(&self, name: &str) -> Option<&Registration> {
        self.small
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, reg)| reg)
            .or_else(|| self.large.get(name))
    }

    #[inline]
    pub(crate) fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.small.len() + self.large.len()
    }

    /// Registered names; the first few keep insertion order.
    pub(crate) fn names(&self) -> impl Iterator<Item = &str> {
        self.small
            .iter()
            .map(|(n, _)| n.as_str())
            .chain(self.large.keys().map(String::as_str))
    }
}
