//! Core traits for lifecycle-aware containers.

mod container;

pub use container::{Container, ContainerExt};
