//! Shared odds and ends that don't belong to a single component.

pub mod error;
