//! End-to-end tests over the public API: lookups against realistic
//! corpora and the binary container on disk.

mod common;

#[path = "integration/container.rs"]
mod container;

#[path = "integration/lookup.rs"]
mod lookup;
