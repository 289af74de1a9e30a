//! Common utilities for the library.

pub mod benchmark;
pub mod loader;
pub mod log;
