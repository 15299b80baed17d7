//! Common utilities for the Quill layout engine.
//!
//! This crate provides shared infrastructure used by all layout components:
//! - **Warning System** - deduplicated, colored diagnostics for policy fallbacks

pub mod warning;

pub use warning::{Component, clear_warnings, warn_once};
