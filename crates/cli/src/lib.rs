//! Command-line shell for the decor inventory.

pub mod app;

pub use app::{App, UpdateField};
