//! Core utilities shared by the Shelf registry and its command line.

pub mod core;

pub use crate::core::error::{ShelfError, ShelfResult};
pub use crate::core::version::{SortKey, BUILD_VERSION};
