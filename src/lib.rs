//! Shelf: a registry of web asset packages
//!
//! Packages are directories with a `manifest.json`, found under a user data
//! directory, an optional bundled zip archive and the system data
//! directories. The registry resolves name clashes between them, keeps a
//! checksum of the cacheable content and serves package files with
//! language and compression negotiation.

pub use shelf_core::core::{ShelfError, ShelfResult};

/// Core module re-exported from shelf-core.
pub mod core {
    pub use shelf_core::core::*;
}

/// Configuration management.
pub mod config;

/// Sorted traversal of directory and archive trees.
pub mod tree;

/// Package loading, checksums and file negotiation.
pub mod package;

/// Package discovery, resolution and serving.
pub mod registry;

/// Request/response boundary used for serving files.
pub mod channel;

pub use channel::{Channel, ResponseBuffer};
pub use config::Config;
pub use package::{Manifest, Package};
pub use registry::PackageRegistry;
