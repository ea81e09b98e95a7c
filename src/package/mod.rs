pub mod checksum;
pub mod loader;
pub mod manifest;
pub mod negotiator;

pub use checksum::ChecksumEngine;
pub use loader::Package;
pub use manifest::{merge_patch, Manifest, OverrideSources};
pub use negotiator::{content_security_policy, filename_variants};
