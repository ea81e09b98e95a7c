pub mod cat;
pub mod checksum;
pub mod list;
pub mod manifests;
