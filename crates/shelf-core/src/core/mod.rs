pub mod error;
pub mod path;
pub mod version;

pub use error::{ShelfError, ShelfResult};
pub use version::{SortKey, BUILD_VERSION};
