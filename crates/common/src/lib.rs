//! Research Bank Common Library
//!
//! Catalogue model, search, and the data sources shared by the web server
//! and the CLI.

pub mod catalogue;
pub mod error;
pub mod region;
pub mod search;
pub mod source;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use catalogue::Catalogue;
pub use error::{Error, Result};
pub use search::{Suggestion, MAX_SUGGESTIONS, MIN_SUGGESTION_CHARS};
pub use source::{source_from_location, CatalogueSource, FileSource, HttpSource};
pub use store::CatalogueStore;
pub use types::*;

/// Research Bank version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
