//! Research Bank Web
//!
//! Serves the catalogue site: landing page, searchable catalogue, item
//! pages, and a small JSON API over the same catalogue.

pub mod config;
pub mod error;
pub mod server;
pub mod static_files;
pub mod templates;

pub use config::WebConfig;
pub use error::{ApiError, WebError};
pub use server::WebServer;
