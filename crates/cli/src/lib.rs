//! Research Bank CLI
//!
//! Lists, shows, and searches the catalogue from a file or URL.

pub mod client;
pub mod commands;
pub mod output;
