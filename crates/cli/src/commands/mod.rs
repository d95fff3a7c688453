//! CLI Commands

pub mod catalogue;
pub mod search;
