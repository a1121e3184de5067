//! CLI command implementations

pub mod index;
pub mod json_output;
pub mod models;
pub mod search;
pub mod signature;
