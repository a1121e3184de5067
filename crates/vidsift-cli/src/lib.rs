//! vidsift CLI library.
//!
//! Command implementations behind the `vidsift` binary: configuration
//! resolution, per-model signature extraction, and the `models`,
//! `signature`, `index` and `search` commands.

pub mod commands;
pub mod extract;
pub mod settings;
