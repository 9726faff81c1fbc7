//! vaultsmith: small helpers for an Obsidian-style vault.
//!
//! - [`convert`] wraps Python/R scripts into Markdown notes.
//! - [`tags`] embeds vault tags, caches the vectors and ranks tag pairs by
//!   cosine distance.

pub mod commands;
pub mod convert;
pub mod core;
pub mod tags;
