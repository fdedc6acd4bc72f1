//! Content-tree mutation and order reconciliation for page and menu aggregates.
//!
//! Every operation takes an immutable [`domain::Tree`] snapshot and returns a new one
//! together with a shallow diff; persistence and versioning belong to the caller.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
