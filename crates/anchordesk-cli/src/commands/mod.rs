//! CLI command implementations.

pub mod canonicalize;
pub mod digest;
pub mod list;
pub mod verify;
