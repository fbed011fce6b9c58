//! Shared utilities.
//!
//! Path normalization used by token resolution and step expansion, and test helpers.

pub mod paths;

#[cfg(test)]
pub mod testutil;
