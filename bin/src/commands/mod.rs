//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod cascade;
pub(crate) mod info;
