//! Caller identity extractors.
//!
//! - [`owner::Owner`] -- Reads the owner id and checks the allow-list.
//! - [`owner::CommandOwner`] -- Same, plus the per-owner command cool-down.

pub mod owner;
