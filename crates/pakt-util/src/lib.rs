//! Shared utilities for the Pakt dependency resolver.
//!
//! This crate provides the cross-cutting error type used by all other Pakt
//! crates, along with the `PaktResult` alias.

pub mod errors;
