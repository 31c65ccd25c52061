//! Core data types for the Pakt dependency resolver.
//!
//! This crate defines the value types shared by the graph engines: package
//! ids, versions, specifiers and requirements, project targets and imports,
//! the `pakt.toml` manifest, local package manifests, the package resolver
//! and fetcher traits, and global configuration.
//!
//! This crate is intentionally free of network I/O.

pub mod config;
pub mod dependency;
pub mod fetcher;
pub mod import;
pub mod manifest;
pub mod package;
pub mod package_reader;
pub mod requirement;
pub mod resolver;
pub mod target;
pub mod version;
