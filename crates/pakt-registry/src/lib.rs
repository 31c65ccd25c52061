//! HTTP package repositories: per-domain location discovery, repository,
//! collection and package documents, and package downloads.

pub mod client;
pub mod documents;
pub mod fetcher;
pub mod http_resolver;
