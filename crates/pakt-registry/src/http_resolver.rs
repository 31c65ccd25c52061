//! [`PackageResolver`] backed by per-domain HTTP package repositories.
//!
//! Each package domain advertises the base URI of its repository in a
//! well-known location document. Base URIs are cached per domain until the
//! document's expiry.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use pakt_core::config::ResolverConfig;
use pakt_core::package::PackageId;
use pakt_core::resolver::{
    CollectionDescriptor, PackageDescriptor, PackageResolver, RepositoryDescriptor,
};
use pakt_core::version::PackageVersion;
use pakt_util::errors::PaktError;
use url::Url;

use crate::client::HttpClient;
use crate::documents::{
    self, CollectionDocument, LocationDocument, PackageDocument, RepositoryDocument,
};

/// Path of the location document relative to a domain's root.
pub const WELL_KNOWN_LOCATION_PATH: &str = ".well-known/pakt-pkgs/location.json";

/// Lifetime of a cached location whose document has no `expires`.
const DEFAULT_LOCATION_TTL_HOURS: i64 = 1;

#[derive(Debug, Clone)]
struct Location {
    base_uri: Url,
    expires: DateTime<Utc>,
}

pub struct HttpPackageResolver {
    client: HttpClient,
    default_location: Option<Url>,
    scheme: String,
    locations: RefCell<HashMap<String, Location>>,
}

impl HttpPackageResolver {
    pub fn new(config: &ResolverConfig) -> miette::Result<Self> {
        let default_location = config
            .default_location
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| PaktError::Config {
                    message: format!("invalid default-location '{raw}': {e}"),
                })
            })
            .transpose()?;
        Ok(Self::with_client(HttpClient::new(config)?, default_location))
    }

    pub fn with_client(client: HttpClient, default_location: Option<Url>) -> Self {
        Self {
            client,
            default_location,
            scheme: "https".to_string(),
            locations: RefCell::new(HashMap::new()),
        }
    }

    /// Scheme used to reach a domain's well-known location (default `https`).
    pub fn with_scheme(mut self, scheme: &str) -> Self {
        self.scheme = scheme.to_string();
        self
    }

    fn well_known_url(&self, domain: &str) -> miette::Result<Url> {
        let raw = format!("{}://{domain}/{WELL_KNOWN_LOCATION_PATH}", self.scheme);
        Url::parse(&raw).map_err(|e| {
            PaktError::Parse {
                message: format!("invalid package domain '{domain}': {e}"),
            }
            .into()
        })
    }

    /// Base URI of the repository serving `domain`.
    pub fn resolve_base_uri(&self, domain: &str) -> miette::Result<Url> {
        let now = Utc::now();
        if let Some(location) = self.locations.borrow().get(domain) {
            if now < location.expires {
                return Ok(location.base_uri.clone());
            }
        }

        let well_known = self.well_known_url(domain)?;
        let (source, body) = match self.fetch_location(&well_known)? {
            Some(body) => (well_known, body),
            None => {
                let Some(default) = &self.default_location else {
                    return Err(location_not_found(domain));
                };
                tracing::debug!("no location at {well_known}, trying default location {default}");
                match self.fetch_location(default)? {
                    Some(body) => (default.clone(), body),
                    None => return Err(location_not_found(domain)),
                }
            }
        };

        let document: LocationDocument = documents::parse(&body, &source)?;
        let mut base_uri = source.join(&document.base_uri).map_err(|e| PaktError::Parse {
            message: format!("invalid baseUri '{}' in {source}: {e}", document.base_uri),
        })?;
        if !base_uri.path().ends_with('/') {
            let path = format!("{}/", base_uri.path());
            base_uri.set_path(&path);
        }
        let expires = document
            .expires
            .unwrap_or_else(|| now + Duration::hours(DEFAULT_LOCATION_TTL_HOURS));

        tracing::debug!("repository for {domain} is {base_uri} until {expires}");
        self.locations.borrow_mut().insert(
            domain.to_string(),
            Location {
                base_uri: base_uri.clone(),
                expires,
            },
        );
        Ok(base_uri)
    }

    /// Body of a location document, or `None` unless the server answered 200.
    fn fetch_location(&self, url: &Url) -> miette::Result<Option<String>> {
        let resp = self.client.get(url)?;
        if resp.status() != reqwest::StatusCode::OK {
            tracing::debug!("location {url} answered {}", resp.status());
            return Ok(None);
        }
        resp.text().map(Some).map_err(|e| {
            PaktError::Network {
                message: format!("Failed to read response from {url}: {e}"),
            }
            .into()
        })
    }

    fn resolve_location(&self, domain: &str, path: &str) -> miette::Result<Url> {
        let base_uri = self.resolve_base_uri(domain)?;
        base_uri.join(path).map_err(|e| {
            PaktError::Parse {
                message: format!("invalid repository path '{path}' under {base_uri}: {e}"),
            }
            .into()
        })
    }

    /// Every collection hosted by the repository for `domain`.
    pub fn get_repository(&self, domain: &str) -> miette::Result<RepositoryDescriptor> {
        let url = self.resolve_location(domain, "repository.json")?;
        let body = self.client.get_text(&url)?;
        let document: RepositoryDocument = documents::parse(&body, &url)?;
        Ok(document.into_descriptor())
    }
}

fn location_not_found(domain: &str) -> miette::Report {
    PaktError::Resolution {
        message: format!("repository location not found for {domain}"),
    }
    .into()
}

impl PackageResolver for HttpPackageResolver {
    fn get_collection(&self, id: &PackageId) -> miette::Result<CollectionDescriptor> {
        let url = self.resolve_location(&id.domain, &format!("collections/{id}/collection.json"))?;
        tracing::debug!("fetching collection {id} from {url}");
        let body = self.client.get_text(&url)?;
        let document: CollectionDocument = documents::parse(&body, &url)?;
        Ok(document.into_descriptor(id))
    }

    fn get_package(
        &self,
        id: &PackageId,
        version: &PackageVersion,
    ) -> miette::Result<PackageDescriptor> {
        let url = self.resolve_location(
            &id.domain,
            &format!("collections/{id}/versions/{version}/package.json"),
        )?;
        tracing::debug!("fetching package {id} {version} from {url}");
        let body = self.client.get_text(&url)?;
        let document: PackageDocument = documents::parse(&body, &url)?;
        document.into_descriptor(id, version, &url)
    }
}
