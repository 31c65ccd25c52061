//! JSON documents served by a package repository.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use pakt_core::package::{PackageId, PackageSpecifier};
use pakt_core::resolver::{
    CollectionDescriptor, CollectionVersion, PackageDescriptor, RepositoryCollection,
    RepositoryDescriptor,
};
use pakt_core::version::PackageVersion;
use pakt_util::errors::PaktError;
use serde::Deserialize;
use url::Url;

/// `.well-known/pakt-pkgs/location.json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDocument {
    pub base_uri: String,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// `repository.json`
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDocument {
    pub repository: RepositoryBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryBody {
    #[serde(default)]
    pub collections: BTreeMap<PackageId, RepositoryCollectionEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepositoryCollectionEntry {
    #[serde(default)]
    pub description: Option<String>,
}

/// `collections/{id}/collection.json`
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDocument {
    pub collection: CollectionBody,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionBody {
    #[serde(default)]
    pub versions: BTreeMap<PackageVersion, VersionEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionEntry {
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pruned: bool,
}

/// `collections/{id}/versions/{version}/package.json`
#[derive(Debug, Clone, Deserialize)]
pub struct PackageDocument {
    pub package: PackageBody,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageBody {
    #[serde(default)]
    pub dependencies: BTreeMap<PackageId, PackageVersion>,
    /// Download URL; relative values resolve against the document's own URL.
    pub url: String,
    #[serde(default)]
    pub uploaded_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pruned: bool,
}

pub(crate) fn parse<T: for<'de> Deserialize<'de>>(body: &str, source: &Url) -> miette::Result<T> {
    serde_json::from_str(body).map_err(|e| {
        PaktError::Parse {
            message: format!("invalid document at {source}: {e}"),
        }
        .into()
    })
}

impl RepositoryDocument {
    pub fn into_descriptor(self) -> RepositoryDescriptor {
        RepositoryDescriptor {
            collections: self
                .repository
                .collections
                .into_iter()
                .map(|(id, entry)| {
                    (
                        id,
                        RepositoryCollection {
                            description: entry.description,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl CollectionDocument {
    pub fn into_descriptor(self, id: &PackageId) -> CollectionDescriptor {
        CollectionDescriptor {
            id: id.clone(),
            versions: self
                .collection
                .versions
                .into_iter()
                .map(|(version, entry)| {
                    (
                        version,
                        CollectionVersion {
                            uploaded_at: entry.uploaded_at,
                            pruned: entry.pruned,
                        },
                    )
                })
                .collect(),
        }
    }
}

impl PackageDocument {
    pub fn into_descriptor(
        self,
        id: &PackageId,
        version: &PackageVersion,
        source: &Url,
    ) -> miette::Result<PackageDescriptor> {
        let url = source.join(&self.package.url).map_err(|e| PaktError::Parse {
            message: format!("invalid package url '{}' in {source}: {e}", self.package.url),
        })?;
        Ok(PackageDescriptor {
            id: id.clone(),
            version: *version,
            dependencies: self
                .package
                .dependencies
                .into_iter()
                .map(|(id, version)| PackageSpecifier::new(id, version))
                .collect(),
            url,
            uploaded_at: self.package.uploaded_at,
            pruned: self.package.pruned,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Url {
        Url::parse("https://pkgs.example.com/collections/http@example.com/versions/2.0.0/package.json")
            .unwrap()
    }

    #[test]
    fn parse_location_without_expiry() {
        let doc: LocationDocument = parse(r#"{"baseUri": "/pkgs/"}"#, &source()).unwrap();
        assert_eq!(doc.base_uri, "/pkgs/");
        assert!(doc.expires.is_none());
    }

    #[test]
    fn parse_collection_versions() {
        let body = r#"{
            "collection": {
                "versions": {
                    "1.0.0": {"uploadedAt": "2024-03-01T12:00:00Z", "pruned": true},
                    "1.1.0": {"uploadedAt": "2024-04-01T12:00:00Z"}
                }
            }
        }"#;
        let doc: CollectionDocument = parse(body, &source()).unwrap();
        let id = PackageId::new("http", "example.com");
        let collection = doc.into_descriptor(&id);
        assert_eq!(collection.versions.len(), 2);
        assert!(collection.versions[&PackageVersion::new(1, 0, 0)].pruned);
        assert_eq!(collection.latest_unpruned(), Some(PackageVersion::new(1, 1, 0)));
    }

    #[test]
    fn package_url_resolves_relative_to_document() {
        let body = r#"{
            "package": {
                "dependencies": {"json@example.com": "1.2.0"},
                "url": "http-2.0.0.pakt",
                "uploadedAt": "2024-03-01T12:00:00Z"
            }
        }"#;
        let doc: PackageDocument = parse(body, &source()).unwrap();
        let package = doc
            .into_descriptor(
                &PackageId::new("http", "example.com"),
                &PackageVersion::new(2, 0, 0),
                &source(),
            )
            .unwrap();
        assert_eq!(
            package.url.as_str(),
            "https://pkgs.example.com/collections/http@example.com/versions/2.0.0/http-2.0.0.pakt"
        );
        assert_eq!(package.dependencies.len(), 1);
        assert!(!package.pruned);
        assert!(package.uploaded_at.is_some());
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let err = parse::<PackageDocument>("{\"package\": 3}", &source()).unwrap_err();
        assert!(err.to_string().starts_with("Parse error: invalid document at"));
    }

    #[test]
    fn repository_lists_collections() {
        let body = r#"{"repository": {"collections": {"http@example.com": {"description": "HTTP client"}}}}"#;
        let doc: RepositoryDocument = parse(body, &source()).unwrap();
        let repository = doc.into_descriptor();
        let entry = &repository.collections[&PackageId::new("http", "example.com")];
        assert_eq!(entry.description.as_deref(), Some("HTTP client"));
    }
}
