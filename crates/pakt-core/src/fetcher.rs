//! The package fetcher seam: "make the package behind this URL available locally".

use std::path::PathBuf;

use url::Url;

/// Retrieves package files so they can be read from the local filesystem.
pub trait PackageFetcher {
    /// Fetch the package at `url`, returning the local path it now lives at.
    ///
    /// `file://` URLs need no transfer and resolve to their own path.
    fn fetch(&self, url: &Url) -> miette::Result<PathBuf>;
}

impl<F: PackageFetcher + ?Sized> PackageFetcher for &F {
    fn fetch(&self, url: &Url) -> miette::Result<PathBuf> {
        (**self).fetch(url)
    }
}
