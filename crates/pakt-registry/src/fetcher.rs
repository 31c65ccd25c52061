//! Package downloads into a local directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use pakt_core::config::ResolverConfig;
use pakt_core::fetcher::PackageFetcher;
use pakt_core::package_reader::PackageReader;
use pakt_util::errors::PaktError;
use url::Url;

use crate::client::HttpClient;

/// Downloads larger than this show a progress bar.
const PROGRESS_THRESHOLD_BYTES: u64 = 100_000;

/// Fetches `http(s)` package URLs into a download root.
///
/// Each download is written to a temporary file inside the root, then renamed
/// after the specifier declared in its package manifest.
pub struct HttpPackageFetcher {
    client: HttpClient,
    download_root: PathBuf,
    show_progress: bool,
}

impl HttpPackageFetcher {
    pub fn new(download_root: &Path, config: &ResolverConfig) -> miette::Result<Self> {
        Self::with_client(download_root, HttpClient::new(config)?)
    }

    pub fn with_client(download_root: &Path, client: HttpClient) -> miette::Result<Self> {
        if !download_root.is_dir() {
            return Err(PaktError::Download {
                message: format!(
                    "download root {} is not a valid directory",
                    download_root.display()
                ),
            }
            .into());
        }
        Ok(Self {
            client,
            download_root: download_root.to_path_buf(),
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn download_root(&self) -> &Path {
        &self.download_root
    }

    fn progress_bar(&self, total: Option<u64>, label: &str) -> ProgressBar {
        match total {
            Some(total) if self.show_progress && total > PROGRESS_THRESHOLD_BYTES => {
                let pb = ProgressBar::new(total);
                if let Ok(style) =
                    ProgressStyle::with_template("  {msg} {bar:30.cyan/dim} {bytes}/{total_bytes}")
                {
                    pb.set_style(style.progress_chars("##-"));
                }
                pb.set_message(label.to_string());
                pb
            }
            _ => ProgressBar::hidden(),
        }
    }

    fn download(&self, url: &Url) -> miette::Result<PathBuf> {
        let mut resp = self.client.get(url)?;
        let status = resp.status();
        if status.as_u16() >= 300 {
            return Err(PaktError::Network {
                message: format!("encountered {status} status code during fetch of {url}"),
            }
            .into());
        }

        let mut file = tempfile::Builder::new()
            .prefix("fetch.")
            .tempfile_in(&self.download_root)
            .map_err(PaktError::from)?;

        let pb = self.progress_bar(resp.content_length(), url.as_str());
        let written = {
            let mut writer = pb.wrap_write(file.as_file_mut());
            let written = resp.copy_to(&mut writer).map_err(|e| PaktError::Network {
                message: format!("Failed to read {url}: {e}"),
            })?;
            writer.flush().map_err(PaktError::from)?;
            written
        };
        pb.finish_and_clear();

        let specifier = PackageReader::open(file.path())?.read_package_specifier();
        let destination = specifier.to_filesystem_path(&self.download_root);
        file.persist(&destination)
            .map_err(|e| PaktError::from(e.error))?;
        tracing::info!(
            "downloaded {specifier} from {url} ({written} bytes) to {}",
            destination.display()
        );
        Ok(destination)
    }
}

impl PackageFetcher for HttpPackageFetcher {
    fn fetch(&self, url: &Url) -> miette::Result<PathBuf> {
        match url.scheme() {
            "file" => url.to_file_path().map_err(|()| {
                PaktError::Parse {
                    message: format!("cannot express {url} as a local path"),
                }
                .into()
            }),
            "http" | "https" => self.download(url),
            other => Err(PaktError::Download {
                message: format!("unsupported scheme '{other}' for {url}"),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_download_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = HttpPackageFetcher::new(&missing, &ResolverConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("is not a valid directory"));
    }

    #[test]
    fn file_urls_pass_through() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpPackageFetcher::new(dir.path(), &ResolverConfig::default()).unwrap();
        let url = Url::from_file_path(dir.path().join("local.pakt")).unwrap();
        assert_eq!(fetcher.fetch(&url).unwrap(), dir.path().join("local.pakt"));
    }

    #[test]
    fn unsupported_scheme_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = HttpPackageFetcher::new(dir.path(), &ResolverConfig::default()).unwrap();
        let url = Url::parse("ftp://example.com/a.pakt").unwrap();
        assert!(fetcher.fetch(&url).is_err());
    }
}
