//! Retrieval of vocabulary tables
//!
//! Tables are fetched either from GitHub over HTTP or from a local mirror.
//! A table that does not exist is not an error: many products have no
//! product-specific dimensions or attributes, and the corresponding section
//! is simply left as it was.

use crate::errors::{Result, TemplateError};
use crate::locator::{VocabLocator, AMF_CVS_REPO, INSTRUMENT_VOCABS_REPO};
use async_trait::async_trait;
use std::io::ErrorKind;
use tracing::debug;

/// Source of raw vocabulary table text
#[async_trait]
pub trait VocabSource: Send + Sync {
    /// Fetch a table, `None` when the resource does not exist
    async fn fetch(&self, location: &str) -> Result<Option<String>>;

    /// Fetch a table that has to exist
    async fn fetch_required(&self, location: &str) -> Result<String> {
        self.fetch(location)
            .await?
            .ok_or_else(|| TemplateError::MissingTable {
                location: location.to_string(),
            })
    }
}

/// Tables served over HTTP
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("amof-template/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Tag of the newest release of a GitHub repository
    ///
    /// GitHub redirects `/releases/latest` to `/releases/tag/<tag>`, so the
    /// tag is the last segment of the final URL.
    pub async fn latest_release(&self, repo: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{repo}/releases/latest"))
            .send()
            .await?;
        Ok(tag_from_release_url(response.url().as_str()))
    }

    /// Whether a tagged release exists in a GitHub repository
    pub async fn release_exists(&self, repo: &str, tag: &str) -> Result<bool> {
        let response = self
            .client
            .get(format!("{repo}/releases/tag/{tag}"))
            .send()
            .await?;
        Ok(response.status().is_success())
    }

    /// Resolve a requested vocabulary tag and build a locator for it
    ///
    /// `latest` resolves to the newest AMF_CVs release; any other tag must
    /// exist. Instrument vocabularies always come from their latest release.
    pub async fn resolve_locator(&self, tag: &str) -> Result<VocabLocator> {
        let cvs_tag = if tag == "latest" {
            self.latest_release(AMF_CVS_REPO).await?
        } else if self.release_exists(AMF_CVS_REPO, tag).await? {
            tag.to_string()
        } else {
            return Err(TemplateError::VersionNotFound {
                tag: tag.to_string(),
            });
        };
        let instrument_tag = self.latest_release(INSTRUMENT_VOCABS_REPO).await?;
        debug!(%cvs_tag, %instrument_tag, "resolved vocabulary releases");
        Ok(VocabLocator::remote(cvs_tag, instrument_tag))
    }
}

#[async_trait]
impl VocabSource for HttpSource {
    async fn fetch(&self, location: &str) -> Result<Option<String>> {
        let response = self.client.get(location).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(Some(response.text().await?))
        } else {
            debug!(%location, %status, "vocabulary table not available");
            Ok(None)
        }
    }
}

/// Tables stored on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSource;

#[async_trait]
impl VocabSource for LocalSource {
    async fn fetch(&self, location: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(location).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%location, "vocabulary table not present");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Last path segment of a release URL, empty when the URL ends in `/`
pub fn tag_from_release_url(url: &str) -> String {
    url.rsplit('/').next().unwrap_or_default().to_string()
}
