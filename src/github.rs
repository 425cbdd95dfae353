use serde::Deserialize;

use crate::config::SyncConfig;
use crate::error::SyncError;

/// A single item from the upstream directory listing.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEntry {
    pub name: String,
    pub sha: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Direct download URL. The listing reports `null` for directories.
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks and submodules. Skipped like directories.
    #[serde(other)]
    Other,
}

/// Source of upstream files. The one real implementation talks to the
/// GitHub contents API; tests substitute an in-memory fake.
pub trait RemoteSource {
    /// Fetch the upstream directory listing. Each call performs a fresh
    /// request, so the sequence of entries can be restarted at will.
    fn list(&self) -> Result<Vec<RemoteEntry>, SyncError>;

    /// Download the bytes behind a single URL.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, SyncError>;
}

const USER_AGENT: &str = concat!("ggml-sycl-sync/", env!("CARGO_PKG_VERSION"));

pub struct GitHubSource {
    client: reqwest::blocking::Client,
    contents_url: String,
}

impl GitHubSource {
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        // GitHub rejects requests without a User-Agent header.
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| SyncError::Network(err.to_string()))?;
        Ok(Self {
            client,
            contents_url: config.contents_url(),
        })
    }
}

impl RemoteSource for GitHubSource {
    fn list(&self) -> Result<Vec<RemoteEntry>, SyncError> {
        let response = self
            .client
            .get(&self.contents_url)
            .send()
            .map_err(|err| SyncError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Network(format!(
                "listing request to {} returned {status}",
                self.contents_url
            )));
        }
        let body = response
            .text()
            .map_err(|err| SyncError::Network(err.to_string()))?;
        serde_json::from_str(&body).map_err(|err| SyncError::Decode(err.to_string()))
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, SyncError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| SyncError::Network(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Network(format!(
                "download of {url} returned {status}"
            )));
        }
        let bytes = response
            .bytes()
            .map_err(|err| SyncError::Network(err.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_entries_deserialize() {
        let body = r#"[
            {"name": "ggml-sycl.cpp", "sha": "0123abcd", "type": "file",
             "download_url": "https://example.invalid/ggml-sycl.cpp", "size": 1024},
            {"name": "dpct", "sha": "4567ef01", "type": "dir", "download_url": null}
        ]"#;
        let entries: Vec<RemoteEntry> = serde_json::from_str(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].name, "ggml-sycl.cpp");
        assert_eq!(entries[1].kind, EntryKind::Dir);
        assert!(entries[1].download_url.is_none());
    }

    #[test]
    fn unknown_entry_types_fall_back_to_other() {
        let body = r#"{"name": "link", "sha": "aa", "type": "symlink", "download_url": null}"#;
        let entry: RemoteEntry = serde_json::from_str(body).unwrap();
        assert_eq!(entry.kind, EntryKind::Other);
    }
}
