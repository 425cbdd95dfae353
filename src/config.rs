use anyhow::Context;
use std::path::{Path, PathBuf};

/// Where to sync from and to. Every field has a default matching the
/// stock ggml-sycl layout, so a missing config file behaves like a plain
/// zero-argument invocation.
#[derive(serde::Serialize, serde::Deserialize, Clone)]
pub struct SyncConfig {
    /// Local directory that mirrors the upstream subpath.
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,
    #[serde(default = "default_owner")]
    pub upstream_owner: String,
    #[serde(default = "default_repo")]
    pub upstream_repo: String,
    #[serde(default = "default_branch")]
    pub upstream_branch: String,
    /// Relative path of the mirrored directory inside the upstream repo.
    /// For example `ggml/src/ggml-sycl`.
    #[serde(default = "default_subpath")]
    pub upstream_subpath: String,
    /// Base URL of the directory-listing API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Base URL for raw file contents.
    #[serde(default = "default_raw_base")]
    pub raw_base: String,
    /// Files under `upstream_subpath` that are fetched on every run without
    /// any hash comparison. An absent upstream counterpart is tolerated.
    #[serde(default = "default_aux_paths")]
    pub aux_paths: Vec<String>,
}

impl SyncConfig {
    pub fn full_repo_name(&self) -> String {
        format!("{}/{}", self.upstream_owner, self.upstream_repo)
    }

    /// URL of the directory-listing endpoint for the configured subpath.
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base,
            self.upstream_owner,
            self.upstream_repo,
            self.upstream_subpath,
            self.upstream_branch
        )
    }

    /// URL of a raw file at `relpath` under the configured subpath.
    pub fn raw_url(&self, relpath: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}/{relpath}",
            self.raw_base,
            self.upstream_owner,
            self.upstream_repo,
            self.upstream_branch,
            self.upstream_subpath
        )
    }

    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let config = toml::to_string_pretty(self).context("cannot serialize config")?;
        std::fs::write(path, config).context("cannot write config")?;
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            upstream_owner: default_owner(),
            upstream_repo: default_repo(),
            upstream_branch: default_branch(),
            upstream_subpath: default_subpath(),
            api_base: default_api_base(),
            raw_base: default_raw_base(),
            aux_paths: default_aux_paths(),
        }
    }
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("ml/backend/ggml/ggml/src/ggml-sycl")
}

fn default_owner() -> String {
    String::from("ggml-org")
}

fn default_repo() -> String {
    String::from("llama.cpp")
}

fn default_branch() -> String {
    String::from("master")
}

fn default_subpath() -> String {
    String::from("ggml/src/ggml-sycl")
}

fn default_api_base() -> String {
    String::from("https://api.github.com")
}

fn default_raw_base() -> String {
    String::from("https://raw.githubusercontent.com")
}

fn default_aux_paths() -> Vec<String> {
    vec![String::from("dpct/helper.hpp")]
}

pub fn load_config(path: &Path) -> anyhow::Result<SyncConfig> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("cannot load config file from {}", path.display()))?;
    let config: SyncConfig = toml::from_str(&data).context("cannot load config as TOML")?;
    Ok(config)
}
