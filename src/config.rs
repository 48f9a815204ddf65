//! Settings for both tools, resolved from command-line flags and the
//! environment.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// GitHub access and cache location for `gh-activity`.
#[derive(Args, Debug, Clone)]
pub struct GithubConfig {
    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Personal access token; unauthenticated requests are heavily rate limited
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Directory holding cache files.
    ///
    /// Defaults to the platform cache directory, e.g. ~/.cache/git-activity on Linux.
    #[arg(long, env = "GH_ACTIVITY_CACHE_DIR", global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Commits requested per API page (max 100)
    #[arg(long, default_value = "100", global = true)]
    pub per_page: u32,

    /// Stop following pagination after this many pages per range
    #[arg(long, default_value = "50", global = true)]
    pub max_pages: usize,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", global = true)]
    pub timeout_secs: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            cache_dir: None,
            per_page: 100,
            max_pages: 50,
            timeout_secs: 30,
        }
    }
}

impl GithubConfig {
    /// Cache directory, falling back to `<platform cache dir>/git-activity`.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("git-activity")
        })
    }

    /// Check the settings and make sure the cache directory exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        if !(1..=100).contains(&self.per_page) {
            return Err(ConfigError::PerPageOutOfRange(self.per_page));
        }
        let dir = self.cache_dir();
        if !dir.exists() {
            std::fs::create_dir_all(&dir)
                .map_err(|e| ConfigError::CacheDirectoryCreateFailed(dir.clone(), e))?;
        } else if !dir.is_dir() {
            return Err(ConfigError::CacheDirectoryNotDirectory(dir));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Text => "txt",
            OutputFormat::Json => "json",
        }
    }
}

/// Where and how `git-history export` writes pages.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub out_dir: PathBuf,
    pub prefix: String,
    pub page_size: usize,
    pub format: OutputFormat,
    /// Worker threads for diffs and writing; 0 = rayon default.
    pub threads: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("git-history"),
            prefix: "commits".to_string(),
            page_size: 100,
            format: OutputFormat::Text,
            threads: 0,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        if self.prefix.is_empty() || self.prefix.contains(['/', '\\']) {
            return Err(ConfigError::InvalidPrefix(self.prefix.clone()));
        }
        if self.out_dir.exists() && !self.out_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.out_dir.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("API URL must not be empty")]
    EmptyApiUrl,

    #[error("--per-page must be between 1 and 100, got {0}")]
    PerPageOutOfRange(u32),

    #[error("failed to create cache directory {0}: {1}")]
    CacheDirectoryCreateFailed(PathBuf, std::io::Error),

    #[error("cache path is not a directory: {0}")]
    CacheDirectoryNotDirectory(PathBuf),

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("invalid file prefix '{0}'")]
    InvalidPrefix(String),

    #[error("output path is not a directory: {0}")]
    OutputNotDirectory(PathBuf),
}
