//! Minimal GitHub REST client for the commits listing endpoint.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION, LINK};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GithubConfig;
use crate::domain::window::TimeRange;
use crate::error::{ActivityError, Result};
use crate::utils::fmt_utc;

const API_VERSION: &str = "2022-11-28";

/// `owner/name` of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoSlug {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ActivityError::InvalidRepoSlug(s.to_string());
        let trimmed = s.trim().trim_end_matches('/');
        let path = trimmed
            .strip_prefix("https://github.com/")
            .or_else(|| trimmed.strip_prefix("http://github.com/"))
            .or_else(|| trimmed.strip_prefix("git@github.com:"))
            .unwrap_or(trimmed);
        let path = path.strip_suffix(".git").unwrap_or(path);

        let (owner, name) = path.split_once('/').ok_or_else(invalid)?;
        let ok = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        };
        if !ok(owner) || !ok(name) {
            return Err(invalid());
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A commit as stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteCommit {
    pub sha: String,
    pub author_login: Option<String>,
    pub author_name: String,
    pub author_email: String,
    pub authored_at: DateTime<Utc>,
    /// The date GitHub's `since`/`until` filters apply to.
    pub committed_at: DateTime<Utc>,
    pub message: String,
    pub html_url: String,
}

impl RemoteCommit {
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    pub fn short_sha(&self) -> &str {
        &self.sha[..7.min(self.sha.len())]
    }
}

/// Anything that can list a user's commits in a repository over a range.
pub trait CommitSource {
    fn fetch(&self, repo: &RepoSlug, user: &str, range: TimeRange) -> Result<Vec<RemoteCommit>>;
}

// --- wire format ---

#[derive(Debug, Deserialize)]
struct ApiCommit {
    sha: String,
    #[serde(default)]
    html_url: String,
    commit: ApiCommitDetail,
    author: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct ApiCommitDetail {
    author: Option<ApiSignature>,
    committer: Option<ApiSignature>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiSignature {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl From<ApiCommit> for RemoteCommit {
    fn from(c: ApiCommit) -> Self {
        let author = c.commit.author;
        let committer = c.commit.committer;
        let authored_at = author.as_ref().and_then(|a| a.date);
        let committed_at = committer.as_ref().and_then(|s| s.date).or(authored_at);
        let epoch = DateTime::<Utc>::UNIX_EPOCH;
        RemoteCommit {
            sha: c.sha,
            author_login: c.author.map(|u| u.login),
            author_name: author.as_ref().map(|a| a.name.clone()).unwrap_or_default(),
            author_email: author.map(|a| a.email).unwrap_or_default(),
            authored_at: authored_at.or(committed_at).unwrap_or(epoch),
            committed_at: committed_at.unwrap_or(epoch),
            message: c.commit.message,
            html_url: c.html_url,
        }
    }
}

/// Decode one page of `GET /repos/{owner}/{repo}/commits`.
pub fn parse_commits_page(body: &str) -> Result<Vec<RemoteCommit>> {
    let page: Vec<ApiCommit> = serde_json::from_str(body)?;
    Ok(page.into_iter().map(RemoteCommit::from).collect())
}

/// URL of the `rel="next"` entry of a `Link` header.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let url = pieces.next()?.trim();
        let is_next = pieces.any(|p| p.trim() == r#"rel="next""#);
        if is_next {
            url.strip_prefix('<')
                .and_then(|u| u.strip_suffix('>'))
                .map(str::to_string)
        } else {
            None
        }
    })
}

pub struct GithubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
    per_page: u32,
    max_pages: usize,
}

impl GithubClient {
    pub fn new(config: &GithubConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            per_page: config.per_page.clamp(1, 100),
            max_pages: config.max_pages.max(1),
        })
    }

    fn get(&self, url: &str, query: Option<&[(&str, String)]>) -> Result<Response> {
        let mut req = self
            .http
            .get(url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if let Some(q) = query {
            req = req.query(q);
        }
        if let Some(token) = &self.token {
            req = req.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        debug!(url, "GET");
        Ok(req.send()?)
    }
}

fn check_status(url: &str, status: StatusCode, headers: &HeaderMap, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok());
    if matches!(status, StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS)
        && remaining == Some("0")
    {
        let reset = headers
            .get("x-ratelimit-reset")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| fmt_utc(&dt))
            .unwrap_or_else(|| "an unknown time".to_string());
        return Err(ActivityError::RateLimited { reset });
    }
    if status == StatusCode::NOT_FOUND {
        return Err(ActivityError::NotFound {
            url: url.to_string(),
        });
    }
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    Err(ActivityError::GithubStatus {
        status: status.as_u16(),
        url: url.to_string(),
        message,
    })
}

impl CommitSource for GithubClient {
    fn fetch(&self, repo: &RepoSlug, user: &str, range: TimeRange) -> Result<Vec<RemoteCommit>> {
        let first = format!("{}/repos/{}/{}/commits", self.api_url, repo.owner, repo.name);
        let query = [
            ("author", user.to_string()),
            ("since", fmt_utc(&range.start)),
            ("until", fmt_utc(&range.end)),
            ("per_page", self.per_page.to_string()),
        ];

        let mut out = Vec::new();
        let mut url = first.clone();
        let mut pages = 0usize;

        loop {
            let resp = if pages == 0 {
                self.get(&url, Some(&query))?
            } else {
                self.get(&url, None)?
            };
            pages += 1;

            let status = resp.status();
            let headers = resp.headers().clone();
            let body = resp.text()?;

            // 409 is GitHub's answer for a repository with no commits at all
            if status == StatusCode::CONFLICT {
                debug!(%repo, "repository is empty");
                break;
            }
            check_status(&url, status, &headers, &body)?;

            let batch = parse_commits_page(&body)?;
            debug!(page = pages, commits = batch.len(), "fetched page");
            out.extend(batch);

            let next = headers
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_link);
            match next {
                Some(n) if pages < self.max_pages => url = n,
                Some(_) => {
                    info!(
                        max_pages = self.max_pages,
                        "page limit reached for {first}; results may be incomplete"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(out)
    }
}
