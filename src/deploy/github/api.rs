//! GitHub REST API client.
//!
//! Blocking HTTP client for the subset of the API the publish pipeline
//! needs: per-file content operations (`/contents/`), repository
//! creation (`/user/repos`) and hosting enablement (`/pages`).
//! Authentication is basic auth from the stored username and token.
//!
//! Every non-success response is surfaced as [`Error::Remote`]; nothing
//! here retries.

use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::Deserialize;
use serde_json::json;
use ureq::Agent;

use crate::config::GithubDeployConfig;
use crate::error::Error;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

// ============================================================================
// Repository Identity
// ============================================================================

/// `owner/name` pair every API operation is addressed at.
///
/// Derived once from either the explicit `owner/name` override or the
/// account's default naming, and used consistently by every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    /// Resolve the repository identity from config.
    ///
    /// # Errors
    /// [`Error::Validation`] for a malformed `owner/name` override.
    pub fn resolve(config: &GithubDeployConfig) -> Result<Self, Error> {
        match &config.repository {
            Some(spec) => match spec.split_once('/') {
                Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok(Self {
                    owner: owner.to_string(),
                    name: name.to_string(),
                }),
                _ => Err(Error::Validation(format!(
                    "[deploy.github.repository] `{spec}` is not of the form owner/name"
                ))),
            },
            None => Ok(Self {
                owner: config.username.clone(),
                name: format!("{}.github.io", config.username),
            }),
        }
    }

    /// Hosted URL to fall back on when the pages endpoint omits one.
    pub fn default_pages_url(&self) -> String {
        if self.name == format!("{}.github.io", self.owner) {
            format!("https://{}.github.io/", self.owner)
        } else {
            format!("https://{}.github.io/{}/", self.owner, self.name)
        }
    }
}

impl std::fmt::Display for RepoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// ============================================================================
// File Records and Sync Planning
// ============================================================================

/// One file's state as known by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFileRecord {
    pub path: String,

    /// Content address required for updates and deletes.
    pub sha: String,

    /// Decoded file content.
    pub content: Vec<u8>,
}

/// The minimal write a local file needs against the remote record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncAction {
    /// Remote content is byte-identical: no network write at all.
    Skip,

    /// No remote record: create without a prior sha.
    Create,

    /// Remote differs: update against its sha.
    Update { sha: String },
}

/// Decide the minimal write for `local` against the fetched record.
pub fn classify(local: &[u8], remote: Option<&RemoteFileRecord>) -> SyncAction {
    match remote {
        None => SyncAction::Create,
        Some(record) if record.content == local => SyncAction::Skip,
        Some(record) => SyncAction::Update {
            sha: record.sha.clone(),
        },
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    #[serde(default)]
    html_url: String,
}

// ============================================================================
// Client
// ============================================================================

/// GitHub REST API client.
#[derive(Clone)]
pub struct GithubApi {
    agent: Agent,
    api_base: String,
    username: String,
    token: String,
}

impl GithubApi {
    /// Create a client against `api_base` with basic-auth credentials.
    pub fn new(api_base: &str, username: &str, token: &str) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            api_base: api_base.trim_end_matches('/').to_owned(),
            username: username.to_owned(),
            token: token.to_owned(),
        }
    }

    fn auth_header(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.token);
        format!("Basic {}", BASE64_STANDARD.encode(credentials))
    }

    fn contents_url(&self, repo: &RepoId, path: &str) -> String {
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            repo.owner,
            repo.name,
            encoded.join("/")
        )
    }

    /// Fetch one file's remote record; `None` when the file is absent.
    pub fn get_contents(
        &self,
        repo: &RepoId,
        path: &str,
    ) -> Result<Option<RemoteFileRecord>, Error> {
        let url = self.contents_url(repo, path);
        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/vnd.github+json")
            .call()?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        let mut body = response.into_body();
        if status >= 400 {
            return Err(remote_error(status, &mut body));
        }

        let record: ContentsResponse = body.read_json()?;
        let content = decode_content(&record.content)?;
        Ok(Some(RemoteFileRecord {
            path: path.to_string(),
            sha: record.sha,
            content,
        }))
    }

    /// Create or update one file. `sha` must carry the existing record's
    /// address for updates and be absent for creates.
    pub fn put_contents(
        &self,
        repo: &RepoId,
        path: &str,
        content: &[u8],
        sha: Option<&str>,
        message: &str,
    ) -> Result<(), Error> {
        let mut payload = json!({
            "message": message,
            "content": BASE64_STANDARD.encode(content),
        });
        if let Some(sha) = sha {
            payload["sha"] = json!(sha);
        }
        let body = serde_json::to_vec(&payload)?;

        let url = self.contents_url(repo, path);
        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/vnd.github+json")
            .header("Content-Type", "application/json")
            .send(&body[..])?;

        expect_success(response)
    }

    /// Delete one file; the existing record's sha is required.
    pub fn delete_contents(
        &self,
        repo: &RepoId,
        path: &str,
        sha: &str,
        message: &str,
    ) -> Result<(), Error> {
        let payload = json!({
            "message": message,
            "sha": sha,
        });
        let body = serde_json::to_vec(&payload)?;

        let url = self.contents_url(repo, path);
        let response = self
            .agent
            .delete(&url)
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/vnd.github+json")
            .header("Content-Type", "application/json")
            .force_send_body()
            .send(&body[..])?;

        expect_success(response)
    }

    /// Create the remote repository under the authenticated account.
    ///
    /// # Errors
    /// [`Error::Conflict`] when a same-named repository already exists.
    pub fn create_repository(&self, repo: &RepoId) -> Result<(), Error> {
        let payload = json!({
            "name": repo.name,
            "auto_init": false,
        });
        let body = serde_json::to_vec(&payload)?;

        let url = format!("{}/user/repos", self.api_base);
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/vnd.github+json")
            .header("Content-Type", "application/json")
            .send(&body[..])?;

        let status = response.status().as_u16();
        if status == 422 {
            return Err(Error::Conflict(repo.to_string()));
        }
        let mut body = response.into_body();
        if status >= 400 {
            return Err(remote_error(status, &mut body));
        }
        Ok(())
    }

    /// Hosted URL of the repository's pages site, if already enabled.
    pub fn pages_site(&self, repo: &RepoId) -> Result<Option<String>, Error> {
        let url = format!("{}/repos/{}/{}/pages", self.api_base, repo.owner, repo.name);
        let response = self
            .agent
            .get(&url)
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/vnd.github+json")
            .call()?;

        let status = response.status().as_u16();
        if status == 404 {
            return Ok(None);
        }
        let mut body = response.into_body();
        if status >= 400 {
            return Err(remote_error(status, &mut body));
        }

        let pages: PagesResponse = body.read_json()?;
        Ok(Some(hosted_url(pages, repo)))
    }

    /// Enable hosting on the repository. One request, no polling: the
    /// response already carries the hosted URL.
    pub fn enable_pages(&self, repo: &RepoId, branch: &str) -> Result<String, Error> {
        let payload = json!({
            "source": { "branch": branch, "path": "/" },
        });
        let body = serde_json::to_vec(&payload)?;

        let url = format!("{}/repos/{}/{}/pages", self.api_base, repo.owner, repo.name);
        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header())
            .header("Accept", "application/vnd.github+json")
            .header("Content-Type", "application/json")
            .send(&body[..])?;

        let status = response.status().as_u16();
        let mut body = response.into_body();
        if status >= 400 {
            return Err(remote_error(status, &mut body));
        }

        let pages: PagesResponse = body.read_json()?;
        Ok(hosted_url(pages, repo))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn hosted_url(pages: PagesResponse, repo: &RepoId) -> String {
    if pages.html_url.is_empty() {
        repo.default_pages_url()
    } else {
        pages.html_url
    }
}

fn remote_error(status: u16, body: &mut ureq::Body) -> Error {
    let body = body
        .read_to_string()
        .unwrap_or_else(|_| "(unable to read error body)".to_string());
    Error::Remote { status, body }
}

fn expect_success(response: ureq::http::Response<ureq::Body>) -> Result<(), Error> {
    let status = response.status().as_u16();
    if status >= 400 {
        let mut body = response.into_body();
        return Err(remote_error(status, &mut body));
    }
    Ok(())
}

/// Decode a base64 content body; the wire format inserts line breaks.
fn decode_content(encoded: &str) -> Result<Vec<u8>, Error> {
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    BASE64_STANDARD
        .decode(compact)
        .map_err(|err| Error::Validation(format!("malformed base64 content body: {err}")))
}

// ============================================================================
// Tests
// ============================================================================
