// Normalized repository records and the raw shapes they are built from.
// Backend listings and public GitHub listings both normalize into NormalizedRepositoryRecord.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RepoLensError, Result};

/// Canonical repository shape handed to callers, whichever source served it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRepositoryRecord {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub url: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub star_count: u64,
    pub fork_count: u64,
    pub owner: String,
    pub clone_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub private: bool,
}

impl NormalizedRepositoryRecord {
    /// Check the record invariants: name and url must be present.
    fn validated(self) -> Result<Self> {
        if self.name.trim().is_empty() {
            return Err(RepoLensError::Parse(format!(
                "repository {} has no name",
                self.id
            )));
        }
        if self.url.trim().is_empty() {
            return Err(RepoLensError::Parse(format!(
                "repository '{}' has no url",
                self.name
            )));
        }
        Ok(self)
    }
}

/// Owner object embedded in GitHub repository payloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// Repository as returned by the public GitHub listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub clone_url: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub forks_count: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub private: bool,
    pub owner: Option<GitHubOwner>,
}

/// Repository as returned by the backend's `user-repositories` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendRepository {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    pub clone_url: Option<String>,
    pub language: Option<String>,
    #[serde(alias = "stargazers_count")]
    pub stars: Option<u64>,
    #[serde(alias = "forks_count")]
    pub forks: Option<u64>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub private: bool,
}

/// Backend listing envelope.
#[derive(Debug, Deserialize)]
struct BackendRepositoryList {
    #[serde(default)]
    repositories: Vec<BackendRepository>,
}

/// Map a public GitHub repository onto the canonical record.
pub fn normalize_github(repo: GitHubRepository) -> Result<NormalizedRepositoryRecord> {
    let owner = repo
        .owner
        .map(|o| o.login)
        .unwrap_or_else(|| owner_from_full_name(&repo.full_name));
    let full_name = full_name_or(&repo.full_name, &owner, &repo.name);

    NormalizedRepositoryRecord {
        id: repo.id,
        name: repo.name,
        full_name,
        url: repo.html_url,
        description: repo.description,
        language: repo.language,
        star_count: repo.stargazers_count.unwrap_or(0),
        fork_count: repo.forks_count.unwrap_or(0),
        owner,
        clone_url: repo.clone_url,
        updated_at: repo.updated_at,
        private: repo.private,
    }
    .validated()
}

/// Map a backend repository onto the canonical record.
pub fn normalize_backend(repo: BackendRepository) -> Result<NormalizedRepositoryRecord> {
    let owner = owner_from_full_name(&repo.full_name);
    let full_name = full_name_or(&repo.full_name, &owner, &repo.name);

    NormalizedRepositoryRecord {
        id: repo.id,
        name: repo.name,
        full_name,
        url: repo.html_url,
        description: repo.description,
        language: repo.language,
        star_count: repo.stars.unwrap_or(0),
        fork_count: repo.forks.unwrap_or(0),
        owner,
        clone_url: repo.clone_url,
        updated_at: repo.updated_at,
        private: repo.private,
    }
    .validated()
}

/// Decode and normalize a backend listing payload.
///
/// Accepts the `{ "repositories": [...] }` envelope or a bare array.
pub fn normalize_backend_listing(payload: Value) -> Result<Vec<NormalizedRepositoryRecord>> {
    let repos: Vec<BackendRepository> = if payload.is_array() {
        serde_json::from_value(payload)?
    } else {
        serde_json::from_value::<BackendRepositoryList>(payload)?.repositories
    };

    repos.into_iter().map(normalize_backend).collect()
}

fn owner_from_full_name(full_name: &str) -> String {
    full_name
        .split_once('/')
        .map(|(owner, _)| owner.to_string())
        .unwrap_or_default()
}

fn full_name_or(full_name: &str, owner: &str, name: &str) -> String {
    if !full_name.is_empty() || owner.is_empty() {
        full_name.to_string()
    } else {
        format!("{}/{}", owner, name)
    }
}
