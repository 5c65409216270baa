// Backend API response types.
// Defines structs for deserializing the repository analysis backend's JSON payloads.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::diagram::{DiagramDocument, DiagramGenerator, TreeNode};
use crate::error::Result;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: Option<String>,
    pub mode: Option<String>,
    pub timestamp: Option<String>,
}

/// Result of asking the backend to process a repository.
///
/// A first-time process returns the tree at top level; a repeat returns the
/// stored record under `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedRepository {
    pub message: String,
    pub username: String,
    pub repo_name: String,
    pub tree_structure: Option<Value>,
    pub repo_summary: Option<String>,
    pub functions_processed: Option<u64>,
    pub data: Option<StoredRepository>,
}

impl ProcessedRepository {
    /// Summary text, wherever the response carried it.
    pub fn summary(&self) -> Option<&str> {
        self.repo_summary
            .as_deref()
            .or_else(|| self.data.as_ref().and_then(|d| d.repo_summary.as_deref()))
    }

    /// Decoded structure tree, wherever the response carried it.
    pub fn tree(&self) -> Result<Vec<TreeNode>> {
        let structure = self
            .tree_structure
            .as_ref()
            .or_else(|| self.data.as_ref().and_then(|d| d.tree_structure.as_ref()));
        match structure {
            Some(value) => TreeNode::from_structure(value),
            None => Ok(Vec::new()),
        }
    }
}

/// Stored record of an already processed repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRepository {
    pub repo_name: String,
    pub repo_url: String,
    pub tree_structure: Option<Value>,
    pub repo_summary: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Structure of a processed repository.
#[derive(Debug, Clone)]
pub struct RepositoryStructure {
    pub repo_url: String,
    pub repo_name: String,
    pub roots: Vec<TreeNode>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl RepositoryStructure {
    /// Diagram of the structure, generated with a fresh indexer.
    pub fn diagram(&self) -> DiagramDocument {
        DiagramGenerator::new().generate(&self.roots)
    }
}

/// Wire form of the structure response.
#[derive(Debug, Deserialize)]
pub(crate) struct StructureResponse {
    pub repo_url: String,
    #[serde(default)]
    pub structure: Value,
    #[serde(default)]
    pub repo_name: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Answer to a natural-language question about a repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryAnswer {
    pub response: String,
    pub model: Option<String>,
    pub repo_url: String,
    pub question: String,
}

/// A function matching a search query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionMatch {
    pub function_name: String,
    pub file_path: String,
    pub function_summary: Option<String>,
    pub function_code: Option<String>,
}

/// Function search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionSearch {
    #[serde(default)]
    pub results: Vec<FunctionMatch>,
    pub count: Option<u64>,
    pub repo_url: Option<String>,
    pub query: Option<String>,
}

/// Summary of a processed repository belonging to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub repo_name: String,
    pub repo_url: String,
    pub repo_summary: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Wire form of the summaries and summary-search responses.
#[derive(Debug, Deserialize)]
pub(crate) struct SummariesResponse {
    #[serde(default, alias = "results")]
    pub summaries: Vec<RepositorySummary>,
}

/// Result of toggling a repository's favorite flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteUpdate {
    pub username: String,
    pub repo_name: String,
    pub is_favorite: bool,
    pub message: Option<String>,
}
