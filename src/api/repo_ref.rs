// GitHub repository URL parsing.

use std::fmt;

use crate::error::{RepoLensError, Result};

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse `github.com/<owner>/<repo>` URLs, including `.git`, `/tree/...`
    /// and `/blob/...` forms.
    pub fn parse(url: &str) -> Result<Self> {
        let invalid = || RepoLensError::Validation(format!("Invalid GitHub URL: {}", url));

        let (_, rest) = url.split_once("github.com/").ok_or_else(invalid)?;
        let mut segments = rest.split(['/', '?', '#']);

        let owner = segments.next().unwrap_or_default();
        let name = segments.next().unwrap_or_default();
        let name = name.strip_suffix(".git").unwrap_or(name);

        if owner.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
