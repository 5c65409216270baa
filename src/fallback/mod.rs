// Fallback module.
// Substitutes the public GitHub listing when the backend cannot serve repository data.

pub mod coordinator;
pub mod github;
pub mod record;

pub use coordinator::SourceFallbackCoordinator;
pub use github::{GitHubSource, RepositorySource};
pub use record::{
    BackendRepository, GitHubRepository, NormalizedRepositoryRecord, normalize_backend,
    normalize_backend_listing, normalize_github,
};
