// Backend API module.
// Typed operations over the request gateway, as consumed by UI collaborators.

pub mod client;
pub mod endpoints;
pub mod repo_ref;
pub mod types;

pub use client::ApiClient;
pub use endpoints::DEFAULT_QUERY_MODEL;
pub use repo_ref::RepoRef;
pub use types::*;
