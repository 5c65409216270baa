// Resilient access layer for repository analysis backends.
// Request caching, transport retries, fallback sources and tree-to-diagram rendering.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod diagram;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod transport;

pub use api::ApiClient;
pub use cache::{CacheEntry, CacheStore};
pub use config::ClientConfig;
pub use diagram::{DiagramDocument, DiagramGenerator, TreeNode, TreeNodeIndexer};
pub use error::{RepoLensError, Result};
pub use fallback::{NormalizedRepositoryRecord, SourceFallbackCoordinator};
pub use gateway::RequestGateway;
pub use transport::{RequestDescriptor, RetryingTransport};
