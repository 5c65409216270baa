// Backend API endpoint functions.
// Provides typed methods for each backend operation, validating input before any request.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::diagram::TreeNode;
use crate::error::{RepoLensError, Result};
use crate::fallback::{
    NormalizedRepositoryRecord, RepositorySource, SourceFallbackCoordinator, normalize_github,
};
use crate::transport::{Access, RequestDescriptor, Transport};

use super::client::ApiClient;
use super::repo_ref::RepoRef;
use super::types::{
    FavoriteUpdate, FunctionSearch, HealthStatus, ProcessedRepository, QueryAnswer,
    RepositoryStructure, RepositorySummary, StructureResponse, SummariesResponse,
};

/// Model name sent when the caller does not pick one.
pub const DEFAULT_QUERY_MODEL: &str = "mock-ai";

impl<T: Transport, S: RepositorySource> ApiClient<T, S> {
    /// Check backend health. Only a 2xx answer counts as healthy.
    ///
    /// Never served from the cache.
    pub async fn health(&mut self) -> Result<HealthStatus> {
        let request = RequestDescriptor::get("/health").with_access(Access::Write);
        decode(self.gateway.execute(&request).await?)
    }

    /// Ask the backend to analyse a GitHub repository.
    pub async fn process_repository(&mut self, github_url: &str) -> Result<ProcessedRepository> {
        let github_url = required("GitHub URL", github_url)?;
        RepoRef::parse(github_url)?;

        let request =
            RequestDescriptor::post("/process-repository", &json!({ "github_url": github_url }))?;
        self.write(&request).await
    }

    /// List a user's repositories, from the backend or else the public GitHub listing.
    pub async fn user_repositories(
        &mut self,
        username: &str,
    ) -> Result<Vec<NormalizedRepositoryRecord>> {
        let username = username_field(username)?;
        let request =
            RequestDescriptor::query("/user-repositories", &json!({ "username": username }))?;

        let source = &self.source;
        SourceFallbackCoordinator::new(&mut self.gateway)
            .fetch_with_fallback(
                &request,
                move || source.user_repositories(username),
                normalize_github,
            )
            .await
    }

    /// Fetch the structure tree of a processed repository.
    pub async fn repository_structure(&mut self, repo_url: &str) -> Result<RepositoryStructure> {
        let repo_url = required("Repository URL", repo_url)?;
        RepoRef::parse(repo_url)?;

        let request =
            RequestDescriptor::query("/repository-structure", &json!({ "repo_url": repo_url }))?;
        let response: StructureResponse = decode(self.gateway.execute(&request).await?)?;

        Ok(RepositoryStructure {
            roots: TreeNode::from_structure(&response.structure)?,
            repo_url: response.repo_url,
            repo_name: response.repo_name,
            created_at: response.created_at,
            updated_at: response.updated_at,
        })
    }

    /// Ask a question about a processed repository.
    pub async fn query_repository(
        &mut self,
        repo_url: &str,
        question: &str,
        model: Option<&str>,
    ) -> Result<QueryAnswer> {
        let repo_url = required("Repository URL", repo_url)?;
        let question = required("Question", question)?;
        RepoRef::parse(repo_url)?;

        let request = RequestDescriptor::query(
            "/query-repository",
            &json!({
                "repo_url": repo_url,
                "question": question,
                "model": model.unwrap_or(DEFAULT_QUERY_MODEL),
            }),
        )?;
        decode(self.gateway.execute(&request).await?)
    }

    /// Search functions of a repository by free-text query.
    pub async fn search_functions(
        &mut self,
        repo_url: &str,
        query: &str,
    ) -> Result<FunctionSearch> {
        let repo_url = required("Repository URL", repo_url)?;
        let query = required("Query", query)?;

        let request = RequestDescriptor::query(
            "/search-functions",
            &json!({ "repo_url": repo_url, "query": query }),
        )?;
        decode(self.gateway.execute(&request).await?)
    }

    /// List summaries of a user's processed repositories.
    pub async fn user_repository_summaries(
        &mut self,
        username: &str,
    ) -> Result<Vec<RepositorySummary>> {
        let username = username_field(username)?;

        let request = RequestDescriptor::query(
            "/user-repository-summaries",
            &json!({ "username": username }),
        )?;
        let response: SummariesResponse = decode(self.gateway.execute(&request).await?)?;
        Ok(response.summaries)
    }

    /// Search a user's processed repositories by name and summary.
    pub async fn search_summaries(
        &mut self,
        username: &str,
        query: &str,
    ) -> Result<Vec<RepositorySummary>> {
        let username = username_field(username)?;
        let query = required("Search query", query)?;

        let request = RequestDescriptor::query(
            "/search-summaries",
            &json!({ "username": username, "query": query }),
        )?;
        let response: SummariesResponse = decode(self.gateway.execute(&request).await?)?;
        Ok(response.summaries)
    }

    /// Mark or unmark a processed repository as a favorite.
    pub async fn toggle_favorite(
        &mut self,
        username: &str,
        repo_name: &str,
        is_favorite: bool,
    ) -> Result<FavoriteUpdate> {
        let username = username_field(username)?;
        let repo_name = required("Repository name", repo_name)?;

        let request = RequestDescriptor::post(
            "/toggle-favorite",
            &json!({
                "username": username,
                "repo_name": repo_name,
                "is_favorite": is_favorite,
            }),
        )?;
        self.write(&request).await
    }

    /// Send a write and drop cached reads it may have made stale.
    async fn write<R: DeserializeOwned>(&mut self, request: &RequestDescriptor) -> Result<R> {
        let payload = self.gateway.execute(request).await?;
        self.gateway.clear_cache();
        decode(payload)
    }
}

/// Trimmed value of a required field, or a validation error naming it.
fn required<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(RepoLensError::Validation(format!("{} is required", field)));
    }
    Ok(value)
}

/// Trimmed GitHub-style username: ASCII letters, digits and hyphens only.
fn username_field(value: &str) -> Result<&str> {
    let username = required("Username", value)?;
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(RepoLensError::Validation(format!(
            "Invalid username: {}",
            username
        )));
    }
    Ok(username)
}

fn decode<R: DeserializeOwned>(payload: Value) -> Result<R> {
    serde_json::from_value(payload).map_err(|e| RepoLensError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::fallback::GitHubRepository;
    use crate::gateway::RequestGateway;
    use crate::transport::{RawResponse, RetryPolicy, RetryingTransport};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend double routing by endpoint and recording request bodies.
    #[derive(Default)]
    struct FakeBackend {
        routes: HashMap<String, RawResponse>,
        requests: Mutex<Vec<(String, Option<Value>)>>,
    }

    impl FakeBackend {
        fn route(mut self, endpoint: &str, status: u16, body: Value) -> Self {
            self.routes
                .insert(endpoint.to_string(), RawResponse::new(status, body.to_string()));
            self
        }
    }

    impl Transport for FakeBackend {
        async fn send(&self, request: &RequestDescriptor) -> Result<RawResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((request.endpoint().to_string(), request.body().cloned()));
            self.routes
                .get(request.endpoint())
                .cloned()
                .ok_or_else(|| RepoLensError::Transport("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct FakeSource {
        repos: Vec<GitHubRepository>,
        calls: AtomicUsize,
    }

    impl RepositorySource for FakeSource {
        async fn user_repositories(&self, _username: &str) -> Result<Vec<GitHubRepository>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.repos.clone())
        }
    }

    fn client(backend: FakeBackend, source: FakeSource) -> ApiClient<FakeBackend, FakeSource> {
        let policy = RetryPolicy {
            max_retries: 1,
            ..RetryPolicy::default()
        };
        ApiClient::new(
            RequestGateway::new(RetryingTransport::new(backend, policy), CacheStore::default()),
            source,
        )
    }

    fn requests(client: &ApiClient<FakeBackend, FakeSource>) -> Vec<(String, Option<Value>)> {
        client.gateway().transport().inner().requests.lock().unwrap().clone()
    }

    const REPO_URL: &str = "https://github.com/testuser/Genetic-Algorithm";

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        let mut client = client(FakeBackend::default(), FakeSource::default());

        let cases = [
            client.process_repository("").await.unwrap_err(),
            client.process_repository("https://example.com/x").await.unwrap_err(),
            client.user_repositories("   ").await.unwrap_err(),
            client.user_repositories("a/../orgs/x").await.unwrap_err(),
            client.user_repositories("a?per_page=1").await.unwrap_err(),
            client.user_repository_summaries("some user").await.unwrap_err(),
            client.repository_structure("").await.unwrap_err(),
            client.query_repository(REPO_URL, "", None).await.unwrap_err(),
            client.search_functions("", "net").await.unwrap_err(),
            client.search_summaries("testuser", "").await.unwrap_err(),
            client.toggle_favorite("testuser", "", true).await.unwrap_err(),
        ];

        for err in cases {
            assert!(matches!(err, RepoLensError::Validation(_)), "{:?}", err);
        }
        assert!(requests(&client).is_empty());
        assert_eq!(
            client.user_repositories("").await.unwrap_err().message(),
            "Username is required"
        );
    }

    #[tokio::test]
    async fn test_repository_structure_decodes_tree() {
        let backend = FakeBackend::default().route(
            "/repository-structure",
            200,
            json!({
                "repo_url": REPO_URL,
                "repo_name": "Genetic-Algorithm",
                "structure": {
                    "name": "Genetic-Algorithm",
                    "type": "directory",
                    "path": ".",
                    "children": [
                        {"name": "best_net.py", "type": "file", "path": "./best_net.py"},
                        {"name": "genetic.py", "type": "file", "path": "./genetic.py"}
                    ]
                },
                "created_at": "2024-01-15T10:30:00",
                "updated_at": "2024-01-15T10:30:00"
            }),
        );
        let mut client = client(backend, FakeSource::default());

        let structure = client.repository_structure(REPO_URL).await.unwrap();
        assert_eq!(structure.repo_name, "Genetic-Algorithm");
        assert_eq!(structure.diagram().declarations().count(), 3);

        client.repository_structure(REPO_URL).await.unwrap();
        assert_eq!(requests(&client).len(), 1, "second call served from cache");
    }

    #[tokio::test]
    async fn test_unprocessed_repository_reports_server_message() {
        let backend = FakeBackend::default().route(
            "/repository-structure",
            404,
            json!({"error": "Repository not found. Please process it first."}),
        );
        let mut client = client(backend, FakeSource::default());

        let err = client.repository_structure(REPO_URL).await.unwrap_err();
        assert_eq!(err.message(), "Repository not found. Please process it first.");
    }

    #[tokio::test]
    async fn test_user_repositories_falls_back_when_backend_down() {
        let repo: GitHubRepository = serde_json::from_value(json!({
            "id": 1,
            "name": "ML-Utils",
            "full_name": "testuser/ML-Utils",
            "html_url": "https://github.com/testuser/ML-Utils",
            "stargazers_count": 15
        }))
        .unwrap();
        let source = FakeSource {
            repos: vec![repo],
            ..FakeSource::default()
        };
        let mut client = client(FakeBackend::default(), source);

        let records = client.user_repositories("testuser").await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].star_count, 15);
        assert_eq!(client.source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_query_sends_default_model() {
        let backend = FakeBackend::default().route(
            "/query-repository",
            200,
            json!({
                "response": "It evolves CNNs.",
                "model": "mock-ai",
                "repo_url": REPO_URL,
                "question": "what does it do?"
            }),
        );
        let mut client = client(backend, FakeSource::default());

        let answer = client
            .query_repository(REPO_URL, "  what does it do?  ", None)
            .await
            .unwrap();

        assert_eq!(answer.response, "It evolves CNNs.");
        let (_, body) = &requests(&client)[0];
        assert_eq!(
            body.as_ref().unwrap(),
            &json!({"repo_url": REPO_URL, "question": "what does it do?", "model": "mock-ai"})
        );
    }

    #[tokio::test]
    async fn test_toggle_favorite_is_not_cached() {
        let backend = FakeBackend::default().route(
            "/toggle-favorite",
            200,
            json!({
                "username": "testuser",
                "repo_name": "Genetic-Algorithm",
                "is_favorite": true,
                "message": "Repository added to favorites"
            }),
        );
        let mut client = client(backend, FakeSource::default());

        client.toggle_favorite("testuser", "Genetic-Algorithm", true).await.unwrap();
        let update = client.toggle_favorite("testuser", "Genetic-Algorithm", true).await.unwrap();

        assert!(update.is_favorite);
        assert_eq!(requests(&client).len(), 2);
    }

    #[tokio::test]
    async fn test_writes_invalidate_cached_summaries() {
        let backend = FakeBackend::default()
            .route(
                "/user-repository-summaries",
                200,
                json!({
                    "username": "testuser",
                    "summaries": [{"repo_name": "Genetic-Algorithm", "repo_url": REPO_URL}]
                }),
            )
            .route(
                "/toggle-favorite",
                200,
                json!({
                    "username": "testuser",
                    "repo_name": "Genetic-Algorithm",
                    "is_favorite": true
                }),
            );
        let mut client = client(backend, FakeSource::default());

        client.user_repository_summaries("testuser").await.unwrap();
        client.user_repository_summaries("testuser").await.unwrap();
        assert_eq!(requests(&client).len(), 2, "second listing served from cache");

        client.toggle_favorite("testuser", "Genetic-Algorithm", true).await.unwrap();
        assert!(client.gateway().cache().is_empty());

        client.user_repository_summaries("testuser").await.unwrap();
        let endpoints: Vec<_> = requests(&client).into_iter().map(|(e, _)| e).collect();
        assert_eq!(
            endpoints,
            [
                "/user-repository-summaries",
                "/toggle-favorite",
                "/user-repository-summaries"
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let backend = FakeBackend::default()
            .route("/user-repository-summaries", 200, json!({"summaries": []}))
            .route("/toggle-favorite", 404, json!({"error": "Repository not found"}));
        let mut client = client(backend, FakeSource::default());

        client.user_repository_summaries("testuser").await.unwrap();
        client.toggle_favorite("testuser", "missing", true).await.unwrap_err();

        assert_eq!(client.gateway().cache().len(), 1);
    }

    #[tokio::test]
    async fn test_health_is_never_cached() {
        let backend =
            FakeBackend::default().route("/health", 200, json!({"status": "healthy"}));
        let mut client = client(backend, FakeSource::default());

        client.health().await.unwrap();
        let health = client.health().await.unwrap();

        assert_eq!(health.status, "healthy");
        assert_eq!(requests(&client).len(), 2);
        assert!(client.gateway().cache().is_empty());
    }

    #[tokio::test]
    async fn test_health_failure_is_reported() {
        let mut client = client(FakeBackend::default(), FakeSource::default());

        let err = client.health().await.unwrap_err();
        assert!(err.is_transport());
    }
}
