// Request fingerprints used as cache keys.

use crate::transport::RequestDescriptor;

/// Derive the cache key for a request from its method, endpoint and body.
///
/// Object keys in the body serialize in sorted order, so equal bodies give
/// equal fingerprints regardless of how they were built.
pub fn fingerprint(request: &RequestDescriptor) -> String {
    let body = request.body().map(|b| b.to_string()).unwrap_or_default();
    format!("{} {} {}", request.method(), request.endpoint(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Method;
    use serde_json::json;

    #[test]
    fn test_same_request_same_fingerprint() {
        let a = RequestDescriptor::query(
            "/search-functions",
            &json!({"query": "net", "repo_url": "u"}),
        )
        .unwrap();
        let b = RequestDescriptor::query(
            "/search-functions",
            &json!({"repo_url": "u", "query": "net"}),
        )
        .unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_distinguishes_parts() {
        let base = RequestDescriptor::query("/search-functions", &json!({"query": "net"})).unwrap();
        let other_body =
            RequestDescriptor::query("/search-functions", &json!({"query": "mutate"})).unwrap();
        let other_endpoint =
            RequestDescriptor::query("/search-summaries", &json!({"query": "net"})).unwrap();
        let other_method = RequestDescriptor::new(Method::Put, "/search-functions")
            .with_body(json!({"query": "net"}));

        assert_ne!(fingerprint(&base), fingerprint(&other_body));
        assert_ne!(fingerprint(&base), fingerprint(&other_endpoint));
        assert_ne!(fingerprint(&base), fingerprint(&other_method));
    }

    #[test]
    fn test_fingerprint_without_body() {
        assert_eq!(fingerprint(&RequestDescriptor::get("/health")), "GET /health ");
    }
}
