// Request and response values exchanged with the transport.
// Descriptors are immutable once built; the gateway only reads them.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Access implied by the method alone.
    pub fn default_access(&self) -> Access {
        match self {
            Method::Get | Method::Head => Access::Read,
            _ => Access::Write,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Whether a request has side effects on the server.
///
/// Only `Read` requests are served from and stored in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Read,
    Write,
}

/// A single logical request: method, endpoint path and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    endpoint: String,
    body: Option<Value>,
    access: Access,
}

impl RequestDescriptor {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            access: method.default_access(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn post<B: Serialize>(endpoint: impl Into<String>, body: &B) -> crate::Result<Self> {
        Ok(Self::new(Method::Post, endpoint).with_body(serde_json::to_value(body)?))
    }

    /// A POST that only queries data; eligible for caching.
    pub fn query<B: Serialize>(endpoint: impl Into<String>, body: &B) -> crate::Result<Self> {
        Ok(Self::post(endpoint, body)?.with_access(Access::Read))
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_read(&self) -> bool {
        self.access == Access::Read
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_access_defaults_follow_method() {
        assert!(RequestDescriptor::get("/health").is_read());
        assert!(!RequestDescriptor::new(Method::Delete, "/x").is_read());

        let post = RequestDescriptor::post("/process-repository", &json!({"a": 1})).unwrap();
        assert!(!post.is_read());
    }

    #[test]
    fn test_query_is_read_post() {
        let query = RequestDescriptor::query("/repository-structure", &json!({"repo_url": "u"}))
            .unwrap();
        assert_eq!(query.method(), Method::Post);
        assert!(query.is_read());
        assert_eq!(query.body(), Some(&json!({"repo_url": "u"})));
    }

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(199, "").is_success());
        assert!(!RawResponse::new(301, "").is_success());
        assert!(!RawResponse::new(404, "").is_success());
    }
}
