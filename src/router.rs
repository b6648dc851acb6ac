//! HTTP routing with matchit.
//!
//! The [`Engine`] trait is the registration surface the dispatcher talks to;
//! [`Router`] implements it and is frozen into a [`RouterHandle`] for the
//! server.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use hyper::Method;

use crate::error::{Error, Result};
use crate::response::HttpResponse;

/// Boxed future for async handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// An incoming request as seen by route handlers.
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method.
    pub method: Method,
    /// The request URI.
    pub uri: hyper::Uri,
    /// The request headers.
    pub headers: hyper::http::HeaderMap,
    /// Route parameters (e.g., {id} from path).
    pub params: HashMap<String, String>,
    /// Decoded query string fields.
    pub query: HashMap<String, String>,
    /// The request body, pre-read as bytes.
    pub body: Bytes,
    /// Correlation id stamped by the server.
    pub request_id: Option<String>,
}

impl Request {
    /// Build a request with no headers, params, or body.
    pub fn new(method: Method, uri: hyper::Uri) -> Self {
        let query = parse_query(uri.query());
        Self {
            method,
            uri,
            headers: hyper::http::HeaderMap::new(),
            params: HashMap::new(),
            query,
            body: Bytes::new(),
            request_id: None,
        }
    }

    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Get a query string field by name.
    pub fn query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }
}

/// Decode a raw query string. Malformed input yields an empty collection;
/// repeated keys keep the last value.
pub fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    raw.and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
        .map(|pairs| pairs.into_iter().collect())
        .unwrap_or_default()
}

/// Handler function type.
/// Takes a Request and returns a future resolving to a response.
pub type Handler = Box<dyn Fn(Request) -> BoxFuture<'static, HttpResponse> + Send + Sync>;

/// Per-verb registration surface of an HTTP engine.
///
/// Registration fails only for paths the engine cannot route, which is a
/// configuration error.
pub trait Engine {
    fn get(&mut self, path: &str, handler: Handler) -> Result<()>;
    fn post(&mut self, path: &str, handler: Handler) -> Result<()>;
    fn put(&mut self, path: &str, handler: Handler) -> Result<()>;
    fn delete(&mut self, path: &str, handler: Handler) -> Result<()>;
}

/// A registered path with method-specific handlers.
struct PathEntry {
    handlers: HashMap<Method, Handler>,
}

/// HTTP router for registering and dispatching requests.
pub struct Router {
    routes: matchit::Router<usize>,
    patterns: HashMap<String, usize>,
    entries: Vec<PathEntry>,
}

impl Router {
    /// Create a new router.
    pub fn new() -> Self {
        Self {
            routes: matchit::Router::new(),
            patterns: HashMap::new(),
            entries: Vec::new(),
        }
    }

    /// Register a handler for a method and path.
    ///
    /// Patterns are compared by their text, so `/items/search` and
    /// `/items/{id}` are separate entries. Fails on a pattern matchit
    /// rejects and on a second handler for the same method and pattern.
    pub fn route(&mut self, method: Method, path: &str, handler: Handler) -> Result<()> {
        let entry_idx = match self.patterns.get(path) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.routes
                    .insert(path, idx)
                    .map_err(|e| Error::Config(format!("Invalid route {path}: {e}")))?;
                self.entries.push(PathEntry {
                    handlers: HashMap::new(),
                });
                self.patterns.insert(path.to_string(), idx);
                idx
            }
        };

        let handlers = &mut self.entries[entry_idx].handlers;
        if handlers.contains_key(&method) {
            return Err(Error::Config(format!("Duplicate route {method} {path}")));
        }
        handlers.insert(method, handler);
        Ok(())
    }
}

impl Engine for Router {
    fn get(&mut self, path: &str, handler: Handler) -> Result<()> {
        self.route(Method::GET, path, handler)
    }

    fn post(&mut self, path: &str, handler: Handler) -> Result<()> {
        self.route(Method::POST, path, handler)
    }

    fn put(&mut self, path: &str, handler: Handler) -> Result<()> {
        self.route(Method::PUT, path, handler)
    }

    fn delete(&mut self, path: &str, handler: Handler) -> Result<()> {
        self.route(Method::DELETE, path, handler)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe router handle for use in request handling.
pub struct RouterHandle {
    routes: matchit::Router<usize>,
    entries: Vec<PathEntry>,
}

impl Router {
    /// Convert to a thread-safe handle for use in request handling.
    pub fn into_handle(self) -> Arc<RouterHandle> {
        Arc::new(RouterHandle {
            routes: self.routes,
            entries: self.entries,
        })
    }
}

/// Result of matching a request to a route.
pub enum RouteMatch<'a> {
    /// Route matched with handler.
    Matched {
        handler: &'a Handler,
        params: HashMap<String, String>,
    },
    /// Path matched but method not allowed.
    MethodNotAllowed,
    /// Path not found.
    NotFound,
}

impl RouterHandle {
    /// Match a request to a route.
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_> {
        match self.routes.at(path) {
            Ok(matched) => {
                let entry = &self.entries[*matched.value];

                let params: HashMap<String, String> = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();

                match entry.handlers.get(method) {
                    Some(handler) => RouteMatch::Matched { handler, params },
                    None => RouteMatch::MethodNotAllowed,
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }
}
