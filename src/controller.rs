//! Controller trait for metadata-driven API surfaces.
//!
//! A controller declares its routes as a [`RouteTable`] and answers calls by
//! method name. The [`Dispatcher`](crate::dispatcher::Dispatcher) joins the
//! two.
//!
//! # Example
//!
//! ```ignore
//! use gangway::decorator::{get, query_param};
//! use gangway::{Arguments, Controller, Error, Result, RouteTable};
//!
//! pub struct ItemController;
//!
//! #[async_trait::async_trait]
//! impl Controller for ItemController {
//!     fn base_path(&self) -> &str {
//!         "/api/items"
//!     }
//!
//!     fn routes(&self) -> Result<RouteTable> {
//!         RouteTable::builder()
//!             .route("search", [get("/search"), query_param(0, "q")])
//!             .build()
//!     }
//!
//!     async fn invoke(&self, method: &str, args: Arguments) -> Result<serde_json::Value> {
//!         match method {
//!             "search" => Ok(serde_json::json!({ "q": args.query(0)? })),
//!             other => Err(Error::NotFound(other.to_string())),
//!         }
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::metadata::RouteTable;
use crate::resolver::Arguments;

/// A group of HTTP-exposed methods sharing a base path.
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    /// Prefix joined in front of every route path.
    fn base_path(&self) -> &str;

    /// Route metadata for this controller's methods.
    fn routes(&self) -> Result<RouteTable>;

    /// Invoke `method` with its resolved positional arguments.
    async fn invoke(&self, method: &str, args: Arguments) -> Result<Value>;
}
