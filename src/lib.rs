//! Gangway - declarative controller routing on top of hyper.
//!
//! Controllers describe their HTTP surface as route metadata; gangway binds
//! that metadata to a router at startup and runs every request through one
//! pipeline:
//!
//! - **Metadata**: verb, path, auth flag and positional parameters per method
//! - **Decorators**: composable metadata mutations that build a route table
//! - **Resolver**: extracts query fields, body and session into arguments
//! - **Dispatcher**: registers routes and wraps results in a response envelope
//! - **Server**: hyper-based HTTP server with matchit routing
//!
//! # Example
//!
//! ```ignore
//! use gangway::decorator::{auth_required, get, post, body, session};
//! use gangway::{Application, Arguments, Controller, ConfigLoader, Error, Result, RouteTable};
//!
//! struct Notes;
//!
//! #[async_trait::async_trait]
//! impl Controller for Notes {
//!     fn base_path(&self) -> &str { "/api/notes" }
//!
//!     fn routes(&self) -> Result<RouteTable> {
//!         RouteTable::builder()
//!             .route("mine", [get("/mine"), auth_required(), session(0)])
//!             .route("create", [post(""), auth_required(), session(0), body(1)])
//!             .build()
//!     }
//!
//!     async fn invoke(&self, method: &str, args: Arguments) -> Result<serde_json::Value> {
//!         match method {
//!             "mine" => Ok(gangway::json!({ "owner": args.session(0)?.user_id })),
//!             "create" => Ok(args.raw_body(1)?.clone()),
//!             other => Err(Error::NotFound(other.to_string())),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> gangway::Result<()> {
//!     let config = ConfigLoader::new("NOTES").load(None, None, None, None)?;
//!     gangway::logging::init(&config.logging)?;
//!
//!     let mut app = Application::new(config);
//!     app.mount(Notes)?;
//!     app.run().await
//! }
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod controller;
pub mod decorator;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod resolver;
pub mod response;
pub mod router;
pub mod server;
pub mod session;

// Re-export main types at crate root
pub use app::Application;
pub use config::{Config, ConfigLoader};
pub use controller::Controller;
pub use dispatcher::{Dispatcher, Registration};
pub use error::{Error, Result};
pub use metadata::{MAX_PARAMETERS, ParameterDescription, ParameterKind, RouteEntry, RouteTable, Verb};
pub use resolver::{Argument, Arguments};
pub use router::{Engine, Request, Router};
pub use session::{Session, SessionResolver};

// Re-export commonly used dependencies for convenience
pub use async_trait::async_trait;
pub use hyper::Method;
pub use serde_json::json;
