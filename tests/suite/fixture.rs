//! Shared test controller and configuration.

use std::sync::atomic::{AtomicUsize, Ordering};

use gangway::config::{Auth, Config, Logging, Server as ServerConfig};
use gangway::decorator::{
    auth_required, body, delete, get, post, put, query_param, role_level, session,
};
use gangway::{Arguments, Controller, Error, Result, RouteTable, async_trait, json};
use serde_json::Value;

pub const SECRET: &str = "test-secret-that-is-at-least-32b!";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        auth: Auth {
            jwt_secret: SECRET.to_string(),
            token_expiry_days: 1,
        },
        logging: Logging::default(),
    }
}

/// Item controller mounted under `/api`, counting every invocation.
#[derive(Default)]
pub struct Items {
    calls: AtomicUsize,
}

impl Items {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Controller for Items {
    fn base_path(&self) -> &str {
        "/api"
    }

    fn routes(&self) -> Result<RouteTable> {
        RouteTable::builder()
            .route("search", [get("/items"), query_param(0, "q")])
            .route("create", [session(0), body(1), auth_required(), post("/items")])
            .route("replace", [put("/items"), auth_required(), body(0)])
            .route("remove", [delete("/items"), auth_required()])
            .route("locked", [get("/locked")])
            .route("purge", [role_level(5), delete("/admin/items")])
            .build()
    }

    async fn invoke(&self, method: &str, args: Arguments) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match method {
            "search" => Ok(json!({ "q": args.query(0)? })),
            "create" => Ok(json!({
                "owner": args.session(0)?.user_id,
                "item": args.raw_body(1)?,
            })),
            "replace" => Ok(args.raw_body(0)?.clone()),
            "remove" => Ok(json!({ "removed": true })),
            "locked" => Err(Error::handler(4040, "Item is locked")),
            "purge" => Ok(json!({ "purged": true })),
            other => Err(Error::NotFound(other.to_string())),
        }
    }
}
