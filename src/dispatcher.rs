//! Controller dispatch.
//!
//! [`Dispatcher::mount`] walks a controller's [`RouteTable`] once and binds
//! every entry to the engine's verb-specific registration call. Each bound
//! handler runs the per-request pipeline:
//!
//! 1. resolve declared parameters,
//! 2. check the session when the route requires authorization or a role
//!    level,
//! 3. invoke the controller method,
//! 4. answer with the success envelope or the normalized error body.
//!
//! Errors from steps 1-3 are all answered at this single boundary.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::metadata::{RouteEntry, RouteTable, Verb};
use crate::resolver;
use crate::response::{self, HttpResponse};
use crate::router::{Engine, Handler, Request};
use crate::session::SessionResolver;

/// One binding made by [`Dispatcher::mount`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub verb: Verb,
    pub path: String,
    /// Controller method the route invokes.
    pub method: String,
}

/// Binds controllers to an [`Engine`].
#[derive(Clone)]
pub struct Dispatcher {
    sessions: Arc<dyn SessionResolver>,
}

impl Dispatcher {
    pub fn new(sessions: Arc<dyn SessionResolver>) -> Self {
        Self { sessions }
    }

    /// Register every route of `controller` with `engine`.
    ///
    /// All entries are validated before the first registration, so a
    /// controller with a route lacking a verb/path registers nothing.
    pub fn mount<C, E>(&self, controller: Arc<C>, engine: &mut E) -> Result<Vec<Registration>>
    where
        C: Controller,
        E: Engine + ?Sized,
    {
        let table = controller.routes()?;
        let bindings = plan(controller.base_path(), table)?;

        let mut registrations = Vec::with_capacity(bindings.len());
        for (registration, entry) in bindings {
            let handler = self.handler(Arc::clone(&controller), &registration.method, entry);
            let path = registration.path.as_str();
            match registration.verb {
                Verb::Get => engine.get(path, handler)?,
                Verb::Post => engine.post(path, handler)?,
                Verb::Put => engine.put(path, handler)?,
                Verb::Delete => engine.delete(path, handler)?,
            }
            info!("Registered {} {}", registration.verb, registration.path);
            registrations.push(registration);
        }

        Ok(registrations)
    }

    fn handler<C: Controller>(
        &self,
        controller: Arc<C>,
        method: &str,
        entry: Arc<RouteEntry>,
    ) -> Handler {
        let sessions = Arc::clone(&self.sessions);
        let method: Arc<str> = Arc::from(method);
        Box::new(move |request| {
            let controller = Arc::clone(&controller);
            let sessions = Arc::clone(&sessions);
            let method = Arc::clone(&method);
            let entry = Arc::clone(&entry);
            Box::pin(async move {
                handle(controller.as_ref(), &method, &entry, sessions.as_ref(), request).await
            })
        })
    }
}

/// Compute full paths and freeze entries; fails on the first route without
/// a verb/path mapping.
fn plan(base_path: &str, table: RouteTable) -> Result<Vec<(Registration, Arc<RouteEntry>)>> {
    table
        .into_iter()
        .map(|(method, entry)| {
            let (Some(verb), Some(path)) = (entry.verb, entry.path.as_deref()) else {
                return Err(Error::MissingRoute { method });
            };
            let registration = Registration {
                verb,
                path: format!("{base_path}{path}"),
                method,
            };
            Ok((registration, Arc::new(entry)))
        })
        .collect()
}

/// Run one request through `method` and render the response.
pub async fn handle<C>(
    controller: &C,
    method: &str,
    entry: &RouteEntry,
    sessions: &dyn SessionResolver,
    request: Request,
) -> HttpResponse
where
    C: Controller + ?Sized,
{
    let request_id = request.request_id.clone();
    match call(controller, method, entry, sessions, &request).await {
        Ok(data) => response::success(data, request_id).unwrap_or_else(Error::into_response),
        Err(e) => {
            debug!(method, error = %e, "Handler pipeline failed");
            e.into_response()
        }
    }
}

async fn call<C>(
    controller: &C,
    method: &str,
    entry: &RouteEntry,
    sessions: &dyn SessionResolver,
    request: &Request,
) -> Result<Value>
where
    C: Controller + ?Sized,
{
    let args = resolver::resolve(request, &entry.parameters, sessions).await?;

    if entry.needs_session() {
        let level = match args.find_session() {
            Some(session) => session.role_level,
            None => {
                let session = sessions.resolve(request).await.inspect_err(|e| {
                    warn!(method, path = %request.uri.path(), "Authorization rejected: {e}");
                })?;
                session.role_level
            }
        };
        if let Some(required) = entry.role_level
            && level < required
        {
            warn!(method, level, required, "Role level too low");
            return Err(Error::Forbidden(format!(
                "Role level {required} required for {method}"
            )));
        }
    }

    controller.invoke(method, args).await
}
