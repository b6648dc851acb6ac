//! Application wiring.
//!
//! One [`Application`] per process owns the router every controller is
//! mounted into, together with the session resolver shared by their routes.
//! Once all controllers are mounted the router is frozen and handed to the
//! server.

use std::sync::Arc;

use tracing::info;

use crate::auth::JwtSessions;
use crate::config::Config;
use crate::controller::Controller;
use crate::dispatcher::{Dispatcher, Registration};
use crate::error::Result;
use crate::router::{Router, RouterHandle};
use crate::server::{self, Server};
use crate::session::SessionResolver;

pub struct Application {
    config: Config,
    router: Router,
    dispatcher: Dispatcher,
    registrations: Vec<Registration>,
}

impl Application {
    /// Create an application that authenticates with JWT Bearer tokens.
    pub fn new(config: Config) -> Self {
        let sessions = Arc::new(JwtSessions::new(config.auth.clone()));
        Self::with_sessions(config, sessions)
    }

    /// Create an application with a custom session resolver.
    pub fn with_sessions(config: Config, sessions: Arc<dyn SessionResolver>) -> Self {
        Self {
            config,
            router: Router::new(),
            dispatcher: Dispatcher::new(sessions),
            registrations: Vec::new(),
        }
    }

    /// Mount a controller's routes.
    pub fn mount<C: Controller>(&mut self, controller: C) -> Result<&mut Self> {
        self.mount_shared(Arc::new(controller))
    }

    /// Mount a controller that is also referenced elsewhere.
    pub fn mount_shared<C: Controller>(&mut self, controller: Arc<C>) -> Result<&mut Self> {
        let name = std::any::type_name::<C>();
        let bound = self.dispatcher.mount(controller, &mut self.router)?;
        info!(controller = name, routes = bound.len(), "Controller mounted");
        self.registrations.extend(bound);
        Ok(self)
    }

    /// Every route bound so far, in registration order.
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Freeze the router.
    pub fn into_parts(self) -> (Config, Arc<RouterHandle>) {
        (self.config, self.router.into_handle())
    }

    /// Bind and start serving; returns once the listener is up.
    pub async fn start(self) -> Result<Server> {
        let (config, router) = self.into_parts();
        server::start(config, router).await
    }

    /// Serve until the accept loop ends.
    pub async fn run(self) -> Result<()> {
        let (config, router) = self.into_parts();
        server::run(config, router).await
    }
}
