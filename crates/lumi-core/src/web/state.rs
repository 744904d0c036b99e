//! Application state shared across HTTP handlers.

use std::sync::Arc;

use crate::channel::BroadcastEndpoint;
use crate::controller::LumiController;

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    /// Bridge operations
    pub controller: Arc<LumiController>,
    /// Endpoint the controller's event channel is bound to
    pub events: Arc<BroadcastEndpoint>,
}

impl AppState {
    /// Create state around a controller and the endpoint its events go to.
    #[must_use]
    pub fn new(controller: Arc<LumiController>, events: Arc<BroadcastEndpoint>) -> Self {
        Self { controller, events }
    }
}

/// Thread-safe shared state handle.
pub type SharedState = Arc<AppState>;
