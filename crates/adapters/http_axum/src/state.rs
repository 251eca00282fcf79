//! Shared application state for axum handlers.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use gardenhub_app::ports::{GardenRepository, MessageTransport, UnitOfWork};
use gardenhub_app::services::{GardenService, PlantService};

/// Application state shared across all axum handlers.
///
/// Generic over the repository, unit of work and transport to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types do not
/// need to be `Clone`, only the `Arc` wrappers are cloned.
pub struct AppState<R, U, T> {
    /// Garden lifecycle service.
    pub garden_service: Arc<GardenService<R, U, T>>,
    /// Plant service.
    pub plant_service: Arc<PlantService<R, U, T>>,
    /// Fired when the server stops accepting work; every request context
    /// carries a child of it.
    pub shutdown: CancellationToken,
}

impl<R, U, T> Clone for AppState<R, U, T> {
    fn clone(&self) -> Self {
        Self {
            garden_service: Arc::clone(&self.garden_service),
            plant_service: Arc::clone(&self.plant_service),
            shutdown: self.shutdown.clone(),
        }
    }
}

impl<R, U, T> AppState<R, U, T>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    /// Create a new application state from service instances.
    pub fn new(
        garden_service: GardenService<R, U, T>,
        plant_service: PlantService<R, U, T>,
    ) -> Self {
        Self {
            garden_service: Arc::new(garden_service),
            plant_service: Arc::new(plant_service),
            shutdown: CancellationToken::new(),
        }
    }

    /// Tie request cancellation to `shutdown`.
    #[must_use]
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }
}
