//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.
//! Every mutating use-case follows the same path: load, mutate the aggregate,
//! commit, then publish the raised events.

pub mod garden_service;
pub mod plant_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use garden_service::{CreateGarden, GardenService, UpdateGarden};
pub use plant_service::PlantService;

use gardenhub_domain::error::{GardenError, NotFoundError};
use gardenhub_domain::garden::Garden;
use gardenhub_domain::id::GardenId;

use crate::ports::Versioned;

fn garden_not_found(id: GardenId) -> GardenError {
    NotFoundError {
        entity: "Garden",
        id: id.to_string(),
    }
    .into()
}

fn require_garden(
    id: GardenId,
    loaded: Option<Versioned<Garden>>,
) -> Result<Versioned<Garden>, GardenError> {
    loaded.ok_or_else(|| garden_not_found(id))
}
