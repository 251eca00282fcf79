//! Garden service: use-cases for managing gardens.

use rust_decimal::Decimal;

use gardenhub_domain::error::GardenError;
use gardenhub_domain::garden::Garden;
use gardenhub_domain::id::{GardenId, UserId};
use gardenhub_domain::time::now;

use crate::context::RequestContext;
use crate::ports::{ChangeSet, GardenRepository, MessageTransport, UnitOfWork};
use crate::publisher::EventPublisher;

use super::require_garden;

/// Input for [`GardenService::create_garden`].
#[derive(Debug, Clone)]
pub struct CreateGarden {
    pub owner_id: UserId,
    pub name: String,
    pub total_surface_area: Decimal,
    pub target_humidity_level: i32,
}

/// Desired values for [`GardenService::update_garden`].
#[derive(Debug, Clone)]
pub struct UpdateGarden {
    pub name: String,
    pub total_surface_area: Decimal,
    pub target_humidity_level: i32,
}

/// Application service for garden lifecycle operations.
pub struct GardenService<R, U, T> {
    repo: R,
    uow: U,
    publisher: EventPublisher<T>,
}

impl<R, U, T> GardenService<R, U, T>
where
    R: GardenRepository,
    U: UnitOfWork,
    T: MessageTransport,
{
    /// Create a new service backed by the given ports.
    pub fn new(repo: R, uow: U, publisher: EventPublisher<T>) -> Self {
        Self {
            repo,
            uow,
            publisher,
        }
    }

    /// Create, persist and announce a new garden.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::Validation`] if the input is rejected, or a
    /// storage/transport error. A transport error means the garden was
    /// stored but not announced.
    pub async fn create_garden(
        &self,
        input: CreateGarden,
        ctx: &RequestContext,
    ) -> Result<Garden, GardenError> {
        let mut garden = Garden::create(
            input.owner_id,
            &input.name,
            input.total_surface_area,
            input.target_humidity_level,
            now(),
        )?;

        self.uow.commit(ChangeSet::new().insert(&garden)).await?;
        tracing::info!(garden_id = %garden.id(), owner_id = %garden.owner_id(), "garden created");

        self.publisher.publish(&mut [&mut garden], ctx).await?;
        Ok(garden)
    }

    /// Look up a garden by id, without its plants.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] when no live garden with `id`
    /// exists, or a storage error from the repository.
    pub async fn get_garden(&self, id: GardenId) -> Result<Garden, GardenError> {
        let loaded = self.repo.get_by_id(id).await?;
        require_garden(id, loaded).map(|v| v.into_inner())
    }

    /// List an owner's gardens, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_gardens(&self, owner_id: UserId) -> Result<Vec<Garden>, GardenError> {
        self.repo.list_by_owner(owner_id).await
    }

    /// Bring a garden to the desired values.
    ///
    /// Name, surface area and humidity are applied in that order; the first
    /// rejection aborts the update. Nothing is written when every value is
    /// already in effect.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`], [`GardenError::Validation`],
    /// [`GardenError::Conflict`] on a concurrent write, or a
    /// storage/transport error.
    pub async fn update_garden(
        &self,
        id: GardenId,
        input: UpdateGarden,
        ctx: &RequestContext,
    ) -> Result<Garden, GardenError> {
        // plants are needed to refuse shrinking below their allocation
        let loaded = self.repo.get_by_id_with_plants(id).await?;
        let loaded = require_garden(id, loaded)?;
        let version = loaded.version;
        let mut garden = loaded.into_inner();

        let at = now();
        garden.rename(&input.name, at)?;
        garden.change_surface_area(input.total_surface_area, at)?;
        garden.change_target_humidity(input.target_humidity_level, at)?;

        if garden.pending_events().is_empty() {
            tracing::debug!(garden_id = %id, "garden unchanged, nothing to commit");
            return Ok(garden);
        }

        self.uow
            .commit(ChangeSet::new().update(&garden, version))
            .await?;
        tracing::info!(
            garden_id = %id,
            changes = garden.pending_events().len(),
            "garden updated"
        );

        self.publisher.publish(&mut [&mut garden], ctx).await?;
        Ok(garden)
    }

    /// Soft-delete a garden and announce it.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] when the garden does not exist or
    /// was already deleted, [`GardenError::Conflict`] on a concurrent write,
    /// or a storage/transport error.
    pub async fn delete_garden(
        &self,
        id: GardenId,
        ctx: &RequestContext,
    ) -> Result<(), GardenError> {
        let loaded = self.repo.get_by_id(id).await?;
        let loaded = require_garden(id, loaded)?;
        let version = loaded.version;
        let mut garden = loaded.into_inner();

        garden.mark_deleted(now());
        self.uow
            .commit(ChangeSet::new().remove(&garden, version))
            .await?;
        tracing::info!(garden_id = %id, "garden deleted");

        self.publisher.publish(&mut [&mut garden], ctx).await?;
        Ok(())
    }
}
