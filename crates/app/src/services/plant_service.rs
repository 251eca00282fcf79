//! Plant service: use-cases for the plants of a garden.
//!
//! Plants are always reached through their garden, which is loaded with its
//! plants, mutated, and committed as a whole.

use gardenhub_domain::error::{GardenError, NotFoundError};
use gardenhub_domain::garden::{Garden, NewPlant, Plant};
use gardenhub_domain::id::{GardenId, PlantId};
use gardenhub_domain::time::now;

use crate::context::RequestContext;
use crate::ports::{ChangeSet, GardenRepository, MessageTransport, UnitOfWork, Versioned};
use crate::publisher::EventPublisher;

use super::require_garden;

fn plant_not_found(id: PlantId) -> GardenError {
    NotFoundError {
        entity: "Plant",
        id: id.to_string(),
    }
    .into()
}

/// Application service for plant operations.
pub struct PlantService<R, U, T> {
    repo: R,
    uow: U,
    publisher: EventPublisher<T>,
}

impl<R, U, T> PlantService<R, U, T>
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

    async fn load(&self, garden_id: GardenId) -> Result<Versioned<Garden>, GardenError> {
        let loaded = self.repo.get_by_id_with_plants(garden_id).await?;
        require_garden(garden_id, loaded)
    }

    /// Commit a garden whose plants changed, then publish its events.
    async fn save(
        &self,
        mut garden: Garden,
        version: i64,
        ctx: &RequestContext,
    ) -> Result<Garden, GardenError> {
        self.uow
            .commit(ChangeSet::new().update_with_plants(&garden, version))
            .await?;
        self.publisher.publish(&mut [&mut garden], ctx).await?;
        Ok(garden)
    }

    /// Add a plant to a garden.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] for a missing garden,
    /// [`GardenError::Validation`] when the plant is invalid or does not
    /// fit, [`GardenError::Conflict`] on a concurrent write, or a
    /// storage/transport error.
    pub async fn add_plant(
        &self,
        garden_id: GardenId,
        input: NewPlant,
        ctx: &RequestContext,
    ) -> Result<Plant, GardenError> {
        let loaded = self.load(garden_id).await?;
        let version = loaded.version;
        let mut garden = loaded.into_inner();

        let plant_id = garden.add_plant(input, now())?;
        let garden = self.save(garden, version, ctx).await?;
        tracing::info!(garden_id = %garden_id, plant_id = %plant_id, "plant added");

        garden
            .plant(plant_id)
            .cloned()
            .ok_or_else(|| plant_not_found(plant_id))
    }

    /// List a garden's plants in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] for a missing garden, or a storage
    /// error.
    pub async fn list_plants(&self, garden_id: GardenId) -> Result<Vec<Plant>, GardenError> {
        let garden = self.load(garden_id).await?.into_inner();
        Ok(garden.plants().to_vec())
    }

    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] when the garden or the plant is
    /// missing, or a storage error.
    pub async fn get_plant(
        &self,
        garden_id: GardenId,
        plant_id: PlantId,
    ) -> Result<Plant, GardenError> {
        let garden = self.load(garden_id).await?.into_inner();
        garden
            .plant(plant_id)
            .cloned()
            .ok_or_else(|| plant_not_found(plant_id))
    }

    /// Bring a plant to the desired values.
    ///
    /// Name, classification, surface area, humidity and plantation date are
    /// applied in that order; the first rejection aborts the update. Nothing
    /// is written when every value is already in effect.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] when the garden or the plant is
    /// missing, [`GardenError::Validation`], [`GardenError::Conflict`], or a
    /// storage/transport error.
    pub async fn update_plant(
        &self,
        garden_id: GardenId,
        plant_id: PlantId,
        input: NewPlant,
        ctx: &RequestContext,
    ) -> Result<Plant, GardenError> {
        let loaded = self.load(garden_id).await?;
        let version = loaded.version;
        let mut garden = loaded.into_inner();
        if garden.plant(plant_id).is_none() {
            return Err(plant_not_found(plant_id));
        }

        let at = now();
        garden.rename_plant(plant_id, &input.name, at)?;
        garden.reclassify_plant(plant_id, &input.species, input.plant_type, at)?;
        garden.define_surface_area_requirement(plant_id, input.surface_area_required, at)?;
        garden.adjust_ideal_humidity(plant_id, input.ideal_humidity_level, at)?;
        garden.set_plantation_date(plant_id, input.plantation_date, at)?;

        let garden = if garden.pending_events().is_empty() {
            tracing::debug!(%garden_id, %plant_id, "plant unchanged, nothing to commit");
            garden
        } else {
            let changes = garden.pending_events().len();
            let garden = self.save(garden, version, ctx).await?;
            tracing::info!(%garden_id, %plant_id, changes, "plant updated");
            garden
        };

        garden
            .plant(plant_id)
            .cloned()
            .ok_or_else(|| plant_not_found(plant_id))
    }

    /// Remove a plant from its garden.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::NotFound`] when the garden or the plant is
    /// missing, [`GardenError::Conflict`], or a storage/transport error.
    pub async fn remove_plant(
        &self,
        garden_id: GardenId,
        plant_id: PlantId,
        ctx: &RequestContext,
    ) -> Result<(), GardenError> {
        let loaded = self.load(garden_id).await?;
        let version = loaded.version;
        let mut garden = loaded.into_inner();
        if garden.plant(plant_id).is_none() {
            return Err(plant_not_found(plant_id));
        }

        garden.remove_plant(plant_id, now());
        self.save(garden, version, ctx).await?;
        tracing::info!(%garden_id, %plant_id, "plant removed");
        Ok(())
    }
}
