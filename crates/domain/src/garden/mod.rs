//! Garden: the aggregate root owning a set of plants.
//!
//! Every mutation goes through a method on [`Garden`]. A method either
//! rejects its input with a [`ValidationFailure`] and leaves the garden
//! untouched, or applies the change, bumps `updated_at` and appends exactly
//! one [`DomainEvent`] to the pending buffer. Re-applying a value already in
//! effect is a successful no-op that raises nothing.
//!
//! The capacity invariant holds after every successful call: the plants'
//! combined `surface_area_required` never exceeds `total_surface_area`.

mod plant;

pub use plant::{NewPlant, Plant};

use rust_decimal::Decimal;

use crate::error::{ErrorCode, ValidationFailure, Violations};
use crate::event::{DomainEvent, GardenEventKind};
use crate::id::{GardenId, PlantId, UserId};
use crate::time::Timestamp;
use crate::value::{HumidityLevel, SurfaceArea};

/// Field keys used in [`ValidationFailure::errors`].
pub mod fields {
    pub const NAME: &str = "name";
    pub const TOTAL_SURFACE_AREA: &str = "totalSurfaceArea";
    pub const TARGET_HUMIDITY_LEVEL: &str = "targetHumidityLevel";
    pub const SPECIES: &str = "species";
    pub const TYPE: &str = "type";
    pub const PLANTATION_DATE: &str = "plantationDate";
    pub const SURFACE_AREA_REQUIRED: &str = "surfaceAreaRequired";
    pub const IDEAL_HUMIDITY_LEVEL: &str = "idealHumidityLevel";
}

const NAME_REQUIRED: &str = "Name is required.";
const TOTAL_AREA_POSITIVE: &str = "Total surface area must be greater than zero.";
const TARGET_HUMIDITY_RANGE: &str = "Target humidity level must be between 0 and 100.";

/// Persisted state of a garden, used to rebuild an aggregate without
/// replaying its history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GardenParts {
    pub id: GardenId,
    pub owner_id: UserId,
    pub name: String,
    pub total_surface_area: SurfaceArea,
    pub target_humidity_level: HumidityLevel,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
    pub plants: Vec<Plant>,
}

/// A garden and the plants it exclusively owns.
#[derive(Debug)]
pub struct Garden {
    id: GardenId,
    owner_id: UserId,
    name: String,
    total_surface_area: SurfaceArea,
    target_humidity_level: HumidityLevel,
    created_at: Timestamp,
    updated_at: Timestamp,
    deleted_at: Option<Timestamp>,
    plants: Vec<Plant>,
    pending_events: Vec<DomainEvent>,
}

impl Garden {
    /// Create a new garden and raise `GardenCreated`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] listing every invalid field among
    /// `name`, `totalSurfaceArea` and `targetHumidityLevel`.
    pub fn create(
        owner_id: UserId,
        name: &str,
        total_surface_area: Decimal,
        target_humidity_level: i32,
        now: Timestamp,
    ) -> Result<Self, ValidationFailure> {
        let mut violations = Violations::new();
        let name = violations.require(non_blank(name), fields::NAME, NAME_REQUIRED);
        let area = violations.require(
            SurfaceArea::new(total_surface_area).ok(),
            fields::TOTAL_SURFACE_AREA,
            TOTAL_AREA_POSITIVE,
        );
        let humidity = violations.require(
            HumidityLevel::new(target_humidity_level).ok(),
            fields::TARGET_HUMIDITY_LEVEL,
            TARGET_HUMIDITY_RANGE,
        );
        let (name, (area, humidity)) = violations.conclude(
            ErrorCode::GardenValidationFailed,
            "One or more validation errors occurred while creating a garden.",
            name.zip(area.zip(humidity)),
        )?;

        let mut garden = Self {
            id: GardenId::new(),
            owner_id,
            name: name.clone(),
            total_surface_area: area,
            target_humidity_level: humidity,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            plants: Vec::new(),
            pending_events: Vec::new(),
        };
        garden.raise(
            now,
            GardenEventKind::GardenCreated {
                owner_id,
                name,
                total_surface_area: area,
                target_humidity_level: humidity,
            },
        );
        Ok(garden)
    }

    /// Rebuild a garden from persisted state. No event is raised.
    #[must_use]
    pub fn restore(parts: GardenParts) -> Self {
        Self {
            id: parts.id,
            owner_id: parts.owner_id,
            name: parts.name,
            total_surface_area: parts.total_surface_area,
            target_humidity_level: parts.target_humidity_level,
            created_at: parts.created_at,
            updated_at: parts.updated_at,
            deleted_at: parts.deleted_at,
            plants: parts.plants,
            pending_events: Vec::new(),
        }
    }

    /// Copy out the persistable state (pending events excluded).
    #[must_use]
    pub fn snapshot(&self) -> GardenParts {
        GardenParts {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name.clone(),
            total_surface_area: self.total_surface_area,
            target_humidity_level: self.target_humidity_level,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
            plants: self.plants.clone(),
        }
    }

    #[must_use]
    pub fn id(&self) -> GardenId {
        self.id
    }

    #[must_use]
    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn total_surface_area(&self) -> SurfaceArea {
        self.total_surface_area
    }

    #[must_use]
    pub fn target_humidity_level(&self) -> HumidityLevel {
        self.target_humidity_level
    }

    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    #[must_use]
    pub fn deleted_at(&self) -> Option<Timestamp> {
        self.deleted_at
    }

    /// Plants in insertion order.
    #[must_use]
    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    #[must_use]
    pub fn plant(&self, plant_id: PlantId) -> Option<&Plant> {
        self.plants.iter().find(|plant| plant.id == plant_id)
    }

    /// Sum of every plant's required surface area.
    #[must_use]
    pub fn allocated_surface_area(&self) -> Decimal {
        self.plants
            .iter()
            .map(|plant| plant.surface_area_required.value())
            .sum()
    }

    /// Events raised since the buffer was last cleared, oldest first.
    #[must_use]
    pub fn pending_events(&self) -> &[DomainEvent] {
        &self.pending_events
    }

    pub fn clear_pending_events(&mut self) {
        self.pending_events.clear();
    }

    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `name` when it is blank.
    pub fn rename(&mut self, name: &str, now: Timestamp) -> Result<(), ValidationFailure> {
        let name = non_blank(name).ok_or_else(|| {
            ValidationFailure::single(
                ErrorCode::GardenValidationFailed,
                "One or more validation errors occurred while renaming a garden.",
                fields::NAME,
                NAME_REQUIRED,
            )
        })?;
        if name == self.name {
            return Ok(());
        }

        self.name.clone_from(&name);
        self.raise(now, GardenEventKind::GardenRenamed { name });
        Ok(())
    }

    /// Change the garden's total surface area.
    ///
    /// Shrinking below the area already allocated to plants is refused so
    /// the capacity invariant keeps holding. The plants must be loaded for
    /// that check to be meaningful.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `totalSurfaceArea` when the value
    /// is not positive, or a capacity violation on the same field when it
    /// is smaller than the current allocation.
    pub fn change_surface_area(
        &mut self,
        total_surface_area: Decimal,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let area = SurfaceArea::new(total_surface_area).map_err(|_| {
            ValidationFailure::single(
                ErrorCode::GardenValidationFailed,
                "One or more validation errors occurred while changing a garden's surface area.",
                fields::TOTAL_SURFACE_AREA,
                TOTAL_AREA_POSITIVE,
            )
        })?;
        if area == self.total_surface_area {
            return Ok(());
        }
        let allocated = self.allocated_surface_area();
        if allocated > area.value() {
            return Err(ValidationFailure::capacity(
                fields::TOTAL_SURFACE_AREA,
                format!(
                    "Total surface area cannot be smaller than the {allocated} already allocated to plants."
                ),
            ));
        }

        self.total_surface_area = area;
        self.raise(
            now,
            GardenEventKind::GardenSurfaceAreaChanged {
                total_surface_area: area,
            },
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `targetHumidityLevel` outside `[0, 100]`.
    pub fn change_target_humidity(
        &mut self,
        target_humidity_level: i32,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let humidity = HumidityLevel::new(target_humidity_level).map_err(|_| {
            ValidationFailure::single(
                ErrorCode::GardenValidationFailed,
                "One or more validation errors occurred while changing a garden's target humidity.",
                fields::TARGET_HUMIDITY_LEVEL,
                TARGET_HUMIDITY_RANGE,
            )
        })?;
        if humidity == self.target_humidity_level {
            return Ok(());
        }

        self.target_humidity_level = humidity;
        self.raise(
            now,
            GardenEventKind::GardenTargetHumidityChanged {
                target_humidity_level: humidity,
            },
        );
        Ok(())
    }

    /// Soft-delete the garden. Only the first call raises `GardenDeleted`.
    pub fn mark_deleted(&mut self, now: Timestamp) {
        if self.is_deleted() {
            return;
        }

        self.deleted_at = Some(now);
        self.raise(now, GardenEventKind::GardenDeleted);
    }

    /// Record an accepted transition.
    fn raise(&mut self, now: Timestamp, kind: GardenEventKind) {
        self.updated_at = now;
        self.pending_events.push(DomainEvent::new(self.id, now, kind));
    }

    fn plant_index(&self, plant_id: PlantId) -> Option<usize> {
        self.plants.iter().position(|plant| plant.id == plant_id)
    }

    /// Check that `required` fits next to every plant except `replacing`.
    fn ensure_capacity(
        &self,
        replacing: Option<PlantId>,
        required: SurfaceArea,
    ) -> Result<(), ValidationFailure> {
        let others: Decimal = self
            .plants
            .iter()
            .filter(|plant| Some(plant.id) != replacing)
            .map(|plant| plant.surface_area_required.value())
            .sum();
        let fits = others
            .checked_add(required.value())
            .is_some_and(|total| total <= self.total_surface_area.value());
        if fits {
            return Ok(());
        }
        Err(ValidationFailure::capacity(
            fields::SURFACE_AREA_REQUIRED,
            format!(
                "The plants' combined surface area would exceed the garden's total surface area of {}.",
                self.total_surface_area
            ),
        ))
    }
}

/// Trimmed copy of `value`, or `None` when it is blank.
fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
