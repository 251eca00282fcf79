//! Plants and the garden operations that target them.
//!
//! A plant only exists inside its garden. Operations addressing a plant id
//! the garden does not hold succeed without raising anything.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Garden, fields, non_blank};
use crate::error::{ErrorCode, ValidationFailure, Violations};
use crate::event::GardenEventKind;
use crate::id::PlantId;
use crate::time::Timestamp;
use crate::value::{HumidityLevel, PlantType, SurfaceArea};

const NAME_REQUIRED: &str = "Name is required.";
const SPECIES_REQUIRED: &str = "Species is required.";
const AREA_POSITIVE: &str = "Surface area required must be greater than zero.";
const HUMIDITY_RANGE: &str = "Ideal humidity level must be between 0 and 100.";
const DATE_IN_PAST: &str = "Plantation date must be in the past.";

/// A plant owned by a [`Garden`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub id: PlantId,
    pub name: String,
    pub species: String,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub plantation_date: Timestamp,
    pub surface_area_required: SurfaceArea,
    pub ideal_humidity_level: HumidityLevel,
}

/// Unvalidated input for [`Garden::add_plant`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlant {
    pub name: String,
    pub species: String,
    pub plant_type: PlantType,
    pub plantation_date: Timestamp,
    pub surface_area_required: Decimal,
    pub ideal_humidity_level: i32,
}

impl Garden {
    /// Add a plant, provided its footprint fits in the remaining area.
    ///
    /// Field rules are checked first and reported together. Only when they
    /// all pass is capacity checked, which fails with a single
    /// `surfaceAreaRequired` error.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] with the garden code in both cases.
    pub fn add_plant(
        &mut self,
        input: NewPlant,
        now: Timestamp,
    ) -> Result<PlantId, ValidationFailure> {
        let mut violations = Violations::new();
        let name = violations.require(non_blank(&input.name), fields::NAME, NAME_REQUIRED);
        let species =
            violations.require(non_blank(&input.species), fields::SPECIES, SPECIES_REQUIRED);
        violations.check(
            input.plantation_date < now,
            fields::PLANTATION_DATE,
            DATE_IN_PAST,
        );
        let area = violations.require(
            SurfaceArea::new(input.surface_area_required).ok(),
            fields::SURFACE_AREA_REQUIRED,
            AREA_POSITIVE,
        );
        let humidity = violations.require(
            HumidityLevel::new(input.ideal_humidity_level).ok(),
            fields::IDEAL_HUMIDITY_LEVEL,
            HUMIDITY_RANGE,
        );
        let ((name, species), (area, humidity)) = violations.conclude(
            ErrorCode::GardenValidationFailed,
            "One or more validation errors occurred while adding a plant.",
            name.zip(species).zip(area.zip(humidity)),
        )?;

        self.ensure_capacity(None, area)?;

        let plant = Plant {
            id: PlantId::new(),
            name,
            species,
            plant_type: input.plant_type,
            plantation_date: input.plantation_date,
            surface_area_required: area,
            ideal_humidity_level: humidity,
        };
        let id = plant.id;
        self.plants.push(plant.clone());
        self.raise(now, GardenEventKind::PlantAddedToGarden { plant });
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `name` when it is blank.
    pub fn rename_plant(
        &mut self,
        plant_id: PlantId,
        name: &str,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let Some(index) = self.plant_index(plant_id) else {
            return Ok(());
        };
        let name = non_blank(name)
            .ok_or_else(|| plant_failure("renaming a plant", fields::NAME, NAME_REQUIRED))?;
        if self.plants[index].name == name {
            return Ok(());
        }

        self.plants[index].name.clone_from(&name);
        self.raise(now, GardenEventKind::PlantRenamed { plant_id, name });
        Ok(())
    }

    /// Change species and type together.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `species` when it is blank.
    pub fn reclassify_plant(
        &mut self,
        plant_id: PlantId,
        species: &str,
        plant_type: PlantType,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let Some(index) = self.plant_index(plant_id) else {
            return Ok(());
        };
        let species = non_blank(species).ok_or_else(|| {
            plant_failure("reclassifying a plant", fields::SPECIES, SPECIES_REQUIRED)
        })?;
        let plant = &mut self.plants[index];
        if plant.species == species && plant.plant_type == plant_type {
            return Ok(());
        }

        plant.species.clone_from(&species);
        plant.plant_type = plant_type;
        self.raise(
            now,
            GardenEventKind::PlantReclassified {
                plant_id,
                species,
                plant_type,
            },
        );
        Ok(())
    }

    /// Change how much area a plant needs, re-checking capacity against the
    /// other plants.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] when the value is not positive, or a
    /// capacity violation on `surfaceAreaRequired` when it no longer fits.
    pub fn define_surface_area_requirement(
        &mut self,
        plant_id: PlantId,
        surface_area_required: Decimal,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let Some(index) = self.plant_index(plant_id) else {
            return Ok(());
        };
        let area = SurfaceArea::new(surface_area_required).map_err(|_| {
            plant_failure(
                "changing a plant's surface area requirement",
                fields::SURFACE_AREA_REQUIRED,
                AREA_POSITIVE,
            )
        })?;
        if self.plants[index].surface_area_required == area {
            return Ok(());
        }
        self.ensure_capacity(Some(plant_id), area)?;

        self.plants[index].surface_area_required = area;
        self.raise(
            now,
            GardenEventKind::PlantSurfaceAreaRequirementChanged {
                plant_id,
                surface_area_required: area,
            },
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `idealHumidityLevel` outside `[0, 100]`.
    pub fn adjust_ideal_humidity(
        &mut self,
        plant_id: PlantId,
        ideal_humidity_level: i32,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let Some(index) = self.plant_index(plant_id) else {
            return Ok(());
        };
        let humidity = HumidityLevel::new(ideal_humidity_level).map_err(|_| {
            plant_failure(
                "adjusting a plant's ideal humidity",
                fields::IDEAL_HUMIDITY_LEVEL,
                HUMIDITY_RANGE,
            )
        })?;
        if self.plants[index].ideal_humidity_level == humidity {
            return Ok(());
        }

        self.plants[index].ideal_humidity_level = humidity;
        self.raise(
            now,
            GardenEventKind::PlantIdealHumidityLevelChanged {
                plant_id,
                ideal_humidity_level: humidity,
            },
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] on `plantationDate` unless it is
    /// strictly before `now`.
    pub fn set_plantation_date(
        &mut self,
        plant_id: PlantId,
        plantation_date: Timestamp,
        now: Timestamp,
    ) -> Result<(), ValidationFailure> {
        let Some(index) = self.plant_index(plant_id) else {
            return Ok(());
        };
        if plantation_date >= now {
            return Err(plant_failure(
                "changing a plant's plantation date",
                fields::PLANTATION_DATE,
                DATE_IN_PAST,
            ));
        }
        if self.plants[index].plantation_date == plantation_date {
            return Ok(());
        }

        self.plants[index].plantation_date = plantation_date;
        self.raise(
            now,
            GardenEventKind::PlantPlantationDateChanged {
                plant_id,
                plantation_date,
            },
        );
        Ok(())
    }

    /// Remove a plant. Missing plants are ignored.
    pub fn remove_plant(&mut self, plant_id: PlantId, now: Timestamp) {
        let Some(index) = self.plant_index(plant_id) else {
            return;
        };

        self.plants.remove(index);
        self.raise(now, GardenEventKind::PlantRemovedFromGarden { plant_id });
    }
}

fn plant_failure(action: &str, field: &str, message: &str) -> ValidationFailure {
    ValidationFailure::single(
        ErrorCode::PlantValidationFailed,
        format!("One or more validation errors occurred while {action}."),
        field,
        message,
    )
}

#[cfg(test)]
impl NewPlant {
    /// A valid vegetable planted a day ago, needing `area` square units.
    pub(crate) fn sample(name: &str, area: i64) -> Self {
        Self {
            name: name.to_string(),
            species: "Solanum lycopersicum".to_string(),
            plant_type: PlantType::Vegetable,
            plantation_date: crate::time::now() - chrono::Duration::days(1),
            surface_area_required: Decimal::from(area),
            ideal_humidity_level: 60,
        }
    }
}
