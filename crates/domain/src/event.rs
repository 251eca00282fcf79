//! Domain events: immutable records of accepted garden state transitions.
//!
//! Events are appended to the owning garden's pending buffer in the order
//! the mutations were accepted and stay there until the publisher drains
//! them after a successful commit.

use serde::{Deserialize, Serialize};

use crate::garden::Plant;
use crate::id::{EventId, GardenId, PlantId, UserId};
use crate::time::Timestamp;
use crate::value::{HumidityLevel, PlantType, SurfaceArea};

/// A state transition accepted by a [`Garden`](crate::garden::Garden).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: EventId,
    pub garden_id: GardenId,
    pub occurred_at: Timestamp,
    pub kind: GardenEventKind,
}

/// What happened, with the values in effect when the event was raised.
///
/// New kinds may be added; consumers must keep a fallback arm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
#[non_exhaustive]
pub enum GardenEventKind {
    GardenCreated {
        owner_id: UserId,
        name: String,
        total_surface_area: SurfaceArea,
        target_humidity_level: HumidityLevel,
    },
    GardenRenamed {
        name: String,
    },
    GardenSurfaceAreaChanged {
        total_surface_area: SurfaceArea,
    },
    GardenTargetHumidityChanged {
        target_humidity_level: HumidityLevel,
    },
    GardenDeleted,
    PlantAddedToGarden {
        plant: Plant,
    },
    PlantRemovedFromGarden {
        plant_id: PlantId,
    },
    PlantRenamed {
        plant_id: PlantId,
        name: String,
    },
    PlantReclassified {
        plant_id: PlantId,
        species: String,
        plant_type: PlantType,
    },
    PlantSurfaceAreaRequirementChanged {
        plant_id: PlantId,
        surface_area_required: SurfaceArea,
    },
    PlantIdealHumidityLevelChanged {
        plant_id: PlantId,
        ideal_humidity_level: HumidityLevel,
    },
    PlantPlantationDateChanged {
        plant_id: PlantId,
        plantation_date: Timestamp,
    },
}

impl GardenEventKind {
    /// Stable kind tag, e.g. `"GardenCreated"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GardenCreated { .. } => "GardenCreated",
            Self::GardenRenamed { .. } => "GardenRenamed",
            Self::GardenSurfaceAreaChanged { .. } => "GardenSurfaceAreaChanged",
            Self::GardenTargetHumidityChanged { .. } => "GardenTargetHumidityChanged",
            Self::GardenDeleted => "GardenDeleted",
            Self::PlantAddedToGarden { .. } => "PlantAddedToGarden",
            Self::PlantRemovedFromGarden { .. } => "PlantRemovedFromGarden",
            Self::PlantRenamed { .. } => "PlantRenamed",
            Self::PlantReclassified { .. } => "PlantReclassified",
            Self::PlantSurfaceAreaRequirementChanged { .. } => {
                "PlantSurfaceAreaRequirementChanged"
            }
            Self::PlantIdealHumidityLevelChanged { .. } => "PlantIdealHumidityLevelChanged",
            Self::PlantPlantationDateChanged { .. } => "PlantPlantationDateChanged",
        }
    }

    /// The child plant involved, if any.
    #[must_use]
    pub fn plant_id(&self) -> Option<PlantId> {
        match self {
            Self::PlantAddedToGarden { plant } => Some(plant.id),
            Self::PlantRemovedFromGarden { plant_id }
            | Self::PlantRenamed { plant_id, .. }
            | Self::PlantReclassified { plant_id, .. }
            | Self::PlantSurfaceAreaRequirementChanged { plant_id, .. }
            | Self::PlantIdealHumidityLevelChanged { plant_id, .. }
            | Self::PlantPlantationDateChanged { plant_id, .. } => Some(*plant_id),
            Self::GardenCreated { .. }
            | Self::GardenRenamed { .. }
            | Self::GardenSurfaceAreaChanged { .. }
            | Self::GardenTargetHumidityChanged { .. }
            | Self::GardenDeleted => None,
        }
    }
}

impl DomainEvent {
    pub(crate) fn new(garden_id: GardenId, occurred_at: Timestamp, kind: GardenEventKind) -> Self {
        Self {
            id: EventId::new(),
            garden_id,
            occurred_at,
            kind,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    #[must_use]
    pub fn plant_id(&self) -> Option<PlantId> {
        self.kind.plant_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_expose_plant_reference_for_plant_events_only() {
        let plant_id = PlantId::new();
        let renamed = GardenEventKind::PlantRenamed {
            plant_id,
            name: "Basil".to_string(),
        };
        assert_eq!(renamed.plant_id(), Some(plant_id));
        assert_eq!(GardenEventKind::GardenDeleted.plant_id(), None);
    }

    #[test]
    fn should_tag_serialized_events_with_kind_name() {
        let event = DomainEvent::new(
            GardenId::new(),
            crate::time::now(),
            GardenEventKind::GardenRenamed {
                name: "Back yard".to_string(),
            },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"]["kind"], "GardenRenamed");
        assert_eq!(json["kind"]["name"], "Back yard");
        assert_eq!(event.name(), "GardenRenamed");
    }
}
