//! Integration messages: the external, transport-carried representation
//! of garden and plant domain events.
//!
//! Messages are serialized as camelCase JSON. The payload is internally
//! tagged with its kind under `"type"`, so the plant classification travels
//! as `plantType`.

use serde::{Deserialize, Serialize};

use gardenhub_domain::id::{GardenId, PlantId, UserId};
use gardenhub_domain::time::Timestamp;
use gardenhub_domain::value::{HumidityLevel, PlantType, SurfaceArea};

use crate::context::RequestContext;

/// Envelope handed to a [`MessageTransport`](crate::ports::MessageTransport).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationMessage {
    pub occurred_at: Timestamp,
    pub correlation_id: Option<String>,
    pub causation_id: Option<String>,
    pub payload: MessagePayload,
}

impl IntegrationMessage {
    /// Wrap `payload`, copying correlation and causation from `ctx`.
    #[must_use]
    pub fn new(occurred_at: Timestamp, ctx: &RequestContext, payload: MessagePayload) -> Self {
        Self {
            occurred_at,
            correlation_id: ctx.correlation_id.clone(),
            causation_id: ctx.causation_id.clone(),
            payload,
        }
    }
}

/// One variant per published event kind, carrying exactly the fields a
/// consumer needs to follow the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum MessagePayload {
    GardenCreated {
        garden_id: GardenId,
        owner_id: UserId,
        name: String,
        total_surface_area: SurfaceArea,
        target_humidity_level: HumidityLevel,
    },
    GardenRenamed {
        garden_id: GardenId,
        owner_id: UserId,
        name: String,
    },
    GardenSurfaceAreaChanged {
        garden_id: GardenId,
        owner_id: UserId,
        total_surface_area: SurfaceArea,
    },
    GardenTargetHumidityChanged {
        garden_id: GardenId,
        owner_id: UserId,
        target_humidity_level: HumidityLevel,
    },
    GardenDeleted {
        garden_id: GardenId,
        owner_id: UserId,
    },
    PlantAddedToGarden {
        garden_id: GardenId,
        plant_id: PlantId,
        name: String,
        species: String,
        plant_type: PlantType,
        surface_area_required: SurfaceArea,
        ideal_humidity_level: HumidityLevel,
        plantation_date: Timestamp,
    },
    PlantRemovedFromGarden {
        garden_id: GardenId,
        plant_id: PlantId,
    },
    PlantRenamed {
        garden_id: GardenId,
        plant_id: PlantId,
        name: String,
    },
    PlantReclassified {
        garden_id: GardenId,
        plant_id: PlantId,
        species: String,
        plant_type: PlantType,
    },
    PlantSurfaceAreaRequirementChanged {
        garden_id: GardenId,
        plant_id: PlantId,
        surface_area_required: SurfaceArea,
    },
    PlantIdealHumidityLevelChanged {
        garden_id: GardenId,
        plant_id: PlantId,
        ideal_humidity_level: HumidityLevel,
    },
    PlantPlantationDateChanged {
        garden_id: GardenId,
        plant_id: PlantId,
        plantation_date: Timestamp,
    },
}

impl MessagePayload {
    /// The kind tag, identical to the `"type"` value on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GardenCreated { .. } => "GardenCreated",
            Self::GardenRenamed { .. } => "GardenRenamed",
            Self::GardenSurfaceAreaChanged { .. } => "GardenSurfaceAreaChanged",
            Self::GardenTargetHumidityChanged { .. } => "GardenTargetHumidityChanged",
            Self::GardenDeleted { .. } => "GardenDeleted",
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

    /// Kebab-case routing key, e.g. `garden-created`.
    #[must_use]
    pub fn topic(&self) -> String {
        let name = self.name();
        let mut topic = String::with_capacity(name.len() + 4);
        for (i, c) in name.char_indices() {
            if c.is_ascii_uppercase() {
                if i > 0 {
                    topic.push('-');
                }
                topic.push(c.to_ascii_lowercase());
            } else {
                topic.push(c);
            }
        }
        topic
    }

    #[must_use]
    pub fn garden_id(&self) -> GardenId {
        match self {
            Self::GardenCreated { garden_id, .. }
            | Self::GardenRenamed { garden_id, .. }
            | Self::GardenSurfaceAreaChanged { garden_id, .. }
            | Self::GardenTargetHumidityChanged { garden_id, .. }
            | Self::GardenDeleted { garden_id, .. }
            | Self::PlantAddedToGarden { garden_id, .. }
            | Self::PlantRemovedFromGarden { garden_id, .. }
            | Self::PlantRenamed { garden_id, .. }
            | Self::PlantReclassified { garden_id, .. }
            | Self::PlantSurfaceAreaRequirementChanged { garden_id, .. }
            | Self::PlantIdealHumidityLevelChanged { garden_id, .. }
            | Self::PlantPlantationDateChanged { garden_id, .. } => *garden_id,
        }
    }
}
