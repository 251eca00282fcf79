//! Event publisher: turns pending domain events into integration messages.
//!
//! Translation reads the garden as it stands when publishing, so a message
//! reflects every mutation made in the request rather than the value in
//! effect when its event was raised. A plant event whose plant has since
//! been removed falls back to the values carried by the event itself.
//!
//! Dispatch is sequential. Buffers are cleared only once every message of
//! the call has been handed to the transport, and only for gardens that
//! produced a message; on failure or cancellation they are left intact so
//! the whole step can be retried.

use gardenhub_domain::error::GardenError;
use gardenhub_domain::event::{DomainEvent, GardenEventKind};
use gardenhub_domain::garden::{Garden, Plant};
use gardenhub_domain::id::PlantId;

use crate::context::RequestContext;
use crate::messages::{IntegrationMessage, MessagePayload};
use crate::ports::MessageTransport;

/// Translates and dispatches pending events over a [`MessageTransport`].
pub struct EventPublisher<T> {
    transport: T,
}

impl<T> EventPublisher<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: MessageTransport> EventPublisher<T> {
    /// Dispatch every pending event of `gardens`, garden by garden in slice
    /// order and oldest event first, then clear the buffer of each garden
    /// that dispatched at least one message.
    ///
    /// Returns the number of messages dispatched. Events of unknown kind are
    /// skipped; a garden holding only such events keeps them.
    ///
    /// # Errors
    ///
    /// Returns [`GardenError::Cancelled`] when `ctx` is cancelled before a
    /// dispatch, or the transport's error. Buffers are untouched in both
    /// cases; messages already dispatched are not recalled.
    pub async fn publish(
        &self,
        gardens: &mut [&mut Garden],
        ctx: &RequestContext,
    ) -> Result<usize, GardenError> {
        let mut dispatched = 0;
        let mut published = Vec::with_capacity(gardens.len());
        for (index, garden) in gardens.iter().enumerate() {
            let count = self.dispatch_pending(garden, ctx, dispatched).await?;
            if count > 0 {
                published.push(index);
            }
            dispatched += count;
        }

        for index in published {
            gardens[index].clear_pending_events();
        }
        Ok(dispatched)
    }

    /// Dispatch the pending events of one garden without touching its
    /// buffer. `before` only feeds the cancellation log.
    async fn dispatch_pending(
        &self,
        garden: &Garden,
        ctx: &RequestContext,
        before: usize,
    ) -> Result<usize, GardenError> {
        let mut count = 0;
        for event in garden.pending_events() {
            let Some(payload) = translate(event, garden) else {
                tracing::debug!(
                    event_id = %event.id,
                    kind = event.name(),
                    "no integration message for event, skipping"
                );
                continue;
            };
            if ctx.is_cancelled() {
                tracing::warn!(
                    garden_id = %garden.id(),
                    dispatched = before + count,
                    "publish cancelled, keeping pending events"
                );
                return Err(GardenError::Cancelled);
            }

            let message = IntegrationMessage::new(event.occurred_at, ctx, payload);
            tracing::debug!(
                garden_id = %event.garden_id,
                kind = message.payload.name(),
                correlation_id = ?message.correlation_id,
                "dispatching integration message"
            );
            self.transport.publish(message).await?;
            count += 1;
        }
        Ok(count)
    }
}

/// Build the message for `event` from the current state of `garden`.
///
/// Returns `None` for event kinds without a message.
#[must_use]
pub fn translate(event: &DomainEvent, garden: &Garden) -> Option<MessagePayload> {
    let garden_id = event.garden_id;
    let owner_id = garden.owner_id();
    let current = |plant_id: PlantId| garden.plant(plant_id);

    let payload = match &event.kind {
        GardenEventKind::GardenCreated { .. } => MessagePayload::GardenCreated {
            garden_id,
            owner_id,
            name: garden.name().to_string(),
            total_surface_area: garden.total_surface_area(),
            target_humidity_level: garden.target_humidity_level(),
        },
        GardenEventKind::GardenRenamed { .. } => MessagePayload::GardenRenamed {
            garden_id,
            owner_id,
            name: garden.name().to_string(),
        },
        GardenEventKind::GardenSurfaceAreaChanged { .. } => {
            MessagePayload::GardenSurfaceAreaChanged {
                garden_id,
                owner_id,
                total_surface_area: garden.total_surface_area(),
            }
        }
        GardenEventKind::GardenTargetHumidityChanged { .. } => {
            MessagePayload::GardenTargetHumidityChanged {
                garden_id,
                owner_id,
                target_humidity_level: garden.target_humidity_level(),
            }
        }
        GardenEventKind::GardenDeleted => MessagePayload::GardenDeleted {
            garden_id,
            owner_id,
        },
        GardenEventKind::PlantAddedToGarden { plant } => {
            let plant: &Plant = current(plant.id).unwrap_or(plant);
            MessagePayload::PlantAddedToGarden {
                garden_id,
                plant_id: plant.id,
                name: plant.name.clone(),
                species: plant.species.clone(),
                plant_type: plant.plant_type,
                surface_area_required: plant.surface_area_required,
                ideal_humidity_level: plant.ideal_humidity_level,
                plantation_date: plant.plantation_date,
            }
        }
        GardenEventKind::PlantRemovedFromGarden { plant_id } => {
            MessagePayload::PlantRemovedFromGarden {
                garden_id,
                plant_id: *plant_id,
            }
        }
        GardenEventKind::PlantRenamed { plant_id, name } => MessagePayload::PlantRenamed {
            garden_id,
            plant_id: *plant_id,
            name: current(*plant_id).map_or_else(|| name.clone(), |p| p.name.clone()),
        },
        GardenEventKind::PlantReclassified {
            plant_id,
            species,
            plant_type,
        } => {
            let (species, plant_type) = current(*plant_id).map_or_else(
                || (species.clone(), *plant_type),
                |p| (p.species.clone(), p.plant_type),
            );
            MessagePayload::PlantReclassified {
                garden_id,
                plant_id: *plant_id,
                species,
                plant_type,
            }
        }
        GardenEventKind::PlantSurfaceAreaRequirementChanged {
            plant_id,
            surface_area_required,
        } => MessagePayload::PlantSurfaceAreaRequirementChanged {
            garden_id,
            plant_id: *plant_id,
            surface_area_required: current(*plant_id)
                .map_or(*surface_area_required, |p| p.surface_area_required),
        },
        GardenEventKind::PlantIdealHumidityLevelChanged {
            plant_id,
            ideal_humidity_level,
        } => MessagePayload::PlantIdealHumidityLevelChanged {
            garden_id,
            plant_id: *plant_id,
            ideal_humidity_level: current(*plant_id)
                .map_or(*ideal_humidity_level, |p| p.ideal_humidity_level),
        },
        GardenEventKind::PlantPlantationDateChanged {
            plant_id,
            plantation_date,
        } => MessagePayload::PlantPlantationDateChanged {
            garden_id,
            plant_id: *plant_id,
            plantation_date: current(*plant_id).map_or(*plantation_date, |p| p.plantation_date),
        },
        _ => return None,
    };
    Some(payload)
}
