use std::{collections::VecDeque, mem};

use log::{info, warn};

use crate::{
    types::{HostType, SubObjectIndex},
    world::{
        entity::error::EntityError,
        entity_world::World,
        event::{
            entity_event::{EventPayload, SpawnRecord},
            event_channel::EntityEventChannel,
        },
        inventory::{ContainerSlot, InventoryAddress},
        placement::Placement,
        prefab::PrefabSource,
        registry::EntityRegistry,
        spawn::{error::SpawnError, spawn_request::SpawnRequest},
        world_events::WorldEvents,
    },
    EntityId,
};

/// What a flush did.
#[derive(Debug, Default, PartialEq)]
pub struct FlushReport {
    /// Entities created, oldest request first
    pub spawned: Vec<EntityId>,
    /// Entities removed, contents before their container
    pub removed: Vec<EntityId>,
    /// Contained spawns that were placed in the world instead
    pub redirected: usize,
    /// Requests that could not be materialized
    pub failed: Vec<SpawnError>,
}

/// Everything a flush touches.
pub struct FlushContext<'a> {
    pub world: &'a mut World,
    pub channel: &'a mut EntityEventChannel,
    pub events: &'a mut WorldEvents,
}

/// Defers entity creation and removal to a single point in the tick, so no
/// structural change happens while the world is being iterated.
pub struct EntitySpawnQueue {
    host_type: HostType,
    spawns: VecDeque<SpawnRequest>,
    removals: Vec<EntityId>,
}

impl EntitySpawnQueue {
    pub fn new(host_type: HostType) -> Self {
        Self {
            host_type,
            spawns: VecDeque::new(),
            removals: Vec::new(),
        }
    }

    pub fn pending_spawns(&self) -> usize {
        self.spawns.len()
    }

    pub fn pending_removals(&self) -> &[EntityId] {
        &self.removals
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.removals.is_empty()
    }

    /// Queues `request` for the next flush.
    pub fn enqueue_spawn(
        &mut self,
        prefabs: &dyn PrefabSource,
        request: SpawnRequest,
    ) -> Result<(), SpawnError> {
        if !self.host_type.is_authoritative() {
            warn!(
                "Ignoring spawn of {}: only the authoritative host spawns entities",
                request.prefab()
            );
            return Err(SpawnError::NotAuthoritative);
        }
        if prefabs.prefab(request.prefab()).is_none() {
            warn!("Ignoring spawn of unknown prefab {}", request.prefab());
            return Err(SpawnError::PrefabNotFound {
                prefab: request.prefab().clone(),
            });
        }
        if !request.is_finite() {
            warn!("Ignoring spawn of {} with a non-finite value", request.prefab());
            return Err(SpawnError::NonFinite {
                prefab: request.prefab().clone(),
            });
        }

        self.spawns.push_back(request);
        Ok(())
    }

    /// Queues `entity` and everything currently inside it for removal,
    /// contents first. Queueing an entity twice has no further effect.
    pub fn enqueue_remove(
        &mut self,
        registry: &EntityRegistry,
        entity: EntityId,
    ) -> Result<(), SpawnError> {
        if !self.host_type.is_authoritative() {
            warn!("Ignoring removal of {}: only the authoritative host removes entities", entity);
            return Err(SpawnError::NotAuthoritative);
        }
        if self.removals.contains(&entity) {
            return Ok(());
        }
        if !registry.contains(&entity) {
            warn!("Ignoring removal of unknown entity {}", entity);
            return Err(SpawnError::EntityNotFound { entity });
        }

        for id in registry.removal_order(&entity) {
            if !self.removals.contains(&id) {
                self.removals.push(id);
            }
        }
        Ok(())
    }

    /// Performs every queued spawn, oldest first, then every queued removal.
    /// The authoritative host writes an event for each change to `ctx.channel`;
    /// removal events are written before the entity is taken out.
    pub fn flush(&mut self, ctx: FlushContext) -> FlushReport {
        let FlushContext {
            world,
            channel,
            events,
        } = ctx;
        let mut report = FlushReport::default();

        while let Some(request) = self.spawns.pop_front() {
            match self.materialize(world, channel, request, &mut report) {
                Ok(entity) => {
                    events.push_spawn(entity);
                    report.spawned.push(entity);
                }
                Err(error) => {
                    warn!("Spawn failed: {}", error);
                    report.failed.push(error);
                }
            }
        }

        for entity in mem::take(&mut self.removals) {
            // picks up anything that entered the container after it was queued
            let order = world.registry().removal_order(&entity);
            if order.is_empty() {
                continue;
            }
            if self.host_type.is_authoritative() {
                for id in &order {
                    channel.write(*id, SubObjectIndex::Whole, EventPayload::EntityRemoved);
                }
            }
            for id in world.registry_mut().despawn(&entity) {
                events.push_remove(id);
                report.removed.push(id);
            }
        }

        report
    }

    /// Drops every pending request without performing it.
    pub fn reset(&mut self) {
        self.spawns.clear();
        self.removals.clear();
    }

    fn materialize(
        &self,
        world: &mut World,
        channel: &mut EntityEventChannel,
        request: SpawnRequest,
        report: &mut FlushReport,
    ) -> Result<EntityId, SpawnError> {
        let prefab_id = request.prefab().clone();
        let max_condition = world
            .prefab(&prefab_id)
            .map(|prefab| prefab.max_condition())
            .ok_or_else(|| SpawnError::PrefabNotFound {
                prefab: prefab_id.clone(),
            })?;
        let condition = request
            .condition()
            .unwrap_or(max_condition)
            .clamp(0.0, max_condition);

        let placement = match request {
            SpawnRequest::Positioned {
                position,
                parent_space,
                ..
            } => Placement::World {
                position,
                parent_space,
            },
            SpawnRequest::Contained { inventory, .. } => {
                let placement = resolve_contained(world.registry(), &inventory)?;
                if !placement.is_contained() {
                    report.redirected += 1;
                }
                placement
            }
        };

        let entity = world.generate_id();
        world.create(entity, &prefab_id, placement, condition)?;

        if self.host_type.is_authoritative() {
            channel.write(
                entity,
                SubObjectIndex::Whole,
                EventPayload::EntityCreated(SpawnRecord {
                    prefab: prefab_id,
                    placement,
                    condition,
                }),
            );
        }

        Ok(entity)
    }
}

/// Picks the first free slot of `inventory`. A full inventory, or an address
/// that names no inventory, places the entity at the owner's location instead.
fn resolve_contained(
    registry: &EntityRegistry,
    inventory: &InventoryAddress,
) -> Result<Placement, SpawnError> {
    let slot = match registry.free_slot(inventory) {
        Ok(slot) => slot,
        Err(EntityError::NotFound { entity }) => {
            warn!("Dropping spawn into inventory of missing entity {}", entity);
            return Err(SpawnError::EntityNotFound { entity });
        }
        Err(error) => {
            info!("{}, spawning next to it instead", error);
            None
        }
    };

    if let Some(slot) = slot {
        return Ok(Placement::Contained(ContainerSlot {
            inventory: *inventory,
            slot,
        }));
    }

    let (position, parent_space) =
        registry
            .world_location(&inventory.owner)
            .ok_or(SpawnError::EntityNotFound {
                entity: inventory.owner,
            })?;
    info!(
        "Inventory {} of {} has no free slot, spawning next to it instead",
        inventory.sub_object, inventory.owner
    );
    Ok(Placement::World {
        position,
        parent_space,
    })
}
