use tether_serde::BitReader;

use crate::{
    types::SubObjectIndex,
    world::{
        entity::{entity::Entity, error::EntityError},
        entity_world::World,
        event::{
            entity_event::{EntityEvent, EntityEventKind, EventPayload},
            error::DispatchError,
        },
        inventory::InventoryAddress,
        sub_object::{Attribute, SubObject},
        world_events::WorldEvents,
    },
    EntityId,
};

/// Applies one decoded event to `world`, recording what changed in `events`.
pub(crate) fn apply(
    world: &mut World,
    event: EntityEvent,
    events: &mut WorldEvents,
) -> Result<(), DispatchError> {
    let kind = event.kind();
    let target = event.target;

    match event.payload {
        EventPayload::EntityCreated(record) => {
            if world.host_type().is_authoritative() {
                return Err(DispatchError::NotPermitted {
                    entity: target,
                    kind,
                });
            }
            if world.registry().contains(&target) {
                return Err(DispatchError::Duplicate { entity: target });
            }
            world.create(target, &record.prefab, record.placement, record.condition)?;
            events.push_spawn(target);
        }
        EventPayload::EntityRemoved => {
            if world.host_type().is_authoritative() {
                return Err(DispatchError::NotPermitted {
                    entity: target,
                    kind,
                });
            }
            if !world.registry().contains(&target) {
                return Err(DispatchError::EntityNotFound {
                    entity: target,
                    kind,
                });
            }
            for removed in world.registry_mut().despawn(&target) {
                events.push_remove(removed);
            }
        }
        EventPayload::AttributeChanged { attribute, value } => {
            let entity = entity_mut(world, &event.target, kind)?;
            let accepted = match event.sub_object {
                SubObjectIndex::Whole => {
                    if attribute == Attribute::Condition {
                        entity.set_condition(value);
                        true
                    } else {
                        false
                    }
                }
                SubObjectIndex::Index(index) => {
                    sub_object_mut(entity, index, kind)?.set_attribute(attribute, value)
                }
            };
            if !accepted {
                return Err(rejected(&event.target, event.sub_object, kind));
            }
            events.push_attribute_change(target, event.sub_object, attribute, value);
        }
        EventPayload::ComponentState(state) => {
            let SubObjectIndex::Index(index) = event.sub_object else {
                return Err(rejected(&target, event.sub_object, kind));
            };
            let entity = entity_mut(world, &target, kind)?;
            let sub_object = sub_object_mut(entity, index, kind)?;
            if !sub_object.has_component_state() {
                return Err(rejected(&target, event.sub_object, kind));
            }
            sub_object
                .read_state(&mut BitReader::new(state.bytes()))
                .map_err(|_| rejected(&target, event.sub_object, kind))?;
            events.push_component_state(target, index);
        }
        EventPayload::ContainerState { slots } => {
            let SubObjectIndex::Index(index) = event.sub_object else {
                return Err(rejected(&target, event.sub_object, kind));
            };
            let address = InventoryAddress::new(target, index);
            world
                .registry_mut()
                .set_inventory_slots(&address, slots)
                .map_err(|error| match error {
                    EntityError::NotFound { entity } if entity == target => {
                        DispatchError::EntityNotFound { entity, kind }
                    }
                    EntityError::SubObjectOutOfRange {
                        entity,
                        index,
                        count,
                    } => DispatchError::SubObjectOutOfRange {
                        entity,
                        index,
                        count,
                        kind,
                    },
                    EntityError::NotAnInventory { .. } => {
                        rejected(&target, SubObjectIndex::Index(index), kind)
                    }
                    other => DispatchError::Entity(other),
                })?;
            events.push_container_state(target, index);
        }
    }

    Ok(())
}

fn entity_mut<'w>(
    world: &'w mut World,
    target: &EntityId,
    kind: EntityEventKind,
) -> Result<&'w mut Entity, DispatchError> {
    world
        .registry_mut()
        .get_mut(target)
        .ok_or(DispatchError::EntityNotFound {
            entity: *target,
            kind,
        })
}

fn sub_object_mut(
    entity: &mut Entity,
    index: u8,
    kind: EntityEventKind,
) -> Result<&mut SubObject, DispatchError> {
    let id = entity.id();
    let count = entity.sub_objects().len();
    entity
        .sub_object_mut(index)
        .ok_or(DispatchError::SubObjectOutOfRange {
            entity: id,
            index,
            count,
            kind,
        })
}

fn rejected(
    target: &EntityId,
    sub_object: SubObjectIndex,
    kind: EntityEventKind,
) -> DispatchError {
    DispatchError::Rejected {
        entity: *target,
        sub_object,
        kind,
    }
}
