use std::collections::{btree_map, BTreeMap};

use glam::Vec2;
use log::debug;

use crate::{
    types::HostType,
    world::{
        body::{Body, BodyState, PhysicsBody},
        entity::{entity::Entity, error::EntityError},
        inventory::{ContainerSlot, InventoryAddress},
        placement::Placement,
        prefab::Prefab,
    },
    EntityId,
};

/// Owns every entity of one session. Only the spawn queue flush and inbound
/// event dispatch mutate it.
pub struct EntityRegistry {
    host_type: HostType,
    sample_capacity: usize,
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn new(host_type: HostType, sample_capacity: usize) -> Self {
        Self {
            host_type,
            sample_capacity,
            entities: BTreeMap::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    pub fn get(&self, entity: &EntityId) -> Option<&Entity> {
        self.entities.get(entity)
    }

    pub fn get_mut(&mut self, entity: &EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(entity)
    }

    pub fn iter(&self) -> btree_map::Values<'_, EntityId, Entity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> btree_map::ValuesMut<'_, EntityId, Entity> {
        self.entities.values_mut()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Creates `entity` from `prefab` at `placement`. The placement must be
    /// fully resolved: a contained placement names a free slot of an existing
    /// inventory.
    pub fn spawn(
        &mut self,
        entity: EntityId,
        prefab: &Prefab,
        placement: Placement,
        condition: f32,
    ) -> Result<(), EntityError> {
        if self.entities.contains_key(&entity) {
            return Err(EntityError::AlreadyExists { entity });
        }

        let predicted = !self.host_type.is_authoritative();

        match placement {
            Placement::World {
                position,
                parent_space,
            } => {
                if !position.is_finite() || !condition.is_finite() {
                    return Err(EntityError::NonFinite { entity });
                }
                let mut record = Entity::new(
                    entity,
                    prefab,
                    Body::new(BodyState::at(position)),
                    condition,
                    self.sample_capacity,
                    predicted,
                );
                record.set_parent_space(parent_space.filter(|space| self.contains(space)));
                self.entities.insert(entity, record);
            }
            Placement::Contained(slot) => {
                if !condition.is_finite() {
                    return Err(EntityError::NonFinite { entity });
                }
                self.check_slot_free(&slot)?;
                let (position, parent_space) = self
                    .world_location(&slot.inventory.owner)
                    .ok_or(EntityError::NotFound {
                        entity: slot.inventory.owner,
                    })?;
                let mut record = Entity::new(
                    entity,
                    prefab,
                    Body::new(BodyState::at(position)),
                    condition,
                    self.sample_capacity,
                    predicted,
                );
                record.set_parent_space(parent_space);
                record.set_container(Some(slot));
                self.entities.insert(entity, record);
                self.occupy(entity, &slot)?;
            }
        }

        Ok(())
    }

    /// Returns the first free slot of the addressed inventory, or `None` if it is full.
    pub fn free_slot(&self, address: &InventoryAddress) -> Result<Option<u8>, EntityError> {
        let owner = self
            .entities
            .get(&address.owner)
            .ok_or(EntityError::NotFound {
                entity: address.owner,
            })?;
        let count = owner.sub_objects().len();
        let sub_object = owner
            .sub_object(address.sub_object)
            .ok_or(EntityError::SubObjectOutOfRange {
                entity: address.owner,
                index: address.sub_object,
                count,
            })?;
        let inventory = sub_object.inventory().ok_or(EntityError::NotAnInventory {
            entity: address.owner,
            index: address.sub_object,
        })?;
        Ok(inventory.first_free_slot())
    }

    /// World position and parent space of `entity`. Contained entities report
    /// those of the outermost free-floating container.
    pub fn world_location(&self, entity: &EntityId) -> Option<(Vec2, Option<EntityId>)> {
        let mut current = self.entities.get(entity)?;
        // bounded so a corrupted chain can never loop forever
        for _ in 0..=self.entities.len() {
            match current.container() {
                None => return Some((current.position(), current.parent_space())),
                Some(slot) => current = self.entities.get(&slot.inventory.owner)?,
            }
        }
        None
    }

    pub fn world_position(&self, entity: &EntityId) -> Option<Vec2> {
        self.world_location(entity).map(|(position, _)| position)
    }

    /// Entities directly inside any inventory of `entity`.
    pub fn contents(&self, entity: &EntityId) -> Vec<EntityId> {
        let Some(record) = self.entities.get(entity) else {
            return Vec::new();
        };
        record
            .sub_objects()
            .iter()
            .filter_map(|sub_object| sub_object.inventory())
            .flat_map(|inventory| inventory.items())
            .collect()
    }

    /// `entity` and everything transitively contained in it, contents before
    /// their container.
    pub fn removal_order(&self, entity: &EntityId) -> Vec<EntityId> {
        let mut output = Vec::new();
        if self.entities.contains_key(entity) {
            self.collect_post_order(*entity, &mut output);
        }
        output
    }

    fn collect_post_order(&self, entity: EntityId, output: &mut Vec<EntityId>) {
        if output.contains(&entity) {
            return;
        }
        for item in self.contents(&entity) {
            self.collect_post_order(item, output);
        }
        output.push(entity);
    }

    /// Whether `entity` is `ancestor` or sits somewhere inside it.
    pub fn is_inside(&self, entity: &EntityId, ancestor: &EntityId) -> bool {
        let mut current = *entity;
        for _ in 0..=self.entities.len() {
            if current == *ancestor {
                return true;
            }
            match self.entities.get(&current).and_then(|record| record.container()) {
                Some(slot) => current = slot.inventory.owner,
                None => return false,
            }
        }
        false
    }

    /// Removes `entity` together with everything still inside it. Returns the
    /// removed ids, contents first.
    pub fn despawn(&mut self, entity: &EntityId) -> Vec<EntityId> {
        let removed = self.removal_order(entity);
        for id in &removed {
            let Some(record) = self.entities.remove(id) else {
                continue;
            };
            if let Some(slot) = record.container() {
                self.vacate(*id, &slot);
            }
        }
        for record in self.entities.values_mut() {
            if let Some(space) = record.parent_space() {
                if removed.contains(&space) {
                    record.set_parent_space(None);
                }
            }
        }
        removed
    }

    /// Replaces the slots of an inventory with `slots`. Listed entities that
    /// exist locally are moved into their slot; entities that were inside and
    /// are no longer listed are dropped at the owner's location.
    pub fn set_inventory_slots(
        &mut self,
        address: &InventoryAddress,
        slots: Vec<Option<EntityId>>,
    ) -> Result<(), EntityError> {
        let owner = address.owner;
        let previous: Vec<EntityId> = {
            let record = self
                .entities
                .get(&owner)
                .ok_or(EntityError::NotFound { entity: owner })?;
            let count = record.sub_objects().len();
            let inventory = record
                .sub_object(address.sub_object)
                .ok_or(EntityError::SubObjectOutOfRange {
                    entity: owner,
                    index: address.sub_object,
                    count,
                })?
                .inventory()
                .ok_or(EntityError::NotAnInventory {
                    entity: owner,
                    index: address.sub_object,
                })?;
            if inventory.capacity() != slots.len() {
                return Err(EntityError::CapacityMismatch {
                    entity: owner,
                    index: address.sub_object,
                    expected: inventory.capacity(),
                    actual: slots.len(),
                });
            }
            inventory.items().collect()
        };

        let mut accepted: Vec<Option<EntityId>> = Vec::with_capacity(slots.len());
        for item in slots {
            let item = item.filter(|id| {
                if !self.entities.contains_key(id) {
                    debug!("Inventory of {} lists unknown entity {}, leaving slot empty", owner, id);
                    return false;
                }
                if self.is_inside(&owner, id) {
                    debug!("Entity {} cannot be placed inside {}", id, owner);
                    return false;
                }
                !accepted.contains(&Some(*id))
            });
            accepted.push(item);
        }

        let (position, parent_space) = self
            .world_location(&owner)
            .ok_or(EntityError::NotFound { entity: owner })?;

        // release everything that was inside and is not listed anymore
        for id in previous {
            if accepted.contains(&Some(id)) {
                continue;
            }
            if let Some(record) = self.entities.get_mut(&id) {
                record.set_container(None);
                record.set_parent_space(parent_space);
                record.body_mut().set_position(position);
            }
        }

        // detach listed entities from wherever they were before
        for id in accepted.iter().flatten() {
            let previous_slot = self.entities.get(id).and_then(|record| record.container());
            if let Some(slot) = previous_slot {
                if slot.inventory != *address {
                    self.vacate(*id, &slot);
                }
            }
        }

        for (index, item) in accepted.iter().enumerate() {
            let Some(id) = item else {
                continue;
            };
            if let Some(record) = self.entities.get_mut(id) {
                record.set_container(Some(ContainerSlot {
                    inventory: *address,
                    slot: index as u8,
                }));
                record.set_parent_space(parent_space);
                record.body_mut().set_position(position);
            }
        }

        if let Some(inventory) = self
            .entities
            .get_mut(&owner)
            .and_then(|record| record.sub_object_mut(address.sub_object))
            .and_then(|sub_object| sub_object.inventory_mut())
        {
            inventory.replace_slots(accepted);
        }

        Ok(())
    }

    fn check_slot_free(&self, slot: &ContainerSlot) -> Result<(), EntityError> {
        let address = &slot.inventory;
        let owner = self
            .entities
            .get(&address.owner)
            .ok_or(EntityError::NotFound {
                entity: address.owner,
            })?;
        let count = owner.sub_objects().len();
        let inventory = owner
            .sub_object(address.sub_object)
            .ok_or(EntityError::SubObjectOutOfRange {
                entity: address.owner,
                index: address.sub_object,
                count,
            })?
            .inventory()
            .ok_or(EntityError::NotAnInventory {
                entity: address.owner,
                index: address.sub_object,
            })?;
        if (slot.slot as usize) < inventory.capacity() && inventory.get(slot.slot).is_none() {
            Ok(())
        } else {
            Err(EntityError::SlotUnavailable {
                entity: address.owner,
                index: address.sub_object,
                slot: slot.slot,
            })
        }
    }

    fn occupy(&mut self, entity: EntityId, slot: &ContainerSlot) -> Result<(), EntityError> {
        let address = &slot.inventory;
        let placed = self
            .entities
            .get_mut(&address.owner)
            .and_then(|owner| owner.sub_object_mut(address.sub_object))
            .and_then(|sub_object| sub_object.inventory_mut())
            .map(|inventory| inventory.put_at(slot.slot, entity))
            .unwrap_or(false);
        if placed {
            Ok(())
        } else {
            self.entities.remove(&entity);
            Err(EntityError::SlotUnavailable {
                entity: address.owner,
                index: address.sub_object,
                slot: slot.slot,
            })
        }
    }

    fn vacate(&mut self, entity: EntityId, slot: &ContainerSlot) {
        if let Some(inventory) = self
            .entities
            .get_mut(&slot.inventory.owner)
            .and_then(|owner| owner.sub_object_mut(slot.inventory.sub_object))
            .and_then(|sub_object| sub_object.inventory_mut())
        {
            inventory.remove(&entity);
        }
    }
}
