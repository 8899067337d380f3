use tether_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::EntityId;

/// Names an inventory: the entity that owns it and its position in that
/// entity's sub-object list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InventoryAddress {
    pub owner: EntityId,
    pub sub_object: u8,
}

impl InventoryAddress {
    pub fn new(owner: EntityId, sub_object: u8) -> Self {
        Self { owner, sub_object }
    }
}

/// Where a contained entity currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContainerSlot {
    pub inventory: InventoryAddress,
    pub slot: u8,
}

impl Serde for ContainerSlot {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.inventory.owner.ser(writer);
        self.inventory.sub_object.ser(writer);
        self.slot.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let owner = EntityId::de(reader)?;
        let sub_object = u8::de(reader)?;
        let slot = u8::de(reader)?;
        Ok(Self {
            inventory: InventoryAddress::new(owner, sub_object),
            slot,
        })
    }

    fn bit_length(&self) -> u32 {
        self.inventory.owner.bit_length() + 16
    }
}

/// A bounded, ordered collection of slots, each holding at most one entity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inventory {
    slots: Vec<Option<EntityId>>,
}

impl Inventory {
    pub fn new(capacity: u8) -> Self {
        Self {
            slots: vec![None; capacity as usize],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[Option<EntityId>] {
        &self.slots
    }

    pub fn items(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    pub fn is_full(&self) -> bool {
        self.first_free_slot().is_none()
    }

    pub fn first_free_slot(&self) -> Option<u8> {
        self.slots
            .iter()
            .position(|slot| slot.is_none())
            .map(|index| index as u8)
    }

    pub fn get(&self, slot: u8) -> Option<EntityId> {
        self.slots.get(slot as usize).copied().flatten()
    }

    pub fn contains(&self, entity: &EntityId) -> bool {
        self.slots.iter().any(|slot| slot.as_ref() == Some(entity))
    }

    /// Puts `entity` into `slot`. Fails if the slot is out of range or taken
    /// by another entity.
    pub fn put_at(&mut self, slot: u8, entity: EntityId) -> bool {
        let Some(current) = self.slots.get_mut(slot as usize) else {
            return false;
        };
        match *current {
            Some(existing) => existing == entity,
            None => {
                *current = Some(entity);
                true
            }
        }
    }

    /// Clears whichever slot holds `entity`, returning its index.
    pub fn remove(&mut self, entity: &EntityId) -> Option<u8> {
        let index = self
            .slots
            .iter()
            .position(|slot| slot.as_ref() == Some(entity))?;
        self.slots[index] = None;
        Some(index as u8)
    }

    pub(crate) fn replace_slots(&mut self, slots: Vec<Option<EntityId>>) {
        self.slots = slots;
    }
}
