use thiserror::Error;

use crate::{EntityId, PrefabId};

/// Errors raised by the entity registry while placing, moving or removing entities
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EntityError {
    /// An entity with this id is already registered
    #[error("Entity {entity} already exists")]
    AlreadyExists { entity: EntityId },

    /// The id is outside of the range ids are allocated from
    #[error("Entity id {entity} is out of range")]
    IdOutOfRange { entity: EntityId },

    /// The entity is not registered
    #[error("Entity {entity} not found")]
    NotFound { entity: EntityId },

    /// The prefab could not be resolved
    #[error("Prefab {prefab} not found")]
    PrefabNotFound { prefab: PrefabId },

    /// The addressed sub-object does not exist on the entity
    #[error("Entity {entity} has no sub-object {index} (it has {count})")]
    SubObjectOutOfRange {
        entity: EntityId,
        index: u8,
        count: usize,
    },

    /// The addressed sub-object exists but is not an inventory
    #[error("Sub-object {index} of entity {entity} is not an inventory")]
    NotAnInventory { entity: EntityId, index: u8 },

    /// The inventory slot is outside of the inventory's capacity or already taken
    #[error("Slot {slot} of inventory {index} on entity {entity} is unavailable")]
    SlotUnavailable {
        entity: EntityId,
        index: u8,
        slot: u8,
    },

    /// A replacement slot list does not match the inventory's capacity
    #[error("Inventory {index} on entity {entity} holds {expected} slots, got {actual}")]
    CapacityMismatch {
        entity: EntityId,
        index: u8,
        expected: usize,
        actual: usize,
    },

    /// Placing the entity would put it inside itself
    #[error("Entity {entity} cannot be placed inside its own contents")]
    ContainmentCycle { entity: EntityId },

    /// A position, velocity or rotation was NaN or infinite
    #[error("Entity {entity} was given a non-finite physical value")]
    NonFinite { entity: EntityId },
}
