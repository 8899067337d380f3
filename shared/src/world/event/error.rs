use thiserror::Error;

use tether_serde::SerdeErr;

use crate::{
    types::SubObjectIndex,
    world::{entity::error::EntityError, event::entity_event::EntityEventKind},
    EntityId,
};

/// Why a well-formed entity event could not be applied. The envelope is
/// dropped and the rest of the message is still processed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// The target entity does not exist on this host
    #[error("{kind:?} event for unknown entity {entity}")]
    EntityNotFound {
        entity: EntityId,
        kind: EntityEventKind,
    },

    /// The addressed sub-object index is past the end of the entity's sub-objects
    #[error("{kind:?} event for sub-object {index} of entity {entity}, which has {count}")]
    SubObjectOutOfRange {
        entity: EntityId,
        index: u8,
        count: usize,
        kind: EntityEventKind,
    },

    /// The addressed sub-object (or whole entity) does not accept this payload
    #[error("{kind:?} event rejected by {sub_object:?} of entity {entity}")]
    Rejected {
        entity: EntityId,
        sub_object: SubObjectIndex,
        kind: EntityEventKind,
    },

    /// An entity with the created id already exists
    #[error("Entity {entity} was created twice")]
    Duplicate { entity: EntityId },

    /// Only the authoritative host decides which entities exist
    #[error("{kind:?} event for entity {entity} received by the authoritative host")]
    NotPermitted {
        entity: EntityId,
        kind: EntityEventKind,
    },

    /// The world refused the change
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Errors that abort the processing of one inbound message
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventChannelError {
    /// An envelope could not be decoded. Envelopes after it are unreadable
    /// since they carry no length field.
    #[error("Malformed entity event at position {position} ({applied} applied before it)")]
    Malformed {
        position: usize,
        applied: usize,
        #[source]
        source: SerdeErr,
    },
}
