use thiserror::Error;

use crate::{
    world::{entity::error::EntityError, prefab::PrefabId},
    EntityId,
};

/// Errors raised while queueing or materializing spawns and removals
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpawnError {
    /// Only the authoritative host may create or remove entities
    #[error("Entities can only be spawned or removed by the authoritative host")]
    NotAuthoritative,

    /// The requested prefab is not known to the prefab source
    #[error("Prefab {prefab} not found")]
    PrefabNotFound { prefab: PrefabId },

    /// The entity to remove does not exist
    #[error("Entity {entity} not found")]
    EntityNotFound { entity: EntityId },

    /// The requested position or condition is NaN or infinite
    #[error("Spawn of prefab {prefab} has a non-finite position or condition")]
    NonFinite { prefab: PrefabId },

    /// The world refused the spawn at flush time
    #[error(transparent)]
    Entity(#[from] EntityError),
}
