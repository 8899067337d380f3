use glam::Vec2;

use crate::{
    world::{inventory::InventoryAddress, prefab::PrefabId},
    EntityId,
};

/// A deferred request to create an entity from a prefab.
#[derive(Clone, Debug, PartialEq)]
pub enum SpawnRequest {
    /// Free-floating in the world, optionally inside a larger vessel
    Positioned {
        prefab: PrefabId,
        position: Vec2,
        parent_space: Option<EntityId>,
        condition: Option<f32>,
    },
    /// Inside an inventory, in its first free slot
    Contained {
        prefab: PrefabId,
        inventory: InventoryAddress,
        condition: Option<f32>,
    },
}

impl SpawnRequest {
    pub fn positioned<P: Into<PrefabId>>(prefab: P, position: Vec2) -> Self {
        SpawnRequest::Positioned {
            prefab: prefab.into(),
            position,
            parent_space: None,
            condition: None,
        }
    }

    pub fn contained<P: Into<PrefabId>>(prefab: P, inventory: InventoryAddress) -> Self {
        SpawnRequest::Contained {
            prefab: prefab.into(),
            inventory,
            condition: None,
        }
    }

    /// Overrides the starting condition, which otherwise is the prefab's maximum.
    pub fn with_condition(mut self, value: f32) -> Self {
        match &mut self {
            SpawnRequest::Positioned { condition, .. } | SpawnRequest::Contained { condition, .. } => {
                *condition = Some(value);
            }
        }
        self
    }

    /// Has no effect on contained spawns, which inherit their owner's space.
    pub fn with_parent_space(mut self, space: EntityId) -> Self {
        if let SpawnRequest::Positioned { parent_space, .. } = &mut self {
            *parent_space = Some(space);
        }
        self
    }

    pub fn prefab(&self) -> &PrefabId {
        match self {
            SpawnRequest::Positioned { prefab, .. } | SpawnRequest::Contained { prefab, .. } => {
                prefab
            }
        }
    }

    pub fn condition(&self) -> Option<f32> {
        match self {
            SpawnRequest::Positioned { condition, .. }
            | SpawnRequest::Contained { condition, .. } => *condition,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        let condition_finite = self.condition().map_or(true, f32::is_finite);
        match self {
            SpawnRequest::Positioned { position, .. } => condition_finite && position.is_finite(),
            SpawnRequest::Contained { .. } => condition_finite,
        }
    }
}
