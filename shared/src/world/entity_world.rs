use crate::{
    types::HostType,
    world::{
        entity::{entity_id::EntityIdGenerator, error::EntityError},
        placement::Placement,
        prefab::{Prefab, PrefabId, PrefabSource},
        registry::EntityRegistry,
    },
    EntityId,
};

/// The entity registry of one host together with the prefab source it
/// instantiates from and the id generator it allocates from.
///
/// The id generator outlives sessions: [`World::clear`] drops entities but
/// never rewinds ids.
pub struct World {
    registry: EntityRegistry,
    prefabs: Box<dyn PrefabSource>,
    ids: EntityIdGenerator,
}

impl World {
    pub fn new(host_type: HostType, sample_capacity: usize, prefabs: Box<dyn PrefabSource>) -> Self {
        Self {
            registry: EntityRegistry::new(host_type, sample_capacity),
            prefabs,
            ids: EntityIdGenerator::new(),
        }
    }

    pub fn host_type(&self) -> HostType {
        self.registry.host_type()
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn prefabs(&self) -> &dyn PrefabSource {
        self.prefabs.as_ref()
    }

    pub fn prefab(&self, id: &PrefabId) -> Option<&Prefab> {
        self.prefabs.prefab(id)
    }

    pub fn generate_id(&mut self) -> EntityId {
        self.ids.generate()
    }

    /// Instantiates `prefab` as `entity` at `placement`.
    pub fn create(
        &mut self,
        entity: EntityId,
        prefab: &PrefabId,
        placement: Placement,
        condition: f32,
    ) -> Result<(), EntityError> {
        if entity == EntityId::MAX {
            return Err(EntityError::IdOutOfRange { entity });
        }
        let prefab = self
            .prefabs
            .prefab(prefab)
            .ok_or_else(|| EntityError::PrefabNotFound {
                prefab: prefab.clone(),
            })?;
        self.registry.spawn(entity, prefab, placement, condition)?;
        self.ids.skip_past(entity);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.registry.clear();
    }
}
