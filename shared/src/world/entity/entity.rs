use glam::Vec2;

use crate::{
    reconcile::{
        position_buffer::PositionBuffer,
        reconciler::{Reconciler, Reconciliation},
    },
    world::{
        body::{Body, PhysicsBody},
        inventory::ContainerSlot,
        prefab::{Prefab, PrefabId},
        sub_object::SubObject,
    },
    EntityId,
};

/// A replicated object in the simulated world.
pub struct Entity {
    id: EntityId,
    prefab: PrefabId,
    body: Body,
    condition: f32,
    max_condition: f32,
    parent_space: Option<EntityId>,
    container: Option<ContainerSlot>,
    sub_objects: Vec<SubObject>,
    samples: PositionBuffer,
    predicted: bool,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        prefab: &Prefab,
        body: Body,
        condition: f32,
        sample_capacity: usize,
        predicted: bool,
    ) -> Self {
        Self {
            id,
            prefab: prefab.id().clone(),
            body,
            condition: condition.clamp(0.0, prefab.max_condition()),
            max_condition: prefab.max_condition(),
            parent_space: None,
            container: None,
            sub_objects: prefab
                .sub_objects()
                .iter()
                .map(SubObject::from_template)
                .collect(),
            samples: PositionBuffer::new(sample_capacity),
            predicted,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn prefab(&self) -> &PrefabId {
        &self.prefab
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn condition(&self) -> f32 {
        self.condition
    }

    pub fn max_condition(&self) -> f32 {
        self.max_condition
    }

    pub fn set_condition(&mut self, condition: f32) {
        self.condition = condition.clamp(0.0, self.max_condition);
    }

    pub fn parent_space(&self) -> Option<EntityId> {
        self.parent_space
    }

    pub(crate) fn set_parent_space(&mut self, parent_space: Option<EntityId>) {
        self.parent_space = parent_space;
    }

    pub fn container(&self) -> Option<ContainerSlot> {
        self.container
    }

    pub(crate) fn set_container(&mut self, container: Option<ContainerSlot>) {
        self.container = container;
    }

    /// Free-floating entities are simulated and sampled; contained ones ride along with their owner.
    pub fn is_free_floating(&self) -> bool {
        self.container.is_none()
    }

    pub fn sub_objects(&self) -> &[SubObject] {
        &self.sub_objects
    }

    pub fn sub_object(&self, index: u8) -> Option<&SubObject> {
        self.sub_objects.get(index as usize)
    }

    pub fn sub_object_mut(&mut self, index: u8) -> Option<&mut SubObject> {
        self.sub_objects.get_mut(index as usize)
    }

    pub fn samples(&self) -> &PositionBuffer {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut PositionBuffer {
        &mut self.samples
    }

    pub fn is_predicted(&self) -> bool {
        self.predicted
    }

    /// Runs one reconcile step against this entity's own sample buffer and
    /// applies the result to its body.
    pub fn reconcile(&mut self, reconciler: &Reconciler, now: f64) -> Reconciliation {
        let result = reconciler.reconcile(&mut self.samples, self.body.state(), now);
        self.body.apply_state(&result.state);
        result
    }
}
