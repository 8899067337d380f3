use std::{mem, vec::IntoIter};

use crate::{
    reconcile::{error::SampleError, reconciler::Correction},
    types::SubObjectIndex,
    world::{
        event::error::{DispatchError, EventChannelError},
        sub_object::Attribute,
    },
    EntityId,
};

/// Structural changes and problems recorded during one tick, handed to the
/// game layer. Read them with `events.read::<SpawnEntityEvent>()` and friends.
pub struct WorldEvents {
    spawns: Vec<EntityId>,
    removes: Vec<EntityId>,
    attribute_changes: Vec<(EntityId, SubObjectIndex, Attribute, f32)>,
    component_states: Vec<(EntityId, u8)>,
    container_states: Vec<(EntityId, u8)>,
    corrections: Vec<(EntityId, Correction)>,
    dispatch_errors: Vec<DispatchError>,
    sample_errors: Vec<(EntityId, SampleError)>,
    malformed: Vec<EventChannelError>,
    empty: bool,
}

impl Default for WorldEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldEvents {
    pub fn new() -> Self {
        Self {
            spawns: Vec::new(),
            removes: Vec::new(),
            attribute_changes: Vec::new(),
            component_states: Vec::new(),
            container_states: Vec::new(),
            corrections: Vec::new(),
            dispatch_errors: Vec::new(),
            sample_errors: Vec::new(),
            malformed: Vec::new(),
            empty: true,
        }
    }

    // Public

    pub fn is_empty(&self) -> bool {
        self.empty
    }

    pub fn read<V: WorldEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: WorldEvent>(&self) -> bool {
        V::has(self)
    }

    // Crate-public

    pub(crate) fn push_spawn(&mut self, entity: EntityId) {
        self.spawns.push(entity);
        self.empty = false;
    }

    pub(crate) fn push_remove(&mut self, entity: EntityId) {
        self.removes.push(entity);
        self.empty = false;
    }

    pub(crate) fn push_attribute_change(
        &mut self,
        entity: EntityId,
        sub_object: SubObjectIndex,
        attribute: Attribute,
        value: f32,
    ) {
        self.attribute_changes
            .push((entity, sub_object, attribute, value));
        self.empty = false;
    }

    pub(crate) fn push_component_state(&mut self, entity: EntityId, index: u8) {
        self.component_states.push((entity, index));
        self.empty = false;
    }

    pub(crate) fn push_container_state(&mut self, entity: EntityId, index: u8) {
        self.container_states.push((entity, index));
        self.empty = false;
    }

    pub(crate) fn push_correction(&mut self, entity: EntityId, correction: Correction) {
        self.corrections.push((entity, correction));
        self.empty = false;
    }

    pub(crate) fn push_dispatch_error(&mut self, error: DispatchError) {
        self.dispatch_errors.push(error);
        self.empty = false;
    }

    pub(crate) fn push_sample_error(&mut self, entity: EntityId, error: SampleError) {
        self.sample_errors.push((entity, error));
        self.empty = false;
    }

    pub(crate) fn push_malformed(&mut self, error: EventChannelError) {
        self.malformed.push(error);
        self.empty = false;
    }
}

// Event Trait
pub trait WorldEvent {
    type Iter;

    fn iter(events: &mut WorldEvents) -> Self::Iter;

    fn has(events: &WorldEvents) -> bool;
}

macro_rules! world_event {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name;

        impl WorldEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut WorldEvents) -> Self::Iter {
                let list = mem::take(&mut events.$field);
                IntoIterator::into_iter(list)
            }

            fn has(events: &WorldEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

world_event!(
    /// Entities created this tick, locally or from an inbound `EntityCreated`
    SpawnEntityEvent,
    spawns,
    EntityId
);
world_event!(
    /// Entities removed this tick, contents before their container
    RemoveEntityEvent,
    removes,
    EntityId
);
world_event!(
    AttributeChangeEvent,
    attribute_changes,
    (EntityId, SubObjectIndex, Attribute, f32)
);
world_event!(
    /// Sub-objects whose replicated state was overwritten
    ComponentStateEvent,
    component_states,
    (EntityId, u8)
);
world_event!(
    /// Inventories whose slots were replaced
    ContainerStateEvent,
    container_states,
    (EntityId, u8)
);
world_event!(
    /// Blends and snaps applied to predicted entities
    CorrectionEvent,
    corrections,
    (EntityId, Correction)
);
world_event!(
    /// Inbound envelopes that were read but could not be applied
    DispatchErrorEvent,
    dispatch_errors,
    DispatchError
);
world_event!(SampleErrorEvent, sample_errors, (EntityId, SampleError));
world_event!(
    /// Inbound messages cut short by a decode failure
    MalformedMessageEvent,
    malformed,
    EventChannelError
);
