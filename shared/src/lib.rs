//! # Tether Shared
//! The synchronization core shared by tether-server & tether-client: the
//! entity world, the deferred spawn queue, the entity event channel, position
//! reconciliation and the per-tick driver tying them together.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use glam::Vec2;
pub use tether_serde::{
    BitCounter, BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
    UnsignedVariableInteger,
};

mod config;
mod reconcile;
mod simulation;
mod types;
mod world;

pub use config::{ReconcileConfig, SyncConfig};
pub use reconcile::{
    error::SampleError,
    position_buffer::PositionBuffer,
    position_sample::PositionSample,
    reconciler::{wrap_angle, Correction, Reconciler, Reconciliation},
};
pub use simulation::{
    message::{read_samples, write_samples, MessageHeader},
    simulation::Simulation,
};
pub use types::{HostType, SubObjectIndex, Tick};
pub use world::{
    body::{Body, BodyState, PhysicsBody},
    entity::{
        entity::Entity,
        entity_id::{EntityId, EntityIdGenerator},
        error::EntityError,
    },
    entity_world::World,
    event::{
        entity_event::{ComponentState, EntityEvent, EntityEventKind, EventPayload, SpawnRecord},
        error::{DispatchError, EventChannelError},
        event_channel::{EntityEventChannel, ReadReport},
    },
    inventory::{ContainerSlot, Inventory, InventoryAddress},
    placement::Placement,
    prefab::{Prefab, PrefabCatalog, PrefabId, PrefabSource},
    registry::EntityRegistry,
    spawn::{
        error::SpawnError,
        spawn_queue::{EntitySpawnQueue, FlushContext, FlushReport},
        spawn_request::SpawnRequest,
    },
    sub_object::{Attribute, Device, Limb, SubObject, SubObjectTemplate},
    world_events::{
        AttributeChangeEvent, ComponentStateEvent, ContainerStateEvent, CorrectionEvent,
        DispatchErrorEvent, MalformedMessageEvent, RemoveEntityEvent, SampleErrorEvent,
        SpawnEntityEvent, WorldEvent, WorldEvents,
    },
};
