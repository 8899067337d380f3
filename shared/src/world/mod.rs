pub mod body;
pub mod entity;
pub mod entity_world;
pub mod event;
pub mod inventory;
pub mod placement;
pub mod prefab;
pub mod registry;
pub mod spawn;
pub mod sub_object;
pub mod world_events;
