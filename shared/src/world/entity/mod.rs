pub mod entity;
pub mod entity_id;
pub mod error;
