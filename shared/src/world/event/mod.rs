pub mod dispatch;
pub mod entity_event;
pub mod error;
pub mod event_channel;
