pub mod error;
pub mod spawn_queue;
pub mod spawn_request;
