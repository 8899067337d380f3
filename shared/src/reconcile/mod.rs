pub mod error;
pub mod position_buffer;
pub mod position_sample;
pub mod reconciler;
