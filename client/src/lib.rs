//! # Tether Client
//! An observer of a tether session: applies the host's entity events,
//! simulates entities locally and reconciles them toward the host's
//! position samples.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tether_shared::{
        BitReader, BitWrite, BitWriter, ConstBitLength, Serde, SerdeErr, UnsignedInteger,
        UnsignedVariableInteger,
    };
}

mod client;
mod client_config;
mod clock_events;

pub use client::Client;
pub use client_config::ClientConfig;
pub use clock_events::{ClockAdoption, ClockAdoptionEvent, ClockEvent, ClockEvents, HostTickEvent};
