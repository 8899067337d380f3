//! # Tether Server
//! The authoritative host: runs the simulation, broadcasts every tick's
//! entity events and position samples to connected users, and brings late
//! joiners up to date with a snapshot.

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

mod error;
mod server;
mod user;

pub use error::TetherServerError;
pub use server::{Server, ServerConfig};
pub use user::UserKey;
