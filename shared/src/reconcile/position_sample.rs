use tether_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use crate::world::body::BodyState;

/// An authoritative observation of a body at a given simulation time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PositionSample {
    pub timestamp: f64,
    pub state: BodyState,
}

impl PositionSample {
    pub fn new(timestamp: f64, state: BodyState) -> Self {
        Self { timestamp, state }
    }

    pub fn is_finite(&self) -> bool {
        self.timestamp.is_finite() && self.state.is_finite()
    }
}

impl Serde for PositionSample {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.timestamp.ser(writer);
        self.state.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let timestamp = f64::de(reader)?;
        let state = BodyState::de(reader)?;
        Ok(Self { timestamp, state })
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for PositionSample {
    fn const_bit_length() -> u32 {
        64 + <BodyState as ConstBitLength>::const_bit_length()
    }
}
