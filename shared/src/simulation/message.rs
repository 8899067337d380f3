use tether_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

use crate::{reconcile::position_sample::PositionSample, types::Tick, EntityId};

/// Leads every simulation message: the sender's tick and simulation time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MessageHeader {
    pub tick: Tick,
    pub time: f64,
}

impl MessageHeader {
    /// Reads only the header of `bytes`.
    pub fn peek(bytes: &[u8]) -> Result<Self, SerdeErr> {
        Self::de(&mut BitReader::new(bytes))
    }
}

impl Serde for MessageHeader {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.tick.ser(writer);
        self.time.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let tick = Tick::de(reader)?;
        let time = f64::de(reader)?;
        if !time.is_finite() {
            return Err(SerdeErr);
        }
        Ok(Self { tick, time })
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for MessageHeader {
    fn const_bit_length() -> u32 {
        32 + 64
    }
}

/// Writes the samples section as a continue-bit list of `(entity, sample)` pairs.
pub fn write_samples(writer: &mut dyn BitWrite, samples: &[(EntityId, PositionSample)]) {
    for (entity, sample) in samples {
        true.ser(writer);
        entity.ser(writer);
        sample.ser(writer);
    }
    false.ser(writer);
}

/// Reads the samples section. Non-finite samples are returned as read; the
/// sample buffer is the one that refuses them.
pub fn read_samples(reader: &mut BitReader) -> Result<Vec<(EntityId, PositionSample)>, SerdeErr> {
    let mut samples = Vec::new();
    loop {
        let sample_continue = bool::de(reader)?;
        if !sample_continue {
            break;
        }
        let entity = EntityId::de(reader)?;
        let sample = PositionSample::de(reader)?;
        samples.push((entity, sample));
    }
    Ok(samples)
}
