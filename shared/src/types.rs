use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};

pub type Tick = u32;

/// Which side of the connection a simulation runs on. The server is the
/// authoritative host; clients predict and reconcile against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HostType {
    Server,
    Client,
}

impl HostType {
    pub fn is_authoritative(self) -> bool {
        self == HostType::Server
    }
}

/// Addresses either a whole entity or one of its sub-objects (limb, device,
/// inventory) by position in the entity's sub-object list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubObjectIndex {
    Whole,
    Index(u8),
}

impl Serde for SubObjectIndex {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            SubObjectIndex::Whole => {
                false.ser(writer);
            }
            SubObjectIndex::Index(index) => {
                true.ser(writer);
                UnsignedVariableInteger::<3>::new(*index as u64).ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if !bool::de(reader)? {
            return Ok(SubObjectIndex::Whole);
        }
        let index = UnsignedVariableInteger::<3>::de(reader)?.get();
        let index = u8::try_from(index).map_err(|_| SerdeErr)?;
        Ok(SubObjectIndex::Index(index))
    }

    fn bit_length(&self) -> u32 {
        match self {
            SubObjectIndex::Whole => 1,
            SubObjectIndex::Index(index) => {
                1 + UnsignedVariableInteger::<3>::new(*index as u64).bit_length()
            }
        }
    }
}
