use glam::Vec2;
use tether_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::{world::inventory::ContainerSlot, EntityId};

/// Where a newly created entity ends up. Spawn requests are resolved into a
/// concrete placement on the authoritative host; observers apply it verbatim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Placement {
    World {
        position: Vec2,
        parent_space: Option<EntityId>,
    },
    Contained(ContainerSlot),
}

impl Placement {
    pub fn world(position: Vec2) -> Self {
        Placement::World {
            position,
            parent_space: None,
        }
    }

    pub fn is_contained(&self) -> bool {
        matches!(self, Placement::Contained(_))
    }
}

impl Serde for Placement {
    fn ser(&self, writer: &mut dyn BitWrite) {
        match self {
            Placement::World {
                position,
                parent_space,
            } => {
                false.ser(writer);
                position.ser(writer);
                parent_space.ser(writer);
            }
            Placement::Contained(slot) => {
                true.ser(writer);
                slot.ser(writer);
            }
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        if bool::de(reader)? {
            return Ok(Placement::Contained(ContainerSlot::de(reader)?));
        }
        let position = Vec2::de(reader)?;
        if !position.is_finite() {
            return Err(SerdeErr);
        }
        let parent_space = Option::<EntityId>::de(reader)?;
        Ok(Placement::World {
            position,
            parent_space,
        })
    }

    fn bit_length(&self) -> u32 {
        1 + match self {
            Placement::World {
                position,
                parent_space,
            } => position.bit_length() + parent_space.bit_length(),
            Placement::Contained(slot) => slot.bit_length(),
        }
    }
}
