use std::fmt;

use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedVariableInteger};

/// Process-wide identifier of a replicated entity. Assigned by the
/// authoritative host and stable for the entity's whole lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(u64);

impl EntityId {
    /// Reserved: no id may be allocated past it.
    pub const MAX: EntityId = EntityId(u64::MAX);

    pub fn from_u64(value: u64) -> Self {
        Self(value)
    }

    pub fn to_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl Serde for EntityId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedVariableInteger::<7>::new(self.0).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(UnsignedVariableInteger::<7>::de(reader)?.get()))
    }

    fn bit_length(&self) -> u32 {
        UnsignedVariableInteger::<7>::new(self.0).bit_length()
    }
}

/// Hands out entity ids. Ids only ever increase, so an id is never reused
/// while an in-flight message could still reference the entity that held it.
pub struct EntityIdGenerator {
    next: u64,
}

impl Default for EntityIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn generate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    /// Makes sure ids handed out from now on are greater than `id`.
    /// Used when entities with externally chosen ids are loaded.
    /// Returns false, leaving the generator untouched, for [`EntityId::MAX`].
    pub fn skip_past(&mut self, id: EntityId) -> bool {
        let Some(next) = id.0.checked_add(1) else {
            return false;
        };
        if next > self.next {
            self.next = next;
        }
        true
    }
}
