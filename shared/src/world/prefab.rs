use std::{collections::HashMap, fmt};

use tether_serde::{BitReader, BitWrite, Serde, SerdeErr};

use crate::world::sub_object::SubObjectTemplate;

/// Stable identifier of a piece of content an entity can be spawned from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PrefabId(String);

impl PrefabId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrefabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl From<&str> for PrefabId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Serde for PrefabId {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.0.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self(String::de(reader)?))
    }

    fn bit_length(&self) -> u32 {
        self.0.bit_length()
    }
}

/// Immutable description of what an entity spawned from this prefab looks like.
#[derive(Clone, Debug)]
pub struct Prefab {
    id: PrefabId,
    max_condition: f32,
    sub_objects: Vec<SubObjectTemplate>,
}

impl Prefab {
    pub fn new<I: Into<PrefabId>>(id: I, max_condition: f32) -> Self {
        Self {
            id: id.into(),
            max_condition,
            sub_objects: Vec::new(),
        }
    }

    pub fn with_limb(mut self, max_health: f32) -> Self {
        self.sub_objects.push(SubObjectTemplate::Limb { max_health });
        self
    }

    pub fn with_device(mut self) -> Self {
        self.sub_objects.push(SubObjectTemplate::Device);
        self
    }

    pub fn with_inventory(mut self, capacity: u8) -> Self {
        self.sub_objects.push(SubObjectTemplate::Inventory { capacity });
        self
    }

    pub fn id(&self) -> &PrefabId {
        &self.id
    }

    pub fn max_condition(&self) -> f32 {
        self.max_condition
    }

    pub fn sub_objects(&self) -> &[SubObjectTemplate] {
        &self.sub_objects
    }
}

/// Resolves prefab identifiers into descriptors. Content loading lives
/// outside of this crate and plugs in through this trait.
pub trait PrefabSource {
    fn prefab(&self, id: &PrefabId) -> Option<&Prefab>;
}

/// In-memory [`PrefabSource`].
#[derive(Default)]
pub struct PrefabCatalog {
    prefabs: HashMap<PrefabId, Prefab>,
}

impl PrefabCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefab: Prefab) {
        self.prefabs.insert(prefab.id.clone(), prefab);
    }

    pub fn with(mut self, prefab: Prefab) -> Self {
        self.insert(prefab);
        self
    }

    pub fn len(&self) -> usize {
        self.prefabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefabs.is_empty()
    }
}

impl PrefabSource for PrefabCatalog {
    fn prefab(&self, id: &PrefabId) -> Option<&Prefab> {
        self.prefabs.get(id)
    }
}
