use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use crate::{
    types::SubObjectIndex,
    world::{placement::Placement, prefab::PrefabId, sub_object::Attribute},
    EntityId,
};

/// Wire tag of an [`EventPayload`], written as 3 bits ahead of the payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityEventKind {
    EntityCreated,
    EntityRemoved,
    AttributeChanged,
    ComponentState,
    ContainerState,
}

impl EntityEventKind {
    pub fn name(&self) -> &'static str {
        match self {
            EntityEventKind::EntityCreated => "EntityCreated",
            EntityEventKind::EntityRemoved => "EntityRemoved",
            EntityEventKind::AttributeChanged => "AttributeChanged",
            EntityEventKind::ComponentState => "ComponentState",
            EntityEventKind::ContainerState => "ContainerState",
        }
    }
}

impl Serde for EntityEventKind {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let index: u64 = match self {
            EntityEventKind::EntityCreated => 0,
            EntityEventKind::EntityRemoved => 1,
            EntityEventKind::AttributeChanged => 2,
            EntityEventKind::ComponentState => 3,
            EntityEventKind::ContainerState => 4,
        };
        UnsignedInteger::<3>::new(index).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<3>::de(reader)?.get() {
            0 => Ok(EntityEventKind::EntityCreated),
            1 => Ok(EntityEventKind::EntityRemoved),
            2 => Ok(EntityEventKind::AttributeChanged),
            3 => Ok(EntityEventKind::ComponentState),
            4 => Ok(EntityEventKind::ContainerState),
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        3
    }
}

/// Everything an observer needs to recreate an entity the authoritative host spawned.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRecord {
    pub prefab: PrefabId,
    pub placement: Placement,
    pub condition: f32,
}

/// Opaque state blob written by a sub-object. Only the sub-object on the
/// other side knows how to read it.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComponentState {
    bytes: Vec<u8>,
}

impl ComponentState {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    EntityCreated(SpawnRecord),
    EntityRemoved,
    AttributeChanged { attribute: Attribute, value: f32 },
    ComponentState(ComponentState),
    ContainerState { slots: Vec<Option<EntityId>> },
}

impl EventPayload {
    pub fn kind(&self) -> EntityEventKind {
        match self {
            EventPayload::EntityCreated(_) => EntityEventKind::EntityCreated,
            EventPayload::EntityRemoved => EntityEventKind::EntityRemoved,
            EventPayload::AttributeChanged { .. } => EntityEventKind::AttributeChanged,
            EventPayload::ComponentState(_) => EntityEventKind::ComponentState,
            EventPayload::ContainerState { .. } => EntityEventKind::ContainerState,
        }
    }

    fn ser_body(&self, writer: &mut dyn BitWrite) {
        match self {
            EventPayload::EntityCreated(record) => {
                record.prefab.ser(writer);
                record.placement.ser(writer);
                record.condition.ser(writer);
            }
            EventPayload::EntityRemoved => {}
            EventPayload::AttributeChanged { attribute, value } => {
                attribute.ser(writer);
                value.ser(writer);
            }
            EventPayload::ComponentState(state) => {
                state.bytes.ser(writer);
            }
            EventPayload::ContainerState { slots } => {
                slots.ser(writer);
            }
        }
    }

    fn de_body(kind: EntityEventKind, reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match kind {
            EntityEventKind::EntityCreated => {
                let prefab = PrefabId::de(reader)?;
                let placement = Placement::de(reader)?;
                let condition = finite(f32::de(reader)?)?;
                Ok(EventPayload::EntityCreated(SpawnRecord {
                    prefab,
                    placement,
                    condition,
                }))
            }
            EntityEventKind::EntityRemoved => Ok(EventPayload::EntityRemoved),
            EntityEventKind::AttributeChanged => {
                let attribute = Attribute::de(reader)?;
                let value = finite(f32::de(reader)?)?;
                Ok(EventPayload::AttributeChanged { attribute, value })
            }
            EntityEventKind::ComponentState => Ok(EventPayload::ComponentState(ComponentState {
                bytes: Vec::<u8>::de(reader)?,
            })),
            EntityEventKind::ContainerState => Ok(EventPayload::ContainerState {
                slots: Vec::<Option<EntityId>>::de(reader)?,
            }),
        }
    }

    fn body_bit_length(&self) -> u32 {
        match self {
            EventPayload::EntityCreated(record) => {
                record.prefab.bit_length() + record.placement.bit_length() + 32
            }
            EventPayload::EntityRemoved => 0,
            EventPayload::AttributeChanged { attribute, .. } => attribute.bit_length() + 32,
            EventPayload::ComponentState(state) => state.bytes.bit_length(),
            EventPayload::ContainerState { slots } => slots.bit_length(),
        }
    }
}

fn finite(value: f32) -> Result<f32, SerdeErr> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SerdeErr)
    }
}

/// One addressed event: `target` entity, optional sub-object, typed payload.
///
/// On the wire: target, sub-object index, 3-bit kind, then the payload. No
/// length field is written; the kind alone determines how to read the rest.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityEvent {
    pub target: EntityId,
    pub sub_object: SubObjectIndex,
    pub payload: EventPayload,
}

impl EntityEvent {
    pub fn new(target: EntityId, sub_object: SubObjectIndex, payload: EventPayload) -> Self {
        Self {
            target,
            sub_object,
            payload,
        }
    }

    pub fn kind(&self) -> EntityEventKind {
        self.payload.kind()
    }
}

impl Serde for EntityEvent {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.target.ser(writer);
        self.sub_object.ser(writer);
        self.payload.kind().ser(writer);
        self.payload.ser_body(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let target = EntityId::de(reader)?;
        let sub_object = SubObjectIndex::de(reader)?;
        let kind = EntityEventKind::de(reader)?;
        let payload = EventPayload::de_body(kind, reader)?;
        Ok(Self {
            target,
            sub_object,
            payload,
        })
    }

    fn bit_length(&self) -> u32 {
        self.target.bit_length()
            + self.sub_object.bit_length()
            + 3
            + self.payload.body_bit_length()
    }
}
