use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use crate::world::inventory::Inventory;

/// How a prefab lays out the sub-objects of the entities spawned from it.
/// Every host instantiates the same layout, so sub-object indices agree.
#[derive(Clone, Debug, PartialEq)]
pub enum SubObjectTemplate {
    Limb { max_health: f32 },
    Device,
    Inventory { capacity: u8 },
}

/// Named scalar attributes that can be changed through an `AttributeChanged` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Durability of the whole entity
    Condition,
    /// Health of a limb
    Health,
    /// Stored charge of a device
    Charge,
}

impl Serde for Attribute {
    fn ser(&self, writer: &mut dyn BitWrite) {
        let index: u64 = match self {
            Attribute::Condition => 0,
            Attribute::Health => 1,
            Attribute::Charge => 2,
        };
        UnsignedInteger::<2>::new(index).ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        match UnsignedInteger::<2>::de(reader)?.get() {
            0 => Ok(Attribute::Condition),
            1 => Ok(Attribute::Health),
            2 => Ok(Attribute::Charge),
            _ => Err(SerdeErr),
        }
    }

    fn bit_length(&self) -> u32 {
        2
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Limb {
    health: f32,
    max_health: f32,
    severed: bool,
}

impl Limb {
    pub fn new(max_health: f32) -> Self {
        Self {
            health: max_health,
            max_health,
            severed: false,
        }
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    pub fn is_severed(&self) -> bool {
        self.severed
    }

    pub fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
    }

    pub fn sever(&mut self) {
        self.severed = true;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Device {
    active: bool,
    charge: f32,
}

impl Device {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn set_charge(&mut self, charge: f32) {
        self.charge = charge.max(0.0);
    }
}

/// A stateful part of an entity that can be addressed by index in entity events.
#[derive(Clone, Debug, PartialEq)]
pub enum SubObject {
    Limb(Limb),
    Device(Device),
    Inventory(Inventory),
}

impl SubObject {
    pub fn from_template(template: &SubObjectTemplate) -> Self {
        match template {
            SubObjectTemplate::Limb { max_health } => SubObject::Limb(Limb::new(*max_health)),
            SubObjectTemplate::Device => SubObject::Device(Device::default()),
            SubObjectTemplate::Inventory { capacity } => {
                SubObject::Inventory(Inventory::new(*capacity))
            }
        }
    }

    pub fn inventory(&self) -> Option<&Inventory> {
        match self {
            SubObject::Inventory(inventory) => Some(inventory),
            _ => None,
        }
    }

    pub fn inventory_mut(&mut self) -> Option<&mut Inventory> {
        match self {
            SubObject::Inventory(inventory) => Some(inventory),
            _ => None,
        }
    }

    /// Whether this sub-object carries opaque state replicated through
    /// `ComponentState` events. Inventories replicate through `ContainerState`.
    pub fn has_component_state(&self) -> bool {
        !matches!(self, SubObject::Inventory(_))
    }

    /// Writes this sub-object's replicated state. The event channel carries
    /// the result as an opaque blob and never looks inside.
    pub fn write_state(&self, writer: &mut dyn BitWrite) {
        match self {
            SubObject::Limb(limb) => {
                limb.severed.ser(writer);
                limb.health.ser(writer);
            }
            SubObject::Device(device) => {
                device.active.ser(writer);
                device.charge.ser(writer);
            }
            SubObject::Inventory(_) => {}
        }
    }

    /// Applies state produced by [`SubObject::write_state`] on another host.
    pub fn read_state(&mut self, reader: &mut BitReader) -> Result<(), SerdeErr> {
        match self {
            SubObject::Limb(limb) => {
                let severed = bool::de(reader)?;
                let health = f32::de(reader)?;
                if !health.is_finite() {
                    return Err(SerdeErr);
                }
                limb.severed = severed;
                limb.set_health(health);
            }
            SubObject::Device(device) => {
                let active = bool::de(reader)?;
                let charge = f32::de(reader)?;
                if !charge.is_finite() {
                    return Err(SerdeErr);
                }
                device.active = active;
                device.set_charge(charge);
            }
            SubObject::Inventory(_) => return Err(SerdeErr),
        }
        Ok(())
    }

    /// Sets a named attribute. Returns false if this sub-object has no such attribute.
    pub fn set_attribute(&mut self, attribute: Attribute, value: f32) -> bool {
        match (self, attribute) {
            (SubObject::Limb(limb), Attribute::Health) => {
                limb.set_health(value);
                true
            }
            (SubObject::Device(device), Attribute::Charge) => {
                device.set_charge(value);
                true
            }
            _ => false,
        }
    }
}
