use glam::Vec2;
use tether_serde::{BitReader, BitWrite, ConstBitLength, Serde, SerdeErr};

/// Full physical state of a rigid body at one instant.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f32,
    pub angular_velocity: f32,
}

impl BodyState {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn is_finite(&self) -> bool {
        self.position.is_finite()
            && self.velocity.is_finite()
            && self.rotation.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Dead-reckons the state `seconds` into the future using its own velocities.
    pub fn extrapolate(&self, seconds: f32) -> Self {
        Self {
            position: self.position + self.velocity * seconds,
            velocity: self.velocity,
            rotation: self.rotation + self.angular_velocity * seconds,
            angular_velocity: self.angular_velocity,
        }
    }
}

impl Serde for BodyState {
    fn ser(&self, writer: &mut dyn BitWrite) {
        self.position.ser(writer);
        self.velocity.ser(writer);
        self.rotation.ser(writer);
        self.angular_velocity.ser(writer);
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        Ok(Self {
            position: Vec2::de(reader)?,
            velocity: Vec2::de(reader)?,
            rotation: f32::de(reader)?,
            angular_velocity: f32::de(reader)?,
        })
    }

    fn bit_length(&self) -> u32 {
        <Self as ConstBitLength>::const_bit_length()
    }
}

impl ConstBitLength for BodyState {
    fn const_bit_length() -> u32 {
        <Vec2 as ConstBitLength>::const_bit_length() * 2 + 32 * 2
    }
}

/// The narrow surface through which position correction reads and writes a
/// physics body. Game code backed by a real physics engine implements this
/// for its own rigid bodies.
pub trait PhysicsBody {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, position: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    fn rotation(&self) -> f32;
    fn set_rotation(&mut self, rotation: f32);
    fn angular_velocity(&self) -> f32;
    fn set_angular_velocity(&mut self, angular_velocity: f32);

    fn state(&self) -> BodyState {
        BodyState {
            position: self.position(),
            velocity: self.velocity(),
            rotation: self.rotation(),
            angular_velocity: self.angular_velocity(),
        }
    }

    fn apply_state(&mut self, state: &BodyState) {
        self.set_position(state.position);
        self.set_velocity(state.velocity);
        self.set_rotation(state.rotation);
        self.set_angular_velocity(state.angular_velocity);
    }
}

/// Minimal kinematic body used by the simulation when no external physics
/// engine drives the entity.
#[derive(Clone, Debug, Default)]
pub struct Body {
    state: BodyState,
}

impl Body {
    pub fn new(state: BodyState) -> Self {
        Self { state }
    }

    /// Advances the body by `dt` seconds of free motion.
    pub fn integrate(&mut self, dt: f32) {
        self.state = self.state.extrapolate(dt);
    }
}

impl PhysicsBody for Body {
    fn position(&self) -> Vec2 {
        self.state.position
    }

    fn set_position(&mut self, position: Vec2) {
        self.state.position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.state.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.state.velocity = velocity;
    }

    fn rotation(&self) -> f32 {
        self.state.rotation
    }

    fn set_rotation(&mut self, rotation: f32) {
        self.state.rotation = rotation;
    }

    fn angular_velocity(&self) -> f32 {
        self.state.angular_velocity
    }

    fn set_angular_velocity(&mut self, angular_velocity: f32) {
        self.state.angular_velocity = angular_velocity;
    }

    fn state(&self) -> BodyState {
        self.state
    }
}
