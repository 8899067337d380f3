use std::{mem, vec::IntoIter};

use tether_shared::Tick;

/// The local clock was moved to the host's simulation time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockAdoption {
    /// Local simulation time before the jump, in seconds
    pub from: f64,
    /// Host simulation time read from the message header, in seconds
    pub to: f64,
}

impl ClockAdoption {
    pub fn lag(&self) -> f64 {
        self.to - self.from
    }
}

/// What the client learned about the host's clock between two calls to
/// [`Client::take_clock_events`](crate::Client::take_clock_events).
#[derive(Default)]
pub struct ClockEvents {
    host_ticks: Vec<Tick>,
    adoptions: Vec<ClockAdoption>,
}

impl ClockEvents {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.host_ticks.is_empty() && self.adoptions.is_empty()
    }

    pub fn read<V: ClockEvent>(&mut self) -> V::Iter {
        V::iter(self)
    }

    pub fn has<V: ClockEvent>(&self) -> bool {
        V::has(self)
    }

    pub(crate) fn push_host_tick(&mut self, tick: Tick) {
        self.host_ticks.push(tick);
    }

    pub(crate) fn push_adoption(&mut self, adoption: ClockAdoption) {
        self.adoptions.push(adoption);
    }
}

pub trait ClockEvent {
    type Iter;

    fn iter(events: &mut ClockEvents) -> Self::Iter;

    fn has(events: &ClockEvents) -> bool;
}

macro_rules! clock_event {
    ($(#[$meta:meta])* $name:ident, $field:ident, $item:ty) => {
        $(#[$meta])*
        pub struct $name;

        impl ClockEvent for $name {
            type Iter = IntoIter<$item>;

            fn iter(events: &mut ClockEvents) -> Self::Iter {
                IntoIterator::into_iter(mem::take(&mut events.$field))
            }

            fn has(events: &ClockEvents) -> bool {
                !events.$field.is_empty()
            }
        }
    };
}

clock_event!(
    /// Tick carried by each host message header, in arrival order
    HostTickEvent,
    host_ticks,
    Tick
);
clock_event!(ClockAdoptionEvent, adoptions, ClockAdoption);
