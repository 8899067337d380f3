use std::mem;

use log::{debug, info};

use tether_shared::{
    DispatchError, EntityId, EventPayload, HostType, MessageHeader, PrefabSource, Simulation,
    SubObjectIndex, Tick, World, WorldEvents,
};

use crate::{
    clock_events::{ClockAdoption, ClockEvents},
    ClientConfig,
};

/// An observer of a session. Entities are created and removed only by the
/// host; the client simulates them locally between samples and reconciles
/// toward the samples it receives.
pub struct Client {
    config: ClientConfig,
    simulation: Simulation,
    server_tick: Option<Tick>,
    clock_events: ClockEvents,
}

impl Client {
    /// Create a new Client
    pub fn new<P: PrefabSource + 'static>(config: ClientConfig, prefabs: P) -> Self {
        let simulation = Simulation::new(config.sync.clone(), HostType::Client, Box::new(prefabs));
        Self {
            config,
            simulation,
            server_tick: None,
            clock_events: ClockEvents::new(),
        }
    }

    /// Starts observing a session with an empty world
    pub fn connect(&mut self) {
        self.server_tick = None;
        self.simulation.begin_session();
    }

    pub fn is_connected(&self) -> bool {
        self.simulation.is_session_active()
    }

    /// Stops observing, dropping every entity
    pub fn disconnect(&mut self) {
        self.server_tick = None;
        self.simulation.end_session();
    }

    /// Hands a message from the host to the simulation; it is applied on the next tick
    pub fn receive(&mut self, message: Vec<u8>) {
        if !self.is_connected() {
            debug!("Dropping message received while disconnected");
            return;
        }

        if let Ok(header) = MessageHeader::peek(&message) {
            self.server_tick = Some(header.tick);
            self.clock_events.push_host_tick(header.tick);

            let lag = header.time - self.simulation.time();
            let tick_interval = self.config.sync.tick_interval.as_secs_f64();
            if self.config.adopt_server_time && lag > tick_interval {
                info!(
                    "Adopting host time {:.3}s (local clock was {:.3}s behind)",
                    header.time, lag
                );
                self.clock_events.push_adoption(ClockAdoption {
                    from: self.simulation.time(),
                    to: header.time,
                });
                self.simulation.adopt_time(header.time);
            }
        }

        self.simulation.receive(message);
    }

    /// Advances the local simulation one step
    pub fn tick(&mut self) -> WorldEvents {
        self.simulation.tick()
    }

    /// Messages for the host, oldest first
    pub fn take_outgoing(&mut self) -> Vec<Vec<u8>> {
        self.simulation.drain_outgoing()
    }

    pub fn take_clock_events(&mut self) -> ClockEvents {
        mem::take(&mut self.clock_events)
    }

    /// Queues an event for the host, such as a device being switched on
    pub fn write_event(&mut self, target: EntityId, sub_object: SubObjectIndex, payload: EventPayload) {
        self.simulation.write_event(target, sub_object, payload);
    }

    pub fn write_component_state(&mut self, target: EntityId, index: u8) -> Result<(), DispatchError> {
        self.simulation.write_component_state(target, index)
    }

    pub fn world(&self) -> &World {
        self.simulation.world()
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    /// Tick of the most recent message received from the host
    pub fn server_tick(&self) -> Option<Tick> {
        self.server_tick
    }

    pub fn client_tick(&self) -> Tick {
        self.simulation.current_tick()
    }
}
