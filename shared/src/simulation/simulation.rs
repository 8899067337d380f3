use std::collections::{HashSet, VecDeque};

use log::{debug, info, warn};

use tether_serde::{BitReader, BitWriter, Serde};

use crate::{
    config::SyncConfig,
    reconcile::{
        position_sample::PositionSample,
        reconciler::{Correction, Reconciler},
    },
    simulation::message::{read_samples, write_samples, MessageHeader},
    types::{HostType, SubObjectIndex, Tick},
    world::{
        body::PhysicsBody,
        entity::entity::Entity,
        entity_world::World,
        event::{
            entity_event::{EventPayload, SpawnRecord},
            error::DispatchError,
            event_channel::EntityEventChannel,
        },
        placement::Placement,
        prefab::PrefabSource,
        registry::EntityRegistry,
        spawn::{
            error::SpawnError,
            spawn_queue::{EntitySpawnQueue, FlushContext, FlushReport},
            spawn_request::SpawnRequest,
        },
        world_events::WorldEvents,
    },
    EntityId,
};

/// Drives one host of a session: local physics, reconciliation, the deferred
/// spawn queue, outgoing message assembly and inbound message processing, in
/// that order, once per fixed tick.
pub struct Simulation {
    config: SyncConfig,
    host_type: HostType,
    world: World,
    queue: EntitySpawnQueue,
    channel: EntityEventChannel,
    reconciler: Reconciler,
    session_active: bool,
    tick: Tick,
    time: f64,
    inbound: VecDeque<Vec<u8>>,
    outbound: VecDeque<Vec<u8>>,
}

impl Simulation {
    pub fn new(config: SyncConfig, host_type: HostType, prefabs: Box<dyn PrefabSource>) -> Self {
        let world = World::new(host_type, config.sample_buffer_capacity, prefabs);
        let reconciler = Reconciler::new(config.reconcile.clone());
        Self {
            config,
            host_type,
            world,
            queue: EntitySpawnQueue::new(host_type),
            channel: EntityEventChannel::new(),
            reconciler,
            session_active: false,
            tick: 0,
            time: 0.0,
            inbound: VecDeque::new(),
            outbound: VecDeque::new(),
        }
    }

    // Session

    pub fn begin_session(&mut self) {
        if self.session_active {
            warn!("Session already active, restarting it");
        }
        self.clear_session();
        self.session_active = true;
        info!("{:?} session started", self.host_type);
    }

    /// Drops every entity and pending request or message. Entity ids keep
    /// counting up so ids from the old session are never reused.
    pub fn end_session(&mut self) {
        if !self.session_active {
            return;
        }
        self.clear_session();
        self.session_active = false;
        info!("{:?} session ended", self.host_type);
    }

    fn clear_session(&mut self) {
        self.world.clear();
        self.queue.reset();
        self.channel.clear();
        self.inbound.clear();
        self.outbound.clear();
        self.tick = 0;
        self.time = 0.0;
    }

    pub fn is_session_active(&self) -> bool {
        self.session_active
    }

    // Accessors

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn host_type(&self) -> HostType {
        self.host_type
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct access to one entity, for game code that moves bodies or edits
    /// sub-objects. Structural changes still go through the spawn queue.
    pub fn entity_mut(&mut self, entity: &EntityId) -> Option<&mut Entity> {
        self.world.registry_mut().get_mut(entity)
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    /// Simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Jumps the local clock to the authoritative host's time.
    pub fn adopt_time(&mut self, time: f64) {
        if time.is_finite() {
            self.time = time;
        }
    }

    // Mutations

    pub fn enqueue_spawn(&mut self, request: SpawnRequest) -> Result<(), SpawnError> {
        self.queue.enqueue_spawn(self.world.prefabs(), request)
    }

    pub fn enqueue_remove(&mut self, entity: EntityId) -> Result<(), SpawnError> {
        self.queue.enqueue_remove(self.world.registry(), entity)
    }

    /// Queues an event for the next outgoing message.
    pub fn write_event(&mut self, target: EntityId, sub_object: SubObjectIndex, payload: EventPayload) {
        self.channel.write(target, sub_object, payload);
    }

    /// Queues the replicated state of one sub-object for the next outgoing message.
    pub fn write_component_state(&mut self, target: EntityId, index: u8) -> Result<(), DispatchError> {
        self.channel
            .write_component_state(self.world.registry(), target, index)
    }

    /// Buffers an inbound message for the next tick.
    pub fn receive(&mut self, message: Vec<u8>) {
        if !self.session_active {
            debug!("Dropping message received outside of a session");
            return;
        }
        self.inbound.push_back(message);
    }

    pub fn take_outgoing(&mut self) -> Option<Vec<u8>> {
        self.outbound.pop_front()
    }

    pub fn drain_outgoing(&mut self) -> Vec<Vec<u8>> {
        self.outbound.drain(..).collect()
    }

    // Tick

    /// Advances the simulation by one fixed step.
    pub fn tick(&mut self) -> WorldEvents {
        let mut events = WorldEvents::new();
        if !self.session_active {
            return events;
        }

        let dt = self.config.tick_interval.as_secs_f32();
        self.tick = self.tick.wrapping_add(1);
        self.time += self.config.tick_interval.as_secs_f64();

        // local physics
        for entity in self.world.registry_mut().iter_mut() {
            if entity.is_free_floating() {
                entity.body_mut().integrate(dt);
            }
        }

        // reconcile predicted bodies
        let now = self.time;
        for entity in self.world.registry_mut().iter_mut() {
            if !entity.is_predicted() || !entity.is_free_floating() {
                continue;
            }
            let result = entity.reconcile(&self.reconciler, now);
            match result.correction {
                Correction::Blend | Correction::Snap => {
                    events.push_correction(entity.id(), result.correction);
                }
                Correction::None | Correction::Detached | Correction::Idle => {}
            }
        }

        // structural changes
        let report = self.flush(&mut events);
        if !report.failed.is_empty() {
            debug!("{} spawn request(s) failed this tick", report.failed.len());
        }

        // outgoing
        let samples = self.collect_samples();
        if self.channel.has_outgoing() || !samples.is_empty() {
            let message = self.write_message(&samples);
            self.outbound.push_back(message);
        }

        // inbound
        while let Some(message) = self.inbound.pop_front() {
            self.read_message(&message, &mut events);
        }

        events
    }

    fn flush(&mut self, events: &mut WorldEvents) -> FlushReport {
        self.queue.flush(FlushContext {
            world: &mut self.world,
            channel: &mut self.channel,
            events,
        })
    }

    fn collect_samples(&self) -> Vec<(EntityId, PositionSample)> {
        if !self.host_type.is_authoritative() {
            return Vec::new();
        }
        let interval = Tick::from(self.config.sample_interval_ticks.max(1));
        if self.tick % interval != 0 {
            return Vec::new();
        }
        self.world
            .registry()
            .iter()
            .filter(|entity| entity.is_free_floating())
            .map(|entity| {
                (
                    entity.id(),
                    PositionSample::new(self.time, entity.body().state()),
                )
            })
            .collect()
    }

    fn write_message(&mut self, samples: &[(EntityId, PositionSample)]) -> Vec<u8> {
        let mut writer = BitWriter::new();
        MessageHeader {
            tick: self.tick,
            time: self.time,
        }
        .ser(&mut writer);
        self.channel.write_messages(&mut writer);
        write_samples(&mut writer, samples);
        writer.to_bytes()
    }

    fn read_message(&mut self, message: &[u8], events: &mut WorldEvents) {
        let mut reader = BitReader::new(message);

        let header = match MessageHeader::de(&mut reader) {
            Ok(header) => header,
            Err(error) => {
                warn!("Dropping message with unreadable header: {}", error);
                return;
            }
        };

        match self
            .channel
            .read_messages(&mut reader, &mut self.world, events)
        {
            Ok(report) => {
                if report.dropped > 0 {
                    debug!(
                        "Tick {}: applied {} entity event(s), dropped {}",
                        header.tick, report.applied, report.dropped
                    );
                }
            }
            Err(error) => {
                warn!("Tick {}: {}", header.tick, error);
                events.push_malformed(error);
                return;
            }
        }

        let samples = match read_samples(&mut reader) {
            Ok(samples) => samples,
            Err(error) => {
                warn!("Tick {}: unreadable position samples: {}", header.tick, error);
                return;
            }
        };

        let received_at = self.time;
        for (id, sample) in samples {
            let Some(entity) = self.world.registry_mut().get_mut(&id) else {
                debug!("Dropping position sample for unknown entity {}", id);
                continue;
            };
            if !entity.is_predicted() {
                debug!("Dropping position sample for locally simulated entity {}", id);
                continue;
            }
            if let Err(error) = entity.samples_mut().insert(sample, received_at) {
                debug!("Rejected position sample for {}: {}", id, error);
                events.push_sample_error(id, error);
            }
        }
    }

    /// Builds a message that recreates the whole current world on a newly
    /// joined observer: every entity (containers before their contents, parent
    /// spaces before the entities inside them), then the state of every limb and device, then one sample per
    /// free-floating entity.
    pub fn snapshot_message(&self) -> Vec<u8> {
        let registry = self.world.registry();
        let mut channel = EntityEventChannel::new();

        let mut order = Vec::with_capacity(registry.len());
        let mut visited = HashSet::new();
        for entity in registry.iter().filter(|entity| entity.is_free_floating()) {
            push_tree(registry, entity.id(), &mut visited, &mut order);
        }

        for id in &order {
            let Some(entity) = registry.get(id) else {
                continue;
            };
            let placement = match entity.container() {
                Some(slot) => Placement::Contained(slot),
                None => Placement::World {
                    position: entity.position(),
                    parent_space: entity.parent_space(),
                },
            };
            channel.write(
                *id,
                SubObjectIndex::Whole,
                EventPayload::EntityCreated(SpawnRecord {
                    prefab: entity.prefab().clone(),
                    placement,
                    condition: entity.condition(),
                }),
            );
        }

        for id in &order {
            let Some(entity) = registry.get(id) else {
                continue;
            };
            for (index, sub_object) in entity.sub_objects().iter().enumerate() {
                if !sub_object.has_component_state() {
                    continue;
                }
                let Ok(index) = u8::try_from(index) else {
                    break;
                };
                if let Err(error) = channel.write_component_state(registry, *id, index) {
                    debug!("Snapshot skipped state of {}: {}", id, error);
                }
            }
        }

        let samples: Vec<(EntityId, PositionSample)> = registry
            .iter()
            .filter(|entity| entity.is_free_floating())
            .map(|entity| {
                (
                    entity.id(),
                    PositionSample::new(self.time, entity.body().state()),
                )
            })
            .collect();

        let mut writer = BitWriter::new();
        MessageHeader {
            tick: self.tick,
            time: self.time,
        }
        .ser(&mut writer);
        channel.write_messages(&mut writer);
        write_samples(&mut writer, &samples);
        writer.to_bytes()
    }
}

// Appends the tree rooted at `root`, containers first, after the trees of
// the parent spaces it refers to.
fn push_tree(
    registry: &EntityRegistry,
    root: EntityId,
    visited: &mut HashSet<EntityId>,
    order: &mut Vec<EntityId>,
) {
    if !visited.insert(root) {
        return;
    }

    let mut tree = registry.removal_order(&root);
    tree.reverse();

    for id in &tree {
        let Some(space) = registry.get(id).and_then(|entity| entity.parent_space()) else {
            continue;
        };
        if let Some(space_root) = outermost_container(registry, space) {
            push_tree(registry, space_root, visited, order);
        }
    }

    order.extend(tree);
}

fn outermost_container(registry: &EntityRegistry, entity: EntityId) -> Option<EntityId> {
    let mut current = registry.get(&entity)?;
    for _ in 0..registry.len() {
        let Some(slot) = current.container() else {
            return Some(current.id());
        };
        current = registry.get(&slot.inventory.owner)?;
    }
    None
}
