use std::collections::BTreeMap;

use log::{info, warn};

use tether_shared::{
    DispatchError, Entity, EntityId, EventPayload, HostType, PrefabSource, Simulation, SpawnError,
    SpawnRequest, SubObjectIndex, Tick, World, WorldEvents,
};

use crate::{user::User, ServerConfig, TetherServerError, UserKey};

/// The authoritative host of a session. Every entity is created and removed
/// here; connected users observe the result through the messages returned
/// by [`Server::take_outgoing`].
pub struct Server {
    config: ServerConfig,
    simulation: Simulation,
    users: BTreeMap<UserKey, User>,
    next_user: u64,
}

impl Server {
    /// Create a new Server
    pub fn new<P: PrefabSource + 'static>(config: ServerConfig, prefabs: P) -> Self {
        let simulation = Simulation::new(config.sync.clone(), HostType::Server, Box::new(prefabs));
        Self {
            config,
            simulation,
            users: BTreeMap::new(),
            next_user: 0,
        }
    }

    /// Starts a session with an empty world
    pub fn listen(&mut self) {
        self.simulation.begin_session();
    }

    /// Returns whether or not the Server is running a session
    pub fn is_listening(&self) -> bool {
        self.simulation.is_session_active()
    }

    /// Ends the session, disconnecting every user and dropping every entity
    pub fn stop(&mut self) {
        self.users.clear();
        self.simulation.end_session();
    }

    // Users

    /// Connects a new observer. If configured, the first message it receives
    /// recreates the current world.
    pub fn add_user(&mut self) -> Result<UserKey, TetherServerError> {
        if !self.is_listening() {
            return Err(TetherServerError::NotListening);
        }

        let user_key = UserKey::from_u64(self.next_user);
        self.next_user += 1;

        let mut user = User::new();
        if self.config.send_snapshot_on_join {
            let snapshot = self.simulation.snapshot_message();
            user.push(snapshot, self.config.max_pending_messages);
        }
        self.users.insert(user_key, user);

        info!("{} joined at tick {}", user_key, self.simulation.current_tick());
        Ok(user_key)
    }

    /// Disconnects a user, dropping anything still queued for it
    pub fn remove_user(&mut self, user_key: &UserKey) -> bool {
        let removed = self.users.remove(user_key).is_some();
        if removed {
            info!("{} left", user_key);
        }
        removed
    }

    pub fn user_exists(&self, user_key: &UserKey) -> bool {
        self.users.contains_key(user_key)
    }

    pub fn user_keys(&self) -> Vec<UserKey> {
        self.users.keys().copied().collect()
    }

    pub fn users_count(&self) -> usize {
        self.users.len()
    }

    /// Number of messages discarded for `user_key` because it fell behind
    pub fn dropped_messages(&self, user_key: &UserKey) -> Option<usize> {
        self.users.get(user_key).map(User::dropped)
    }

    // Messages

    /// Hands a message from `user_key` to the simulation; it is applied on the next tick
    pub fn receive(&mut self, user_key: &UserKey, message: Vec<u8>) -> Result<(), TetherServerError> {
        if !self.users.contains_key(user_key) {
            return Err(TetherServerError::UserNotFound { user: *user_key });
        }
        self.simulation.receive(message);
        Ok(())
    }

    /// Everything waiting to be delivered to `user_key`, oldest first
    pub fn take_outgoing(&mut self, user_key: &UserKey) -> Result<Vec<Vec<u8>>, TetherServerError> {
        self.users
            .get_mut(user_key)
            .map(User::take)
            .ok_or(TetherServerError::UserNotFound { user: *user_key })
    }

    pub fn pending_outgoing(&self, user_key: &UserKey) -> usize {
        self.users.get(user_key).map_or(0, User::pending)
    }

    // World

    pub fn enqueue_spawn(&mut self, request: SpawnRequest) -> Result<(), SpawnError> {
        self.simulation.enqueue_spawn(request)
    }

    pub fn enqueue_remove(&mut self, entity: EntityId) -> Result<(), SpawnError> {
        self.simulation.enqueue_remove(entity)
    }

    pub fn write_event(&mut self, target: EntityId, sub_object: SubObjectIndex, payload: EventPayload) {
        self.simulation.write_event(target, sub_object, payload);
    }

    pub fn write_component_state(&mut self, target: EntityId, index: u8) -> Result<(), DispatchError> {
        self.simulation.write_component_state(target, index)
    }

    pub fn world(&self) -> &World {
        self.simulation.world()
    }

    pub fn entity_mut(&mut self, entity: &EntityId) -> Option<&mut Entity> {
        self.simulation.entity_mut(entity)
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn current_tick(&self) -> Tick {
        self.simulation.current_tick()
    }

    // Tick

    /// Advances the simulation one step and broadcasts its message to every user
    pub fn tick(&mut self) -> WorldEvents {
        let events = self.simulation.tick();

        for message in self.simulation.drain_outgoing() {
            for (user_key, user) in self.users.iter_mut() {
                if user.push(message.clone(), self.config.max_pending_messages) {
                    warn!("{} is falling behind, discarded its oldest message", user_key);
                }
            }
        }

        events
    }
}
