use std::default::Default;

use tether_shared::SyncConfig;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Used to configure the simulation shared with Clients
    pub sync: SyncConfig,
    /// Determines whether a newly added user is sent a snapshot of the whole
    /// world before any regular message
    pub send_snapshot_on_join: bool,
    /// Outgoing messages kept per user before the oldest ones are discarded
    pub max_pending_messages: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            send_snapshot_on_join: true,
            max_pending_messages: 64,
        }
    }
}
