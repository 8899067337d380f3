use std::default::Default;

use tether_shared::SyncConfig;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Must match the host's simulation settings
    pub sync: SyncConfig,
    /// Jump the local clock to the host's time whenever it lags by more than
    /// one tick interval
    pub adopt_server_time: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::default(),
            adopt_server_time: true,
        }
    }
}
