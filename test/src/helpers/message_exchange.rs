use tether_client::{Client, ClientConfig};
use tether_server::{Server, UserKey};
use tether_shared::WorldEvents;

use crate::test_prefabs;

/// A connected client together with the key the server knows it by
pub struct TestClient {
    pub key: UserKey,
    pub client: Client,
}

impl TestClient {
    /// Adds a user to `server` and connects a fresh client for it
    pub fn join(server: &mut Server, config: ClientConfig) -> Self {
        let key = server.add_user().expect("server should be listening");
        let mut client = Client::new(config, test_prefabs());
        client.connect();
        Self { key, client }
    }
}

/// Delivers everything queued on both sides
pub fn exchange_messages(server: &mut Server, clients: &mut [TestClient]) {
    for test_client in clients.iter_mut() {
        let outgoing = server
            .take_outgoing(&test_client.key)
            .expect("user should exist");
        for message in outgoing {
            test_client.client.receive(message);
        }
        for message in test_client.client.take_outgoing() {
            server
                .receive(&test_client.key, message)
                .expect("user should exist");
        }
    }
}

/// Ticks the server, delivers its messages, then ticks every client.
/// Returns the server's events followed by each client's.
pub fn tick_and_exchange(
    server: &mut Server,
    clients: &mut [TestClient],
) -> (WorldEvents, Vec<WorldEvents>) {
    let server_events = server.tick();
    exchange_messages(server, clients);
    let client_events = clients
        .iter_mut()
        .map(|test_client| test_client.client.tick())
        .collect();
    (server_events, client_events)
}

pub fn tick_and_exchange_n_times(server: &mut Server, clients: &mut [TestClient], n: usize) {
    for _ in 0..n {
        tick_and_exchange(server, clients);
    }
}
