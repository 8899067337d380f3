use tether_client::ClientConfig;
use tether_server::{Server, ServerConfig};
use tether_shared::{
    Correction, CorrectionEvent, EntityId, PhysicsBody, SpawnEntityEvent, SpawnRequest, Vec2,
};
use tether_test::{
    exchange_messages, test_prefabs, tick_and_exchange, tick_and_exchange_n_times, TestClient,
    BARREL,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn setup_with_barrel() -> (Server, Vec<TestClient>, EntityId) {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    let mut clients = vec![TestClient::join(&mut server, ClientConfig::default())];

    server
        .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::ZERO))
        .unwrap();
    let (mut events, _) = tick_and_exchange(&mut server, &mut clients);
    let barrel = events.read::<SpawnEntityEvent>().next().unwrap();
    (server, clients, barrel)
}

fn client_position(clients: &[TestClient], entity: &EntityId) -> Vec2 {
    clients[0]
        .client
        .world()
        .registry()
        .get(entity)
        .unwrap()
        .position()
}

fn server_position(server: &Server, entity: &EntityId) -> Vec2 {
    server.world().registry().get(entity).unwrap().position()
}

#[test]
fn moving_body_is_tracked_closely() {
    let (mut server, mut clients, barrel) = setup_with_barrel();
    server
        .entity_mut(&barrel)
        .unwrap()
        .body_mut()
        .set_velocity(Vec2::new(1.0, 0.5));

    for _ in 0..60 {
        tick_and_exchange(&mut server, &mut clients);
    }

    let distance = server_position(&server, &barrel).distance(client_position(&clients, &barrel));
    assert!(distance < 0.05, "client drifted {} away", distance);
}

#[test]
fn burst_of_messages_is_caught_up_at_once() {
    let (mut server, mut clients, barrel) = setup_with_barrel();
    server
        .entity_mut(&barrel)
        .unwrap()
        .body_mut()
        .set_velocity(Vec2::new(1.0, 0.0));
    tick_and_exchange_n_times(&mut server, &mut clients, 5);

    // three host ticks reach the client in a single exchange
    server.tick();
    server.tick();
    server.tick();
    exchange_messages(&mut server, &mut clients);
    clients[0].client.tick();

    for _ in 0..20 {
        tick_and_exchange(&mut server, &mut clients);
        let buffered = clients[0]
            .client
            .world()
            .registry()
            .get(&barrel)
            .unwrap()
            .samples()
            .len();
        // only the sample that arrived this tick is still waiting
        assert!(buffered <= 1, "{} samples still buffered", buffered);
    }

    let distance = server_position(&server, &barrel).distance(client_position(&clients, &barrel));
    assert!(distance < 0.1, "client drifted {} away", distance);
}

#[test]
fn teleport_snaps_the_replica() {
    let (mut server, mut clients, barrel) = setup_with_barrel();
    for _ in 0..5 {
        tick_and_exchange(&mut server, &mut clients);
    }

    server
        .entity_mut(&barrel)
        .unwrap()
        .body_mut()
        .set_position(Vec2::new(10_000.0, 0.0));

    let mut corrections = Vec::new();
    for _ in 0..3 {
        let (_, mut client_events) = tick_and_exchange(&mut server, &mut clients);
        corrections.extend(client_events[0].read::<CorrectionEvent>());
    }

    assert!(corrections.contains(&(barrel, Correction::Snap)));
    let distance = server_position(&server, &barrel).distance(client_position(&clients, &barrel));
    assert!(distance < 1e-2, "client is {} away after snapping", distance);
}

#[test]
fn small_nudge_blends_instead_of_snapping() {
    let (mut server, mut clients, barrel) = setup_with_barrel();
    for _ in 0..5 {
        tick_and_exchange(&mut server, &mut clients);
    }

    server
        .entity_mut(&barrel)
        .unwrap()
        .body_mut()
        .set_position(Vec2::new(0.5, 0.0));

    let mut corrections = Vec::new();
    for _ in 0..3 {
        let (_, mut client_events) = tick_and_exchange(&mut server, &mut clients);
        corrections.extend(client_events[0].read::<CorrectionEvent>());
    }

    assert!(corrections.contains(&(barrel, Correction::Blend)));
    assert!(!corrections.contains(&(barrel, Correction::Snap)));
    let x = client_position(&clients, &barrel).x;
    assert!(x > 0.0 && x < 0.5, "blend moved the replica to {}", x);
}

#[test]
fn silent_host_detaches_the_replica() {
    let (mut server, mut clients, barrel) = setup_with_barrel();
    for _ in 0..5 {
        tick_and_exchange(&mut server, &mut clients);
    }

    // the host stops sending; the client keeps simulating on its own
    server.remove_user(&clients[0].key);
    let client = &mut clients[0].client;
    for _ in 0..200 {
        let events = client.tick();
        assert!(!events.has::<CorrectionEvent>());
    }

    let replica = client.world().registry().get(&barrel).unwrap();
    assert!(replica.samples().is_empty());
    let last_received = replica.samples().last_received_at().unwrap();
    let window = client.simulation().config().reconcile.staleness_window;
    assert!(client.simulation().time() - last_received > window.as_secs_f64());
}
