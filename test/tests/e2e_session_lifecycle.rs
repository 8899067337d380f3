use tether_client::ClientConfig;
use tether_server::{Server, ServerConfig, TetherServerError};
use tether_shared::{SpawnEntityEvent, SpawnRequest, SubObject, Vec2};
use tether_test::{
    assert_worlds_match, test_prefabs, tick_and_exchange, tick_and_exchange_n_times, TestClient,
    BARREL, CRATE, CRAWLER,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

#[test]
fn users_are_tracked_until_removed() {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());

    assert_eq!(server.add_user(), Err(TetherServerError::NotListening));

    server.listen();
    let first = server.add_user().unwrap();
    let second = server.add_user().unwrap();
    assert_ne!(first, second);
    assert_eq!(server.users_count(), 2);
    assert_eq!(server.user_keys(), vec![first, second]);

    assert!(server.remove_user(&first));
    assert!(!server.remove_user(&first));
    assert!(!server.user_exists(&first));
    assert!(server.user_exists(&second));
    assert_eq!(
        server.take_outgoing(&first),
        Err(TetherServerError::UserNotFound { user: first })
    );
}

#[test]
fn stopping_the_server_drops_users_and_entities() {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    let user = server.add_user().unwrap();
    server
        .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::ZERO))
        .unwrap();
    server.tick();

    server.stop();

    assert!(!server.is_listening());
    assert_eq!(server.users_count(), 0);
    assert!(server.world().registry().is_empty());
    assert!(!server.user_exists(&user));
}

#[test]
fn slow_user_loses_its_oldest_messages() {
    init_logger();
    let config = ServerConfig {
        max_pending_messages: 4,
        send_snapshot_on_join: false,
        ..ServerConfig::default()
    };
    let mut server = Server::new(config, test_prefabs());
    server.listen();
    let user = server.add_user().unwrap();
    server
        .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::ZERO))
        .unwrap();

    // the barrel is sampled every tick, so every tick produces a message
    for _ in 0..10 {
        server.tick();
    }

    assert_eq!(server.pending_outgoing(&user), 4);
    assert_eq!(server.dropped_messages(&user), Some(6));
    assert_eq!(server.take_outgoing(&user).unwrap().len(), 4);
    assert_eq!(server.pending_outgoing(&user), 0);
}

#[test]
fn disconnecting_clears_the_client_world() {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    let mut clients = vec![TestClient::join(&mut server, ClientConfig::default())];
    server
        .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::ZERO))
        .unwrap();
    tick_and_exchange_n_times(&mut server, &mut clients, 3);
    assert_eq!(clients[0].client.world().registry().len(), 1);

    let client = &mut clients[0].client;
    client.disconnect();

    assert!(!client.is_connected());
    assert!(client.world().registry().is_empty());
    assert_eq!(client.client_tick(), 0);
    assert_eq!(client.server_tick(), None);

    // messages that arrive afterwards are ignored
    let mut message = server.take_outgoing(&clients[0].key).unwrap();
    server.tick();
    message.extend(server.take_outgoing(&clients[0].key).unwrap());
    let client = &mut clients[0].client;
    for bytes in message {
        client.receive(bytes);
    }
    assert!(client.tick().is_empty());
}

#[test]
fn parent_space_is_replicated() {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    let mut clients = vec![TestClient::join(&mut server, ClientConfig::default())];

    server
        .enqueue_spawn(SpawnRequest::positioned(CRATE, Vec2::new(40.0, 0.0)))
        .unwrap();
    let (mut events, _) = tick_and_exchange(&mut server, &mut clients);
    let vessel = events.read::<SpawnEntityEvent>().next().unwrap();

    server
        .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::new(41.0, 0.5)).with_parent_space(vessel))
        .unwrap();
    let (mut events, _) = tick_and_exchange(&mut server, &mut clients);
    let barrel = events.read::<SpawnEntityEvent>().next().unwrap();
    tick_and_exchange(&mut server, &mut clients);

    let replica = clients[0].client.world().registry().get(&barrel).unwrap();
    assert_eq!(replica.parent_space(), Some(vessel));

    // removing the vessel leaves the barrel floating on its own
    server.enqueue_remove(vessel).unwrap();
    tick_and_exchange_n_times(&mut server, &mut clients, 2);

    let replica = clients[0].client.world().registry().get(&barrel).unwrap();
    assert_eq!(replica.parent_space(), None);
    assert_worlds_match(&server, &clients[0].client, 0.05);
}

#[test]
fn snapshot_carries_sub_object_state() {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    server
        .enqueue_spawn(SpawnRequest::positioned(CRAWLER, Vec2::ZERO))
        .unwrap();
    let mut events = server.tick();
    let crawler = events.read::<SpawnEntityEvent>().next().unwrap();

    let entity = server.entity_mut(&crawler).unwrap();
    if let Some(SubObject::Limb(limb)) = entity.sub_object_mut(1) {
        limb.sever();
    }
    if let Some(SubObject::Device(device)) = entity.sub_object_mut(2) {
        device.set_active(true);
    }

    let mut clients = vec![TestClient::join(&mut server, ClientConfig::default())];
    tick_and_exchange(&mut server, &mut clients);

    let replica = clients[0].client.world().registry().get(&crawler).unwrap();
    match replica.sub_object(1) {
        Some(SubObject::Limb(limb)) => assert!(limb.is_severed()),
        other => panic!("expected a limb, found {:?}", other),
    }
    match replica.sub_object(2) {
        Some(SubObject::Device(device)) => assert!(device.is_active()),
        other => panic!("expected a device, found {:?}", other),
    }
}
