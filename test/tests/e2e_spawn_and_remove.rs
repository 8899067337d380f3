use tether_client::ClientConfig;
use tether_server::{Server, ServerConfig};
use tether_shared::{
    EntityId, HostType, InventoryAddress, RemoveEntityEvent, Simulation, SpawnEntityEvent,
    SpawnError, SpawnRequest, SyncConfig, Vec2,
};
use tether_test::{
    assert_worlds_match, test_prefabs, tick_and_exchange, tick_and_exchange_n_times, TestClient,
    BARREL, CRATE, POUCH,
};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn setup(clients: usize) -> (Server, Vec<TestClient>) {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    let clients = (0..clients)
        .map(|_| TestClient::join(&mut server, ClientConfig::default()))
        .collect();
    (server, clients)
}

fn spawn_one(server: &mut Server, clients: &mut [TestClient], request: SpawnRequest) -> EntityId {
    server.enqueue_spawn(request).unwrap();
    let (mut events, _) = tick_and_exchange(server, clients);
    let spawned: Vec<EntityId> = events.read::<SpawnEntityEvent>().collect();
    assert_eq!(spawned.len(), 1);
    spawned[0]
}

#[test]
fn spawned_entity_appears_on_every_client() {
    let (mut server, mut clients) = setup(2);

    server
        .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::new(10.0, 20.0)))
        .unwrap();
    let (mut server_events, mut client_events) = tick_and_exchange(&mut server, &mut clients);

    let spawned: Vec<EntityId> = server_events.read::<SpawnEntityEvent>().collect();
    assert_eq!(spawned.len(), 1);
    let entity = spawned[0];

    for (test_client, events) in clients.iter().zip(client_events.iter_mut()) {
        assert_eq!(events.read::<SpawnEntityEvent>().collect::<Vec<_>>(), vec![entity]);

        let replica = test_client.client.world().registry().get(&entity).unwrap();
        assert_eq!(replica.position(), Vec2::new(10.0, 20.0));
        assert_eq!(replica.condition(), 100.0);
        assert!(replica.is_predicted());

        assert_worlds_match(&server, &test_client.client, 1e-4);
    }
}

#[test]
fn removing_a_container_removes_its_contents_everywhere() {
    let (mut server, mut clients) = setup(1);

    let crate_entity = spawn_one(
        &mut server,
        &mut clients,
        SpawnRequest::positioned(CRATE, Vec2::new(-3.0, 7.0)),
    );
    let inventory = InventoryAddress::new(crate_entity, 0);
    server.enqueue_spawn(SpawnRequest::contained(BARREL, inventory)).unwrap();
    server.enqueue_spawn(SpawnRequest::contained(BARREL, inventory)).unwrap();
    tick_and_exchange(&mut server, &mut clients);

    let client = &clients[0].client;
    let contents = client.world().registry().contents(&crate_entity);
    assert_eq!(contents.len(), 2);
    assert_worlds_match(&server, client, 1e-4);

    server.enqueue_remove(crate_entity).unwrap();
    let (mut server_events, mut client_events) = tick_and_exchange(&mut server, &mut clients);

    let mut expected = contents;
    expected.push(crate_entity);
    assert_eq!(server_events.read::<RemoveEntityEvent>().collect::<Vec<_>>(), expected);
    assert_eq!(
        client_events[0].read::<RemoveEntityEvent>().collect::<Vec<_>>(),
        expected
    );
    assert!(server.world().registry().is_empty());
    assert!(clients[0].client.world().registry().is_empty());
}

#[test]
fn full_inventory_spawn_lands_next_to_the_container() {
    let (mut server, mut clients) = setup(1);

    let pouch = spawn_one(
        &mut server,
        &mut clients,
        SpawnRequest::positioned(POUCH, Vec2::new(3.0, 4.0)),
    );
    let inventory = InventoryAddress::new(pouch, 0);
    server.enqueue_spawn(SpawnRequest::contained(BARREL, inventory)).unwrap();
    server.enqueue_spawn(SpawnRequest::contained(BARREL, inventory)).unwrap();
    let (mut server_events, _) = tick_and_exchange(&mut server, &mut clients);

    let spawned: Vec<EntityId> = server_events.read::<SpawnEntityEvent>().collect();
    assert_eq!(spawned.len(), 2);

    let registry = server.world().registry();
    assert!(registry.get(&spawned[0]).unwrap().container().is_some());
    let overflow = registry.get(&spawned[1]).unwrap();
    assert!(overflow.is_free_floating());
    assert_eq!(overflow.position(), Vec2::new(3.0, 4.0));

    assert_worlds_match(&server, &clients[0].client, 1e-4);
}

#[test]
fn entities_stay_in_sync_over_many_ticks() {
    let (mut server, mut clients) = setup(1);

    for index in 0..5 {
        server
            .enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::new(index as f32, 0.0)))
            .unwrap();
    }
    tick_and_exchange_n_times(&mut server, &mut clients, 20);

    let ids = server.world().registry().ids();
    server.enqueue_remove(ids[1]).unwrap();
    server.enqueue_remove(ids[3]).unwrap();
    tick_and_exchange_n_times(&mut server, &mut clients, 5);

    assert_eq!(server.world().registry().len(), 3);
    assert_worlds_match(&server, &clients[0].client, 1e-3);
}

#[test]
fn clients_cannot_spawn_or_remove() {
    init_logger();
    let mut simulation = Simulation::new(
        SyncConfig::default(),
        HostType::Client,
        Box::new(test_prefabs()),
    );
    simulation.begin_session();

    assert_eq!(
        simulation.enqueue_spawn(SpawnRequest::positioned(BARREL, Vec2::ZERO)),
        Err(SpawnError::NotAuthoritative)
    );
    assert_eq!(
        simulation.enqueue_remove(EntityId::from_u64(1)),
        Err(SpawnError::NotAuthoritative)
    );

    simulation.tick();
    assert!(simulation.world().registry().is_empty());
    assert!(simulation.take_outgoing().is_none());
}
