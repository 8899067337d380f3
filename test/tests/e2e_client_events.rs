use tether_client::ClientConfig;
use tether_server::{Server, ServerConfig};
use tether_shared::{
    Attribute, AttributeChangeEvent, BitWriter, ComponentState, ComponentStateEvent,
    DispatchError, DispatchErrorEvent, EntityEventKind, EntityId, EventPayload,
    SpawnEntityEvent, SpawnRequest, SubObject, SubObjectIndex, Vec2, World, WorldEvents,
};
use tether_test::{assert_worlds_match, test_prefabs, tick_and_exchange, TestClient, CRAWLER};

fn init_logger() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn setup_with_crawler() -> (Server, Vec<TestClient>, EntityId) {
    init_logger();
    let mut server = Server::new(ServerConfig::default(), test_prefabs());
    server.listen();
    let mut clients = vec![TestClient::join(&mut server, ClientConfig::default())];

    server
        .enqueue_spawn(SpawnRequest::positioned(CRAWLER, Vec2::new(2.0, 3.0)))
        .unwrap();
    let (mut events, _) = tick_and_exchange(&mut server, &mut clients);
    let crawler = events.read::<SpawnEntityEvent>().next().unwrap();
    (server, clients, crawler)
}

/// Runs a few exchanges and returns every event the server recorded
fn server_events_over(server: &mut Server, clients: &mut [TestClient], ticks: usize) -> Vec<WorldEvents> {
    (0..ticks)
        .map(|_| tick_and_exchange(server, clients).0)
        .collect()
}

fn device_charge(world: &World, crawler: &EntityId) -> f32 {
    match world.registry().get(crawler).unwrap().sub_object(2) {
        Some(SubObject::Device(device)) => device.charge(),
        other => panic!("expected a device, found {:?}", other),
    }
}

#[test]
fn client_attribute_change_reaches_the_server() {
    let (mut server, mut clients, crawler) = setup_with_crawler();

    clients[0].client.write_event(
        crawler,
        SubObjectIndex::Index(2),
        EventPayload::AttributeChanged {
            attribute: Attribute::Charge,
            value: 0.5,
        },
    );

    let changes: Vec<_> = server_events_over(&mut server, &mut clients, 3)
        .iter_mut()
        .flat_map(|events| events.read::<AttributeChangeEvent>().collect::<Vec<_>>())
        .collect();

    assert_eq!(
        changes,
        vec![(crawler, SubObjectIndex::Index(2), Attribute::Charge, 0.5)]
    );
    assert_eq!(device_charge(server.world(), &crawler), 0.5);
}

#[test]
fn host_relays_accepted_state_to_other_observers() {
    let (mut server, mut clients, crawler) = setup_with_crawler();
    let observer = TestClient::join(&mut server, ClientConfig::default());
    clients.push(observer);
    server_events_over(&mut server, &mut clients, 2);

    clients[0].client.write_event(
        crawler,
        SubObjectIndex::Index(2),
        EventPayload::AttributeChanged {
            attribute: Attribute::Charge,
            value: 0.25,
        },
    );
    server_events_over(&mut server, &mut clients, 5);

    assert_eq!(device_charge(server.world(), &crawler), 0.25);
    for test_client in &clients {
        assert_eq!(device_charge(test_client.client.world(), &crawler), 0.25);
        assert_worlds_match(&server, &test_client.client, 0.05);
    }
}

#[test]
fn host_relays_component_state_from_a_client() {
    let (mut server, mut clients, crawler) = setup_with_crawler();
    let observer = TestClient::join(&mut server, ClientConfig::default());
    clients.push(observer);
    server_events_over(&mut server, &mut clients, 2);

    // the client ships a whole device state blob rather than a single attribute
    let mut device = server
        .world()
        .registry()
        .get(&crawler)
        .unwrap()
        .sub_object(2)
        .unwrap()
        .clone();
    assert!(device.set_attribute(Attribute::Charge, 0.9));
    let mut writer = BitWriter::new();
    device.write_state(&mut writer);
    clients[0].client.write_event(
        crawler,
        SubObjectIndex::Index(2),
        EventPayload::ComponentState(ComponentState::new(writer.to_bytes())),
    );

    let changes: Vec<_> = server_events_over(&mut server, &mut clients, 5)
        .iter_mut()
        .flat_map(|events| events.read::<ComponentStateEvent>().collect::<Vec<_>>())
        .collect();

    assert_eq!(changes, vec![(crawler, 2)]);
    assert_eq!(device_charge(clients[1].client.world(), &crawler), 0.9);
}

#[test]
fn client_removal_is_not_permitted() {
    let (mut server, mut clients, crawler) = setup_with_crawler();

    clients[0]
        .client
        .write_event(crawler, SubObjectIndex::Whole, EventPayload::EntityRemoved);

    let errors: Vec<DispatchError> = server_events_over(&mut server, &mut clients, 3)
        .iter_mut()
        .flat_map(|events| events.read::<DispatchErrorEvent>().collect::<Vec<_>>())
        .collect();

    assert_eq!(
        errors,
        vec![DispatchError::NotPermitted {
            entity: crawler,
            kind: EntityEventKind::EntityRemoved,
        }]
    );
    assert!(server.world().registry().contains(&crawler));
    assert!(clients[0].client.world().registry().contains(&crawler));
}

#[test]
fn event_for_missing_sub_object_is_dropped() {
    let (mut server, mut clients, crawler) = setup_with_crawler();

    clients[0].client.write_event(
        crawler,
        SubObjectIndex::Index(9),
        EventPayload::AttributeChanged {
            attribute: Attribute::Health,
            value: 1.0,
        },
    );
    clients[0].client.write_event(
        crawler,
        SubObjectIndex::Index(2),
        EventPayload::AttributeChanged {
            attribute: Attribute::Charge,
            value: 0.75,
        },
    );

    let mut events = server_events_over(&mut server, &mut clients, 3);
    let errors: Vec<DispatchError> = events
        .iter_mut()
        .flat_map(|events| events.read::<DispatchErrorEvent>().collect::<Vec<_>>())
        .collect();

    assert_eq!(
        errors,
        vec![DispatchError::SubObjectOutOfRange {
            entity: crawler,
            index: 9,
            count: 4,
            kind: EntityEventKind::AttributeChanged,
        }]
    );
    // the envelope after the bad one still applies
    assert_eq!(device_charge(server.world(), &crawler), 0.75);
}
