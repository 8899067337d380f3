use tether_client::Client;
use tether_server::Server;

/// Asserts the client mirrors the server's world: same entities, prefabs,
/// containment and condition, and free-floating positions within `tolerance`.
pub fn assert_worlds_match(server: &Server, client: &Client, tolerance: f32) {
    let server_registry = server.world().registry();
    let client_registry = client.world().registry();

    assert_eq!(
        server_registry.ids(),
        client_registry.ids(),
        "entity sets differ"
    );

    for expected in server_registry.iter() {
        let actual = client_registry
            .get(&expected.id())
            .unwrap_or_else(|| panic!("client is missing {}", expected.id()));

        assert_eq!(expected.prefab(), actual.prefab(), "prefab of {}", expected.id());
        assert_eq!(expected.container(), actual.container(), "container of {}", expected.id());
        assert_eq!(expected.condition(), actual.condition(), "condition of {}", expected.id());
        assert_eq!(expected.sub_objects(), actual.sub_objects(), "sub-objects of {}", expected.id());

        if expected.is_free_floating() {
            let distance = expected.position().distance(actual.position());
            assert!(
                distance <= tolerance,
                "{} is {} away from the server position",
                expected.id(),
                distance
            );
        }
    }
}
