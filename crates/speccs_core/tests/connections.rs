use rusqlite::Connection as SqliteConnection;
use speccs_core::db::open_db_in_memory;
use speccs_core::{
    Asset, AssetType, AttributeValue, ConnectionType, Direction, EntityKind, InventoryStore,
    NewConnection, StoreError, TaxonomyCategory, TraversalQuery, ValidationError,
    MAX_TRACE_DEPTH,
};
use uuid::Uuid;

fn create(store: &InventoryStore<'_>, tag: &str, name: &str) -> Asset {
    store
        .create_asset(&Asset::new(AssetType::parse(tag).unwrap()).named(name))
        .unwrap()
}

fn link(store: &InventoryStore<'_>, from: &Asset, to: &Asset, kind: ConnectionType) {
    store
        .create_connection(&NewConnection::new(from.id, to.id, kind))
        .unwrap();
}

fn names(assets: impl IntoIterator<Item = Asset>) -> Vec<String> {
    assets
        .into_iter()
        .map(|asset| asset.name.unwrap_or_default())
        .collect()
}

#[test]
fn deleting_breaker_removes_connection_and_keeps_outlet() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let breaker = create(&store, "Breaker", "Breaker 12");
    let outlet = create(&store, "Outlet", "Counter outlet");

    let connection = store
        .create_connection(&NewConnection::new(
            breaker.id,
            outlet.id,
            ConnectionType::ElectricalPower,
        ))
        .unwrap();

    store.purge_asset(breaker.id).unwrap();

    let err = store.get_connection(connection.id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Connection,
            ..
        }
    ));
    assert_eq!(count(&conn, "connections"), 0);

    let outlet_after = store.get_asset(outlet.id).unwrap();
    assert_eq!(outlet_after.name.as_deref(), Some("Counter outlet"));
    assert!(outlet_after.is_active());
}

#[test]
fn purging_breaker_journals_unlink_on_surviving_outlet() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let breaker = create(&store, "Breaker", "Breaker 14");
    let outlet = create(&store, "Outlet", "Island outlet");
    let connection = store
        .create_connection(&NewConnection::new(
            breaker.id,
            outlet.id,
            ConnectionType::ElectricalPower,
        ))
        .unwrap();

    store.purge_asset(breaker.id).unwrap();

    let journal = store.list_journal(outlet.id).unwrap();
    let actions: Vec<&str> = journal.iter().map(|entry| entry.action.as_str()).collect();
    assert_eq!(actions, vec!["Create", "Link", "Unlink"]);

    let unlink = &journal[2];
    assert_eq!(
        unlink.details.get("connection_id"),
        Some(&AttributeValue::Text(connection.id.to_string()))
    );
    assert_eq!(
        unlink.details.get("peer_asset_id"),
        Some(&AttributeValue::Text(breaker.id.to_string()))
    );
    assert_eq!(
        unlink.details.get("direction"),
        Some(&AttributeValue::Text("incoming".to_string()))
    );
}

#[test]
fn connection_requires_existing_distinct_endpoints_and_registered_type() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let valve = create(&store, "Valve", "Main shutoff");
    let pipe = create(&store, "Pipe", "Cold supply");

    let err = store
        .create_connection(&NewConnection::new(
            valve.id,
            valve.id,
            ConnectionType::WaterSupply,
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::SelfLoop(id)) if id == valve.id
    ));

    let err = store
        .create_connection(&NewConnection::new(
            valve.id,
            Uuid::new_v4(),
            ConnectionType::WaterSupply,
        ))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Asset,
            ..
        }
    ));

    let gas = ConnectionType::parse("GasSupply").unwrap();
    let err = store
        .create_connection(&NewConnection::new(valve.id, pipe.id, gas.clone()))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::UnregisteredTag {
            category: TaxonomyCategory::ConnectionType,
            ..
        })
    ));

    store
        .register_term(TaxonomyCategory::ConnectionType, "GasSupply", "Natural gas line")
        .unwrap();
    let created = store
        .create_connection(&NewConnection::new(valve.id, pipe.id, gas.clone()))
        .unwrap();
    assert_eq!(created.connection_type, gas);
}

#[test]
fn link_and_unlink_are_journaled_on_both_endpoints() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let switch = create(&store, "Switch", "Hall switch");
    let fixture = create(&store, "Fixture", "Hall light");

    let mut input = NewConnection::new(switch.id, fixture.id, ConnectionType::ControlSignal);
    input.notes = Some("  three-way  ".to_string());
    let connection = store.create_connection(&input).unwrap();
    assert_eq!(connection.notes.as_deref(), Some("three-way"));

    store.delete_connection(connection.id).unwrap();

    let switch_journal = store.list_journal(switch.id).unwrap();
    let fixture_journal = store.list_journal(fixture.id).unwrap();
    let switch_actions: Vec<&str> = switch_journal
        .iter()
        .map(|entry| entry.action.as_str())
        .collect();
    assert_eq!(switch_actions, vec!["Create", "Link", "Unlink"]);
    assert_eq!(fixture_journal.len(), 3);

    let link = &switch_journal[1];
    assert_eq!(
        link.details.get("peer_asset_id"),
        Some(&AttributeValue::Text(fixture.id.to_string()))
    );
    assert_eq!(
        link.details.get("direction"),
        Some(&AttributeValue::Text("outgoing".to_string()))
    );
    assert_eq!(
        fixture_journal[1].details.get("direction"),
        Some(&AttributeValue::Text("incoming".to_string()))
    );

    let err = store.delete_connection(connection.id).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Connection,
            ..
        }
    ));
}

#[test]
fn connected_assets_filter_by_direction_and_type() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let panel = create(&store, "Panel", "Main panel");
    let breaker = create(&store, "Breaker", "Breaker 3");
    let outlet = create(&store, "Outlet", "Garage outlet");
    let router = create(&store, "Appliance", "Router");

    link(&store, &panel, &breaker, ConnectionType::ElectricalPower);
    link(&store, &breaker, &outlet, ConnectionType::ElectricalPower);
    link(&store, &outlet, &router, ConnectionType::ElectricalPower);
    link(&store, &breaker, &router, ConnectionType::DataNetwork);

    let both = store
        .connected_assets(breaker.id, &TraversalQuery::default())
        .unwrap();
    assert_eq!(
        names(both.iter().map(|hit| hit.asset.clone())),
        vec!["Main panel", "Garage outlet", "Router"]
    );
    assert_eq!(both[0].direction, Direction::Incoming);
    assert_eq!(both[1].direction, Direction::Outgoing);

    let outgoing_power = store
        .connected_assets(
            breaker.id,
            &TraversalQuery::new(Direction::Outgoing).of_type(ConnectionType::ElectricalPower),
        )
        .unwrap();
    assert_eq!(
        names(outgoing_power.into_iter().map(|hit| hit.asset)),
        vec!["Garage outlet"]
    );

    let incoming = store
        .connected_assets(breaker.id, &TraversalQuery::new(Direction::Incoming))
        .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].asset.id, panel.id);

    let err = store
        .connected_assets(Uuid::new_v4(), &TraversalQuery::default())
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Asset,
            ..
        }
    ));
}

#[test]
fn trace_walks_breadth_first_and_stops_on_cycles() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let a = create(&store, "Pipe", "A");
    let b = create(&store, "Pipe", "B");
    let c = create(&store, "Pipe", "C");
    let d = create(&store, "Valve", "D");

    link(&store, &a, &b, ConnectionType::WaterSupply);
    link(&store, &b, &c, ConnectionType::WaterSupply);
    link(&store, &c, &a, ConnectionType::WaterSupply);
    link(&store, &c, &d, ConnectionType::WaterSupply);

    let steps = store
        .trace(a.id, &TraversalQuery::new(Direction::Outgoing), 10)
        .unwrap();
    let reached: Vec<(String, u32)> = steps
        .iter()
        .map(|step| (step.asset.name.clone().unwrap_or_default(), step.depth))
        .collect();
    assert_eq!(
        reached,
        vec![
            ("B".to_string(), 1),
            ("C".to_string(), 2),
            ("D".to_string(), 3)
        ]
    );
    assert_eq!(steps[2].parent_asset_id, c.id);
    assert_eq!(steps[2].via.to_asset_id, d.id);

    let shallow = store
        .trace(a.id, &TraversalQuery::new(Direction::Outgoing), 1)
        .unwrap();
    assert_eq!(shallow.len(), 1);

    let upstream = store
        .trace(d.id, &TraversalQuery::new(Direction::Incoming), 5)
        .unwrap();
    assert_eq!(names(upstream.into_iter().map(|step| step.asset)), vec!["C", "B", "A"]);
}

#[test]
fn trace_rejects_out_of_range_depth() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let pipe = create(&store, "Pipe", "Lonely");

    for depth in [0, MAX_TRACE_DEPTH + 1] {
        let err = store
            .trace(pipe.id, &TraversalQuery::default(), depth)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidTraceDepth { .. })
        ));
    }
    assert!(store
        .trace(pipe.id, &TraversalQuery::default(), MAX_TRACE_DEPTH)
        .unwrap()
        .is_empty());
}

fn count(conn: &SqliteConnection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
