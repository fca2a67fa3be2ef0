use speccs_core::db::open_db_in_memory;
use speccs_core::{
    BuildingFields, EntityKind, FloorFields, InventoryStore, PropertyFields, RoomFields,
    StoreError, ValidationError,
};
use uuid::Uuid;

#[test]
fn create_and_read_full_ownership_chain() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();

    let property = store
        .create_property(&PropertyFields::new("  Maple House ").with_address("12 Maple St"))
        .unwrap();
    assert_eq!(property.name, "Maple House");
    assert_eq!(property.address.as_deref(), Some("12 Maple St"));
    assert!(property.created_at > 0);

    let building = store
        .create_building(property.id, &BuildingFields::new("Main").with_type("House"))
        .unwrap();
    assert_eq!(building.property_id, property.id);
    assert_eq!(building.building_type.as_deref(), Some("House"));

    let floor = store
        .create_floor(building.id, &FloorFields::new("Ground", 0))
        .unwrap();
    let room = store
        .create_room(floor.id, &RoomFields::new("Kitchen").with_description("North side"))
        .unwrap();
    assert_eq!(room.floor_id, floor.id);
    assert!(room.reference_door_asset_id.is_none());

    assert_eq!(store.get_property(property.id).unwrap(), property);
    assert_eq!(store.get_building(building.id).unwrap(), building);
    assert_eq!(store.get_floor(floor.id).unwrap(), floor);
    assert_eq!(store.get_room(room.id).unwrap(), room);

    assert_eq!(store.list_properties().unwrap(), vec![property.clone()]);
    assert_eq!(store.list_buildings(property.id).unwrap(), vec![building]);
    assert_eq!(store.list_rooms(floor.id).unwrap(), vec![room]);
}

#[test]
fn floors_list_by_level_order() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let property = store.create_property(&PropertyFields::new("Home")).unwrap();
    let building = store
        .create_building(property.id, &BuildingFields::new("House"))
        .unwrap();

    store
        .create_floor(building.id, &FloorFields::new("Upstairs", 1))
        .unwrap();
    store
        .create_floor(building.id, &FloorFields::new("Basement", -1))
        .unwrap();
    store
        .create_floor(building.id, &FloorFields::new("Ground", 0))
        .unwrap();

    let names: Vec<String> = store
        .list_floors(building.id)
        .unwrap()
        .into_iter()
        .map(|floor| floor.name)
        .collect();
    assert_eq!(names, vec!["Basement", "Ground", "Upstairs"]);
}

#[test]
fn missing_parent_is_reported_as_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = store
        .create_building(missing, &BuildingFields::new("Garage"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Property,
            id
        } if id == missing
    ));

    let err = store
        .create_floor(missing, &FloorFields::new("Ground", 0))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Building,
            ..
        }
    ));

    let err = store
        .create_room(missing, &RoomFields::new("Kitchen"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Floor,
            ..
        }
    ));

    let err = store.list_rooms(missing).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Floor,
            ..
        }
    ));
}

#[test]
fn blank_names_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();

    let err = store.create_property(&PropertyFields::new("   ")).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::BlankName { entity: "property" })
    ));
    assert!(store.list_properties().unwrap().is_empty());
}

#[test]
fn update_changes_fields_and_missing_rows_fail() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let property = store.create_property(&PropertyFields::new("Home")).unwrap();
    let building = store
        .create_building(property.id, &BuildingFields::new("House"))
        .unwrap();
    let floor = store
        .create_floor(building.id, &FloorFields::new("Ground", 0))
        .unwrap();
    let room = store.create_room(floor.id, &RoomFields::new("Den")).unwrap();

    let property = store
        .update_property(
            property.id,
            &PropertyFields::new("Lake House").with_address("1 Shore Rd"),
        )
        .unwrap();
    assert_eq!(property.name, "Lake House");
    assert_eq!(property.address.as_deref(), Some("1 Shore Rd"));

    let floor = store
        .update_floor(floor.id, &FloorFields::new("Main", 2))
        .unwrap();
    assert_eq!(floor.level_order, 2);

    let room = store
        .update_room(room.id, &RoomFields::new("Study"))
        .unwrap();
    assert_eq!(room.name, "Study");
    assert!(room.description.is_none());

    let err = store
        .update_building(Uuid::new_v4(), &BuildingFields::new("Shed"))
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Building,
            ..
        }
    ));

    let err = store.delete_room(Uuid::new_v4()).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            entity: EntityKind::Room,
            ..
        }
    ));
}

#[test]
fn get_unknown_entities_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();
    let id = Uuid::new_v4();

    assert!(matches!(
        store.get_property(id).unwrap_err(),
        StoreError::NotFound {
            entity: EntityKind::Property,
            ..
        }
    ));
    assert!(matches!(
        store.get_room(id).unwrap_err(),
        StoreError::NotFound {
            entity: EntityKind::Room,
            ..
        }
    ));
}
