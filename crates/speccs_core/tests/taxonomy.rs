use speccs_core::db::open_db_in_memory;
use speccs_core::{
    ConstraintViolation, InventoryStore, StoreError, TaxonomyCategory, ValidationError,
};

#[test]
fn builtin_terms_are_seeded_and_listed_first() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();

    store
        .register_term(TaxonomyCategory::ConnectionType, "Antenna", "Coax feed")
        .unwrap();

    let terms = store.list_terms(TaxonomyCategory::ConnectionType).unwrap();
    assert_eq!(terms.len(), 8);
    assert!(terms[..7].iter().all(|term| term.is_builtin));
    let last = terms.last().unwrap();
    assert_eq!(last.tag, "Antenna");
    assert_eq!(last.description, "Coax feed");
    assert!(!last.is_builtin);

    let actions: Vec<String> = store
        .list_terms(TaxonomyCategory::JournalAction)
        .unwrap()
        .into_iter()
        .map(|term| term.tag)
        .collect();
    for expected in ["Create", "Update", "Replace", "Delete", "Link", "Unlink"] {
        assert!(actions.iter().any(|tag| tag == expected), "missing {expected}");
    }

    assert!(store
        .is_registered(TaxonomyCategory::AssetType, "WallSegment")
        .unwrap());
    assert!(!store
        .is_registered(TaxonomyCategory::AssetType, "HotTub")
        .unwrap());
}

#[test]
fn duplicate_and_malformed_terms_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let store = InventoryStore::try_new(&conn).unwrap();

    let err = store
        .register_term(TaxonomyCategory::ConnectionType, "WaterSupply", "again")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Constraint(ConstraintViolation::DuplicateTerm { .. })
    ));

    let err = store
        .register_term(TaxonomyCategory::AssetType, "hot tub", "")
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::InvalidTag { .. })
    ));

    let term = store
        .register_term(TaxonomyCategory::AssetType, " HotTub ", " Outdoor spa ")
        .unwrap();
    assert_eq!(term.tag, "HotTub");
    assert_eq!(term.description, "Outdoor spa");
    assert_eq!(term.category, TaxonomyCategory::AssetType);
}
