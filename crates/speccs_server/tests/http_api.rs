use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use speccs_core::open_db_in_memory;
use speccs_server::{router, AppState};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(open_db_in_memory().unwrap()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_as(app, method, uri, body, None).await
}

async fn send_as(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    actor: Option<&str>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        request = request.header("x-actor", actor);
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, value)
}

/// Creates property -> building -> floor -> room and returns the room id.
async fn seed_room(app: &Router) -> String {
    let (status, property) = send(
        app,
        "POST",
        "/properties",
        Some(json!({"name": "123 Main St"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, building) = send(
        app,
        "POST",
        &format!("/properties/{}/buildings", property["id"].as_str().unwrap()),
        Some(json!({"name": "Main House", "building_type": "House"})),
    )
    .await;
    let (_, floor) = send(
        app,
        "POST",
        &format!("/buildings/{}/floors", building["id"].as_str().unwrap()),
        Some(json!({"name": "First Floor", "level_order": 0})),
    )
    .await;
    let (status, room) = send(
        app,
        "POST",
        &format!("/floors/{}/rooms", floor["id"].as_str().unwrap()),
        Some(json!({"name": "Kitchen"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    room["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn root_health_and_db_check() {
    let app = app();

    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("Hello, Speccs World!".to_string()));

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = send(&app, "GET", "/db_check", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["schema_version"].as_u64().unwrap() >= 1);
}

#[tokio::test]
async fn kitchen_door_reference_flow() {
    let app = app();
    let room_id = seed_room(&app).await;

    let (status, door) = send(
        &app,
        "POST",
        "/assets",
        Some(json!({"asset_type": "Door", "room_id": room_id, "name": "Back door"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(door["status"], "Active");
    assert!(door["location_angle"].is_null());
    assert!(door["location_height"].is_null());

    let (status, room) = send(
        &app,
        "PUT",
        &format!("/rooms/{room_id}/reference-door"),
        Some(json!({"asset_id": door["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(room["reference_door_asset_id"], door["id"]);

    let (_, outlet) = send(
        &app,
        "POST",
        "/assets",
        Some(json!({"asset_type": "Outlet", "room_id": room_id})),
    )
    .await;
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/rooms/{room_id}/reference-door"),
        Some(json!({"asset_id": outlet["id"]})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "constraint_violation");

    let (status, assets) = send(&app, "GET", &format!("/rooms/{room_id}/assets"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assets.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn error_statuses_follow_store_errors() {
    let app = app();
    let missing = uuid::Uuid::new_v4();

    let (status, body) = send(&app, "GET", &format!("/properties/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = send(&app, "GET", "/properties/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/properties", Some(json!({"name": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _) = send(
        &app,
        "POST",
        &format!("/floors/{missing}/rooms"),
        Some(json!({"name": "Attic"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", "/taxonomy/colors", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn connections_trace_and_purge_cascade() {
    let app = app();

    let (_, breaker) = send(
        &app,
        "POST",
        "/assets",
        Some(json!({"asset_type": "Breaker", "name": "Breaker 12"})),
    )
    .await;
    let (_, outlet) = send(
        &app,
        "POST",
        "/assets",
        Some(json!({"asset_type": "Outlet.Duplex", "name": "Counter outlet"})),
    )
    .await;

    let (status, connection) = send_as(
        &app,
        "POST",
        "/connections",
        Some(json!({
            "from_asset_id": breaker["id"],
            "to_asset_id": outlet["id"],
            "connection_type": "ElectricalPower"
        })),
        Some("electrician"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let breaker_id = breaker["id"].as_str().unwrap();
    let (status, neighbours) = send(
        &app,
        "GET",
        &format!("/assets/{breaker_id}/connections?direction=outgoing&type=ElectricalPower"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(neighbours[0]["asset"]["id"], outlet["id"]);
    assert_eq!(neighbours[0]["direction"], "outgoing");

    let (status, steps) = send(
        &app,
        "GET",
        &format!("/assets/{breaker_id}/trace?max_depth=3"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(steps.as_array().unwrap().len(), 1);
    assert_eq!(steps[0]["depth"], 1);

    let (status, journal) = send(
        &app,
        "GET",
        &format!("/assets/{breaker_id}/journal"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(journal[1]["action"], "Link");
    assert_eq!(journal[1]["actor"], "electrician");

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/assets/{breaker_id}?purge=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let connection_id = connection["id"].as_str().unwrap();
    let (status, _) = send(&app, "GET", &format!("/connections/{connection_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let outlet_id = outlet["id"].as_str().unwrap();
    let (status, outlet_after) = send(&app, "GET", &format!("/assets/{outlet_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outlet_after["name"], "Counter outlet");
}

#[tokio::test]
async fn soft_delete_replace_and_custom_journal() {
    let app = app();
    let room_id = seed_room(&app).await;

    let (_, fixture) = send(
        &app,
        "POST",
        "/assets",
        Some(json!({"asset_type": "Fixture", "room_id": room_id, "name": "Pendant"})),
    )
    .await;
    let fixture_id = fixture["id"].as_str().unwrap().to_string();

    let (status, replacement) = send(
        &app,
        "POST",
        &format!("/assets/{fixture_id}/replace"),
        Some(json!({"asset_type": "Fixture", "name": "LED pendant"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(replacement["room_id"].as_str(), Some(room_id.as_str()));

    let (_, old) = send(&app, "GET", &format!("/assets/{fixture_id}"), None).await;
    assert_eq!(old["status"], "Replaced");

    let replacement_id = replacement["id"].as_str().unwrap();
    let (status, entry) = send_as(
        &app,
        "POST",
        &format!("/assets/{replacement_id}/journal"),
        Some(json!({"action": "Inspect", "details": {"result": "pass"}})),
        Some("inspector"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(entry["action"], "Inspect");
    assert_eq!(entry["actor"], "inspector");

    for reserved in ["Create", "Update", "Delete", "Replace", "Link", "Unlink"] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/assets/{replacement_id}/journal"),
            Some(json!({"action": reserved})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{reserved}");
        assert_eq!(body["error"], "validation_error");
    }
    let (_, replacement_now) = send(&app, "GET", &format!("/assets/{replacement_id}"), None).await;
    assert_eq!(replacement_now["status"], "Active");

    let (status, deleted) = send(
        &app,
        "DELETE",
        &format!("/assets/{replacement_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["status"], "Deleted");

    let (_, visible) = send(&app, "GET", &format!("/assets?room_id={room_id}"), None).await;
    // Only the replaced fixture is still listed; the deleted one is hidden.
    assert_eq!(visible.as_array().unwrap().len(), 1);

    let (_, all) = send(
        &app,
        "GET",
        &format!("/assets?room_id={room_id}&include_deleted=true"),
        None,
    )
    .await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (status, _) = send_as(
        &app,
        "POST",
        &format!("/assets/{replacement_id}/journal"),
        Some(json!({"action": "Inspect"})),
        Some("   "),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn taxonomy_registration_enables_custom_connection_types() {
    let app = app();

    let (status, terms) = send(&app, "GET", "/taxonomy/connection_type", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(terms.as_array().unwrap().len(), 7);

    let (status, term) = send(
        &app,
        "POST",
        "/taxonomy/connection_type",
        Some(json!({"tag": "GasSupply", "description": "Natural gas"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(term["tag"], "GasSupply");
    assert_eq!(term["category"], "connection_type");

    let (status, _) = send(
        &app,
        "POST",
        "/taxonomy/connection_type",
        Some(json!({"tag": "GasSupply"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn file_database_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("speccs.sqlite3").display());

    let first = router(AppState::new(speccs_core::open_database_url(&url).unwrap()));
    let (status, property) = send(
        &first,
        "POST",
        "/properties",
        Some(json!({"name": "Lake cabin", "address": "1 Shore Rd"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    drop(first);

    let second = router(AppState::new(speccs_core::open_database_url(&url).unwrap()));
    let id = property["id"].as_str().unwrap();
    let (status, loaded) = send(&second, "GET", &format!("/properties/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(loaded["address"], "1 Shore Rd");
}
