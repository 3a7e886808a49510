use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use catalog::seed::seed_components;
use serde_json::{Value, json};
use server::{
    app,
    config::Config,
    credentials::StoreMode,
    database::{Collection, MemoryStore, Store},
    state::AppState,
};
use tower::ServiceExt;

fn offline_app() -> Router {
    let config = Config::default();
    let store = Store::from_mode(&StoreMode::Offline, &config.store_prefix);

    app(AppState::with_store(config, store))
}

fn empty_app() -> (Router, Arc<AppState>) {
    let state = AppState::with_store(Config::default(), Store::Memory(MemoryStore::new()));

    (app(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn idea(title: &str, tags: &[&str]) -> Value {
    json!({
        "title": title,
        "description": "A small build",
        "problem_statement": "Something is tedious",
        "working_principle": "A sensor triggers an actuator",
        "difficulty": "Beginner",
        "estimated_cost": "₹1,000",
        "components": ["Arduino Uno"],
        "innovation_elements": ["Low cost"],
        "scalability_options": ["Add WiFi"],
        "tags": tags
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&offline_app(), "GET", "/api/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_offline_components_are_fallback_catalog() {
    let (status, body) = send(&offline_app(), "GET", "/api/components", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::to_value(seed_components()).unwrap());

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        [
            "Arduino Uno",
            "Servo Motor SG90",
            "Ultrasonic Sensor HC-SR04",
            "LED Strip WS2812B",
            "ESP32 DevKit",
        ]
    );
}

#[tokio::test]
async fn test_empty_store_lists_fallback_catalog() {
    let (app, _) = empty_app();
    let (status, body) = send(&app, "GET", "/api/components", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_create_component_assigns_id_and_timestamp() {
    let (app, _) = empty_app();
    let payload = json!({
        "name": "Relay Module",
        "category": "Switches",
        "description": "Single channel 5V relay",
        "price": 80.0
    });

    let (status, first) = send(&app, "POST", "/api/components", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&app, "POST", "/api/components", Some(payload)).await;

    let first_id = first["id"].as_str().unwrap();
    assert!(!first_id.is_empty());
    assert_ne!(first_id, second["id"].as_str().unwrap());
    assert_eq!(first["availability"], "Available");
    assert!(
        chrono::DateTime::parse_from_rfc3339(first["created_at"].as_str().unwrap()).is_ok()
    );

    let (status, fetched) = send(&app, "GET", &format!("/api/components/{first_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Relay Module");
}

#[tokio::test]
async fn test_create_component_keeps_caller_id() {
    let (app, _) = empty_app();
    let payload = json!({
        "id": "relay-1",
        "name": "Relay Module",
        "category": "Switches",
        "description": "Single channel 5V relay",
        "price": 80.0
    });

    let (_, body) = send(&app, "POST", "/api/components", Some(payload)).await;

    assert_eq!(body["id"], "relay-1");
}

#[tokio::test]
async fn test_malformed_component_is_rejected() {
    let (app, _) = empty_app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/components",
        Some(json!({ "name": "No price" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_missing_component_is_not_found() {
    let (status, body) = send(&offline_app(), "GET", "/api/components/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Component not found");
}

#[tokio::test]
async fn test_delete_component_twice() {
    let app = offline_app();

    let (status, body) = send(&app, "DELETE", "/api/components/comp_2", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Component comp_2 deleted successfully");

    let (status, _) = send(&app, "DELETE", "/api/components/comp_2", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_components_by_category() {
    let (status, body) = send(
        &offline_app(),
        "GET",
        "/api/components/category/Microcontrollers",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["comp_1", "comp_5"]);
}

#[tokio::test]
async fn test_idea_lifecycle() {
    let (app, _) = empty_app();

    let (status, created) = send(&app, "POST", "/api/ideas", Some(idea("Plant Guard", &[]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["is_favorite"], false);
    let id = created["id"].as_str().unwrap().to_string();

    let mut changed = idea("Plant Guard Pro", &["garden"]);
    changed["notes"] = json!("Use a bigger pump");
    let (status, updated) = send(&app, "PUT", &format!("/api/ideas/{id}"), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Plant Guard Pro");
    assert_eq!(updated["created_at"], created["created_at"]);
    assert!(updated["updated_at"].is_string());

    let (_, ideas) = send(&app, "GET", "/api/ideas", None).await;
    assert_eq!(ideas.as_array().unwrap().len(), 1);
    assert_eq!(ideas[0]["notes"], "Use a bigger pump");

    let (status, _) = send(&app, "DELETE", &format!("/api/ideas/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &format!("/api/ideas/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_is_reflected_in_listing() {
    let (app, _) = empty_app();
    let (_, first) = send(&app, "POST", "/api/ideas", Some(idea("One", &[]))).await;
    let (_, second) = send(&app, "POST", "/api/ideas", Some(idea("Two", &[]))).await;
    let first_id = first["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/ideas/{first_id}/favorite?is_favorite=true"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Idea favorite status updated to true");

    let (_, ideas) = send(&app, "GET", "/api/ideas", None).await;
    for listed in ideas.as_array().unwrap() {
        if listed["id"] == first["id"] {
            assert_eq!(listed["is_favorite"], true);
            assert_eq!(listed["title"], "One");
        } else {
            assert_eq!(listed["id"], second["id"]);
            assert_eq!(listed["is_favorite"], false);
        }
    }
}

#[tokio::test]
async fn test_favorite_on_missing_idea() {
    let (app, _) = empty_app();

    let (status, _) = send(
        &app,
        "PATCH",
        "/api/ideas/ghost/favorite?is_favorite=true",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_favorite_requires_flag() {
    let (app, _) = empty_app();
    let (_, created) = send(&app, "POST", "/api/ideas", Some(idea("One", &[]))).await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = send(&app, "PATCH", &format!("/api/ideas/{id}/favorite"), None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_search() {
    let (app, _) = empty_app();
    send(&app, "POST", "/api/ideas", Some(idea("Night Light", &["led"]))).await;
    send(&app, "POST", "/api/ideas", Some(idea("Door Alarm", &["security"]))).await;

    let (status, found) = send(&app, "GET", "/api/ideas/search?query=security", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Door Alarm");

    let (_, found) = send(&app, "GET", "/api/ideas/search?query=LED", None).await;
    assert_eq!(found[0]["title"], "Night Light");

    let (_, found) = send(&app, "GET", "/api/ideas/search?query=submarine", None).await;
    assert!(found.as_array().unwrap().is_empty());

    let (_, found) = send(&app, "GET", "/api/ideas/search?query=", None).await;
    assert_eq!(found.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_generate_without_key() {
    let (status, body) = send(
        &offline_app(),
        "POST",
        "/api/generate-ideas",
        Some(json!({ "selected_components": ["ESP32 DevKit"], "theme": "Farming" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["detail"], "OpenAI API key not configured");
}

#[tokio::test]
async fn test_preferences_default_then_saved() {
    let (app, _) = empty_app();

    let (status, prefs) = send(&app, "GET", "/api/preferences", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(prefs["id"], "default_user");
    assert_eq!(prefs["skill_level"], "Beginner");

    let (status, saved) = send(
        &app,
        "POST",
        "/api/preferences",
        Some(json!({ "skill_level": "Advanced", "dark_mode_enabled": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(saved["updated_at"].is_string());

    let (_, prefs) = send(&app, "GET", "/api/preferences", None).await;
    assert_eq!(prefs["skill_level"], "Advanced");
    assert_eq!(prefs["dark_mode_enabled"], true);
    assert_eq!(prefs["team_size"], "Individual");
}

#[tokio::test]
async fn test_stats() {
    let (app, state) = empty_app();
    let (_, created) = send(&app, "POST", "/api/ideas", Some(idea("One", &[]))).await;
    send(&app, "POST", "/api/ideas", Some(idea("Two", &[]))).await;
    let id = created["id"].as_str().unwrap();
    send(
        &app,
        "PATCH",
        &format!("/api/ideas/{id}/favorite?is_favorite=true"),
        None,
    )
    .await;

    let (status, stats) = send(&app, "GET", "/api/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats,
        json!({
            "ideas_generated": 2,
            "components_available": 0,
            "projects_completed": 0,
            "favorite_ideas": 1
        })
    );
    assert!(!state.store.is_live());
}

#[tokio::test]
async fn test_put_without_notes_clears_them() {
    let (app, _) = empty_app();
    let mut noted = idea("Plant Guard", &[]);
    noted["notes"] = json!("old note");
    let (_, created) = send(&app, "POST", "/api/ideas", Some(noted)).await;
    let id = created["id"].as_str().unwrap();

    let mut cleared = idea("Plant Guard", &[]);
    cleared["notes"] = Value::Null;
    let (status, updated) = send(&app, "PUT", &format!("/api/ideas/{id}"), Some(cleared)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated.get("notes").is_none());
    assert_eq!(updated["created_at"], created["created_at"]);

    let (_, ideas) = send(&app, "GET", "/api/ideas", None).await;
    assert!(ideas[0].get("notes").is_none());
}

#[tokio::test]
async fn test_undecodable_ideas_are_server_errors() {
    let (app, state) = empty_app();
    state
        .store
        .set(Collection::Ideas, "bad", &json!({ "title": "x" }))
        .await
        .unwrap();

    for uri in ["/api/ideas", "/api/ideas/search?query=x", "/api/stats"] {
        let (status, body) = send(&app, "GET", uri, None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert!(
            body["detail"].as_str().unwrap().contains("Malformed document"),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_undecodable_preferences_fall_back_to_defaults() {
    let (app, state) = empty_app();
    state
        .store
        .set(
            Collection::Preferences,
            "default_user",
            &json!({ "skill_level": 3 }),
        )
        .await
        .unwrap();

    let (status, prefs) = send(&app, "GET", "/api/preferences", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        prefs,
        serde_json::to_value(catalog::UserPreferences::default()).unwrap()
    );
}

#[tokio::test]
async fn test_undecodable_components() {
    let (app, state) = empty_app();
    state
        .store
        .set(
            Collection::Components,
            "broken",
            &json!({ "name": "Broken", "category": "Sensors" }),
        )
        .await
        .unwrap();

    let (status, body) = send(&app, "GET", "/api/components/category/Sensors", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());

    let (status, body) = send(&app, "GET", "/api/components", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::to_value(seed_components()).unwrap());
}
