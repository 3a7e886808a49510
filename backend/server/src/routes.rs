use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use catalog::{
    Component, DEFAULT_USER, Idea, IdeaRequest, Stats, UserPreferences, seed::seed_components,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::{
    database::{Collection, Document, encode},
    error::AppError,
    generate, search,
    state::AppState,
    utils::{id_or_new, now},
};

type Shared = State<Arc<AppState>>;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize, Debug)]
pub struct Confirmation {
    pub message: String,
}

impl Confirmation {
    fn new(message: String) -> Json<Self> {
        Json(Self { message })
    }
}

#[derive(Deserialize)]
pub struct FavoriteParams {
    is_favorite: bool,
}

#[derive(Deserialize)]
pub struct SearchParams {
    query: String,
}

pub async fn health_handler() -> Json<Health> {
    Json(Health {
        status: "healthy",
        message: "Atal Idea Generator API is running",
    })
}

/// Never fails: store errors and an empty live catalog both fall back to
/// the starter catalog.
pub async fn list_components_handler(State(state): Shared) -> Json<Vec<Component>> {
    match state.store.all::<Component>(Collection::Components).await {
        Ok(components) if !components.is_empty() => Json(components),
        Ok(_) => {
            warn!("No components stored, returning fallback catalog");
            Json(seed_components())
        }
        Err(e) => {
            warn!("Error fetching components: {e}, returning fallback catalog");
            Json(seed_components())
        }
    }
}

pub async fn create_component_handler(
    State(state): Shared,
    payload: Result<Json<Component>, JsonRejection>,
) -> Result<Json<Component>, AppError> {
    let Json(mut component) = payload?;

    let id = id_or_new(component.id.take());
    component.id = Some(id.clone());
    component.created_at = Some(now());

    state
        .store
        .set(Collection::Components, &id, &component)
        .await
        .map_err(AppError::store("Error creating component"))?;

    info!("Component {} added", component.name);
    Ok(Json(component))
}

pub async fn get_component_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Component>, AppError> {
    state
        .store
        .get::<Component>(Collection::Components, &id)
        .await
        .map_err(AppError::store("Error fetching component"))?
        .map(Json)
        .ok_or(AppError::NotFound("Component"))
}

pub async fn delete_component_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, AppError> {
    let removed = state
        .store
        .delete(Collection::Components, &id)
        .await
        .map_err(AppError::store("Error deleting component"))?;

    if !removed {
        return Err(AppError::NotFound("Component"));
    }

    Ok(Confirmation::new(format!(
        "Component {id} deleted successfully"
    )))
}

pub async fn components_by_category_handler(
    State(state): Shared,
    Path(category): Path<String>,
) -> Result<Json<Vec<Component>>, AppError> {
    state
        .store
        .filter_eq(Collection::Components, "category", &Value::String(category))
        .await
        .map(Json)
        .map_err(AppError::store("Error fetching components by category"))
}

pub async fn list_ideas_handler(State(state): Shared) -> Result<Json<Vec<Idea>>, AppError> {
    state
        .store
        .all(Collection::Ideas)
        .await
        .map(Json)
        .map_err(AppError::store("Error fetching ideas"))
}

pub async fn create_idea_handler(
    State(state): Shared,
    payload: Result<Json<Idea>, JsonRejection>,
) -> Result<Json<Idea>, AppError> {
    let Json(mut idea) = payload?;

    let id = id_or_new(idea.id.take());
    idea.id = Some(id.clone());
    idea.created_at = Some(now());

    state
        .store
        .set(Collection::Ideas, &id, &idea)
        .await
        .map_err(AppError::store("Error saving idea"))?;

    Ok(Json(idea))
}

/// Merges over whatever is stored at `id`, creating it if absent.
pub async fn update_idea_handler(
    State(state): Shared,
    Path(id): Path<String>,
    payload: Result<Json<Idea>, JsonRejection>,
) -> Result<Json<Idea>, AppError> {
    let Json(mut idea) = payload?;

    idea.id = Some(id.clone());
    idea.updated_at = Some(now());

    let mut fields = encode(&idea).map_err(AppError::store("Error updating idea"))?;
    // An absent note clears the stored one; created_at is left as stored.
    fields.insert(
        "notes".to_string(),
        idea.notes.take().map_or(Value::Null, Value::String),
    );

    state
        .store
        .merge(Collection::Ideas, &id, &fields)
        .await
        .map(Json)
        .map_err(AppError::store("Error updating idea"))
}

pub async fn delete_idea_handler(
    State(state): Shared,
    Path(id): Path<String>,
) -> Result<Json<Confirmation>, AppError> {
    let removed = state
        .store
        .delete(Collection::Ideas, &id)
        .await
        .map_err(AppError::store("Error deleting idea"))?;

    if !removed {
        return Err(AppError::NotFound("Idea"));
    }

    Ok(Confirmation::new(format!("Idea {id} deleted successfully")))
}

pub async fn favorite_handler(
    State(state): Shared,
    Path(id): Path<String>,
    params: Result<Query<FavoriteParams>, QueryRejection>,
) -> Result<Json<Confirmation>, AppError> {
    let Query(FavoriteParams { is_favorite }) = params?;

    let mut fields = Document::new();
    fields.insert("is_favorite".to_string(), json!(is_favorite));

    let updated = state
        .store
        .update(Collection::Ideas, &id, fields)
        .await
        .map_err(AppError::store("Error updating favorite status"))?;

    if !updated {
        return Err(AppError::NotFound("Idea"));
    }

    Ok(Confirmation::new(format!(
        "Idea favorite status updated to {is_favorite}"
    )))
}

pub async fn search_handler(
    State(state): Shared,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Idea>>, AppError> {
    let Query(SearchParams { query }) = params?;

    search::search_ideas(&state.store, &query)
        .await
        .map(Json)
        .map_err(AppError::store("Error searching ideas"))
}

pub async fn generate_handler(
    State(state): Shared,
    payload: Result<Json<IdeaRequest>, JsonRejection>,
) -> Result<Json<Vec<Idea>>, AppError> {
    let Json(request) = payload?;

    generate::generate_ideas(&state.completion, &request)
        .await
        .map(Json)
}

/// Never fails: a missing document or a store error yields the defaults.
pub async fn get_preferences_handler(State(state): Shared) -> Json<UserPreferences> {
    match state
        .store
        .get::<UserPreferences>(Collection::Preferences, DEFAULT_USER)
        .await
    {
        Ok(Some(preferences)) => Json(preferences),
        Ok(None) => Json(UserPreferences::default()),
        Err(e) => {
            warn!("Error fetching preferences: {e}");
            Json(UserPreferences::default())
        }
    }
}

pub async fn save_preferences_handler(
    State(state): Shared,
    payload: Result<Json<UserPreferences>, JsonRejection>,
) -> Result<Json<UserPreferences>, AppError> {
    let Json(mut preferences) = payload?;

    preferences.id = Some(DEFAULT_USER.to_string());
    preferences.updated_at = Some(now());

    state
        .store
        .merge(Collection::Preferences, DEFAULT_USER, &preferences)
        .await
        .map(Json)
        .map_err(AppError::store("Error saving preferences"))
}

pub async fn stats_handler(State(state): Shared) -> Result<Json<Stats>, AppError> {
    let ideas = state
        .store
        .all::<Idea>(Collection::Ideas)
        .await
        .map_err(AppError::store("Error fetching stats"))?;

    let components_available = state
        .store
        .count(Collection::Components)
        .await
        .map_err(AppError::store("Error fetching stats"))?;

    Ok(Json(Stats {
        ideas_generated: ideas.len(),
        components_available,
        projects_completed: 0,
        favorite_ideas: ideas.iter().filter(|idea| idea.is_favorite).count(),
    }))
}
