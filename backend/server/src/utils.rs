use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// ISO-8601 timestamp for `created_at` / `updated_at` stamps.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Keeps a caller supplied id unless it is missing or blank.
pub fn id_or_new(id: Option<String>) -> String {
    id.filter(|id| !id.trim().is_empty()).unwrap_or_else(new_id)
}
