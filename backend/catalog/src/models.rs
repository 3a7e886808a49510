use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::DEFAULT_USER;

/// Specification values are flat: text, whole numbers, decimals, flags or null.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Flag(bool),
    Integer(i64),
    Unsigned(u64),
    Decimal(f64),
    Text(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Component {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: f64,
    #[serde(default = "available")]
    pub availability: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<BTreeMap<String, Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn available() -> String {
    "Available".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Idea {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub problem_statement: String,
    pub working_principle: String,
    pub difficulty: String,
    pub estimated_cost: String,
    /// Component names as free text, not catalog ids.
    pub components: Vec<String>,
    pub innovation_elements: Vec<String>,
    pub scalability_options: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Idea {
    /// Text the naive search looks through: title, description and tags.
    pub fn search_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description,
            self.tags.join(" ")
        )
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default = "beginner")]
    pub skill_level: String,
    #[serde(default)]
    pub selected_themes: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub dark_mode_enabled: bool,
    #[serde(default = "short_term")]
    pub project_duration: String,
    #[serde(default = "individual")]
    pub team_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            id: Some(DEFAULT_USER.to_string()),
            skill_level: beginner(),
            selected_themes: Vec::new(),
            interests: Vec::new(),
            dark_mode_enabled: false,
            project_duration: short_term(),
            team_size: individual(),
            updated_at: None,
        }
    }
}

fn beginner() -> String {
    "Beginner".to_string()
}

fn short_term() -> String {
    "Short-term".to_string()
}

fn individual() -> String {
    "Individual".to_string()
}

/// Body of `POST /api/generate-ideas`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct IdeaRequest {
    pub selected_components: Vec<String>,
    pub theme: String,
    #[serde(default = "beginner")]
    pub skill_level: String,
    #[serde(default = "five")]
    pub count: u32,
}

fn five() -> u32 {
    5
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Stats {
    pub ideas_generated: usize,
    pub components_available: usize,
    pub projects_completed: usize,
    pub favorite_ideas: usize,
}
