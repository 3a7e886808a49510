//! # Idea Generation
//!
//! One chat completion call per request. The reply text must be a JSON array
//! of ideas; anything else is reported as a parse failure, never repaired.
//! Each idea gets a fresh id, `is_favorite = false` and a creation stamp.
use catalog::{Idea, IdeaRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::AppError,
    utils::{new_id, now},
};

pub const MAX_TOKENS: u32 = 2000;
pub const TEMPERATURE: f32 = 0.8;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

#[derive(Clone)]
pub struct CompletionClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl CompletionClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.openai_endpoint.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
            api_key: config.openai_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let api_key = self.api_key.as_deref().ok_or(AppError::MissingApiKey)?;

        let request = CompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.endpoint))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Completion(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Completion API returned {status}");

            return Err(AppError::Completion(format!("status {status}: {body}")));
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Completion(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::Completion("empty completion".to_string()))
    }
}

pub fn build_prompt(request: &IdeaRequest) -> String {
    let components = request.selected_components.join(", ");

    format!(
        r#"Generate {count} innovative project ideas using these electronic components: {components}

Theme: {theme}
Skill Level: {skill}

For each idea, provide:
1. Title (creative and engaging)
2. Description (2-3 sentences)
3. Problem Statement (what problem does it solve)
4. Working Principle (how it works technically)
5. Difficulty level (Beginner/Intermediate/Advanced)
6. Estimated Cost (in ₹)
7. Innovation Elements (unique features)
8. Scalability Options (how to expand the project)
9. Tags (relevant keywords)

Format as JSON array with these exact fields:
[{{
    "title": "Project Title",
    "description": "Brief description",
    "problem_statement": "Problem it solves",
    "working_principle": "How it works",
    "difficulty": "Beginner/Intermediate/Advanced",
    "estimated_cost": "₹X,XXX",
    "components": [list of components used],
    "innovation_elements": [list of unique features],
    "scalability_options": [list of expansion possibilities],
    "tags": [relevant tags]
}}]"#,
        count = request.count,
        theme = request.theme,
        skill = request.skill_level,
    )
}

/// Parses the reply text and stamps every idea.
pub fn parse_ideas(reply: &str) -> Result<Vec<Idea>, AppError> {
    let mut ideas: Vec<Idea> =
        serde_json::from_str(reply).map_err(|e| AppError::InvalidAiResponse(e.to_string()))?;

    let created_at = now();
    for idea in &mut ideas {
        idea.id = Some(new_id());
        idea.is_favorite = false;
        idea.created_at = Some(created_at.clone());
    }

    Ok(ideas)
}

pub async fn generate_ideas(
    client: &CompletionClient,
    request: &IdeaRequest,
) -> Result<Vec<Idea>, AppError> {
    if !client.is_configured() {
        return Err(AppError::MissingApiKey);
    }

    info!(
        "Generating {} ideas for theme {}",
        request.count, request.theme
    );

    let prompt = build_prompt(request);
    debug!("Prompt: {prompt}");

    let reply = client.complete(&prompt).await?;
    let ideas = parse_ideas(&reply)?;

    info!("Generated {} ideas", ideas.len());
    Ok(ideas)
}
