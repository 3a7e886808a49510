//! # Idea Search
//!
//! Naive case-insensitive substring match over title, description and tags.
//! Loads the whole ideas collection per call. No tokenizing, ranking or
//! paging; results keep store iteration order.
use catalog::Idea;

use crate::database::{Collection, Store, StoreError};

pub fn matches(idea: &Idea, query: &str) -> bool {
    idea.search_text()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

pub fn filter_ideas(ideas: Vec<Idea>, query: &str) -> Vec<Idea> {
    ideas
        .into_iter()
        .filter(|idea| matches(idea, query))
        .collect()
}

pub async fn search_ideas(store: &Store, query: &str) -> Result<Vec<Idea>, StoreError> {
    let ideas = store.all::<Idea>(Collection::Ideas).await?;

    Ok(filter_ideas(ideas, query))
}
