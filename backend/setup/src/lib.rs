//! # Store Setup
//!
//! One-shot preparation of the document store, separate from the server.
//!
//! 1. Resolve credentials the same way the server does.
//! 2. Write, read back and delete a throwaway `test/connection_test`
//!    document.
//! 3. Seed the components collection with the starter catalog, only when it
//!    holds no documents yet. Running twice never duplicates entries.
//!
//! Without a live store every step is skipped and the run still succeeds.
use anyhow::{Result, bail};
use catalog::seed::seed_components;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use server::{
    config::Config,
    credentials::CredentialResolver,
    database::{Collection, Store},
    utils::{new_id, now},
};

const CONNECTION_TEST_ID: &str = "connection_test";

pub enum SeedOutcome {
    AlreadySeeded,
    Seeded(usize),
}

pub async fn run() -> Result<()> {
    println!("Setting up the document store for Atal Idea Generator...");
    println!("{}", "=".repeat(50));

    let config = Config::load()?;
    let resolver = CredentialResolver::from_config(&config);
    let mode = resolver.resolve().await;

    if !mode.is_live() {
        println!("No store credentials found");
        println!("Skipping connection test - no database client");
        println!("Skipping sample data creation - no database client");
    } else {
        println!("Store initialized with {mode:?} credentials");

        let store = Store::from_mode(mode, &config.store_prefix);
        if !test_connection(&store).await? {
            bail!("Connection test failed - document not found");
        }
        println!("Connection test successful");

        match seed(&store).await? {
            SeedOutcome::AlreadySeeded => println!("Sample components already exist in database"),
            SeedOutcome::Seeded(count) => {
                println!("Successfully created {count} sample components")
            }
        }
    }

    println!("\n{}", "=".repeat(50));
    println!("Store setup complete!");
    println!("\nNext steps:");
    println!("1. Start the backend server: cargo run -p atal");
    println!("2. Point the frontend at http://localhost:{}/api", config.port);

    Ok(())
}

/// Write, read back and delete a throwaway document.
pub async fn test_connection(store: &Store) -> Result<bool> {
    let probe = json!({ "timestamp": now(), "status": "connected" });

    store
        .set(Collection::ConnectionTest, CONNECTION_TEST_ID, &probe)
        .await?;

    let found: Option<Value> = store
        .get(Collection::ConnectionTest, CONNECTION_TEST_ID)
        .await?;

    if found.is_none() {
        return Ok(false);
    }

    store
        .delete(Collection::ConnectionTest, CONNECTION_TEST_ID)
        .await?;

    Ok(true)
}

pub async fn seed(store: &Store) -> Result<SeedOutcome> {
    if !store.is_empty(Collection::Components).await? {
        return Ok(SeedOutcome::AlreadySeeded);
    }

    let components = seed_components();

    let pb = ProgressBar::new(components.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    let created_at = now();
    for mut component in components.iter().cloned() {
        let id = new_id();
        component.id = Some(id.clone());
        component.created_at = Some(created_at.clone());

        pb.set_message(format!("Adding {}", component.name));
        store.set(Collection::Components, &id, &component).await?;

        pb.println(format!("Added component: {}", component.name));
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    Ok(SeedOutcome::Seeded(components.len()))
}
