use std::sync::Arc;

use tracing::info;

use super::{
    config::Config,
    credentials::CredentialResolver,
    database::Store,
    generate::CompletionClient,
};

pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub completion: CompletionClient,
}

impl AppState {
    pub async fn new(config: Config) -> Arc<Self> {
        let resolver = CredentialResolver::from_config(&config);
        let mode = resolver.resolve().await;
        info!("Store mode: {mode:?}");

        let store = Store::from_mode(mode, &config.store_prefix);

        Self::with_store(config, store)
    }

    pub fn with_store(config: Config, store: Store) -> Arc<Self> {
        let completion = CompletionClient::new(&config);

        Arc::new(Self {
            config,
            store,
            completion,
        })
    }
}
