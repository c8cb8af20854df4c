use crate::{
    config::Config,
    services::{ChatService, CreditsService, ImageService, UserService},
    store::{JsonFileStore, LedgerStore, ProfileStore, SqlStore},
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub credits_service: Arc<CreditsService>,
    pub user_service: Arc<UserService>,
    pub chat_service: Arc<ChatService>,
    pub image_service: Arc<ImageService>,
    pub storage_backend: &'static str,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, anyhow::Error> {
        // Smart switch: a configured database URL selects SQL, otherwise the
        // JSON-file fallback under the data directory.
        let (ledger_store, profile_store, storage_backend): (
            Arc<dyn LedgerStore>,
            Arc<dyn ProfileStore>,
            &'static str,
        ) = match config.database.url.as_deref() {
            Some(url) => {
                let store = Arc::new(SqlStore::connect(url).await?);
                (store.clone(), store, "sql")
            }
            None => {
                let store = Arc::new(JsonFileStore::open(&config.storage.data_dir).await?);
                (store.clone(), store, "json")
            }
        };

        tracing::info!("Using {} storage backend", storage_backend);

        let credits_service = Arc::new(CreditsService::new(ledger_store, &config.credits));
        let user_service = Arc::new(UserService::new(profile_store));
        let chat_service = Arc::new(ChatService::new(&config.providers.chat));
        let image_service = Arc::new(ImageService::new(&config.providers.image));

        Ok(Self {
            credits_service,
            user_service,
            chat_service,
            image_service,
            storage_backend,
            config: Arc::new(config),
        })
    }
}
