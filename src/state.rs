use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::guard::public::PublicOnlyGuard;
use crate::guard::route::RouteGuard;
use crate::http::ApiClient;
use crate::services::locale::LocaleManager;
use crate::services::menu::MenuService;
use crate::services::session::CredentialStore;
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage};

/// The wired-up core the UI layer consumes.
///
/// Stores are explicit and dependency-injected rather than ambient
/// singletons, so tests construct isolated instances per case.
pub struct PortalCore {
    /// The core configuration.
    pub config: Config,
    /// The typed HTTP client.
    pub client: Arc<ApiClient>,
    /// The credential store.
    pub session: Arc<CredentialStore>,
    /// The permission menu service.
    pub menu: Arc<MenuService>,
    /// The locale manager.
    pub locale: Arc<LocaleManager>,
    /// The route guard for protected regions.
    pub guard: RouteGuard,
    /// The guard for public-only regions (sign-in and friends).
    pub public_guard: PublicOnlyGuard,
}

impl PortalCore {
    /// Wires the core over the given storages.
    ///
    /// # Arguments
    ///
    /// * `config` - The core configuration.
    /// * `tab` - Tab-scoped storage (token, cached identity).
    /// * `durable` - Durable storage (locale, device id, menu cache).
    pub fn new(
        config: Config,
        tab: Arc<dyn KeyValueStorage>,
        durable: Arc<dyn KeyValueStorage>,
    ) -> Self {
        let client = Arc::new(ApiClient::new(&config, &durable));
        tracing::info!("✅ API client initialized for {}", config.api_base_url);

        let menu = Arc::new(MenuService::new(client.clone(), durable.clone()));
        let session = Arc::new(CredentialStore::new(
            client.clone(),
            menu.clone(),
            tab.clone(),
        ));
        let locale = Arc::new(LocaleManager::new(
            client.clone(),
            session.clone(),
            menu.clone(),
            durable.clone(),
            config.default_locale,
        ));
        tracing::info!("✅ Session, menu, and locale services initialized");

        let guard = RouteGuard::new(session.clone(), menu.clone());
        let public_guard = PublicOnlyGuard::new(session.clone());

        Self {
            config,
            client,
            session,
            menu,
            locale,
            guard,
            public_guard,
        }
    }

    /// Wires the core from environment configuration with the default
    /// storage backends.
    pub fn from_env() -> Result<Self> {
        let config = Config::from_env()?;
        let tab: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        let durable: Arc<dyn KeyValueStorage> =
            Arc::new(FileStorage::open(&config.durable_state_path));
        Ok(Self::new(config, tab, durable))
    }

    /// Runs the app-start sequence: locale first (headers), then session
    /// restore, then a best-effort menu prefetch for signed-in users.
    pub async fn initialize(&self) {
        self.locale.initialize().await;
        self.session.restore().await;

        if self.session.has_token() {
            if let Err(e) = self.menu.fetch(self.locale.current()).await {
                tracing::warn!("⚠️ Menu prefetch failed, continuing without: {}", e);
            }
        }
        tracing::info!("✅ Portal core initialized");
    }
}
