use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::error::{CoreError, Result};
use crate::http::ApiClient;
use crate::models::locale::{Language, Locale, resolve_active};
use crate::services::menu::MenuService;
use crate::services::session::{AuthStatus, CredentialStore};
use crate::storage::{KeyValueStorage, keys};

/// The request payload for persisting a locale.
#[derive(Serialize, Debug)]
struct LocaleRequest<'a> {
    locale: &'a str,
}

/// Holds the active locale and coordinates everything a locale switch
/// touches: outgoing headers, the persisted code, the session identity,
/// and the permission menu.
pub struct LocaleManager {
    client: Arc<ApiClient>,
    session: Arc<CredentialStore>,
    menu: Arc<MenuService>,
    durable: Arc<dyn KeyValueStorage>,
    default_locale: Locale,
    current: RwLock<Locale>,
    languages: RwLock<Vec<Language>>,
    is_changing: AtomicBool,
}

/// Clears the in-flight flag when a `set_locale` call unwinds.
struct ChangingFlag<'a>(&'a AtomicBool);

impl Drop for ChangingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl LocaleManager {
    /// Creates a manager starting at the persisted (or default) locale.
    pub fn new(
        client: Arc<ApiClient>,
        session: Arc<CredentialStore>,
        menu: Arc<MenuService>,
        durable: Arc<dyn KeyValueStorage>,
        default_locale: Locale,
    ) -> Self {
        let persisted = durable
            .get(keys::LOCALE)
            .and_then(|code| Locale::parse(&code));
        let current = persisted.unwrap_or(default_locale);
        client.set_locale(current);

        Self {
            client,
            session,
            menu,
            durable,
            default_locale,
            current: RwLock::new(current),
            languages: RwLock::new(Vec::new()),
            is_changing: AtomicBool::new(false),
        }
    }

    /// The active locale.
    pub fn current(&self) -> Locale {
        *self.current.read().unwrap()
    }

    /// Whether a locale change is currently in flight.
    pub fn is_changing(&self) -> bool {
        self.is_changing.load(Ordering::SeqCst)
    }

    /// Validates the persisted locale against the backend's active
    /// languages on app start and installs the outgoing headers.
    ///
    /// A failed languages fetch degrades to the persisted-or-default
    /// locale with a warning; headers are set either way.
    pub async fn initialize(&self) {
        let persisted = self
            .durable
            .get(keys::LOCALE)
            .and_then(|code| Locale::parse(&code));

        let resolved = match self.client.get_json::<Vec<Language>>("/languages").await {
            Ok(languages) => {
                let resolved = resolve_active(persisted, &languages, self.default_locale);
                *self.languages.write().unwrap() = languages;
                resolved
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not fetch active languages: {}", e);
                persisted.unwrap_or(self.default_locale)
            }
        };

        self.apply(resolved);
        tracing::info!("🌐 Locale initialized: {}", resolved);
    }

    /// Switches the active locale.
    ///
    /// Not reentrant: a second call while a change is in flight is a
    /// caller error (`LocaleChangeInProgress`), not queued. A requested
    /// locale that is not an active language falls back per the
    /// persisted-locale invariant rather than being accepted silently.
    ///
    /// # Returns
    ///
    /// The locale actually applied.
    pub async fn set_locale(&self, requested: Locale) -> Result<Locale> {
        if self
            .is_changing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CoreError::LocaleChangeInProgress);
        }
        let _flag = ChangingFlag(&self.is_changing);

        let resolved = self.resolve_against_active(requested).await;
        if resolved != requested {
            tracing::warn!(
                "⚠️ Locale {} is not active, falling back to {}",
                requested,
                resolved
            );
        }

        self.client
            .post_ok("/locale", &LocaleRequest { locale: resolved.as_str() })
            .await
            .map_err(|e| CoreError::LocaleChangeFailed(e.to_string()))?;

        self.apply(resolved);
        tracing::info!("🌐 Locale changed to: {}", resolved);

        // Best-effort resync so identity labels and the menu reflect the
        // new language. Failures never roll back the locale change.
        if self.session.status() == AuthStatus::Authenticated {
            if let Err(e) = self.session.soft_refresh().await {
                let e = CoreError::SecondaryRefreshFailed(e.to_string());
                tracing::warn!("⚠️ {}", e);
            }
            self.menu.invalidate();
            if let Err(e) = self.menu.fetch(resolved).await {
                let e = CoreError::SecondaryRefreshFailed(e.to_string());
                tracing::warn!("⚠️ {}", e);
            }
        }

        Ok(resolved)
    }

    /// Maps a requested locale onto the active-language list, fetching
    /// the list first if it has not been seen yet.
    async fn resolve_against_active(&self, requested: Locale) -> Locale {
        if self.languages.read().unwrap().is_empty() {
            match self.client.get_json::<Vec<Language>>("/languages").await {
                Ok(languages) => *self.languages.write().unwrap() = languages,
                Err(e) => {
                    tracing::warn!("⚠️ Could not fetch active languages: {}", e);
                    return requested;
                }
            }
        }

        let languages = self.languages.read().unwrap();
        resolve_active(Some(requested), &languages, self.default_locale)
    }

    fn apply(&self, locale: Locale) {
        *self.current.write().unwrap() = locale;
        self.durable.set(keys::LOCALE, locale.as_str());
        self.client.set_locale(locale);
    }
}
