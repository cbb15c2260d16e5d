use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::http::ApiClient;
use crate::models::identity::SessionIdentity;
use crate::services::menu::MenuService;
use crate::storage::{KeyValueStorage, keys};
use crate::validation::auth::{validate_login, validate_password};

/// Where the session currently stands.
///
/// `Unknown → Restoring → {Authenticated | Unauthenticated}` on app start,
/// `Authenticated → Unauthenticated` on logout or token invalidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Nothing decided yet; `restore()` has not run.
    Unknown,
    /// A stored token is being re-verified against the backend.
    Restoring,
    /// A valid token and identity are present.
    Authenticated,
    /// No valid session.
    Unauthenticated,
}

/// The request payload for login.
#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    login: &'a str,
    password: &'a str,
}

/// The response payload for login.
#[derive(Deserialize, Debug)]
struct LoginResponse {
    access_token: String,
    user: SessionIdentity,
}

/// Holds the session token and decoded identity for the tab's lifetime.
///
/// Identity and token are replaced wholesale, never patched, so readers
/// across renders cannot observe a half-updated session.
pub struct CredentialStore {
    client: Arc<ApiClient>,
    menu: Arc<MenuService>,
    tab: Arc<dyn KeyValueStorage>,
    status: RwLock<AuthStatus>,
    identity: RwLock<Option<SessionIdentity>>,
}

impl CredentialStore {
    /// Creates a store over the given client, menu service, and
    /// tab-scoped storage.
    pub fn new(
        client: Arc<ApiClient>,
        menu: Arc<MenuService>,
        tab: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            client,
            menu,
            tab,
            status: RwLock::new(AuthStatus::Unknown),
            identity: RwLock::new(None),
        }
    }

    /// The current session status.
    pub fn status(&self) -> AuthStatus {
        *self.status.read().unwrap()
    }

    /// A snapshot of the current identity, if any.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity.read().unwrap().clone()
    }

    /// Whether a session token is installed.
    pub fn has_token(&self) -> bool {
        self.client.has_bearer()
    }

    /// Restores the session from tab storage on app start.
    ///
    /// Reads the persisted token and minimal cached identity, then
    /// re-verifies the identity against the backend. Any failure resolves
    /// to `Unauthenticated` with session state cleared; this never
    /// surfaces an error to the caller, only logs.
    pub async fn restore(&self) {
        let Some(token) = self.tab.get(keys::TOKEN) else {
            tracing::debug!("🔐 No stored token, starting unauthenticated");
            self.set_status(AuthStatus::Unauthenticated);
            return;
        };

        self.set_status(AuthStatus::Restoring);

        // Cached identity gives guards something to show while the
        // re-verification round-trip is in flight.
        if let Some(raw) = self.tab.get(keys::IDENTITY) {
            match sonic_rs::from_str::<SessionIdentity>(&raw) {
                Ok(cached) => *self.identity.write().unwrap() = Some(cached),
                Err(e) => tracing::warn!("⚠️ Discarding unreadable cached identity: {}", e),
            }
        }

        self.client.set_bearer(Some(token));

        match self.client.get_json::<SessionIdentity>("/auth/me").await {
            Ok(identity) => {
                tracing::info!("✅ Session restored for user: {}", identity.id);
                self.install_identity(identity);
                self.set_status(AuthStatus::Authenticated);
            }
            Err(e) => {
                if e.is_unauthorized() {
                    tracing::warn!("❌ Stored token rejected, session expired");
                } else {
                    tracing::warn!("❌ Session restore failed: {}", e);
                }
                self.clear_session();
                self.set_status(AuthStatus::Unauthenticated);
            }
        }
    }

    /// Exchanges credentials for a token.
    ///
    /// On rejection returns `InvalidCredentials` and leaves any existing
    /// session state untouched.
    pub async fn login(&self, login: &str, password: &str) -> Result<SessionIdentity> {
        validate_login(login)?;
        validate_password(password)?;

        tracing::info!("🔐 Login attempt for: {}", login);

        let response: LoginResponse = self
            .client
            .post_json("/auth/login", &LoginRequest { login, password })
            .await
            .map_err(|e| match e {
                CoreError::Api { status, .. } if (400..500).contains(&status) => {
                    CoreError::InvalidCredentials
                }
                other => other,
            })?;

        self.tab.set(keys::TOKEN, &response.access_token);
        self.client.set_bearer(Some(response.access_token));
        self.install_identity(response.user.clone());
        self.set_status(AuthStatus::Authenticated);

        tracing::info!("✅ User logged in: {}", response.user.id);
        Ok(response.user)
    }

    /// Clears the session. Idempotent.
    ///
    /// Drops the token, identity, tab storage, and the permission-menu
    /// cache. The device id is retained.
    pub fn logout(&self) {
        let had_session = self.has_token() || self.identity.read().unwrap().is_some();
        self.clear_session();
        self.menu.invalidate();
        self.set_status(AuthStatus::Unauthenticated);
        if had_session {
            tracing::info!("👋 User logged out");
        }
    }

    /// Re-fetches the identity wholesale, keeping the session.
    ///
    /// Used after a locale change so localized labels refresh. A rejected
    /// token demotes the session to `Unauthenticated`.
    pub async fn soft_refresh(&self) -> Result<()> {
        if self.status() != AuthStatus::Authenticated {
            return Ok(());
        }

        match self.client.get_json::<SessionIdentity>("/auth/me").await {
            Ok(identity) => {
                tracing::debug!("🔄 Identity refreshed for user: {}", identity.id);
                self.install_identity(identity);
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!("❌ Token rejected during refresh, logging out");
                self.clear_session();
                self.menu.invalidate();
                self.set_status(AuthStatus::Unauthenticated);
                Err(CoreError::SessionExpired)
            }
            Err(e) => Err(e),
        }
    }

    fn install_identity(&self, identity: SessionIdentity) {
        match sonic_rs::to_string(&identity) {
            Ok(raw) => self.tab.set(keys::IDENTITY, &raw),
            Err(e) => tracing::warn!("⚠️ Failed to cache identity: {}", e),
        }
        *self.identity.write().unwrap() = Some(identity);
    }

    fn clear_session(&self) {
        self.tab.remove(keys::TOKEN);
        self.tab.remove(keys::IDENTITY);
        self.client.set_bearer(None);
        *self.identity.write().unwrap() = None;
    }

    fn set_status(&self, next: AuthStatus) {
        let mut status = self.status.write().unwrap();
        let allowed = matches!(
            (*status, next),
            (AuthStatus::Unknown, _)
                | (AuthStatus::Restoring, AuthStatus::Authenticated)
                | (AuthStatus::Restoring, AuthStatus::Unauthenticated)
                | (AuthStatus::Unauthenticated, AuthStatus::Authenticated)
                | (AuthStatus::Unauthenticated, AuthStatus::Restoring)
                | (AuthStatus::Unauthenticated, AuthStatus::Unauthenticated)
                | (AuthStatus::Authenticated, AuthStatus::Unauthenticated)
                | (AuthStatus::Authenticated, AuthStatus::Authenticated)
        );
        if !allowed {
            tracing::warn!("⚠️ Unexpected session transition {:?} -> {:?}", *status, next);
        }
        *status = next;
    }
}
