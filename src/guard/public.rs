use std::sync::Arc;

use crate::services::session::{AuthStatus, CredentialStore};

/// The default landing area for already-signed-in users.
pub const DEFAULT_LANDING: &str = "/dashboard";

/// What a public-only region (e.g. the sign-in page) should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicOutcome {
    /// The session is still being restored.
    Loading,
    /// Already authenticated; leave the public-only page.
    RedirectToHome {
        /// Where to send the user instead.
        to: String,
    },
    /// Render the public page.
    Allowed,
}

/// Inverts the route guard for pages that only make sense signed out.
pub struct PublicOnlyGuard {
    session: Arc<CredentialStore>,
    landing: String,
}

impl PublicOnlyGuard {
    /// Creates a guard redirecting authenticated users to the default
    /// landing area.
    pub fn new(session: Arc<CredentialStore>) -> Self {
        Self::with_landing(session, DEFAULT_LANDING)
    }

    /// Creates a guard with a custom landing location.
    pub fn with_landing(session: Arc<CredentialStore>, landing: impl Into<String>) -> Self {
        Self {
            session,
            landing: landing.into(),
        }
    }

    /// Evaluates the public-only rule.
    pub fn evaluate(&self) -> PublicOutcome {
        match self.session.status() {
            AuthStatus::Unknown | AuthStatus::Restoring => PublicOutcome::Loading,
            AuthStatus::Authenticated if self.session.has_token() => {
                PublicOutcome::RedirectToHome {
                    to: self.landing.clone(),
                }
            }
            _ => PublicOutcome::Allowed,
        }
    }
}
