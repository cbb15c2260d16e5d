//! Session, authorization, and localization core for a university
//! management portal front-end.
//!
//! The UI layer renders pages; this crate owns everything those pages
//! consult before and while they render: the credential store, the
//! server-computed permission menu, the active locale, the access
//! evaluator and route guards, and the signed HTTP client every request
//! goes through.

pub mod config;
pub mod error;
pub mod http;
pub mod i18n;
pub mod state;
pub mod storage;

pub mod access {
    pub mod evaluator;
}

pub mod crypto {
    pub mod device;
    pub mod signer;
}

pub mod guard {
    pub mod public;
    pub mod route;
}

pub mod models {
    pub mod identity;
    pub mod locale;
    pub mod menu;
    pub mod permission;
}

pub mod services {
    pub mod locale;
    pub mod menu;
    pub mod session;
}

pub mod validation {
    pub mod auth;
}

// Re-exports for convenient access
pub use access::evaluator::{Requirement, evaluate};
pub use config::Config;
pub use error::{CoreError, Result};
pub use guard::public::{PublicOnlyGuard, PublicOutcome};
pub use guard::route::{GuardOutcome, GuardRule, RouteGuard};
pub use http::ApiClient;
pub use i18n::{LocalizedText, Translations, localize};
pub use models::identity::{AccountType, Role, SessionIdentity, UserId};
pub use models::locale::{Language, Locale};
pub use models::menu::{MenuNode, MenuTree};
pub use models::permission::{Combinator, PermissionSet};
pub use services::locale::LocaleManager;
pub use services::menu::MenuService;
pub use services::session::{AuthStatus, CredentialStore};
pub use state::PortalCore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
