//! Application state and dependency injection.

mod config;
mod policy;
mod security;

use vigil_postgres::PgClient;

pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder, SessionSettings};
pub use crate::service::policy::AccessPolicy;
pub use crate::service::security::{
    PasswordHasher, SESSION_COOKIE_NAME, TokenCodec, TokenError, TokenKeys, TokenKind,
};
// Re-export error types from crate root for convenience
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,

    // Internal services:
    pub password_hasher: PasswordHasher,
    pub token_keys: TokenKeys,
    pub session_settings: SessionSettings,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Connects to the database, runs pending migrations, and loads
    /// signing secrets.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        let service_state = Self {
            postgres: config.connect_postgres().await?,

            password_hasher: PasswordHasher::new(),
            token_keys: config.load_token_keys()?,
            session_settings: config.session_settings()?,
        };

        Ok(service_state)
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: PgClient);

// Internal services:
impl_di!(password_hasher: PasswordHasher);
impl_di!(token_keys: TokenKeys);
impl_di!(session_settings: SessionSettings);
