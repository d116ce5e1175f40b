//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! Each submodule exposes `routes() -> OpenApiRouter<ServiceState>`;
//! [`openapi_routes`] merges them into the full application router.
//! Authentication is enforced per handler through the [`CurrentUser`]
//! extractor rather than a router-level middleware, because several
//! endpoints (session introspection, magic-link redemption) need to
//! accept both authenticated and anonymous requests.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler
//! [`CurrentUser`]: crate::extract::CurrentUser

mod authentication;
mod custom_maps;
mod error;
mod login_tokens;
mod monitors;
mod preferences;
mod response;
mod users;
mod utils;
mod view_groups;

use axum::response::{IntoResponse, Response};
use utoipa_axum::router::OpenApiRouter;

pub use crate::handler::error::{Error, ErrorKind, Result};
pub(crate) use crate::handler::response::{ErrorResponse, UserProfile};
pub use crate::handler::utils::PaginationQuery;
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns an [`OpenApiRouter`] with all session-protected routes.
fn private_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(users::routes())
        .merge(view_groups::routes())
        .merge(custom_maps::routes())
        .merge(preferences::routes())
}

/// Returns an [`OpenApiRouter`] with all public routes.
fn public_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(authentication::routes())
        .merge(login_tokens::routes())
        .merge(monitors::routes())
}

/// Returns an [`OpenApiRouter`] with all routes.
pub fn openapi_routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(private_routes())
        .merge(public_routes())
        .fallback(fallback)
}

#[cfg(test)]
mod test {
    use axum_test::TestServer;
    use utoipa_axum::router::OpenApiRouter;

    use crate::handler::openapi_routes;
    use crate::service::{ServiceConfig, ServiceState};

    /// Returns a new [`TestServer`] with the given router.
    pub async fn create_test_server_with_router(
        router: OpenApiRouter<ServiceState>,
    ) -> anyhow::Result<TestServer> {
        let config = ServiceConfig::default();
        let state = ServiceState::from_config(&config).await?;
        create_test_server_with_state(router, state).await
    }

    /// Returns a new [`TestServer`] with the given router and state.
    pub async fn create_test_server_with_state(
        router: OpenApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        let app = router.with_state(state);
        let (app, _) = app.split_for_parts();
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] with the default router and state.
    pub async fn create_test_server() -> anyhow::Result<TestServer> {
        let config = ServiceConfig::default();
        let state = ServiceState::from_config(&config).await?;
        create_test_server_with_state(openapi_routes(), state).await
    }

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn handlers() -> anyhow::Result<()> {
        let server = create_test_server().await?;
        assert!(server.is_running());
        Ok(())
    }
}
