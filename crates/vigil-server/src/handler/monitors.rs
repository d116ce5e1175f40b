//! System health monitoring handlers.

use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use vigil_postgres::PgClient;

use crate::extract::Json;
use crate::handler::Result;
use crate::service::ServiceState;

/// Tracing target for monitor operations.
const TRACING_TARGET: &str = "vigil_server::handler::monitors";

/// Health status of the server and its database.
#[must_use]
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    /// Whether the server can reach its database.
    pub is_healthy: bool,
    /// Timestamp when the check ran.
    #[schema(value_type = String)]
    pub checked_at: jiff::Timestamp,
}

/// Checks that the connection pool can hand out a connection.
///
/// The pool validates connections on checkout, so a successful checkout
/// means the database is reachable.
async fn check_database(postgres: &PgClient) -> bool {
    match postgres.get_connection().await {
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(
                target: TRACING_TARGET,
                error = %e,
                "health check could not obtain a connection"
            );
            false
        }
    }
}

/// Reports whether the server and its database are reachable.
#[tracing::instrument(skip_all)]
#[utoipa::path(
    get, path = "/health", tag = "health",
    responses(
        (status = OK, description = "System is healthy", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "System is unhealthy", body = HealthResponse),
    ),
)]
async fn health_status(
    State(postgres): State<PgClient>,
) -> Result<(StatusCode, Json<HealthResponse>)> {
    let is_healthy = check_database(&postgres).await;

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        is_healthy,
        checked_at: jiff::Timestamp::now(),
    };

    Ok((status_code, Json(response)))
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(health_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::create_test_server_with_router;

    #[tokio::test]
    #[ignore = "requires a running postgres instance"]
    async fn health_reports_healthy() -> anyhow::Result<()> {
        let server = create_test_server_with_router(routes()).await?;

        let response = server.get("/health").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body["isHealthy"], true);
        Ok(())
    }
}
