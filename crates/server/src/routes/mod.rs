use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;

pub mod broadcasts;
pub mod clients;
pub mod dashboard;
pub mod invoices;
pub mod notifications;
pub mod panel;
pub mod services;

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    /// Shared secret behind the `/admin` surface. Role checks proper live
    /// outside this system; this is only the gate they hand over to.
    pub admin_key: String,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Middleware: require a matching X-API-Key header on admin routes.
pub async fn require_admin_key(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let provided = req
        .headers()
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if provided.is_empty() || provided != state.admin_key {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(req).await)
}

/// Build the full application router: public health, customer panel and
/// feed routes, and the key-gated admin back office.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/clients/:id/panel", get(panel::get_overview))
        .route("/clients/:id/services", get(panel::list_services))
        .route("/clients/:id/invoices", get(panel::list_invoices))
        .route("/clients/:id/notifications", get(notifications::get_feed))
        .route("/clients/:id/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/:id/read", post(notifications::mark_read));

    let admin = Router::new()
        .route("/admin/dashboard", get(dashboard::get_dashboard))
        .route("/admin/invoices/:id/reminder", post(dashboard::send_reminder))
        .route("/admin/clients", get(clients::list_clients))
        .route("/admin/clients/:id", get(clients::get_client))
        .route("/admin/services", get(services::list_services))
        .route("/admin/invoices", get(invoices::list_invoices))
        .route("/admin/broadcasts/preview", get(broadcasts::preview))
        .route("/admin/broadcasts", post(broadcasts::send))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin_key));

    public
        .merge(admin)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO))
                .on_failure(DefaultOnFailure::new().level(Level::WARN)),
        )
}
