use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct SendRequestDoc {
    /// all, active or pending
    pub audience: String,
    pub title: String,
    pub body: String,
    pub kind: String,
}

#[derive(utoipa::ToSchema)]
pub struct PreviewResponseDoc {
    pub audience: String,
    pub recipients: u64,
}

#[derive(utoipa::ToSchema)]
pub struct SendResponseDoc {
    pub sent: u64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::dashboard::get_dashboard,
        crate::routes::dashboard::send_reminder,
        crate::routes::clients::list_clients,
        crate::routes::clients::get_client,
        crate::routes::services::list_services,
        crate::routes::invoices::list_invoices,
        crate::routes::broadcasts::preview,
        crate::routes::broadcasts::send,
        crate::routes::panel::get_overview,
        crate::routes::panel::list_services,
        crate::routes::panel::list_invoices,
        crate::routes::notifications::get_feed,
        crate::routes::notifications::mark_read,
        crate::routes::notifications::mark_all_read,
    ),
    components(
        schemas(
            HealthResponse,
            SendRequestDoc,
            PreviewResponseDoc,
            SendResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "dashboard"),
        (name = "clients"),
        (name = "services"),
        (name = "invoices"),
        (name = "broadcasts"),
        (name = "panel"),
        (name = "notifications")
    )
)]
pub struct ApiDoc;
