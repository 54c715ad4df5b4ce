use migration::MigratorTrait;
use server::routes::{self, ServerState};
use tower_http::cors::CorsLayer;

// Serve the router over a real TCP listener and hit it with an HTTP client,
// covering the wiring that in-process Service calls skip.
async fn spawn_server() -> anyhow::Result<String> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if !msg.contains("duplicate key value violates unique constraint") {
            return Err(e.into());
        }
    }
    let state = ServerState { db, admin_key: "serve-test-key".into() };
    let app = routes::build_router(CorsLayer::very_permissive(), state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{}", addr))
}

#[tokio::test]
async fn serves_health_and_gates_admin() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let base = spawn_server().await?;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{}/health", base)).send().await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await?;
    assert_eq!(body["status"], "ok");

    let resp = client.get(format!("{}/admin/invoices", base)).send().await?;
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/admin/invoices", base))
        .header("X-API-Key", "serve-test-key")
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    Ok(())
}
