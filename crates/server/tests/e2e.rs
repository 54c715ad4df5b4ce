use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::json;
use tower::Service;
use uuid::Uuid;

use server::routes::{self, ServerState};

const TEST_ADMIN_KEY: &str = "test-admin-key";

fn cors() -> tower_http::cors::CorsLayer {
    tower_http::cors::CorsLayer::very_permissive()
}

async fn build_app() -> anyhow::Result<(Router, DatabaseConnection)> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = ServerState { db: db.clone(), admin_key: TEST_ADMIN_KEY.into() };
    Ok((routes::build_router(cors(), state), db))
}

async fn insert_client(db: &DatabaseConnection, email: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    models::client::ActiveModel {
        id: Set(id),
        name: Set(Some("E2e Client".into())),
        email: Set(email.into()),
        phone: Set(None),
        company: Set(None),
        registered_at: Set(chrono::Utc::now().into()),
    }
    .insert(db)
    .await?;
    Ok(id)
}

async fn body_json(resp: axum::response::Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn panel_overview_scoped_to_client() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (app, db) = build_app().await?;
    let email = format!("e2e_{}@example.com", Uuid::new_v4());
    let client_id = insert_client(&db, &email).await?;
    let other = insert_client(&db, &format!("e2e_{}@example.com", Uuid::new_v4())).await?;

    models::service::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        category: Set("hosting".into()),
        description: Set(None),
        monthly_rate: Set(Some(25.0)),
        status: Set(models::service::STATUS_ACTIVE.into()),
        started_at: Set(Some(chrono::Utc::now().into())),
        expires_at: Set(None),
    }
    .insert(&db)
    .await?;
    models::invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        client_id: Set(client_id),
        service_id: Set(None),
        amount: Set(Some(40.0)),
        status: Set(models::invoice::STATUS_PENDING.into()),
        issued_at: Set(chrono::Utc::now().into()),
        due_at: Set(None),
    }
    .insert(&db)
    .await?;

    let req = Request::builder()
        .uri(format!("/clients/{}/panel", client_id))
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let overview = body_json(resp).await?;
    assert_eq!(overview["stats"]["active_services"], 1);
    assert_eq!(overview["stats"]["pending_invoices"], 1);
    assert_eq!(overview["stats"]["pending_amount"], 40.0);
    assert_eq!(overview["recent_services"].as_array().unwrap().len(), 1);
    assert_eq!(overview["recent_invoices"].as_array().unwrap().len(), 1);

    // Another client sees none of it.
    let req = Request::builder()
        .uri(format!("/clients/{}/services", other))
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let services = body_json(resp).await?;
    assert!(services.as_array().unwrap().is_empty());

    // Unknown client id is a 404 on the overview.
    let req = Request::builder()
        .uri(format!("/clients/{}/panel", Uuid::new_v4()))
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn health_is_public() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, _db) = build_app().await?;

    let req = Request::builder().uri("/health").body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_key() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (app, _db) = build_app().await?;

    // No key
    let req = Request::builder().uri("/admin/dashboard").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Wrong key
    let req = Request::builder()
        .uri("/admin/dashboard")
        .header("X-API-Key", "nope")
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Right key
    let req = Request::builder()
        .uri("/admin/dashboard")
        .header("X-API-Key", TEST_ADMIN_KEY)
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn broadcast_rejects_blank_title() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, _db) = build_app().await?;

    let req = Request::builder()
        .method("POST")
        .uri("/admin/broadcasts")
        .header("X-API-Key", TEST_ADMIN_KEY)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "audience": "all", "title": "  ", "body": "hi", "kind": "info"
        }))?))?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn broadcast_then_mark_read_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (app, db) = build_app().await?;
    let email = format!("e2e_{}@example.com", Uuid::new_v4());
    let client_id = insert_client(&db, &email).await?;

    // Send to everyone; our fresh client must be among the recipients.
    let req = Request::builder()
        .method("POST")
        .uri("/admin/broadcasts")
        .header("X-API-Key", TEST_ADMIN_KEY)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({
            "audience": "all", "title": "Maintenance window", "body": "Saturday 02:00", "kind": "warning"
        }))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let sent = body_json(resp).await?;
    assert!(sent["sent"].as_u64().unwrap() >= 1);

    // The client's feed now carries an unread item.
    let req = Request::builder()
        .uri(format!("/clients/{}/notifications", client_id))
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let feed = body_json(resp).await?;
    assert!(feed["unread_count"].as_u64().unwrap() >= 1);
    let first = &feed["items"][0];
    assert_eq!(first["title"], "Maintenance window");
    let notification_id = first["id"].as_str().unwrap().to_string();

    // Mark it read; the reloaded feed comes back with the badge gone.
    let req = Request::builder()
        .method("POST")
        .uri(format!("/notifications/{}/read?client_id={}", notification_id, client_id))
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let feed = body_json(resp).await?;
    assert_eq!(feed["unread_count"].as_u64().unwrap(), 0);
    assert!(feed["badge"].is_null());
    Ok(())
}

#[tokio::test]
async fn preview_matches_send_shape() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(());
    }
    let (mut app, db) = build_app().await?;
    let email = format!("e2e_{}@example.com", Uuid::new_v4());
    insert_client(&db, &email).await?;

    let req = Request::builder()
        .uri("/admin/broadcasts/preview?audience=all")
        .header("X-API-Key", TEST_ADMIN_KEY)
        .body(Body::empty())?;
    let resp = app.call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await?;
    assert_eq!(body["audience"], "all");
    assert!(body["recipients"].as_u64().unwrap() >= 1);
    Ok(())
}
