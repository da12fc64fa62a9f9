use actix_web::{get, web, HttpResponse};

use crate::db::{collections, Database};

#[get("/health")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once MongoDB answers a ping. Missing collections are reported but do
/// not block readiness; they are created on first write.
#[get("/health/ready")]
async fn health_check_ready(db: web::Data<Database>) -> HttpResponse {
    if let Err(err) = db.health_check().await {
        log::warn!("Readiness check failed: {}", err);
        return HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "not_ready",
            "version": env!("CARGO_PKG_VERSION"),
            "dependencies": { "mongodb": "error" }
        }));
    }

    let present = db.existing_collections().await.unwrap_or_default();
    let missing: Vec<&str> = collections::ALL
        .iter()
        .copied()
        .filter(|name| !present.iter().any(|p| p.as_str() == *name))
        .collect();

    HttpResponse::Ok().json(serde_json::json!({
        "status": "ready",
        "version": env!("CARGO_PKG_VERSION"),
        "dependencies": { "mongodb": "ok" },
        "collections": { "present": present, "missing": missing }
    }))
}

#[get("/health/live")]
async fn health_check_live() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_helpers::{assert_error_status, assert_success_status};
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(App::new().service(health_check)).await;

        let req = test::TestRequest::get().uri("/health").to_request();

        let resp = test::call_service(&app, req).await;
        assert_success_status(resp.status());
    }

    #[actix_web::test]
    async fn test_ready_without_database_is_an_error() {
        let app = test::init_service(App::new().service(health_check_ready)).await;

        let req = test::TestRequest::get().uri("/health/ready").to_request();

        let resp = test::call_service(&app, req).await;
        assert_error_status(resp.status());
    }

    #[actix_web::test]
    async fn test_health_check_live() {
        let app = test::init_service(App::new().service(health_check_live)).await;

        let req = test::TestRequest::get().uri("/health/live").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["status"], "alive");
    }
}
