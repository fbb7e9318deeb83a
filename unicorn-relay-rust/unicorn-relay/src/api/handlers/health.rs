use actix_web::{get, web, HttpResponse, Responder};
use crate::app::state::AppState;

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "core_version": unicorn_bridge_core::VERSION,
        "chains": state.session.chains().iter().map(|c| &c.name).collect::<Vec<_>>(),
        "busy": state.session.is_busy(),
    }))
}
