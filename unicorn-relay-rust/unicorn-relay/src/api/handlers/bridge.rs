use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use unicorn_bridge_core::{ExecutionMode, RouteTarget};
use crate::app::state::AppState;
use crate::domain::error::RelayError;

const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoutesRequest {
    pub amount: String,
    pub token: String,
    pub recipient: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub mode: ExecutionMode,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[get("/status")]
pub async fn get_status(state: web::Data<AppState>) -> Result<HttpResponse, RelayError> {
    let snapshot = state.session.snapshot().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": snapshot.status,
        "account": snapshot.account,
        "busy": state.session.is_busy(),
        "balances": snapshot.balances.len(),
        "routes": snapshot.routes.len(),
        "selected_route": snapshot.selected_route,
        "last_report": snapshot.last_report,
    })))
}

/// Connect an explicit address, or ask the wallet when the body has none
#[post("/connect")]
pub async fn connect(
    state: web::Data<AppState>,
    body: Option<web::Json<ConnectRequest>>,
) -> Result<HttpResponse, RelayError> {
    let address = body.and_then(|b| b.into_inner().address);
    let account = match address {
        Some(address) => state.session.connect_address(&address).await?,
        None => state.session.auto_connect().await?,
    };
    tracing::info!(account = %account, "Account connected");
    Ok(HttpResponse::Ok().json(serde_json::json!({ "account": account })))
}

#[post("/disconnect")]
pub async fn disconnect(state: web::Data<AppState>) -> Result<HttpResponse, RelayError> {
    state.session.disconnect().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "connected": false })))
}

#[post("/scan")]
pub async fn scan(state: web::Data<AppState>) -> Result<HttpResponse, RelayError> {
    let balances = state.session.scan().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "balances": balances,
        "status": state.session.status(),
    })))
}

#[get("/balances")]
pub async fn get_balances(state: web::Data<AppState>) -> Result<HttpResponse, RelayError> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "account": state.session.account().await,
        "balances": state.session.balances().await,
    })))
}

#[post("/routes")]
pub async fn find_routes(
    state: web::Data<AppState>,
    body: web::Json<RoutesRequest>,
) -> Result<HttpResponse, RelayError> {
    let request = body.into_inner();
    let mut target = RouteTarget::new(request.amount, request.token);
    if let Some(recipient) = request.recipient.filter(|r| !r.trim().is_empty()) {
        target = target.with_recipient(recipient);
    }

    let routes = state.session.find_routes(target).await?;
    let selected = state.session.selected_route().await.map(|(i, _)| i);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "routes": routes,
        "selected_route": selected,
        "status": state.session.status(),
    })))
}

#[get("/routes")]
pub async fn get_routes(state: web::Data<AppState>) -> Result<HttpResponse, RelayError> {
    let snapshot = state.session.snapshot().await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "routes": snapshot.routes,
        "selected_route": snapshot.selected_route,
        "target": snapshot.target,
    })))
}

#[post("/routes/select")]
pub async fn select_route(
    state: web::Data<AppState>,
    body: web::Json<SelectRequest>,
) -> Result<HttpResponse, RelayError> {
    let index = body.index;
    let route = state.session.select_route(index).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "selected_route": index,
        "route": route,
    })))
}

#[post("/execute")]
pub async fn execute(
    state: web::Data<AppState>,
    body: Option<web::Json<ExecuteRequest>>,
) -> Result<HttpResponse, RelayError> {
    let mode = body.map(|b| b.mode).unwrap_or_default();
    let report = state.session.execute(mode).await?;
    if !report.is_success() {
        tracing::warn!(submitted = report.submitted.len(), "Route execution failed");
    }
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": report.is_success(),
        "report": report,
    })))
}

#[get("/history")]
pub async fn get_history(
    state: web::Data<AppState>,
    query: web::Query<HistoryQuery>,
) -> Result<HttpResponse, RelayError> {
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "entries": state.history.recent(limit),
        "stats": state.history.stats(),
    })))
}
