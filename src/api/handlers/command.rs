use actix_web::web::Data;
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use crate::app::command_service::CommandService;
use crate::domain::error::ChatPayError;

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "message": "ChatPay Server is running"
    }))
}

/// Command execution entry point: raw text in, structured outcome out.
/// Domain errors surface through `ChatPayError`'s response mapping.
#[post("/command")]
pub async fn execute_command(
    req: web::Json<CommandRequest>,
    service: Data<Arc<CommandService>>,
) -> Result<HttpResponse, ChatPayError> {
    let response = service.execute(&req.command).await?;
    Ok(HttpResponse::Ok().json(response))
}
