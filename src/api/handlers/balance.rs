use actix_web::web::Data;
use actix_web::{get, web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::error::ChatPayError;
use crate::infrastructure::blockchain::manager::BlockchainManager;
use crate::infrastructure::config::Config;

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub address: Option<String>,
}

/// Balances for the configured default token set. Individual read
/// failures are annotated per entry, never fatal to the summary.
#[get("/balance")]
pub async fn get_all_balances(
    query: web::Query<BalanceQuery>,
    manager: Data<Arc<BlockchainManager>>,
    config: Data<Arc<Config>>,
) -> Result<HttpResponse, ChatPayError> {
    let balances = manager
        .balances_of(&config.default_balance_tokens, query.address.as_deref())
        .await;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "network": manager.network_name(),
        "chain_id": manager.chain_id(),
        "balances": balances,
    })))
}

#[get("/balance/{symbol}")]
pub async fn get_token_balance(
    path: web::Path<String>,
    query: web::Query<BalanceQuery>,
    manager: Data<Arc<BlockchainManager>>,
) -> Result<HttpResponse, ChatPayError> {
    let info = manager
        .balance_of(&path, query.address.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(info))
}
