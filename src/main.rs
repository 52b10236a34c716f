use actix_web::{web, App, HttpServer};
use std::sync::Arc;

use chatpay::api::{
    create_contact, delete_contact, execute_command, get_all_balances, get_token_balance, health,
    list_contacts, update_contact,
};
use chatpay::app::command_service::CommandService;
use chatpay::infrastructure::blockchain::manager::BlockchainManager;
use chatpay::infrastructure::config::Config;
use chatpay::infrastructure::logger::Logger;
use chatpay::infrastructure::storage::contact_store::ContactStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = match Config::new() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::Other, format!(
                "Configuration loading failed: {e}"
            )));
        }
    };

    Logger::init(&config.log_level);
    log::info!("🚀 Starting ChatPay Server...");

    if let Err(e) = config.validate() {
        log::error!("❌ Configuration validation failed: {e}");
        return Err(std::io::Error::new(std::io::ErrorKind::Other, format!(
            "Configuration validation failed: {e}"
        )));
    }
    log::info!("✅ Configuration loaded and validated");

    let contact_store = match ContactStore::new(&config.data_dir) {
        Ok(store) => {
            log::info!("✅ Contact store initialized successfully");
            Arc::new(store)
        }
        Err(e) => {
            log::error!("❌ Failed to initialize contact store: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::Other, format!(
                "Contact store initialization failed: {e}"
            )));
        }
    };

    let blockchain_manager = match BlockchainManager::new(&config) {
        Ok(manager) => {
            log::info!("✅ Blockchain manager initialized successfully");
            Arc::new(manager)
        }
        Err(e) => {
            log::error!("❌ Failed to initialize blockchain manager: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::Other, format!(
                "Blockchain manager initialization failed: {e}"
            )));
        }
    };
    log::info!("🔑 Signing account: {:?}", blockchain_manager.signer_address());

    let command_service = Arc::new(CommandService::new(
        Arc::clone(&contact_store),
        Arc::clone(&blockchain_manager),
        config.default_balance_tokens.clone(),
    ));
    log::info!("✅ Command service initialized successfully");

    let port = config.port;
    log::info!("🌐 Starting ChatPay Server on port {port}");
    log::info!("📊 Environment: {}", config.environment);
    log::info!(
        "🔗 Network: {} (chain id {})",
        config.network_name,
        config.chain_id
    );

    let config = Arc::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(actix_web::middleware::Compress::default())
            .wrap(actix_cors::Cors::permissive())
            .app_data(web::Data::new(Arc::clone(&contact_store)))
            .app_data(web::Data::new(Arc::clone(&blockchain_manager)))
            .app_data(web::Data::new(Arc::clone(&command_service)))
            .app_data(web::Data::new(Arc::clone(&config)))
            .service(health)
            .service(
                web::scope("/api")
                    .service(execute_command)
                    .service(get_all_balances)
                    .service(get_token_balance)
                    .service(create_contact)
                    .service(list_contacts)
                    .service(update_contact)
                    .service(delete_contact),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
