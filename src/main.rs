use std::sync::Arc;

use tracing::{error, info};

use chatrelay::broker::TopicBroker;
use chatrelay::chat::ChatService;
use chatrelay::config::load_config;
use chatrelay::session::SessionRegistry;
use chatrelay::transport::websocket::start_websocket_server;
use chatrelay::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.server.log_level);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let broker = Arc::new(TopicBroker::new());
    let registry = Arc::new(SessionRegistry::new(broker.clone()));
    let service = Arc::new(ChatService::new(registry, broker));

    tokio::select! {
        _ = start_websocket_server(addr, service, config) => {
            error!("WebSocket server exited unexpectedly.");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received. Exiting gracefully.");
        }
    }
}
