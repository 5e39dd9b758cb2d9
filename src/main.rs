use dotenv::dotenv;
use smart_bills_backend::app::app::App;
use smart_bills_backend::util::logger::Logger;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // LOG_DIR may come from .env, so load it before the logger
    let env_loaded = dotenv();

    // Guards must outlive the server or buffered file logs are lost
    let _logger = match Logger::new() {
        Ok(logger) => Some(logger),
        Err(e) => {
            eprintln!("Failed to initialise file logging: {e}");
            None
        }
    };

    info!("🚀 Starting Smart Bills Backend");

    match env_loaded {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to build application: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = app.start().await {
        error!("Server terminated with error: {e}");
        std::process::exit(1);
    }
}
