/*
 * BFX-FIX GATEWAY - ENTRY POINT
 * =================================================================
 * Component: src/main.rs
 * Responsibility: wire configuration, logging, the two FIX Services
 * and the admin console together, and run until Ctrl+C.
 * =================================================================
 */

use std::sync::Arc;

use clap::Parser;
use parking_lot::Mutex;
use tokio::signal;
use tracing::{error, info, warn};

use bfx_fix_gateway::admin::StatusProvider;
use bfx_fix_gateway::config::{load_settings, CliArgs};
use bfx_fix_gateway::gateway::Gateway;
use bfx_fix_gateway::{admin, logging};

struct GatewayStatus(Arc<Mutex<Gateway>>);

impl StatusProvider for GatewayStatus {
    fn market_data_peer_count(&self) -> usize {
        self.0.lock().market_data_peer_count()
    }

    fn order_routing_peer_count(&self) -> usize {
        self.0.lock().order_routing_peer_count()
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let args = CliArgs::parse();
    let settings = load_settings(&args)?;

    let _guard = logging::init_logger(&settings.log_dir, &settings.log_level);

    info!("bfx_fix_gateway starting up");

    let gateway = Gateway::new(&settings, tokio::runtime::Handle::current())?;
    let gateway = Arc::new(Mutex::new(gateway));

    gateway.lock().start()?;

    if let Err(e) = admin::start(settings.admin_port, Arc::new(GatewayStatus(gateway.clone()))).await {
        warn!("admin console failed to start: {e}");
    }

    match signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(e) => error!("unable to listen for shutdown signal: {e}"),
    }

    gateway.lock().stop();
    info!("bfx_fix_gateway shutdown complete");
    Ok(())
}
