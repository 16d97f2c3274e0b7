/*
 * BFX-FIX GATEWAY - GATEWAY
 * =================================================================
 * Component Name: src/gateway.rs
 * Core Responsibility: compose the market-data and order-routing
 * Services and own their start/stop lifecycle. Market data starts
 * first and stops last, matching the original gateway's ordering: a
 * FIX order-routing client reconnecting mid-shutdown should never find
 * live order entry with no market data backing it.
 * =================================================================
 */

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::info;

use crate::admin::StatusProvider;
use crate::config::GatewaySettings;
use crate::error::GatewayResult;
use crate::peer::PeerRole;
use crate::service::Service;
use crate::upstream::rest_client::LiveUpstreamRestClient;
use crate::upstream::ws_client::LiveUpstreamWsClient;
use crate::upstream::{UpstreamRestClient, UpstreamWsClient};

pub struct Gateway {
    market_data: Service,
    order_routing: Service,
}

impl Gateway {
    pub fn new(settings: &GatewaySettings, rt: Handle) -> GatewayResult<Self> {
        let ws_url = settings.upstream_ws_url.clone();
        let rest_url = settings.upstream_rest_url.clone();

        let ws_factory: Arc<dyn Fn() -> Arc<dyn UpstreamWsClient> + Send + Sync> = {
            let ws_url = ws_url.clone();
            Arc::new(move || Arc::new(LiveUpstreamWsClient::connect(ws_url.clone())) as Arc<dyn UpstreamWsClient>)
        };
        let rest_factory: Arc<dyn Fn() -> Arc<dyn UpstreamRestClient> + Send + Sync> = {
            let rest_url = rest_url.clone();
            let api_key = settings.rest_api_key.clone();
            let api_secret = settings.rest_api_secret.clone();
            Arc::new(move || {
                Arc::new(LiveUpstreamRestClient::new(rest_url.clone(), api_key.clone(), api_secret.clone()))
                    as Arc<dyn UpstreamRestClient>
            })
        };

        let market_data = Service::new(
            PeerRole::MarketData,
            &settings.md_config_path,
            ws_factory.clone(),
            rest_factory.clone(),
            rt.clone(),
        )?;
        let order_routing =
            Service::new(PeerRole::OrderRouting, &settings.order_config_path, ws_factory, rest_factory, rt)?;

        Ok(Self { market_data, order_routing })
    }

    pub fn start(&mut self) -> GatewayResult<()> {
        info!("gateway starting");
        self.market_data.start()?;
        self.order_routing.start()?;
        Ok(())
    }

    pub fn stop(&mut self) {
        info!("gateway stopping");
        self.order_routing.stop();
        self.market_data.stop();
    }
}

impl StatusProvider for Gateway {
    fn market_data_peer_count(&self) -> usize {
        self.market_data.peer_count()
    }

    fn order_routing_peer_count(&self) -> usize {
        self.order_routing.peer_count()
    }
}
