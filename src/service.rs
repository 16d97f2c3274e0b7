/*
 * BFX-FIX GATEWAY - SERVICE
 * =================================================================
 * Component Name: src/service.rs
 * Core Responsibility: one `quickfix::Acceptor` plus the DashMap of
 * live Peers behind it. A gateway runs exactly two Services — one
 * market-data, one order-routing — differing only in `PeerRole` and
 * which `quickfix` session settings file they load (§3, C8).
 * =================================================================
 */

use std::sync::Arc;

use dashmap::DashMap;
use quickfix::{Acceptor, Application, FileMessageStoreFactory, FixSocketServerKind, LogFactory, SessionId, SessionSettings, StdLogger};
use tokio::runtime::Handle;
use tracing::info;

use crate::error::{GatewayError, GatewayResult};
use crate::fix_adapter::FixAdapter;
use crate::peer::{Peer, PeerRole};
use crate::upstream::{UpstreamRestClient, UpstreamWsClient};

pub struct Service {
    role: PeerRole,
    peers: Arc<DashMap<SessionId, Arc<Peer>>>,
    acceptor: Acceptor,
}

impl Service {
    pub fn new(
        role: PeerRole,
        settings_path: &str,
        ws_factory: Arc<dyn Fn() -> Arc<dyn UpstreamWsClient> + Send + Sync>,
        rest_factory: Arc<dyn Fn() -> Arc<dyn UpstreamRestClient> + Send + Sync>,
        rt: Handle,
    ) -> GatewayResult<Self> {
        let settings = SessionSettings::try_from_path(settings_path)
            .map_err(|e| GatewayError::Config(format!("failed to load FIX settings {settings_path}: {e}")))?;
        let store_factory = FileMessageStoreFactory::try_new(&settings)
            .map_err(|e| GatewayError::Config(format!("failed to init FIX message store: {e}")))?;
        let log_factory = LogFactory::try_new(&StdLogger::Stdout)
            .map_err(|e| GatewayError::Config(format!("failed to init FIX log factory: {e}")))?;

        let peers = Arc::new(DashMap::new());
        let adapter = FixAdapter::new(role, peers.clone(), ws_factory, rest_factory, rt);
        let app = Application::try_new(&adapter)
            .map_err(|e| GatewayError::Config(format!("failed to init FIX application: {e}")))?;

        let acceptor = Acceptor::try_new(
            &settings,
            &app,
            &store_factory,
            &log_factory,
            FixSocketServerKind::MultiThreaded,
        )
        .map_err(|e| GatewayError::Config(format!("failed to init FIX acceptor: {e}")))?;

        Ok(Self { role, peers, acceptor })
    }

    pub fn start(&mut self) -> GatewayResult<()> {
        info!(role = ?self.role, "starting FIX acceptor");
        self.acceptor.start().map_err(|e| GatewayError::TransportError(format!("acceptor start failed: {e}")))
    }

    pub fn stop(&mut self) {
        info!(role = ?self.role, "stopping FIX acceptor");
        let _ = self.acceptor.stop();
    }

    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }
}
