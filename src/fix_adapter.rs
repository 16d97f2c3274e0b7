/*
 * BFX-FIX GATEWAY - FIX ACCEPTOR ADAPTER
 * =================================================================
 * Component Name: src/fix_adapter.rs
 * Core Responsibility: implements `quickfix::ApplicationCallback`,
 * dispatching by `MsgType` (tag 35) to the owning Peer. This is the
 * only place `quickfix` callback signatures are touched; everything it
 * calls into works in terms of plain Rust types (§4.7).
 *
 * QuickFIX callbacks run on the engine's own thread, not inside a
 * tokio task, so every dispatch here borrows a `tokio::runtime::Handle`
 * captured at construction time to hand work to the async side.
 * =================================================================
 */

use std::sync::Arc;

use dashmap::DashMap;
use quickfix::{ApplicationCallback, Message, SessionId};
use tokio::runtime::Handle;
use tracing::{error, info, warn};

use crate::fix::message::{
    extract_cancel_replace_request, extract_cancel_request, extract_credentials, extract_market_data_request,
    extract_new_order_single,
};
use crate::peer::{Peer, PeerRole};
use crate::upstream::{UpstreamRestClient, UpstreamWsClient};

pub struct FixAdapter {
    role: PeerRole,
    peers: Arc<DashMap<SessionId, Arc<Peer>>>,
    ws_factory: Arc<dyn Fn() -> Arc<dyn UpstreamWsClient> + Send + Sync>,
    rest_factory: Arc<dyn Fn() -> Arc<dyn UpstreamRestClient> + Send + Sync>,
    rt: Handle,
}

impl FixAdapter {
    pub fn new(
        role: PeerRole,
        peers: Arc<DashMap<SessionId, Arc<Peer>>>,
        ws_factory: Arc<dyn Fn() -> Arc<dyn UpstreamWsClient> + Send + Sync>,
        rest_factory: Arc<dyn Fn() -> Arc<dyn UpstreamRestClient> + Send + Sync>,
        rt: Handle,
    ) -> Self {
        Self { role, peers, ws_factory, rest_factory, rt }
    }

    fn peer_for(&self, session: &SessionId) -> Option<Arc<Peer>> {
        self.peers.get(session).map(|entry| entry.clone())
    }

    fn dispatch_app_message(&self, msg: &Message, session: &SessionId) {
        let Some(peer) = self.peer_for(session) else {
            warn!("message for unknown session, dropping");
            return;
        };
        let Some(msg_type) = msg.get_field(35).map(|v| v.to_string()) else {
            warn!("message missing MsgType");
            return;
        };
        let msg = msg.clone();
        let session = session.clone();

        self.rt.spawn(async move {
            let result = route_by_msg_type(&peer, &msg_type, &msg, &session).await;
            if let Err(e) = result {
                error!(%session, "failed to process inbound FIX message: {e}");
            }
        });
    }
}

async fn route_by_msg_type(
    peer: &Peer,
    msg_type: &str,
    msg: &Message,
    session: &SessionId,
) -> crate::error::GatewayResult<()> {
    match msg_type {
        "D" => {
            let req = extract_new_order_single(msg)?;
            if let Some(reply) = peer.handle_new_order_single(req).await? {
                send_reply(reply, session);
            }
            Ok(())
        }
        "F" => {
            let req = extract_cancel_request(msg)?;
            if let Some(reply) = peer.handle_cancel_request(req).await? {
                send_reply(reply, session);
            }
            Ok(())
        }
        "G" => {
            let req = extract_cancel_replace_request(msg)?;
            if let Some(reply) = peer.handle_cancel_replace_request(req).await? {
                send_reply(reply, session);
            }
            Ok(())
        }
        "H" => match peer.handle_order_status_request(msg).await {
            Ok(reply) => {
                send_reply(reply, session);
                Ok(())
            }
            Err(e) => {
                let reject = crate::fix::message::build_business_message_reject(
                    &crate::models::execution::BusinessMessageRejectIntent {
                        ref_msg_type: "H".into(),
                        ref_seq_num: None,
                        reject_reason: "0".into(),
                        text: e.to_string(),
                    },
                );
                send_reply(reject, session);
                Ok(())
            }
        },
        "V" => {
            let req = extract_market_data_request(msg)?;
            if let Some(reply) = peer.handle_market_data_request(req).await? {
                send_reply(reply, session);
            }
            Ok(())
        }
        other => {
            warn!("unhandled MsgType {other}");
            Ok(())
        }
    }
}

fn send_reply(msg: Message, session: &SessionId) {
    if let Err(e) = quickfix::Session::send_to_target(msg, session) {
        warn!(%session, "failed to deliver outbound FIX message: {e}");
    }
}

impl ApplicationCallback for FixAdapter {
    /// Instantiate the Peer here, not on Logon — `from_admin` sees the
    /// Logon message's `MsgType=A` *before* `on_logon` fires, and the
    /// credential extraction/upstream authentication path lives there, so
    /// the Peer must already be installed in the map by then (§4.8, C8).
    fn on_create(&self, session: &SessionId) {
        info!(%session, role = ?self.role, "FIX session created");

        let ws = (self.ws_factory)();
        let rest = (self.rest_factory)();
        let peer = Arc::new(Peer::new(self.role, ws.clone(), rest));
        self.peers.insert(session.clone(), peer.clone());

        let session = session.clone();
        self.rt.spawn(async move {
            loop {
                match ws.recv().await {
                    Ok(event) => {
                        for outbound in peer.handle_upstream_event(event) {
                            if let Err(e) = quickfix::Session::send_to_target(outbound, &session) {
                                warn!(%session, "failed to deliver outbound FIX message: {e}");
                            }
                        }
                    }
                    Err(e) => {
                        warn!(%session, "upstream event stream ended: {e}");
                        break;
                    }
                }
            }
        });
    }

    fn on_logon(&self, session: &SessionId) {
        info!(%session, "FIX logon");
    }

    /// The Peer stays installed across a logon/logout cycle — `on_create`
    /// fires once per session object, not once per connection — only its
    /// state is reset so a later reconnect starts clean.
    fn on_logout(&self, session: &SessionId) {
        info!(%session, "FIX logout");
        if let Some(peer) = self.peer_for(session) {
            peer.on_logout();
        }
    }

    fn from_admin(&self, msg: &Message, session: &SessionId) -> Result<(), quickfix::FromAdminError> {
        let Some(msg_type) = msg.get_field(35).map(|v| v.to_string()) else {
            return Ok(());
        };
        if msg_type != "A" {
            return Ok(());
        }

        let Some(peer) = self.peer_for(session) else {
            return Ok(());
        };

        match extract_credentials(msg) {
            Ok(credentials) => {
                let session = session.clone();
                self.rt.spawn(async move {
                    if let Err(e) = peer.on_logon(credentials).await {
                        error!(%session, "upstream authentication failed: {e}");
                    }
                });
                Ok(())
            }
            Err(e) => {
                warn!(%session, "rejecting logon: {e}");
                Err(quickfix::FromAdminError::rejected(e.to_string()))
            }
        }
    }

    fn on_msg_from_app(&self, msg: &Message, session: &SessionId) -> Result<(), quickfix::MsgFromAppError> {
        self.dispatch_app_message(msg, session);
        Ok(())
    }
}
