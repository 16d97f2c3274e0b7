/*
 * BFX-FIX GATEWAY - PEER
 * =================================================================
 * Component Name: src/peer/mod.rs
 * Core Responsibility: everything scoped to one FIX session — created
 * on Logon, torn down on Logout/transport loss. Owns the ID Registry,
 * Order Cache, Subscription Registry, Cancel Registry and its own
 * upstream WS/REST client handles. Single-writer-per-stream: the FIX
 * inbound path and the upstream inbound path each hold the lock only
 * for the duration of one state mutation, and neither ever blocks on
 * network I/O while holding it (§4.8, §4.9).
 * =================================================================
 */

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::cancel_registry::{CancelRegistry, PendingCancelKind};
use crate::error::{GatewayError, GatewayResult, OrderRejectReason};
use crate::fix::message::{
    build_execution_report, build_logout, build_market_data_request_reject, build_md_incremental, build_md_snapshot,
    build_order_cancel_reject, extract_order_status_request, CancelReplaceRequest, CancelRequest,
    MarketDataRequestFields, MdSubscriptionRequestType, NewOrderRequest,
};
use crate::id_registry::IdRegistry;
use crate::models::execution::ExecutionReportIntent;
use crate::models::order::OrderRecord;
use crate::order_cache::OrderCache;
use crate::subscription_registry::{MdEntryType, SubscriptionRegistry};
use crate::symbology::{AccountType, Symbology};
use crate::translators::{market_data, order_routing};
use crate::upstream::{UpstreamCommand, UpstreamEvent, UpstreamOrderSnapshot, UpstreamRestClient, UpstreamWsClient};

/// Whether a Peer's Service is the market-data or order-routing acceptor
/// (§3). A Peer inherits this from its owning Service and behaves
/// accordingly — an order-routing Peer never opens market-data
/// subscriptions and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerRole {
    MarketData,
    OrderRouting,
}

/// How long `Peer::on_logon` waits for the upstream to settle the
/// authentication handshake before giving up (§4.5, §5).
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of an in-flight upstream authentication, broadcast over a
/// `watch` channel so `on_logon`'s bounded wait and `handle_upstream_event`'s
/// `AuthSuccess`/`AuthFailed` arms can rendezvous without a missed wakeup:
/// the channel is reset to `Pending` and subscribed to *before* the
/// `Authenticate` command is sent, so the response can never arrive before
/// something is listening for it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum AuthOutcome {
    Pending,
    Success,
    Failed(String),
}

struct PeerState {
    id_registry: IdRegistry,
    order_cache: OrderCache,
    subscriptions: SubscriptionRegistry,
    cancels: CancelRegistry,
    authenticated: bool,
    /// False while the upstream WS connection is down: new orders are
    /// rejected with `ExchangeClosed` rather than queued, since there is no
    /// order book to route them against. Existing cached orders are left
    /// untouched — only entry of new risk is blocked.
    connected: bool,
    /// Trade ids already turned into an ExecutionReport. The upstream
    /// reports every fill twice (`te` then `tu`); whichever arrives first
    /// wins and the second is a pure duplicate regardless of which event
    /// variant carried it.
    applied_trade_ids: std::collections::HashSet<i64>,
}

impl PeerState {
    fn new() -> Self {
        Self {
            id_registry: IdRegistry::new(),
            order_cache: OrderCache::new(),
            subscriptions: SubscriptionRegistry::new(),
            cancels: CancelRegistry::new(),
            authenticated: false,
            connected: true,
            applied_trade_ids: std::collections::HashSet::new(),
        }
    }
}

pub struct Peer {
    pub role: PeerRole,
    ws: Arc<dyn UpstreamWsClient>,
    rest: Arc<dyn UpstreamRestClient>,
    symbology: Symbology,
    state: Mutex<PeerState>,
    auth: tokio::sync::watch::Sender<AuthOutcome>,
}

impl Peer {
    pub fn new(role: PeerRole, ws: Arc<dyn UpstreamWsClient>, rest: Arc<dyn UpstreamRestClient>) -> Self {
        let (auth, _) = tokio::sync::watch::channel(AuthOutcome::Pending);
        Self { role, ws, rest, symbology: Symbology::default(), state: Mutex::new(PeerState::new()), auth }
    }

    /// Block until the upstream settles the authentication handshake
    /// triggered by this Logon, or until `AUTH_TIMEOUT` elapses (§4.5, §5).
    /// Application messages stay gated on `state.authenticated` until this
    /// resolves `Ok`.
    pub async fn on_logon(&self, credentials: crate::upstream::UpstreamCredentials) -> GatewayResult<()> {
        self.auth.send_replace(AuthOutcome::Pending);
        let mut rx = self.auth.subscribe();
        self.ws.send(UpstreamCommand::Authenticate(credentials)).await?;

        let wait = async {
            loop {
                match &*rx.borrow() {
                    AuthOutcome::Success => return Ok(()),
                    AuthOutcome::Failed(message) => return Err(GatewayError::AuthFailed(message.clone())),
                    AuthOutcome::Pending => {}
                }
                if rx.changed().await.is_err() {
                    return Err(GatewayError::AuthFailed("auth channel closed".into()));
                }
            }
        };

        match tokio::time::timeout(AUTH_TIMEOUT, wait).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::AuthFailed("timed out waiting for upstream authentication".into())),
        }
    }

    pub fn on_logout(&self) {
        let mut state = self.state.lock();
        *state = PeerState::new();
        self.auth.send_replace(AuthOutcome::Pending);
        info!("peer logged out, state cleared");
    }

    /// Handle one inbound FIX application message of known type, returning
    /// outbound FIX messages to send back (zero or more; an
    /// `ExecutionReport`/`MarketDataSnapshotFullRefresh`/etc never blocks
    /// on upstream I/O here — upstream calls are fire-and-forget commands,
    /// the response arrives later through `handle_upstream_event`).
    pub async fn handle_new_order_single(&self, req: NewOrderRequest) -> GatewayResult<Option<quickfix::Message>> {
        let account_type = req.account_type;

        {
            let state = self.state.lock();
            if !state.connected || !state.authenticated {
                let intent = order_routing::execution_report_for_new_reject(
                    &req.cl_ord_id,
                    &req.symbol,
                    req.side,
                    crate::error::OrderRejectReason::ExchangeClosed,
                    "exchange connection unavailable",
                );
                return Ok(Some(build_execution_report(&intent)));
            }
        }

        let cmd = match order_routing::translate_new_order(&req, &self.symbology, account_type) {
            Ok(cmd) => cmd,
            Err(e) => {
                let intent = order_routing::execution_report_for_new_reject(
                    &req.cl_ord_id,
                    &req.symbol,
                    req.side,
                    e.reject_reason(),
                    &e.to_string(),
                );
                return Ok(Some(build_execution_report(&intent)));
            }
        };
        let order = OrderRecord::new(
            req.cl_ord_id.clone(),
            req.symbol.clone(),
            cmd.symbol.clone(),
            req.side,
            req.order_type,
            req.time_in_force,
            crate::models::order::OrderFlags::default(),
            req.price,
            req.stop_price,
            req.order_qty,
            account_type,
        );

        {
            let mut state = self.state.lock();
            state.id_registry.register_pending(&req.cl_ord_id);
            state.order_cache.insert(order);
        }

        self.ws.send(UpstreamCommand::NewOrder(cmd)).await?;
        Ok(None)
    }

    pub async fn handle_cancel_request(&self, req: CancelRequest) -> GatewayResult<Option<quickfix::Message>> {
        let order_id = {
            let state = self.state.lock();
            if !state.connected || !state.authenticated {
                let intent = order_routing::order_cancel_reject(
                    &req.cl_ord_id,
                    &req.orig_cl_ord_id,
                    None,
                    "exchange connection unavailable",
                );
                return Ok(Some(build_order_cancel_reject(&intent)));
            }
            let order = state.order_cache.get(&req.orig_cl_ord_id);
            order.and_then(|o| o.order_id.clone())
        };

        let Some(order_id_str) = order_id else {
            let intent = order_routing::order_cancel_reject(&req.cl_ord_id, &req.orig_cl_ord_id, None, "unknown order");
            return Ok(Some(build_order_cancel_reject(&intent)));
        };
        let order_id: i64 = order_id_str
            .parse()
            .map_err(|_| GatewayError::InternalError("non-numeric OrderID in cache".into()))?;

        {
            let mut state = self.state.lock();
            state.cancels.register(req.cl_ord_id.clone(), req.orig_cl_ord_id.clone(), order_id_str, PendingCancelKind::Cancel);
        }

        self.ws.send(UpstreamCommand::CancelOrder { order_id }).await?;
        Ok(None)
    }

    pub async fn handle_cancel_replace_request(&self, req: CancelReplaceRequest) -> GatewayResult<Option<quickfix::Message>> {
        let order_id_str = {
            let state = self.state.lock();
            if !state.connected || !state.authenticated {
                let intent = order_routing::order_cancel_reject(
                    &req.cl_ord_id,
                    &req.orig_cl_ord_id,
                    None,
                    "exchange connection unavailable",
                );
                return Ok(Some(build_order_cancel_reject(&intent)));
            }
            state.order_cache.get(&req.orig_cl_ord_id).and_then(|o| o.order_id.clone())
        };

        let Some(order_id_str) = order_id_str else {
            let intent = order_routing::order_cancel_reject(&req.cl_ord_id, &req.orig_cl_ord_id, None, "unknown order");
            return Ok(Some(build_order_cancel_reject(&intent)));
        };
        let order_id: i64 = order_id_str
            .parse()
            .map_err(|_| GatewayError::InternalError("non-numeric OrderID in cache".into()))?;

        let cmd = order_routing::translate_cancel_replace(&req, order_id)?;

        {
            let mut state = self.state.lock();
            state.cancels.register(req.cl_ord_id.clone(), req.orig_cl_ord_id.clone(), order_id_str, PendingCancelKind::Replace);
        }

        self.ws.send(UpstreamCommand::UpdateOrder(cmd)).await?;
        Ok(None)
    }

    /// Answer an `OrderStatusRequest`: prefer the live cache, fall back to
    /// REST history before giving up (§4.3, §9).
    pub async fn handle_order_status_request(&self, msg: &quickfix::Message) -> GatewayResult<quickfix::Message> {
        let cl_ord_id = extract_order_status_request(msg)?;

        let cached = {
            let state = self.state.lock();
            if !state.connected || !state.authenticated {
                return Err(GatewayError::order_reject(OrderRejectReason::ExchangeClosed, "exchange connection unavailable"));
            }
            state.order_cache.get(&cl_ord_id).cloned_summary()
        };

        if let Some(intent) = cached {
            return Ok(build_execution_report(&intent));
        }

        let symbol = msg.get_field(crate::fix::tags::SYMBOL).map(|v| v.to_string()).unwrap_or_default();
        let upstream_symbol = self.symbology.to_upstream(&symbol, AccountType::Spot).unwrap_or(symbol.clone());

        match self.rest.order_history(&upstream_symbol, &cl_ord_id).await? {
            Some(historical) => Ok(build_execution_report(&historical_to_intent(&cl_ord_id, &historical))),
            None => Err(GatewayError::order_reject(
                OrderRejectReason::UnknownOrder,
                format!("no order found for ClOrdID {cl_ord_id}"),
            )),
        }
    }

    pub async fn handle_market_data_request(&self, req: MarketDataRequestFields) -> GatewayResult<Option<quickfix::Message>> {
        {
            let state = self.state.lock();
            if !state.connected || !state.authenticated {
                return Ok(Some(build_market_data_request_reject(&req.md_req_id, "exchange connection unavailable")));
            }
        }
        let upstream_symbol = match self.symbology.to_upstream(&req.symbol, AccountType::Spot) {
            Ok(symbol) => symbol,
            Err(_) => {
                return Ok(Some(build_market_data_request_reject(&req.md_req_id, "unknown symbol")));
            }
        };

        match req.subscription_request_type {
            MdSubscriptionRequestType::Subscribe => {
                let mut entry_types = std::collections::HashSet::new();
                if req.want_bid {
                    entry_types.insert(MdEntryType::Bid);
                }
                if req.want_offer {
                    entry_types.insert(MdEntryType::Offer);
                }
                if req.want_trade {
                    entry_types.insert(MdEntryType::Trade);
                }

                {
                    let mut state = self.state.lock();
                    state.subscriptions.open(req.md_req_id.clone(), upstream_symbol.clone(), req.market_depth, entry_types);
                }

                self.ws
                    .send(UpstreamCommand::SubscribeBook {
                        symbol: upstream_symbol.clone(),
                        precision: "P0".into(),
                        frequency: "F0".into(),
                        len: req.market_depth.max(25),
                    })
                    .await?;
                self.ws.send(UpstreamCommand::SubscribeTrades { symbol: upstream_symbol }).await?;
                Ok(None)
            }
            MdSubscriptionRequestType::Unsubscribe => {
                let channel_ids = {
                    let mut state = self.state.lock();
                    state.subscriptions.close(&req.md_req_id)
                };
                for channel_id in channel_ids {
                    self.ws.send(UpstreamCommand::Unsubscribe { channel_id }).await?;
                }
                Ok(None)
            }
        }
    }

    /// Route one event from the upstream WS connection, producing zero or
    /// more outbound FIX messages.
    pub fn handle_upstream_event(&self, event: UpstreamEvent) -> Vec<quickfix::Message> {
        let mut state = self.state.lock();
        match event {
            UpstreamEvent::AuthSuccess { .. } => {
                state.authenticated = true;
                state.connected = true;
                self.auth.send_replace(AuthOutcome::Success);
                Vec::new()
            }
            UpstreamEvent::AuthFailed { message, .. } => {
                warn!("upstream auth failed: {message}");
                self.auth.send_replace(AuthOutcome::Failed(message.clone()));
                vec![build_logout(&format!("AuthFailed: {message}"))]
            }
            UpstreamEvent::OrderNew(snapshot) => on_order_ack(&mut state, &snapshot),
            UpstreamEvent::OrderNewRequestFailed { cl_ord_id, reason } => {
                on_order_new_failed(&mut state, cl_ord_id, &reason)
            }
            UpstreamEvent::OrderCancel(snapshot) => on_cancel_ack(&mut state, &snapshot),
            UpstreamEvent::OrderCancelRequestFailed { order_id, reason } => {
                on_cancel_failed(&mut state, order_id, &reason)
            }
            UpstreamEvent::OrderUpdate(snapshot) => on_replace_ack(&mut state, &snapshot),
            UpstreamEvent::OrderUpdateRequestFailed { order_id, reason } => {
                on_cancel_failed(&mut state, order_id, &reason)
            }
            UpstreamEvent::TradeExecuted(trade) => on_trade(&mut state, &trade),
            UpstreamEvent::TradeExecutionUpdate(trade) => on_trade(&mut state, &trade),
            UpstreamEvent::BookSnapshot { channel_id, levels } => on_book_snapshot(&mut state, channel_id, &levels),
            UpstreamEvent::BookUpdate { channel_id, level } => on_book_update(&mut state, channel_id, &level),
            UpstreamEvent::TradeTick { channel_id, price, amount } => on_trade_tick(&mut state, channel_id, price, amount),
            UpstreamEvent::Subscribed { channel_id, symbol, .. } => {
                if let Some(md_req_id) = state.subscriptions.md_req_id_for_symbol(&symbol) {
                    state.subscriptions.attach_channel(&md_req_id, channel_id);
                }
                Vec::new()
            }
            UpstreamEvent::WalletSnapshot | UpstreamEvent::Unsubscribed { .. } => Vec::new(),
            UpstreamEvent::Info { message, .. } => {
                info!("upstream info: {message}");
                Vec::new()
            }
            UpstreamEvent::Error { message, .. } => {
                warn!("upstream error: {message}");
                Vec::new()
            }
            UpstreamEvent::Disconnected => {
                warn!("upstream connection dropped; awaiting reconnect");
                state.connected = false;
                Vec::new()
            }
        }
    }
}

fn on_order_ack(state: &mut PeerState, snapshot: &UpstreamOrderSnapshot) -> Vec<quickfix::Message> {
    let cl_ord_id = match &snapshot.cl_ord_id {
        Some(id) => id.clone(),
        None => state.id_registry.synthesize_for_unknown_order(&snapshot.order_id.to_string()),
    };
    state.id_registry.assign(&cl_ord_id, &snapshot.order_id.to_string());
    state.order_cache.index_order_id(&cl_ord_id, &snapshot.order_id.to_string());

    let Some(order) = state.order_cache.get(&cl_ord_id) else {
        return Vec::new();
    };
    vec![build_execution_report(&order_routing::execution_report_for_new_ack(order, snapshot))]
}

fn on_order_new_failed(state: &mut PeerState, cl_ord_id: Option<String>, reason: &str) -> Vec<quickfix::Message> {
    let Some(cl_ord_id) = cl_ord_id else {
        return Vec::new();
    };
    let Some(order) = state.order_cache.get(&cl_ord_id) else {
        return Vec::new();
    };
    let intent = order_routing::execution_report_for_new_reject(
        &cl_ord_id,
        &order.fix_symbol,
        order.side,
        crate::error::OrderRejectReason::UpstreamRejected,
        reason,
    );
    state.order_cache.evict(&cl_ord_id);
    state.id_registry.release(&cl_ord_id);
    vec![build_execution_report(&intent)]
}

fn on_cancel_ack(state: &mut PeerState, snapshot: &UpstreamOrderSnapshot) -> Vec<quickfix::Message> {
    let Some(cl_ord_id) = state.id_registry.lookup_by_server(&snapshot.order_id.to_string()).map(str::to_string) else {
        return Vec::new();
    };
    let pending = state.cancels.resolve_for_order(&snapshot.order_id.to_string());
    let Some(order) = state.order_cache.get_mut(&cl_ord_id) else {
        return Vec::new();
    };
    order.set_status(crate::models::order::OrderStatus::Canceled);
    let intent = match &pending {
        Some((report_cl_ord_id, rec)) => {
            order_routing::execution_report_for_cancel(order, report_cl_ord_id, Some(&rec.orig_cl_ord_id))
        }
        None => order_routing::execution_report_for_cancel(order, &cl_ord_id, None),
    };
    state.order_cache.evict(&cl_ord_id);
    state.id_registry.release(&cl_ord_id);
    vec![build_execution_report(&intent)]
}

/// Successful `ou` ack: the order stays live under the replace's own
/// ClOrdID, with the new qty/price from the upstream's echoed snapshot.
fn on_replace_ack(state: &mut PeerState, snapshot: &UpstreamOrderSnapshot) -> Vec<quickfix::Message> {
    let Some(cl_ord_id) = state.id_registry.lookup_by_server(&snapshot.order_id.to_string()).map(str::to_string) else {
        return Vec::new();
    };
    let Some((new_cl_ord_id, rec)) = state.cancels.resolve_for_order(&snapshot.order_id.to_string()) else {
        return Vec::new();
    };

    state.order_cache.rekey(&cl_ord_id, &new_cl_ord_id);
    state.id_registry.release(&cl_ord_id);
    state.id_registry.assign(&new_cl_ord_id, &snapshot.order_id.to_string());

    let Some(order) = state.order_cache.get_mut(&new_cl_ord_id) else {
        return Vec::new();
    };
    order.total_qty = snapshot.amount_orig.abs();
    order.price = snapshot.price;
    order.set_status(crate::models::order::OrderStatus::New);

    let intent = order_routing::execution_report_for_replace(order, &new_cl_ord_id, &rec.orig_cl_ord_id);
    vec![build_execution_report(&intent)]
}

fn on_cancel_failed(state: &mut PeerState, order_id: Option<i64>, reason: &str) -> Vec<quickfix::Message> {
    let Some(order_id) = order_id else {
        return Vec::new();
    };
    let Some((cl_ord_id, pending)) = state.cancels.resolve_for_order(&order_id.to_string()) else {
        return Vec::new();
    };
    let intent = order_routing::order_cancel_reject(&cl_ord_id, &pending.orig_cl_ord_id, Some(order_id.to_string()), reason);
    vec![build_order_cancel_reject(&intent)]
}

fn on_trade(state: &mut PeerState, trade: &crate::upstream::UpstreamTrade) -> Vec<quickfix::Message> {
    let Some(cl_ord_id) = state.id_registry.lookup_by_server(&trade.order_id.to_string()).map(str::to_string) else {
        return Vec::new();
    };
    let already_applied = !state.applied_trade_ids.insert(trade.trade_id);
    let Some(order) = state.order_cache.get_mut(&cl_ord_id) else {
        return Vec::new();
    };
    match order_routing::execution_report_for_trade(order, trade, already_applied) {
        Some(intent) => vec![build_execution_report(&intent)],
        None => Vec::new(),
    }
}

fn on_book_snapshot(
    state: &mut PeerState,
    channel_id: u64,
    levels: &[crate::upstream::UpstreamBookLevel],
) -> Vec<quickfix::Message> {
    let Some(sub) = state.subscriptions.by_channel_id(channel_id) else {
        return Vec::new();
    };
    let md_req_id = sub.md_req_id.clone();
    let upstream_symbol = sub.upstream_symbol.clone();
    let book_levels = market_data::snapshot_to_book_levels(levels);
    let mut out = vec![build_md_snapshot(&md_req_id, &upstream_symbol, &book_levels)];

    // Replay whatever book/trade deltas arrived before this snapshot did,
    // in order, instead of dropping them (§5).
    let (buffered_books, buffered_trades) = state.subscriptions.mark_snapshot_delivered(&md_req_id);
    for level in &buffered_books {
        let entry = market_data::book_update_to_incremental(level);
        out.push(build_md_incremental(&md_req_id, &upstream_symbol, &[entry]));
    }
    for (price, amount) in buffered_trades {
        let entry = market_data::trade_tick_to_incremental(price, amount);
        out.push(build_md_incremental(&md_req_id, &upstream_symbol, &[entry]));
    }
    out
}

fn on_book_update(state: &mut PeerState, channel_id: u64, level: &crate::upstream::UpstreamBookLevel) -> Vec<quickfix::Message> {
    let Some(sub) = state.subscriptions.by_channel_id(channel_id) else {
        return Vec::new();
    };
    let md_req_id = sub.md_req_id.clone();
    let upstream_symbol = sub.upstream_symbol.clone();
    let snapshot_delivered = sub.snapshot_delivered;

    if !snapshot_delivered {
        state.subscriptions.buffer_book_update(&md_req_id, *level);
        return Vec::new();
    }
    let entry = market_data::book_update_to_incremental(level);
    vec![build_md_incremental(&md_req_id, &upstream_symbol, &[entry])]
}

fn on_trade_tick(
    state: &mut PeerState,
    channel_id: u64,
    price: rust_decimal::Decimal,
    amount: rust_decimal::Decimal,
) -> Vec<quickfix::Message> {
    let Some(sub) = state.subscriptions.by_channel_id(channel_id) else {
        return Vec::new();
    };
    let md_req_id = sub.md_req_id.clone();
    let upstream_symbol = sub.upstream_symbol.clone();
    let snapshot_delivered = sub.snapshot_delivered;

    if !snapshot_delivered {
        state.subscriptions.buffer_trade_tick(&md_req_id, price, amount);
        return Vec::new();
    }
    let entry = market_data::trade_tick_to_incremental(price, amount);
    vec![build_md_incremental(&md_req_id, &upstream_symbol, &[entry])]
}

fn historical_to_intent(cl_ord_id: &str, historical: &crate::upstream::HistoricalOrder) -> ExecutionReportIntent {
    ExecutionReportIntent {
        cl_ord_id: cl_ord_id.to_string(),
        orig_cl_ord_id: None,
        order_id: Some(historical.order_id.to_string()),
        exec_id: order_routing::new_exec_id(),
        exec_type: crate::models::execution::ExecType::OrderStatus,
        ord_status: parse_historical_status(&historical.status),
        symbol: historical.symbol.clone(),
        side: if historical.amount_orig.is_sign_negative() {
            crate::models::order::OrderSide::Sell
        } else {
            crate::models::order::OrderSide::Buy
        },
        last_qty: rust_decimal::Decimal::ZERO,
        last_px: rust_decimal::Decimal::ZERO,
        leaves_qty: historical.amount.abs(),
        cum_qty: (historical.amount_orig.abs() - historical.amount.abs()).max(rust_decimal::Decimal::ZERO),
        avg_px: historical.price.unwrap_or(rust_decimal::Decimal::ZERO),
        ord_rej_reason: None,
        text: None,
    }
}

fn parse_historical_status(status: &str) -> crate::models::order::OrderStatus {
    use crate::models::order::OrderStatus::*;
    if status.starts_with("EXECUTED") {
        Filled
    } else if status.starts_with("PARTIALLY") {
        PartiallyFilled
    } else if status.starts_with("CANCELED") {
        Canceled
    } else {
        New
    }
}

trait OrderSummary {
    fn cloned_summary(self) -> Option<ExecutionReportIntent>;
}

impl OrderSummary for Option<&OrderRecord> {
    fn cloned_summary(self) -> Option<ExecutionReportIntent> {
        self.map(|order| ExecutionReportIntent {
            cl_ord_id: order.cl_ord_id.clone(),
            orig_cl_ord_id: None,
            order_id: order.order_id.clone(),
            exec_id: order_routing::new_exec_id(),
            exec_type: crate::models::execution::ExecType::OrderStatus,
            ord_status: order.status,
            symbol: order.fix_symbol.clone(),
            side: order.side,
            last_qty: rust_decimal::Decimal::ZERO,
            last_px: rust_decimal::Decimal::ZERO,
            leaves_qty: order.remaining_qty(),
            cum_qty: order.cum_qty,
            avg_px: order.avg_px,
            ord_rej_reason: None,
            text: None,
        })
    }
}
