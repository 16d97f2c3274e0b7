/*
 * BFX-FIX GATEWAY - UPSTREAM ABSTRACTION
 * =================================================================
 * Component Name: src/upstream/mod.rs
 * Core Responsibility: isolate the Peer/translators from the concrete
 * upstream exchange transports. `UpstreamWsClient` and
 * `UpstreamRestClient` are the seams mocked by `mockall` in the
 * integration tests; `ws_client`/`rest_client` hold the real
 * `tokio-tungstenite`/`reqwest` implementations.
 * =================================================================
 */

pub mod auth;
pub mod rest_client;
pub mod ws_client;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;

/// Credentials for an authenticated upstream WS session, derived by the
/// FIX adapter from either `Username`/`Password` or `RawData` (§9).
#[derive(Debug, Clone)]
pub struct UpstreamCredentials {
    pub api_key: String,
    pub api_secret: zeroize::Zeroizing<String>,
}

/// Commands the Peer issues to the upstream WS connection.
#[derive(Debug, Clone)]
pub enum UpstreamCommand {
    Authenticate(UpstreamCredentials),
    SubscribeBook { symbol: String, precision: String, frequency: String, len: u32 },
    SubscribeTrades { symbol: String },
    SubscribeTicker { symbol: String },
    Unsubscribe { channel_id: u64 },
    NewOrder(NewOrderCommand),
    CancelOrder { order_id: i64 },
    UpdateOrder(UpdateOrderCommand),
}

#[derive(Debug, Clone)]
pub struct NewOrderCommand {
    pub cl_ord_id: String,
    pub symbol: String,
    pub amount: Decimal,
    pub price: Option<Decimal>,
    pub price_trailing: Option<Decimal>,
    pub order_type: String,
    pub flags: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateOrderCommand {
    pub order_id: i64,
    pub amount: Option<Decimal>,
    pub price: Option<Decimal>,
}

/// Events the Peer receives from the upstream WS connection. Named after
/// the upstream's own event taxonomy (`on`, `oc`, `ou`, `te`, `tu`, ...)
/// per §4.5, rather than generic labels, since that taxonomy is what the
/// translators pattern-match against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum UpstreamEvent {
    AuthSuccess { user_id: i64 },
    AuthFailed { code: i32, message: String },
    Subscribed { channel_id: u64, symbol: String, channel: String },
    Unsubscribed { channel_id: u64 },
    OrderNew(UpstreamOrderSnapshot),
    OrderNewRequestFailed { cl_ord_id: Option<String>, reason: String },
    OrderCancel(UpstreamOrderSnapshot),
    OrderCancelRequestFailed { order_id: Option<i64>, reason: String },
    OrderUpdate(UpstreamOrderSnapshot),
    OrderUpdateRequestFailed { order_id: Option<i64>, reason: String },
    TradeExecuted(UpstreamTrade),
    TradeExecutionUpdate(UpstreamTrade),
    WalletSnapshot,
    BookSnapshot { channel_id: u64, levels: Vec<UpstreamBookLevel> },
    BookUpdate { channel_id: u64, level: UpstreamBookLevel },
    TradeTick { channel_id: u64, price: Decimal, amount: Decimal },
    Info { code: i32, message: String },
    Error { code: i32, message: String },
    Disconnected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamOrderSnapshot {
    pub order_id: i64,
    pub cl_ord_id: Option<String>,
    pub symbol: String,
    pub amount: Decimal,
    pub amount_orig: Decimal,
    pub price: Option<Decimal>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamTrade {
    pub trade_id: i64,
    pub order_id: i64,
    pub symbol: String,
    pub exec_amount: Decimal,
    pub exec_price: Decimal,
    pub fee: Option<Decimal>,
    pub fee_currency: Option<String>,
    pub maker: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpstreamBookLevel {
    pub price: Decimal,
    pub count: u32,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoricalOrder {
    pub order_id: i64,
    pub cl_ord_id: Option<String>,
    pub symbol: String,
    pub amount: Decimal,
    pub amount_orig: Decimal,
    pub price: Option<Decimal>,
    pub status: String,
}

/// The live upstream WebSocket connection, as seen by a Peer. A real
/// implementation lives in `ws_client`; tests substitute a `mockall` mock.
#[async_trait]
pub trait UpstreamWsClient: Send + Sync {
    async fn send(&self, command: UpstreamCommand) -> GatewayResult<()>;
    async fn recv(&self) -> GatewayResult<UpstreamEvent>;
}

/// REST fallback used for `OrderStatusRequest` misses and startup
/// reconciliation (§4.3).
#[async_trait]
pub trait UpstreamRestClient: Send + Sync {
    async fn order_history(&self, symbol: &str, cl_ord_id: &str) -> GatewayResult<Option<HistoricalOrder>>;
    async fn active_orders(&self, symbol: &str) -> GatewayResult<Vec<HistoricalOrder>>;
}
