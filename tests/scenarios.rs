//! End-to-end scenario tests, driving a `Peer` against scripted upstream
//! events through a `mockall`-mocked `UpstreamWsClient`/`UpstreamRestClient`,
//! and asserting on the FIX messages produced. These exercise the
//! Peer/translator/registry layer in isolation from the live `quickfix`
//! acceptor — a `SessionId` backed by a real FIX session is only ever
//! constructed by the engine itself, so session-level delivery is covered
//! by the `fix_adapter` unit tests instead.

use std::sync::Arc;

use async_trait::async_trait;
use quickfix::Message;
use rust_decimal_macros::dec;

use bfx_fix_gateway::error::{GatewayError, GatewayResult};
use bfx_fix_gateway::fix::message::{
    extract_cancel_request, extract_credentials, extract_market_data_request, extract_new_order_single,
    MdSubscriptionRequestType,
};
use bfx_fix_gateway::fix::tags;
use bfx_fix_gateway::peer::{Peer, PeerRole};
use bfx_fix_gateway::upstream::{
    HistoricalOrder, UpstreamBookLevel, UpstreamCommand, UpstreamEvent, UpstreamOrderSnapshot, UpstreamRestClient,
    UpstreamTrade, UpstreamWsClient,
};

mockall::mock! {
    pub WsClient {}

    #[async_trait]
    impl UpstreamWsClient for WsClient {
        async fn send(&self, command: UpstreamCommand) -> GatewayResult<()>;
        async fn recv(&self) -> GatewayResult<UpstreamEvent>;
    }
}

mockall::mock! {
    pub RestClient {}

    #[async_trait]
    impl UpstreamRestClient for RestClient {
        async fn order_history(&self, symbol: &str, cl_ord_id: &str) -> GatewayResult<Option<HistoricalOrder>>;
        async fn active_orders(&self, symbol: &str) -> GatewayResult<Vec<HistoricalOrder>>;
    }
}

fn silent_ws() -> Arc<dyn UpstreamWsClient> {
    let mut mock = MockWsClient::new();
    mock.expect_send().returning(|_| Ok(()));
    Arc::new(mock)
}

fn empty_rest() -> Arc<dyn UpstreamRestClient> {
    let mut mock = MockRestClient::new();
    mock.expect_order_history().returning(|_, _| Ok(None));
    mock.expect_active_orders().returning(|_| Ok(Vec::new()));
    Arc::new(mock)
}

fn new_order_single(cl_ord_id: &str, symbol: &str, side: &str, qty: &str, price: &str) -> Message {
    let mut msg = Message::new("D");
    msg.set_field(tags::CL_ORD_ID, cl_ord_id.to_string());
    msg.set_field(tags::SYMBOL, symbol.to_string());
    msg.set_field(tags::SIDE, side.to_string());
    msg.set_field(tags::ORD_TYPE, "2".to_string()); // Limit
    msg.set_field(tags::ORDER_QTY, qty.to_string());
    msg.set_field(tags::PRICE, price.to_string());
    msg
}

fn cancel_request(cl_ord_id: &str, orig_cl_ord_id: &str, symbol: &str) -> Message {
    let mut msg = Message::new("F");
    msg.set_field(tags::CL_ORD_ID, cl_ord_id.to_string());
    msg.set_field(tags::ORIG_CL_ORD_ID, orig_cl_ord_id.to_string());
    msg.set_field(tags::SYMBOL, symbol.to_string());
    msg
}

fn market_data_request(md_req_id: &str, symbol: &str, depth: u32) -> Message {
    let mut msg = Message::new("V");
    msg.set_field(tags::MD_REQ_ID, md_req_id.to_string());
    msg.set_field(tags::SUBSCRIPTION_REQUEST_TYPE, "1".to_string());
    msg.set_field(tags::MARKET_DEPTH, depth.to_string());
    msg.set_field(tags::SYMBOL, symbol.to_string());
    msg
}

fn field(msg: &Message, tag: i32) -> Option<String> {
    msg.get_field(tag).map(|v| v.to_string())
}

// S1 — limit order fully filled: New ack, then a single Trade/Filled report.
#[tokio::test]
async fn s1_limit_order_fully_filled() {
    let peer = Peer::new(PeerRole::OrderRouting, silent_ws(), empty_rest());
    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });

    let req = extract_new_order_single(&new_order_single("c1", "BTC/USD", "1", "1", "30000")).unwrap();
    let reply = peer.handle_new_order_single(req).await.unwrap();
    assert!(reply.is_none(), "a routable order produces no immediate FIX reply");

    let ack = peer.handle_upstream_event(UpstreamEvent::OrderNew(UpstreamOrderSnapshot {
        order_id: 1001,
        cl_ord_id: Some("c1".into()),
        symbol: "tBTCUSD".into(),
        amount: dec!(1),
        amount_orig: dec!(1),
        price: Some(dec!(30000)),
        status: "ACTIVE".into(),
    }));
    assert_eq!(ack.len(), 1);
    assert_eq!(field(&ack[0], tags::EXEC_TYPE).as_deref(), Some("0"));
    assert_eq!(field(&ack[0], tags::ORD_STATUS).as_deref(), Some("0"));
    assert_eq!(field(&ack[0], tags::ORDER_ID).as_deref(), Some("1001"));
    assert_eq!(field(&ack[0], tags::CL_ORD_ID).as_deref(), Some("c1"));

    let fill = peer.handle_upstream_event(UpstreamEvent::TradeExecutionUpdate(UpstreamTrade {
        trade_id: 1,
        order_id: 1001,
        symbol: "tBTCUSD".into(),
        exec_amount: dec!(1),
        exec_price: dec!(30000),
        fee: Some(dec!(0.0006)),
        fee_currency: Some("BTC".into()),
        maker: false,
    }));
    assert_eq!(fill.len(), 1);
    assert_eq!(field(&fill[0], tags::EXEC_TYPE).as_deref(), Some("F"));
    assert_eq!(field(&fill[0], tags::ORD_STATUS).as_deref(), Some("2")); // Filled
    assert_eq!(field(&fill[0], tags::LAST_QTY).as_deref(), Some("1"));
    assert_eq!(field(&fill[0], tags::LAST_PX).as_deref(), Some("30000"));
    assert_eq!(field(&fill[0], tags::CUM_QTY).as_deref(), Some("1"));
    assert_eq!(field(&fill[0], tags::AVG_PX).as_deref(), Some("30000"));
}

// S2 — partial fill then cancel: cancel ack ends with a Canceled report
// carrying the cancel's own ClOrdID and the partial cum/leaves qty.
#[tokio::test]
async fn s2_partial_fill_then_cancel() {
    let peer = Peer::new(PeerRole::OrderRouting, silent_ws(), empty_rest());
    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });

    let req = extract_new_order_single(&new_order_single("c2", "BTC/USD", "1", "2", "30000")).unwrap();
    peer.handle_new_order_single(req).await.unwrap();
    peer.handle_upstream_event(UpstreamEvent::OrderNew(UpstreamOrderSnapshot {
        order_id: 2002,
        cl_ord_id: Some("c2".into()),
        symbol: "tBTCUSD".into(),
        amount: dec!(2),
        amount_orig: dec!(2),
        price: Some(dec!(30000)),
        status: "ACTIVE".into(),
    }));
    let partial = peer.handle_upstream_event(UpstreamEvent::TradeExecutionUpdate(UpstreamTrade {
        trade_id: 2,
        order_id: 2002,
        symbol: "tBTCUSD".into(),
        exec_amount: dec!(0.6),
        exec_price: dec!(30000),
        fee: None,
        fee_currency: None,
        maker: true,
    }));
    assert_eq!(field(&partial[0], tags::ORD_STATUS).as_deref(), Some("1")); // PartiallyFilled

    let cancel_req = extract_cancel_request(&cancel_request("c2x", "c2", "BTC/USD")).unwrap();
    let immediate = peer.handle_cancel_request(cancel_req).await.unwrap();
    assert!(immediate.is_none(), "a known order's cancel is routed upstream, not rejected on the spot");

    let cancel_ack = peer.handle_upstream_event(UpstreamEvent::OrderCancel(UpstreamOrderSnapshot {
        order_id: 2002,
        cl_ord_id: Some("c2".into()),
        symbol: "tBTCUSD".into(),
        amount: dec!(0),
        amount_orig: dec!(2),
        price: Some(dec!(30000)),
        status: "CANCELED".into(),
    }));
    assert_eq!(cancel_ack.len(), 1);
    assert_eq!(field(&cancel_ack[0], tags::ORD_STATUS).as_deref(), Some("4")); // Canceled
    assert_eq!(field(&cancel_ack[0], tags::CUM_QTY).as_deref(), Some("0.6"));
    assert_eq!(field(&cancel_ack[0], tags::LEAVES_QTY).as_deref(), Some("0"));
}

// S3 — unknown symbol: rejected with SymbolUnknown, no upstream send.
#[tokio::test]
async fn s3_unknown_symbol_rejects_without_upstream_send() {
    let mut mock = MockWsClient::new();
    mock.expect_send().times(0);
    let ws: Arc<dyn UpstreamWsClient> = Arc::new(mock);
    let peer = Peer::new(PeerRole::OrderRouting, ws, empty_rest());
    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });

    let req = extract_new_order_single(&new_order_single("c3", "ZZZ/QQQ", "1", "1", "1")).unwrap();
    let reply = peer.handle_new_order_single(req).await.unwrap();
    let reply = reply.expect("unroutable symbol produces an immediate Reject execution report");

    assert_eq!(field(&reply, tags::EXEC_TYPE).as_deref(), Some("8")); // Rejected
    assert_eq!(field(&reply, tags::ORD_STATUS).as_deref(), Some("8"));
    assert_eq!(field(&reply, tags::ORD_REJ_REASON).as_deref(), Some("1")); // SymbolUnknown
}

// S4 — market data snapshot, then an incremental change, then an incremental
// delete at the same price.
#[tokio::test]
async fn s4_market_data_snapshot_then_incrementals() {
    let peer = Peer::new(PeerRole::MarketData, silent_ws(), empty_rest());
    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });

    let req = extract_market_data_request(&market_data_request("m1", "BTC/USD", 10)).unwrap();
    assert_eq!(req.subscription_request_type, MdSubscriptionRequestType::Subscribe);
    let reply = peer.handle_market_data_request(req).await.unwrap();
    assert!(reply.is_none());

    let subscribed = peer.handle_upstream_event(UpstreamEvent::Subscribed {
        channel_id: 77,
        symbol: "tBTCUSD".into(),
        channel: "book".into(),
    });
    assert!(subscribed.is_empty());

    let snapshot = peer.handle_upstream_event(UpstreamEvent::BookSnapshot {
        channel_id: 77,
        levels: vec![
            UpstreamBookLevel { price: dec!(100), count: 1, amount: dec!(1) },
            UpstreamBookLevel { price: dec!(99), count: 1, amount: dec!(2) },
            UpstreamBookLevel { price: dec!(98), count: 1, amount: dec!(3) },
            UpstreamBookLevel { price: dec!(101), count: 1, amount: dec!(-1) },
            UpstreamBookLevel { price: dec!(102), count: 1, amount: dec!(-2) },
            UpstreamBookLevel { price: dec!(103), count: 1, amount: dec!(-3) },
        ],
    });
    assert_eq!(snapshot.len(), 1);
    assert_eq!(field(&snapshot[0], tags::NO_MD_ENTRIES).as_deref(), Some("6"));

    let change = peer.handle_upstream_event(UpstreamEvent::BookUpdate {
        channel_id: 77,
        level: UpstreamBookLevel { price: dec!(100), count: 2, amount: dec!(0.5) },
    });
    assert_eq!(change.len(), 1);
    assert_eq!(field(&change[0], tags::MD_UPDATE_ACTION).as_deref(), Some("1")); // Change
    assert_eq!(field(&change[0], tags::MD_ENTRY_TYPE).as_deref(), Some("0")); // Bid

    let delete = peer.handle_upstream_event(UpstreamEvent::BookUpdate {
        channel_id: 77,
        level: UpstreamBookLevel { price: dec!(100), count: 0, amount: dec!(0.5) },
    });
    assert_eq!(delete.len(), 1);
    assert_eq!(field(&delete[0], tags::MD_UPDATE_ACTION).as_deref(), Some("2")); // Delete
    assert_eq!(field(&delete[0], tags::MD_ENTRY_TYPE).as_deref(), Some("0")); // Bid side
}

// S5 — upstream disconnect mid-session: existing orders stay cached, a new
// order is rejected with ExchangeClosed until reconnection.
#[tokio::test]
async fn s5_upstream_disconnect_rejects_new_orders_until_reconnect() {
    let peer = Peer::new(PeerRole::OrderRouting, silent_ws(), empty_rest());
    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });

    let req = extract_new_order_single(&new_order_single("c5", "BTC/USD", "1", "1", "30000")).unwrap();
    peer.handle_new_order_single(req).await.unwrap();
    peer.handle_upstream_event(UpstreamEvent::OrderNew(UpstreamOrderSnapshot {
        order_id: 5001,
        cl_ord_id: Some("c5".into()),
        symbol: "tBTCUSD".into(),
        amount: dec!(1),
        amount_orig: dec!(1),
        price: Some(dec!(30000)),
        status: "ACTIVE".into(),
    }));

    let disconnected = peer.handle_upstream_event(UpstreamEvent::Disconnected);
    assert!(disconnected.is_empty());

    let req2 = extract_new_order_single(&new_order_single("c5b", "BTC/USD", "1", "1", "30000")).unwrap();
    let reply = peer.handle_new_order_single(req2).await.unwrap();
    let reply = reply.expect("an order placed while disconnected is rejected immediately");
    assert_eq!(field(&reply, tags::ORD_REJ_REASON).as_deref(), Some("2")); // ExchangeClosed

    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });
    let req3 = extract_new_order_single(&new_order_single("c5c", "BTC/USD", "1", "1", "30000")).unwrap();
    let reply3 = peer.handle_new_order_single(req3).await.unwrap();
    assert!(reply3.is_none(), "reconnection (re-authentication) re-opens order entry");
}

// S6 — auth rejected: a Logon lacking both supported credential forms is
// rejected before it ever reaches the upstream, and the failure is
// classified so the caller can cite it in the Logout text.
#[test]
fn s6_logon_without_credentials_is_rejected() {
    let msg = Message::new("A");
    let err = extract_credentials(&msg).unwrap_err();
    assert!(matches!(err, GatewayError::AuthFailed(_)));
    assert!(err.to_string().contains("neither"));
}

// S7 — the upstream rejects the authenticate command: the wired event path
// must produce a Logout citing AuthFailed, and order entry stays closed.
#[tokio::test]
async fn s7_upstream_auth_rejection_emits_logout_and_blocks_orders() {
    let peer = Peer::new(PeerRole::OrderRouting, silent_ws(), empty_rest());

    let outbound = peer.handle_upstream_event(UpstreamEvent::AuthFailed { code: 1, message: "invalid api key".into() });
    assert_eq!(outbound.len(), 1);
    assert_eq!(field(&outbound[0], 35).as_deref(), Some("5"));
    assert!(field(&outbound[0], tags::TEXT).unwrap().contains("AuthFailed"));

    let req = extract_new_order_single(&new_order_single("c7", "BTC/USD", "1", "1", "30000")).unwrap();
    let reply = peer.handle_new_order_single(req).await.unwrap();
    let reply = reply.expect("an unauthenticated peer rejects new orders on the spot");
    assert_eq!(field(&reply, tags::ORD_REJ_REASON).as_deref(), Some("2")); // ExchangeClosed
}

// S8 — a book delta and a trade tick that arrive before the snapshot are
// buffered and replayed as incrementals immediately after it, in order,
// instead of being silently dropped; the trade incremental carries
// MDEntryType=Trade.
#[tokio::test]
async fn s8_pre_snapshot_deltas_are_buffered_then_replayed() {
    let peer = Peer::new(PeerRole::MarketData, silent_ws(), empty_rest());
    peer.handle_upstream_event(UpstreamEvent::AuthSuccess { user_id: 1 });

    let req = extract_market_data_request(&market_data_request("m8", "BTC/USD", 10)).unwrap();
    peer.handle_market_data_request(req).await.unwrap();
    peer.handle_upstream_event(UpstreamEvent::Subscribed { channel_id: 88, symbol: "tBTCUSD".into(), channel: "book".into() });

    let early_update = peer.handle_upstream_event(UpstreamEvent::BookUpdate {
        channel_id: 88,
        level: UpstreamBookLevel { price: dec!(100), count: 1, amount: dec!(1) },
    });
    assert!(early_update.is_empty(), "a book delta before the snapshot is buffered, not forwarded");

    let early_trade = peer.handle_upstream_event(UpstreamEvent::TradeTick { channel_id: 88, price: dec!(100), amount: dec!(0.5) });
    assert!(early_trade.is_empty(), "a trade tick before the snapshot is buffered, not forwarded");

    let snapshot = peer.handle_upstream_event(UpstreamEvent::BookSnapshot {
        channel_id: 88,
        levels: vec![UpstreamBookLevel { price: dec!(99), count: 1, amount: dec!(2) }],
    });
    assert_eq!(snapshot.len(), 3, "snapshot, then the buffered book delta, then the buffered trade");
    assert_eq!(field(&snapshot[0], 35).as_deref(), Some("W"));
    assert_eq!(field(&snapshot[1], 35).as_deref(), Some("X"));
    assert_eq!(field(&snapshot[1], tags::MD_ENTRY_TYPE).as_deref(), Some("0")); // Bid
    assert_eq!(field(&snapshot[2], 35).as_deref(), Some("X"));
    assert_eq!(field(&snapshot[2], tags::MD_ENTRY_TYPE).as_deref(), Some("2")); // Trade

    let later_trade = peer.handle_upstream_event(UpstreamEvent::TradeTick { channel_id: 88, price: dec!(101), amount: dec!(1) });
    assert_eq!(later_trade.len(), 1, "once the snapshot is delivered, later deltas forward immediately");
    assert_eq!(field(&later_trade[0], tags::MD_ENTRY_TYPE).as_deref(), Some("2"));
}
