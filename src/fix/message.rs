/*
 * BFX-FIX GATEWAY - FIX MESSAGE BUILDERS/EXTRACTORS
 * =================================================================
 * Component Name: src/fix/message.rs
 * Core Responsibility: convert between `quickfix::Message` and the
 * protocol-agnostic intents in `models`. Builders turn an intent into
 * an outbound message; extractors turn an inbound message into the
 * typed request the translators expect.
 * =================================================================
 */

use std::str::FromStr;

use quickfix::Message;
use rust_decimal::Decimal;

use crate::error::{GatewayError, GatewayResult};
use crate::fix::tags;
use crate::models::execution::{
    BusinessMessageRejectIntent, ExecType, ExecutionReportIntent, OrderCancelRejectIntent,
};
use crate::models::order::{OrderSide, OrdType, TimeInForce};
use crate::upstream::UpstreamCredentials;

// ---------------------------------------------------------------------
// Outbound builders
// ---------------------------------------------------------------------

pub fn build_execution_report(intent: &ExecutionReportIntent) -> Message {
    let mut msg = Message::new("8");
    msg.set_field(tags::CL_ORD_ID, intent.cl_ord_id.clone());
    if let Some(orig) = &intent.orig_cl_ord_id {
        msg.set_field(tags::ORIG_CL_ORD_ID, orig.clone());
    }
    if let Some(order_id) = &intent.order_id {
        msg.set_field(tags::ORDER_ID, order_id.clone());
    } else {
        msg.set_field(tags::ORDER_ID, "NONE");
    }
    msg.set_field(tags::EXEC_ID, intent.exec_id.clone());
    msg.set_field(tags::EXEC_TYPE, exec_type_code(intent.exec_type));
    msg.set_field(tags::ORD_STATUS, ord_status_code(intent.ord_status));
    msg.set_field(tags::SYMBOL, intent.symbol.clone());
    msg.set_field(tags::SIDE, side_code(intent.side));
    msg.set_field(tags::LAST_QTY, intent.last_qty.to_string());
    msg.set_field(tags::LAST_PX, intent.last_px.to_string());
    msg.set_field(tags::LEAVES_QTY, intent.leaves_qty.to_string());
    msg.set_field(tags::CUM_QTY, intent.cum_qty.to_string());
    msg.set_field(tags::AVG_PX, intent.avg_px.to_string());
    if let Some(reason) = &intent.ord_rej_reason {
        msg.set_field(tags::ORD_REJ_REASON, reason.clone());
    }
    if let Some(text) = &intent.text {
        msg.set_field(tags::TEXT, text.clone());
    }
    msg
}

pub fn build_order_cancel_reject(intent: &OrderCancelRejectIntent) -> Message {
    let mut msg = Message::new("9");
    msg.set_field(tags::CL_ORD_ID, intent.cl_ord_id.clone());
    msg.set_field(tags::ORIG_CL_ORD_ID, intent.orig_cl_ord_id.clone());
    msg.set_field(tags::ORDER_ID, intent.order_id.clone().unwrap_or_else(|| "NONE".into()));
    msg.set_field(tags::ORD_STATUS, "8");
    msg.set_field(tags::CXL_REJ_RESPONSE_TO, "1");
    msg.set_field(tags::CXL_REJ_REASON, intent.cxl_rej_reason.clone());
    if let Some(text) = &intent.text {
        msg.set_field(tags::TEXT, text.clone());
    }
    msg
}

/// A Logout (MsgType=5) carrying the reason in `Text` — sent when the
/// upstream rejects authentication and the session can no longer proceed.
pub fn build_logout(text: &str) -> Message {
    let mut msg = Message::new("5");
    msg.set_field(tags::TEXT, text.to_string());
    msg
}

pub fn build_market_data_request_reject(md_req_id: &str, text: &str) -> Message {
    let mut msg = Message::new("Y");
    msg.set_field(tags::MD_REQ_ID, md_req_id.to_string());
    msg.set_field(tags::TEXT, text.to_string());
    msg
}

pub fn build_business_message_reject(intent: &BusinessMessageRejectIntent) -> Message {
    let mut msg = Message::new("j");
    msg.set_field(tags::REF_MSG_TYPE, intent.ref_msg_type.clone());
    msg.set_field(tags::BUSINESS_REJECT_REASON, intent.reject_reason.clone());
    msg.set_field(tags::TEXT, intent.text.clone());
    msg
}

pub fn build_md_snapshot(md_req_id: &str, symbol: &str, levels: &[crate::models::execution::BookLevel]) -> Message {
    let mut msg = Message::new("W");
    msg.set_field(tags::MD_REQ_ID, md_req_id.to_string());
    msg.set_field(tags::SYMBOL, symbol.to_string());
    msg.set_field(tags::NO_MD_ENTRIES, levels.len().to_string());
    for level in levels {
        msg.set_field(tags::MD_ENTRY_TYPE, book_side_code(level.side));
        msg.set_field(tags::MD_ENTRY_PX, level.price.to_string());
        msg.set_field(tags::MD_ENTRY_SIZE, level.size.to_string());
    }
    msg
}

pub fn build_md_incremental(
    md_req_id: &str,
    symbol: &str,
    entries: &[crate::models::execution::MdIncrementalEntry],
) -> Message {
    let mut msg = Message::new("X");
    msg.set_field(tags::MD_REQ_ID, md_req_id.to_string());
    msg.set_field(tags::NO_MD_ENTRIES, entries.len().to_string());
    for entry in entries {
        msg.set_field(tags::SYMBOL, symbol.to_string());
        msg.set_field(tags::MD_UPDATE_ACTION, md_update_action_code(entry.action));
        if entry.is_trade {
            msg.set_field(tags::MD_ENTRY_TYPE, "2");
        } else if let Some(side) = entry.side {
            msg.set_field(tags::MD_ENTRY_TYPE, book_side_code(side));
        }
        msg.set_field(tags::MD_ENTRY_PX, entry.price.to_string());
        msg.set_field(tags::MD_ENTRY_SIZE, entry.size.to_string());
    }
    msg
}

fn book_side_code(side: crate::models::execution::BookSide) -> &'static str {
    match side {
        crate::models::execution::BookSide::Bid => "0",
        crate::models::execution::BookSide::Offer => "1",
    }
}

fn md_update_action_code(action: crate::models::execution::MdUpdateAction) -> &'static str {
    match action {
        crate::models::execution::MdUpdateAction::New => "0",
        crate::models::execution::MdUpdateAction::Change => "1",
        crate::models::execution::MdUpdateAction::Delete => "2",
    }
}

fn exec_type_code(exec_type: ExecType) -> &'static str {
    match exec_type {
        ExecType::New => "0",
        ExecType::Canceled => "4",
        ExecType::Replaced => "5",
        ExecType::Rejected => "8",
        ExecType::Expired => "C",
        ExecType::Trade => "F",
        ExecType::OrderStatus => "I",
        ExecType::DoneForDay => "3",
    }
}

fn ord_status_code(status: crate::models::order::OrderStatus) -> &'static str {
    use crate::models::order::OrderStatus::*;
    match status {
        PendingNew => "A",
        New => "0",
        PartiallyFilled => "1",
        Filled => "2",
        Canceled => "4",
        Replaced => "5",
        Rejected => "8",
        Expired => "C",
        DoneForDay => "3",
    }
}

fn side_code(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "1",
        OrderSide::Sell => "2",
    }
}

// ---------------------------------------------------------------------
// Inbound extractors
// ---------------------------------------------------------------------

pub struct NewOrderRequest {
    pub cl_ord_id: String,
    pub symbol: String,
    pub account_type: crate::symbology::AccountType,
    pub side: OrderSide,
    pub order_type: OrdType,
    pub time_in_force: TimeInForce,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub order_qty: Decimal,
}

/// `Account` (tag 1) carries the upstream account-type hint as `"exchange"`
/// or `"margin"`; absent or unrecognized defaults to spot, matching the
/// upstream's own default trading wallet.
fn parse_account_type(msg: &Message) -> crate::symbology::AccountType {
    match optional_field(msg, tags::ACCOUNT).as_deref() {
        Some("margin") => crate::symbology::AccountType::Margin,
        _ => crate::symbology::AccountType::Spot,
    }
}

pub fn extract_new_order_single(msg: &Message) -> GatewayResult<NewOrderRequest> {
    Ok(NewOrderRequest {
        cl_ord_id: required_field(msg, tags::CL_ORD_ID)?,
        symbol: required_field(msg, tags::SYMBOL)?,
        account_type: parse_account_type(msg),
        side: parse_side(&required_field(msg, tags::SIDE)?)?,
        order_type: parse_ord_type(&required_field(msg, tags::ORD_TYPE)?)?,
        time_in_force: optional_field(msg, tags::TIME_IN_FORCE)
            .map(|v| parse_tif(&v))
            .transpose()?
            .unwrap_or(TimeInForce::GoodTillCancel),
        price: parse_decimal_field(msg, tags::PRICE),
        stop_price: parse_decimal_field(msg, 99),
        order_qty: parse_decimal_field(msg, tags::ORDER_QTY)
            .ok_or_else(|| GatewayError::ProtocolReject("missing OrderQty".into()))?,
    })
}

pub struct CancelRequest {
    pub cl_ord_id: String,
    pub orig_cl_ord_id: String,
    pub symbol: String,
}

pub fn extract_cancel_request(msg: &Message) -> GatewayResult<CancelRequest> {
    Ok(CancelRequest {
        cl_ord_id: required_field(msg, tags::CL_ORD_ID)?,
        orig_cl_ord_id: required_field(msg, tags::ORIG_CL_ORD_ID)?,
        symbol: required_field(msg, tags::SYMBOL)?,
    })
}

pub struct CancelReplaceRequest {
    pub cl_ord_id: String,
    pub orig_cl_ord_id: String,
    pub symbol: String,
    pub price: Option<Decimal>,
    pub order_qty: Option<Decimal>,
}

pub fn extract_cancel_replace_request(msg: &Message) -> GatewayResult<CancelReplaceRequest> {
    Ok(CancelReplaceRequest {
        cl_ord_id: required_field(msg, tags::CL_ORD_ID)?,
        orig_cl_ord_id: required_field(msg, tags::ORIG_CL_ORD_ID)?,
        symbol: required_field(msg, tags::SYMBOL)?,
        price: parse_decimal_field(msg, tags::PRICE),
        order_qty: parse_decimal_field(msg, tags::ORDER_QTY),
    })
}

pub fn extract_order_status_request(msg: &Message) -> GatewayResult<String> {
    required_field(msg, tags::CL_ORD_ID)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MdSubscriptionRequestType {
    Subscribe,
    Unsubscribe,
}

pub struct MarketDataRequestFields {
    pub md_req_id: String,
    pub subscription_request_type: MdSubscriptionRequestType,
    pub market_depth: u32,
    pub symbol: String,
    pub want_bid: bool,
    pub want_offer: bool,
    pub want_trade: bool,
}

pub fn extract_market_data_request(msg: &Message) -> GatewayResult<MarketDataRequestFields> {
    let sub_type = match required_field(msg, tags::SUBSCRIPTION_REQUEST_TYPE)?.as_str() {
        "1" => MdSubscriptionRequestType::Subscribe,
        "2" => MdSubscriptionRequestType::Unsubscribe,
        other => {
            return Err(GatewayError::ProtocolReject(format!(
                "unsupported SubscriptionRequestType {other}"
            )))
        }
    };
    let market_depth = optional_field(msg, tags::MARKET_DEPTH).and_then(|v| v.parse().ok()).unwrap_or(0);
    Ok(MarketDataRequestFields {
        md_req_id: required_field(msg, tags::MD_REQ_ID)?,
        subscription_request_type: sub_type,
        market_depth,
        symbol: required_field(msg, tags::SYMBOL)?,
        want_bid: true,
        want_offer: true,
        want_trade: true,
    })
}

/// Extract upstream credentials per §9: the acceptor accepts either
/// `Username`/`Password` (api key / secret verbatim) or `RawData` in the
/// form `key:secret`. No other form is inferred.
pub fn extract_credentials(msg: &Message) -> GatewayResult<UpstreamCredentials> {
    if let (Some(username), Some(password)) =
        (optional_field(msg, tags::USERNAME), optional_field(msg, tags::PASSWORD))
    {
        return Ok(UpstreamCredentials { api_key: username, api_secret: password.into() });
    }
    if let Some(raw) = optional_field(msg, tags::RAW_DATA) {
        if let Some((key, secret)) = raw.split_once(':') {
            return Ok(UpstreamCredentials {
                api_key: key.to_string(),
                api_secret: secret.to_string().into(),
            });
        }
    }
    Err(GatewayError::AuthFailed(
        "Logon carried neither Username/Password nor a valid RawData \"key:secret\" pair".into(),
    ))
}

fn required_field(msg: &Message, tag: i32) -> GatewayResult<String> {
    msg.get_field(tag)
        .map(|v| v.to_string())
        .ok_or_else(|| GatewayError::ProtocolReject(format!("missing required tag {tag}")))
}

fn optional_field(msg: &Message, tag: i32) -> Option<String> {
    msg.get_field(tag).map(|v| v.to_string())
}

fn parse_decimal_field(msg: &Message, tag: i32) -> Option<Decimal> {
    optional_field(msg, tag).and_then(|v| Decimal::from_str(&v).ok())
}

fn parse_side(value: &str) -> GatewayResult<OrderSide> {
    match value {
        "1" => Ok(OrderSide::Buy),
        "2" => Ok(OrderSide::Sell),
        other => Err(GatewayError::ProtocolReject(format!("unrecognized Side {other}"))),
    }
}

fn parse_ord_type(value: &str) -> GatewayResult<OrdType> {
    match value {
        "1" => Ok(OrdType::Market),
        "2" => Ok(OrdType::Limit),
        "3" => Ok(OrdType::Stop),
        "4" => Ok(OrdType::StopLimit),
        other => Err(GatewayError::ProtocolReject(format!("unrecognized OrdType {other}"))),
    }
}

fn parse_tif(value: &str) -> GatewayResult<TimeInForce> {
    match value {
        "0" => Ok(TimeInForce::GoodTillCancel),
        "3" => Ok(TimeInForce::ImmediateOrCancel),
        "4" => Ok(TimeInForce::FillOrKill),
        "6" => Ok(TimeInForce::GoodTillDate),
        other => Err(GatewayError::ProtocolReject(format!("unrecognized TimeInForce {other}"))),
    }
}
