/*
 * BFX-FIX GATEWAY - ORDER ROUTING TRANSLATOR
 * =================================================================
 * Component Name: src/translators/order_routing.rs
 * Core Responsibility: FIX order-routing messages <-> upstream order
 * commands/events (§4.6.a, §4.6.b). Trade dedup: the upstream reports
 * every fill twice, first as `te` (provisional, no fee) then as `tu`
 * (authoritative, carries fees); a trade id already applied from a `te`
 * must not be re-applied from its matching `tu`.
 * =================================================================
 */

use uuid::Uuid;

use crate::error::{GatewayError, GatewayResult, OrderRejectReason};
use crate::fix::message::{CancelReplaceRequest, CancelRequest, NewOrderRequest};
use crate::models::execution::{ExecType, ExecutionReportIntent, OrderCancelRejectIntent};
use crate::models::order::{OrderRecord, OrderStatus};
use crate::symbology::Symbology;
use crate::upstream::{NewOrderCommand, UpdateOrderCommand, UpstreamOrderSnapshot, UpstreamTrade};

pub fn translate_new_order(
    req: &NewOrderRequest,
    symbology: &Symbology,
    account_type: crate::symbology::AccountType,
) -> GatewayResult<NewOrderCommand> {
    let upstream_symbol = symbology.to_upstream(&req.symbol, account_type)?;
    Ok(NewOrderCommand {
        cl_ord_id: req.cl_ord_id.clone(),
        symbol: upstream_symbol,
        amount: signed_amount(req.order_qty, req.side),
        price: req.price,
        price_trailing: None,
        order_type: upstream_order_type(req.order_type, req.time_in_force),
        flags: 0,
    })
}

fn signed_amount(qty: rust_decimal::Decimal, side: crate::models::order::OrderSide) -> rust_decimal::Decimal {
    match side {
        crate::models::order::OrderSide::Buy => qty,
        crate::models::order::OrderSide::Sell => -qty,
    }
}

fn upstream_order_type(
    ord_type: crate::models::order::OrdType,
    tif: crate::models::order::TimeInForce,
) -> String {
    use crate::models::order::OrdType::*;
    use crate::models::order::TimeInForce::*;
    match (ord_type, tif) {
        (Market, ImmediateOrCancel) | (Market, FillOrKill) => "MARKET".into(),
        (Market, _) => "MARKET".into(),
        (Limit, ImmediateOrCancel) => "IOC".into(),
        (Limit, FillOrKill) => "FOK".into(),
        (Limit, _) => "LIMIT".into(),
        (Stop, _) => "STOP".into(),
        (StopLimit, _) => "STOP LIMIT".into(),
    }
}

pub fn translate_cancel(req: &CancelRequest, order_id: i64) -> GatewayResult<i64> {
    let _ = &req.symbol;
    Ok(order_id)
}

pub fn translate_cancel_replace(
    req: &CancelReplaceRequest,
    order_id: i64,
) -> GatewayResult<UpdateOrderCommand> {
    Ok(UpdateOrderCommand { order_id, amount: req.order_qty, price: req.price })
}

pub fn new_exec_id() -> String {
    Uuid::new_v4().to_string()
}

/// Build the ExecutionReport for a successful `on` acknowledgement.
pub fn execution_report_for_new_ack(order: &OrderRecord, snapshot: &UpstreamOrderSnapshot) -> ExecutionReportIntent {
    ExecutionReportIntent {
        cl_ord_id: order.cl_ord_id.clone(),
        orig_cl_ord_id: None,
        order_id: Some(snapshot.order_id.to_string()),
        exec_id: new_exec_id(),
        exec_type: ExecType::New,
        ord_status: OrderStatus::New,
        symbol: order.fix_symbol.clone(),
        side: order.side,
        last_qty: rust_decimal::Decimal::ZERO,
        last_px: rust_decimal::Decimal::ZERO,
        leaves_qty: order.remaining_qty(),
        cum_qty: order.cum_qty,
        avg_px: order.avg_px,
        ord_rej_reason: None,
        text: None,
    }
}

/// FIX `OrdRejReason` (tag 103) code for a given classification.
fn ord_rej_reason_code(reason: OrderRejectReason) -> &'static str {
    match reason {
        OrderRejectReason::SymbolUnknown => "1",
        OrderRejectReason::UnknownOrder => "5",
        OrderRejectReason::ExchangeClosed => "2",
        OrderRejectReason::UpstreamRejected => "0",
        OrderRejectReason::Malformed => "99",
    }
}

/// Build the ExecutionReport for an order that never reached the upstream
/// book — either the gateway itself refused it (unknown symbol, exchange
/// unreachable) or the upstream's own `on-req-failed` came back.
pub fn execution_report_for_new_reject(
    cl_ord_id: &str,
    symbol: &str,
    side: crate::models::order::OrderSide,
    reason: OrderRejectReason,
    detail: &str,
) -> ExecutionReportIntent {
    ExecutionReportIntent {
        cl_ord_id: cl_ord_id.to_string(),
        orig_cl_ord_id: None,
        order_id: None,
        exec_id: new_exec_id(),
        exec_type: ExecType::Rejected,
        ord_status: OrderStatus::Rejected,
        symbol: symbol.to_string(),
        side,
        last_qty: rust_decimal::Decimal::ZERO,
        last_px: rust_decimal::Decimal::ZERO,
        leaves_qty: rust_decimal::Decimal::ZERO,
        cum_qty: rust_decimal::Decimal::ZERO,
        avg_px: rust_decimal::Decimal::ZERO,
        ord_rej_reason: Some(ord_rej_reason_code(reason).into()),
        text: Some(detail.to_string()),
    }
}

/// Apply a `te`/`tu` trade event to `order`, returning the resulting
/// ExecutionReport unless this trade id has already been applied.
pub fn execution_report_for_trade(
    order: &mut OrderRecord,
    trade: &UpstreamTrade,
    already_applied: bool,
) -> Option<ExecutionReportIntent> {
    if already_applied {
        return None;
    }
    let fill_qty = trade.exec_amount.abs();
    order.apply_fill(fill_qty, trade.exec_price);

    Some(ExecutionReportIntent {
        cl_ord_id: order.cl_ord_id.clone(),
        orig_cl_ord_id: None,
        order_id: order.order_id.clone(),
        exec_id: trade.trade_id.to_string(),
        exec_type: ExecType::Trade,
        ord_status: order.status,
        symbol: order.fix_symbol.clone(),
        side: order.side,
        last_qty: fill_qty,
        last_px: trade.exec_price,
        leaves_qty: order.remaining_qty(),
        cum_qty: order.cum_qty,
        avg_px: order.avg_px,
        ord_rej_reason: None,
        text: None,
    })
}

/// Build the ExecutionReport for a successful cancel ack. `cl_ord_id` is the
/// cancel request's own ClOrdID (not the original order's) and
/// `orig_cl_ord_id` cites the order it cancelled, matching what the FIX
/// client sent on `OrderCancelRequest`.
pub fn execution_report_for_cancel(order: &OrderRecord, cl_ord_id: &str, orig_cl_ord_id: Option<&str>) -> ExecutionReportIntent {
    ExecutionReportIntent {
        cl_ord_id: cl_ord_id.to_string(),
        orig_cl_ord_id: orig_cl_ord_id.map(|s| s.to_string()),
        order_id: order.order_id.clone(),
        exec_id: new_exec_id(),
        exec_type: ExecType::Canceled,
        ord_status: OrderStatus::Canceled,
        symbol: order.fix_symbol.clone(),
        side: order.side,
        last_qty: rust_decimal::Decimal::ZERO,
        last_px: rust_decimal::Decimal::ZERO,
        leaves_qty: rust_decimal::Decimal::ZERO,
        cum_qty: order.cum_qty,
        avg_px: order.avg_px,
        ord_rej_reason: None,
        text: None,
    }
}

/// Build the ExecutionReport for a successful replace ack (`ou`). The order
/// stays live under its new ClOrdID; `cl_ord_id`/`orig_cl_ord_id` mirror the
/// `OrderCancelReplaceRequest` the same way a cancel ack mirrors its cancel.
pub fn execution_report_for_replace(order: &OrderRecord, cl_ord_id: &str, orig_cl_ord_id: &str) -> ExecutionReportIntent {
    ExecutionReportIntent {
        cl_ord_id: cl_ord_id.to_string(),
        orig_cl_ord_id: Some(orig_cl_ord_id.to_string()),
        order_id: order.order_id.clone(),
        exec_id: new_exec_id(),
        exec_type: ExecType::Replaced,
        ord_status: OrderStatus::Replaced,
        symbol: order.fix_symbol.clone(),
        side: order.side,
        last_qty: rust_decimal::Decimal::ZERO,
        last_px: rust_decimal::Decimal::ZERO,
        leaves_qty: order.remaining_qty(),
        cum_qty: order.cum_qty,
        avg_px: order.avg_px,
        ord_rej_reason: None,
        text: None,
    }
}

pub fn order_cancel_reject(cl_ord_id: &str, orig_cl_ord_id: &str, order_id: Option<String>, reason: &str) -> OrderCancelRejectIntent {
    OrderCancelRejectIntent {
        cl_ord_id: cl_ord_id.to_string(),
        orig_cl_ord_id: orig_cl_ord_id.to_string(),
        order_id,
        cxl_rej_reason: "0".into(),
        text: Some(reason.to_string()),
    }
}

pub fn unknown_order_error(order_id: &str) -> GatewayError {
    GatewayError::order_reject(crate::error::OrderRejectReason::UnknownOrder, format!("no open order {order_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderFlags, OrderSide, OrdType, TimeInForce};
    use crate::symbology::AccountType;
    use rust_decimal_macros::dec;

    fn sample_order() -> OrderRecord {
        let mut order = OrderRecord::new(
            "c1".into(),
            "BTC/USD".into(),
            "tBTCUSD".into(),
            OrderSide::Buy,
            OrdType::Limit,
            TimeInForce::GoodTillCancel,
            OrderFlags::default(),
            Some(dec!(30000)),
            None,
            dec!(1),
            AccountType::Spot,
        );
        order.order_id = Some("s1".into());
        order.set_status(OrderStatus::New);
        order
    }

    #[test]
    fn new_order_buy_has_positive_amount() {
        let symbology = Symbology::default();
        let req = NewOrderRequest {
            cl_ord_id: "c1".into(),
            symbol: "BTC/USD".into(),
            account_type: AccountType::Spot,
            side: OrderSide::Buy,
            order_type: OrdType::Limit,
            time_in_force: TimeInForce::GoodTillCancel,
            price: Some(dec!(30000)),
            stop_price: None,
            order_qty: dec!(1),
        };
        let cmd = translate_new_order(&req, &symbology, AccountType::Spot).unwrap();
        assert_eq!(cmd.amount, dec!(1));
        assert_eq!(cmd.symbol, "tBTCUSD");
    }

    #[test]
    fn new_order_sell_has_negative_amount() {
        let symbology = Symbology::default();
        let req = NewOrderRequest {
            cl_ord_id: "c1".into(),
            symbol: "BTC/USD".into(),
            account_type: AccountType::Spot,
            side: OrderSide::Sell,
            order_type: OrdType::Limit,
            time_in_force: TimeInForce::GoodTillCancel,
            price: Some(dec!(30000)),
            stop_price: None,
            order_qty: dec!(1),
        };
        let cmd = translate_new_order(&req, &symbology, AccountType::Spot).unwrap();
        assert_eq!(cmd.amount, dec!(-1));
    }

    #[test]
    fn trade_dedup_skips_already_applied() {
        let mut order = sample_order();
        let trade = UpstreamTrade {
            trade_id: 1,
            order_id: 1,
            symbol: "tBTCUSD".into(),
            exec_amount: dec!(1),
            exec_price: dec!(30000),
            fee: None,
            fee_currency: None,
            maker: true,
        };
        let first = execution_report_for_trade(&mut order, &trade, false);
        assert!(first.is_some());
        assert_eq!(order.status, OrderStatus::Filled);

        let second = execution_report_for_trade(&mut order, &trade, true);
        assert!(second.is_none());
    }
}
