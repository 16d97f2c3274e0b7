/*
 * BFX-FIX GATEWAY - OUTBOUND FIX INTENTS
 * =================================================================
 * Component Name: src/models/execution.rs
 * Core Responsibility: Protocol-agnostic description of an outbound FIX
 * message, produced by the translators and turned into a `quickfix::Message`
 * by the Peer/Adapter. Keeping these as plain structs (rather than building
 * `quickfix::Message` directly in the translators) is what makes the
 * translator functions pure and unit-testable without a FIX engine running.
 * =================================================================
 */

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::order::{OrderSide, OrderStatus};

/// FIX `ExecType` (tag 150).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecType {
    New,
    Rejected,
    Trade,
    Canceled,
    Replaced,
    Expired,
    DoneForDay,
    OrderStatus,
}

/// Everything needed to populate an outbound `ExecutionReport` (35=8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionReportIntent {
    pub cl_ord_id: String,
    pub orig_cl_ord_id: Option<String>,
    pub order_id: Option<String>,
    pub exec_id: String,
    pub exec_type: ExecType,
    pub ord_status: OrderStatus,
    pub symbol: String,
    pub side: OrderSide,
    pub last_qty: Decimal,
    pub last_px: Decimal,
    pub leaves_qty: Decimal,
    pub cum_qty: Decimal,
    pub avg_px: Decimal,
    pub ord_rej_reason: Option<String>,
    pub text: Option<String>,
}

/// Everything needed to populate an outbound `OrderCancelReject` (35=9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCancelRejectIntent {
    pub cl_ord_id: String,
    pub orig_cl_ord_id: String,
    pub order_id: Option<String>,
    pub cxl_rej_reason: String,
    pub text: Option<String>,
}

/// Everything needed to populate an outbound `BusinessMessageReject` (35=j).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessMessageRejectIntent {
    pub ref_msg_type: String,
    pub ref_seq_num: Option<i64>,
    pub reject_reason: String,
    pub text: String,
}

/// A single level of a market-data snapshot, after sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookSide {
    Bid,
    Offer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookLevel {
    pub side: BookSide,
    pub price: Decimal,
    pub size: Decimal,
}

/// FIX `MDUpdateAction` (tag 279).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MdUpdateAction {
    New,
    Change,
    Delete,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MdIncrementalEntry {
    pub action: MdUpdateAction,
    pub side: Option<BookSide>,
    pub price: Decimal,
    pub size: Decimal,
    pub is_trade: bool,
}
