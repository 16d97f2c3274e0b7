/*
 * BFX-FIX GATEWAY - ORDER RECORD
 * =================================================================
 * Component Name: src/models/order.rs
 * Core Responsibility: The Order Cache's unit of storage — last-known
 * state of one live order, keyed by ClOrdID with a secondary OrderID index.
 * =================================================================
 */

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::Zero;
use serde::{Deserialize, Serialize};

use crate::symbology::AccountType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

/// FIX `OrdType` (tag 40), restricted to the values the upstream accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrdType {
    Market,
    Limit,
    Stop,
    StopLimit,
}

/// FIX `TimeInForce` (tag 59).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    GoodTillCancel,
    ImmediateOrCancel,
    FillOrKill,
    GoodTillDate,
}

/// Execution-instruction derived flags, mapped from `ExecInst`/`DisplayMethod`
/// into the upstream's own order-new payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFlags {
    pub post_only: bool,
    pub hidden: bool,
    /// Only meaningful for `OrdType::Stop`: trailing offset from
    /// `PegDifference` when `ExecInst = PrimaryPeg`.
    pub trailing: bool,
}

/// Order lifecycle state. Forms a DAG with `PendingNew` as the sole entry
/// point; `PartiallyFilled` may recur but the DAG never goes backwards once
/// a terminal state is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    PendingNew,
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Replaced,
    Rejected,
    Expired,
    DoneForDay,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Filled
                | OrderStatus::Canceled
                | OrderStatus::Rejected
                | OrderStatus::Expired
                | OrderStatus::DoneForDay
        )
    }

    /// Whether `to` is a legal successor of `self` in the lifecycle DAG
    /// (invariant #2 in the testable-properties list: no backwards
    /// transitions once terminal, and `New` is never re-entered).
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            OrderStatus::New => matches!(self, OrderStatus::PendingNew),
            _ => true,
        }
    }
}

/// One live (or recently-terminal) order as tracked by the Order Cache.
///
/// Invariant: `cum_qty <= total_qty`, and
/// `status in {Filled, DoneForDay} => remaining_qty() == 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub cl_ord_id: String,
    pub order_id: Option<String>,
    /// FIX-side symbol, e.g. `BTC/USD`.
    pub fix_symbol: String,
    /// Upstream symbol, e.g. `tBTCUSD`.
    pub upstream_symbol: String,
    pub side: OrderSide,
    pub order_type: OrdType,
    pub time_in_force: TimeInForce,
    pub flags: OrderFlags,
    pub price: Option<Decimal>,
    pub stop_price: Option<Decimal>,
    pub total_qty: Decimal,
    pub cum_qty: Decimal,
    pub avg_px: Decimal,
    pub status: OrderStatus,
    pub account_type: AccountType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        cl_ord_id: String,
        fix_symbol: String,
        upstream_symbol: String,
        side: OrderSide,
        order_type: OrdType,
        time_in_force: TimeInForce,
        flags: OrderFlags,
        price: Option<Decimal>,
        stop_price: Option<Decimal>,
        total_qty: Decimal,
        account_type: AccountType,
    ) -> Self {
        let now = Utc::now();
        Self {
            cl_ord_id,
            order_id: None,
            fix_symbol,
            upstream_symbol,
            side,
            order_type,
            time_in_force,
            flags,
            price,
            stop_price,
            total_qty,
            cum_qty: Decimal::ZERO,
            avg_px: Decimal::ZERO,
            status: OrderStatus::PendingNew,
            account_type,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn remaining_qty(&self) -> Decimal {
        (self.total_qty - self.cum_qty).max(Decimal::ZERO)
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Apply a fill (`te`/`tu`), updating cumulative qty and the weighted
    /// average price, and re-deriving status from the new remaining qty.
    pub fn apply_fill(&mut self, fill_qty: Decimal, fill_px: Decimal) {
        let prior_notional = self.avg_px * self.cum_qty;
        let fill_notional = fill_px * fill_qty;
        self.cum_qty += fill_qty;
        if !self.cum_qty.is_zero() {
            self.avg_px = (prior_notional + fill_notional) / self.cum_qty;
        }
        self.status = if self.remaining_qty().is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}
