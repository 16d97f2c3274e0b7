/*
 * BFX-FIX GATEWAY - ORDER CACHE
 * =================================================================
 * Component Name: src/order_cache.rs
 * Core Responsibility: per-peer store of live orders with their
 * last-known state, remaining qty, cumulative qty, average price.
 * Updated exclusively by the upstream event path; the FIX request path
 * only reads it.
 * =================================================================
 */

use std::collections::HashMap;

use crate::models::order::OrderRecord;

#[derive(Debug, Default)]
pub struct OrderCache {
    by_cl_ord_id: HashMap<String, OrderRecord>,
    cl_ord_by_order_id: HashMap<String, String>,
}

impl OrderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, order: OrderRecord) {
        if let Some(order_id) = &order.order_id {
            self.cl_ord_by_order_id.insert(order_id.clone(), order.cl_ord_id.clone());
        }
        self.by_cl_ord_id.insert(order.cl_ord_id.clone(), order);
    }

    pub fn get(&self, cl_ord_id: &str) -> Option<&OrderRecord> {
        self.by_cl_ord_id.get(cl_ord_id)
    }

    pub fn get_mut(&mut self, cl_ord_id: &str) -> Option<&mut OrderRecord> {
        self.by_cl_ord_id.get_mut(cl_ord_id)
    }

    pub fn get_by_order_id(&self, order_id: &str) -> Option<&OrderRecord> {
        self.cl_ord_by_order_id.get(order_id).and_then(|cl| self.by_cl_ord_id.get(cl))
    }

    pub fn get_by_order_id_mut(&mut self, order_id: &str) -> Option<&mut OrderRecord> {
        let cl_ord_id = self.cl_ord_by_order_id.get(order_id)?.clone();
        self.by_cl_ord_id.get_mut(&cl_ord_id)
    }

    /// Record that an OrderID has been assigned to a previously-pending
    /// order, maintaining the secondary index.
    pub fn index_order_id(&mut self, cl_ord_id: &str, order_id: &str) {
        self.cl_ord_by_order_id.insert(order_id.to_string(), cl_ord_id.to_string());
        if let Some(order) = self.by_cl_ord_id.get_mut(cl_ord_id) {
            order.order_id = Some(order_id.to_string());
        }
    }

    /// Re-key an order after a successful `OrderCancelReplaceRequest`: the
    /// replace's own ClOrdID becomes the order's primary key going forward,
    /// carrying the OrderID index with it.
    pub fn rekey(&mut self, old_cl_ord_id: &str, new_cl_ord_id: &str) {
        let Some(mut order) = self.by_cl_ord_id.remove(old_cl_ord_id) else {
            return;
        };
        order.cl_ord_id = new_cl_ord_id.to_string();
        if let Some(order_id) = &order.order_id {
            self.cl_ord_by_order_id.insert(order_id.clone(), new_cl_ord_id.to_string());
        }
        self.by_cl_ord_id.insert(new_cl_ord_id.to_string(), order);
    }

    /// Evict a terminal order. Callers consult the REST client before
    /// eviction causes a later `OrderStatusRequest` to miss (§4.3).
    pub fn evict(&mut self, cl_ord_id: &str) {
        if let Some(order) = self.by_cl_ord_id.remove(cl_ord_id) {
            if let Some(order_id) = order.order_id {
                self.cl_ord_by_order_id.remove(&order_id);
            }
        }
    }

    pub fn active_orders(&self) -> impl Iterator<Item = &OrderRecord> {
        self.by_cl_ord_id.values().filter(|o| o.is_active())
    }

    pub fn len(&self) -> usize {
        self.by_cl_ord_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cl_ord_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{OrderFlags, OrderSide, OrderStatus, OrdType, TimeInForce};
    use crate::symbology::AccountType;
    use rust_decimal_macros::dec;

    fn sample(cl_ord_id: &str) -> OrderRecord {
        OrderRecord::new(
            cl_ord_id.into(),
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
        )
    }

    #[test]
    fn insert_and_lookup_both_indexes() {
        let mut cache = OrderCache::new();
        let mut order = sample("c1");
        order.order_id = Some("s1".into());
        cache.insert(order);

        assert!(cache.get("c1").is_some());
        assert!(cache.get_by_order_id("s1").is_some());
    }

    #[test]
    fn index_order_id_after_insert() {
        let mut cache = OrderCache::new();
        cache.insert(sample("c1"));
        cache.index_order_id("c1", "s1");

        assert_eq!(cache.get_by_order_id("s1").unwrap().cl_ord_id, "c1");
        assert_eq!(cache.get("c1").unwrap().order_id.as_deref(), Some("s1"));
    }

    #[test]
    fn rekey_moves_order_under_new_cl_ord_id() {
        let mut cache = OrderCache::new();
        let mut order = sample("c2");
        order.order_id = Some("s2".into());
        cache.insert(order);

        cache.rekey("c2", "c2x");
        assert!(cache.get("c2").is_none());
        assert_eq!(cache.get("c2x").unwrap().cl_ord_id, "c2x");
        assert_eq!(cache.get_by_order_id("s2").unwrap().cl_ord_id, "c2x");
    }

    #[test]
    fn evict_clears_both_indexes() {
        let mut cache = OrderCache::new();
        let mut order = sample("c1");
        order.order_id = Some("s1".into());
        order.set_status(OrderStatus::Filled);
        cache.insert(order);

        cache.evict("c1");
        assert!(cache.get("c1").is_none());
        assert!(cache.get_by_order_id("s1").is_none());
    }

    #[test]
    fn active_orders_excludes_terminal() {
        let mut cache = OrderCache::new();
        cache.insert(sample("c1"));
        let mut terminal = sample("c2");
        terminal.set_status(OrderStatus::Canceled);
        cache.insert(terminal);

        let active: Vec<_> = cache.active_orders().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].cl_ord_id, "c1");
    }
}
