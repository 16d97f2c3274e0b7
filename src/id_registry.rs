/*
 * BFX-FIX GATEWAY - ID REGISTRY
 * =================================================================
 * Component Name: src/id_registry.rs
 * Core Responsibility: correlate client-assigned ClOrdID with
 * server-assigned OrderID in both directions across an order's lifetime.
 * This is the single hardest invariant of the gateway: a fill event that
 * carries only an OrderID must still find its way back to the FIX client
 * that owns the ClOrdID.
 * =================================================================
 */

use std::collections::{HashMap, HashSet};

/// Per-peer, single-writer-per-stream correlation table. Not `Send`-shared
/// across peers; a Peer owns exactly one.
#[derive(Debug, Default)]
pub struct IdRegistry {
    cl_ord_to_order: HashMap<String, String>,
    order_to_cl_ord: HashMap<String, String>,
    /// ClOrdIDs sent upstream but not yet acknowledged with an OrderID.
    pending: HashSet<String>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `cl_ord_id` has been sent upstream and is awaiting an
    /// OrderID. Idempotent.
    pub fn register_pending(&mut self, cl_ord_id: &str) {
        self.pending.insert(cl_ord_id.to_string());
    }

    pub fn is_pending(&self, cl_ord_id: &str) -> bool {
        self.pending.contains(cl_ord_id)
    }

    /// Assign `order_id` to `cl_ord_id`. Idempotent: the upstream may echo
    /// the same acknowledgement more than once on reconnect, and re-asserting
    /// an identical mapping must not be treated as an error.
    pub fn assign(&mut self, cl_ord_id: &str, order_id: &str) {
        self.pending.remove(cl_ord_id);
        self.cl_ord_to_order.insert(cl_ord_id.to_string(), order_id.to_string());
        self.order_to_cl_ord.insert(order_id.to_string(), cl_ord_id.to_string());
    }

    pub fn lookup_by_client(&self, cl_ord_id: &str) -> Option<&str> {
        self.cl_ord_to_order.get(cl_ord_id).map(String::as_str)
    }

    pub fn lookup_by_server(&self, order_id: &str) -> Option<&str> {
        self.order_to_cl_ord.get(order_id).map(String::as_str)
    }

    /// Drop both sides of a mapping when an order reaches a terminal state.
    pub fn release(&mut self, cl_ord_id: &str) {
        if let Some(order_id) = self.cl_ord_to_order.remove(cl_ord_id) {
            self.order_to_cl_ord.remove(&order_id);
        }
        self.pending.remove(cl_ord_id);
    }

    /// An OrderID was reported for a ClOrdID this registry has never seen
    /// (the order was likely placed out-of-band). Synthesize a ClOrdID of
    /// the form `srv-<OrderID>`, register the pair so subsequent events
    /// correlate, and return it.
    pub fn synthesize_for_unknown_order(&mut self, order_id: &str) -> String {
        if let Some(existing) = self.order_to_cl_ord.get(order_id) {
            return existing.clone();
        }
        let synthetic = format!("srv-{}", order_id);
        self.assign(&synthetic, order_id);
        synthetic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_then_assign() {
        let mut reg = IdRegistry::new();
        reg.register_pending("c1");
        assert!(reg.is_pending("c1"));

        reg.assign("c1", "s1");
        assert!(!reg.is_pending("c1"));
        assert_eq!(reg.lookup_by_client("c1"), Some("s1"));
        assert_eq!(reg.lookup_by_server("s1"), Some("c1"));
    }

    #[test]
    fn assign_is_idempotent() {
        let mut reg = IdRegistry::new();
        reg.assign("c1", "s1");
        reg.assign("c1", "s1");
        assert_eq!(reg.lookup_by_client("c1"), Some("s1"));
    }

    #[test]
    fn release_clears_both_directions() {
        let mut reg = IdRegistry::new();
        reg.assign("c1", "s1");
        reg.release("c1");
        assert_eq!(reg.lookup_by_client("c1"), None);
        assert_eq!(reg.lookup_by_server("s1"), None);
    }

    #[test]
    fn unknown_order_gets_synthetic_client_id() {
        let mut reg = IdRegistry::new();
        let synthetic = reg.synthesize_for_unknown_order("s99");
        assert_eq!(synthetic, "srv-s99");
        assert_eq!(reg.lookup_by_server("s99"), Some(synthetic.as_str()));

        // Re-reporting the same out-of-band order must not mint a second id.
        let again = reg.synthesize_for_unknown_order("s99");
        assert_eq!(again, synthetic);
    }
}
