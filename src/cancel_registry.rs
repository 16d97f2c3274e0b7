/*
 * BFX-FIX GATEWAY - CANCEL REGISTRY
 * =================================================================
 * Component Name: src/cancel_registry.rs
 * Core Responsibility: track ClOrdIDs of in-flight
 * OrderCancelRequest/OrderCancelReplaceRequest messages against the
 * OrderID they target, so the upstream `oc`/`ou` acknowledgement (which
 * carries only the OrderID) can be matched back to the request that
 * caused it and an `OrderCancelReject` can cite the right
 * `OrigClOrdID` on failure (§3, §4.6.a).
 * =================================================================
 */

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCancelKind {
    Cancel,
    Replace,
}

#[derive(Debug, Clone)]
pub struct PendingCancel {
    pub orig_cl_ord_id: String,
    pub order_id: String,
    pub kind: PendingCancelKind,
}

#[derive(Debug, Default)]
pub struct CancelRegistry {
    pending: HashMap<String, PendingCancel>,
}

impl CancelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        cl_ord_id: String,
        orig_cl_ord_id: String,
        order_id: String,
        kind: PendingCancelKind,
    ) {
        self.pending.insert(cl_ord_id, PendingCancel { orig_cl_ord_id, order_id, kind });
    }

    pub fn get(&self, cl_ord_id: &str) -> Option<&PendingCancel> {
        self.pending.get(cl_ord_id)
    }

    pub fn is_pending_for_order(&self, order_id: &str) -> bool {
        self.pending.values().any(|p| p.order_id == order_id)
    }

    /// Resolve (accept or reject) a pending cancel/replace, removing it from
    /// the table.
    pub fn resolve(&mut self, cl_ord_id: &str) -> Option<PendingCancel> {
        self.pending.remove(cl_ord_id)
    }

    /// Find and remove whichever pending cancel/replace targets `order_id`,
    /// returning its own ClOrdID (the table's key) alongside the record. An
    /// upstream `oc`/`ou` acknowledgement carries only the OrderID, so this
    /// is how it gets back to the ClOrdID that requested it.
    pub fn resolve_for_order(&mut self, order_id: &str) -> Option<(String, PendingCancel)> {
        let cl_ord_id = self.pending.iter().find(|(_, p)| p.order_id == order_id).map(|(k, _)| k.clone())?;
        self.pending.remove(&cl_ord_id).map(|p| (cl_ord_id, p))
    }
}
