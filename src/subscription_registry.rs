/*
 * BFX-FIX GATEWAY - SUBSCRIPTION REGISTRY
 * =================================================================
 * Component Name: src/subscription_registry.rs
 * Core Responsibility: correlate a FIX MDReqID with the upstream
 * subscription(s) it opened, so an incremental update arriving on a
 * book/trades channel can be routed back to the FIX session that
 * requested it, and so a `MarketDataRequest` carrying
 * `SubscriptionRequestType = Unsubscribe` can tear the right channels
 * down.
 * =================================================================
 */

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;

use crate::upstream::UpstreamBookLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MdEntryType {
    Bid,
    Offer,
    Trade,
}

#[derive(Debug, Clone)]
pub struct Subscription {
    pub md_req_id: String,
    pub upstream_symbol: String,
    pub market_depth: u32,
    pub entry_types: HashSet<MdEntryType>,
    /// Upstream channel ids returned on `subscribed`, one per channel kind.
    pub upstream_channel_ids: Vec<u64>,
    /// Set once the initial `MarketDataSnapshotFullRefresh` has been sent;
    /// until then, inbound book deltas are buffered rather than forwarded
    /// as incrementals (§4.6.c).
    pub snapshot_delivered: bool,
    /// Book updates that arrived before the snapshot did; drained and
    /// replayed as incrementals once `mark_snapshot_delivered` fires.
    pub pending_book_updates: Vec<UpstreamBookLevel>,
    /// Trade ticks that arrived before the snapshot did, same treatment.
    pub pending_trade_ticks: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    by_md_req_id: HashMap<String, Subscription>,
    md_req_by_channel_id: HashMap<u64, String>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(
        &mut self,
        md_req_id: String,
        upstream_symbol: String,
        market_depth: u32,
        entry_types: HashSet<MdEntryType>,
    ) {
        self.by_md_req_id.insert(
            md_req_id.clone(),
            Subscription {
                md_req_id,
                upstream_symbol,
                market_depth,
                entry_types,
                upstream_channel_ids: Vec::new(),
                snapshot_delivered: false,
                pending_book_updates: Vec::new(),
                pending_trade_ticks: Vec::new(),
            },
        );
    }

    pub fn attach_channel(&mut self, md_req_id: &str, channel_id: u64) {
        if let Some(sub) = self.by_md_req_id.get_mut(md_req_id) {
            sub.upstream_channel_ids.push(channel_id);
        }
        self.md_req_by_channel_id.insert(channel_id, md_req_id.to_string());
    }

    /// Buffer a book delta that arrived before the snapshot did. A no-op if
    /// the subscription is unknown or has already seen its snapshot.
    pub fn buffer_book_update(&mut self, md_req_id: &str, level: UpstreamBookLevel) {
        if let Some(sub) = self.by_md_req_id.get_mut(md_req_id) {
            sub.pending_book_updates.push(level);
        }
    }

    /// Buffer a trade tick that arrived before the snapshot did.
    pub fn buffer_trade_tick(&mut self, md_req_id: &str, price: Decimal, amount: Decimal) {
        if let Some(sub) = self.by_md_req_id.get_mut(md_req_id) {
            sub.pending_trade_ticks.push((price, amount));
        }
    }

    /// Mark the snapshot delivered and drain whatever buffered book/trade
    /// deltas arrived in the meantime, for the caller to replay as
    /// incrementals right after the snapshot.
    pub fn mark_snapshot_delivered(&mut self, md_req_id: &str) -> (Vec<UpstreamBookLevel>, Vec<(Decimal, Decimal)>) {
        let Some(sub) = self.by_md_req_id.get_mut(md_req_id) else {
            return (Vec::new(), Vec::new());
        };
        sub.snapshot_delivered = true;
        (std::mem::take(&mut sub.pending_book_updates), std::mem::take(&mut sub.pending_trade_ticks))
    }

    pub fn get(&self, md_req_id: &str) -> Option<&Subscription> {
        self.by_md_req_id.get(md_req_id)
    }

    pub fn by_channel_id(&self, channel_id: u64) -> Option<&Subscription> {
        self.md_req_by_channel_id.get(&channel_id).and_then(|id| self.by_md_req_id.get(id))
    }

    /// Find the MDReqID of the (at most one, per symbol) open subscription
    /// awaiting a channel attachment for `upstream_symbol`. Used to
    /// correlate an upstream `subscribed` acknowledgement — which carries a
    /// symbol and channel id but no MDReqID — back to the request that
    /// opened it.
    pub fn md_req_id_for_symbol(&self, upstream_symbol: &str) -> Option<String> {
        self.by_md_req_id
            .values()
            .find(|sub| sub.upstream_symbol == upstream_symbol)
            .map(|sub| sub.md_req_id.clone())
    }

    /// Tear down a subscription, returning the upstream channel ids that
    /// must now be unsubscribed.
    pub fn close(&mut self, md_req_id: &str) -> Vec<u64> {
        let Some(sub) = self.by_md_req_id.remove(md_req_id) else {
            return Vec::new();
        };
        for channel_id in &sub.upstream_channel_ids {
            self.md_req_by_channel_id.remove(channel_id);
        }
        sub.upstream_channel_ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_attach_channel_routes_by_channel_id() {
        let mut registry = SubscriptionRegistry::new();
        let mut types = HashSet::new();
        types.insert(MdEntryType::Bid);
        types.insert(MdEntryType::Offer);
        registry.open("md1".into(), "tBTCUSD".into(), 10, types);
        registry.attach_channel("md1", 42);

        assert_eq!(registry.by_channel_id(42).unwrap().md_req_id, "md1");
    }

    #[test]
    fn snapshot_flag_defaults_false_then_marked() {
        let mut registry = SubscriptionRegistry::new();
        registry.open("md1".into(), "tBTCUSD".into(), 10, HashSet::new());
        assert!(!registry.get("md1").unwrap().snapshot_delivered);

        registry.mark_snapshot_delivered("md1");
        assert!(registry.get("md1").unwrap().snapshot_delivered);
    }

    #[test]
    fn finds_md_req_id_by_symbol_for_unattached_subscription() {
        let mut registry = SubscriptionRegistry::new();
        registry.open("md1".into(), "tBTCUSD".into(), 10, HashSet::new());
        assert_eq!(registry.md_req_id_for_symbol("tBTCUSD").as_deref(), Some("md1"));
        assert_eq!(registry.md_req_id_for_symbol("tETHUSD"), None);
    }

    #[test]
    fn close_returns_channel_ids_and_clears_routing() {
        let mut registry = SubscriptionRegistry::new();
        registry.open("md1".into(), "tBTCUSD".into(), 10, HashSet::new());
        registry.attach_channel("md1", 42);
        registry.attach_channel("md1", 43);

        let closed = registry.close("md1");
        assert_eq!(closed.len(), 2);
        assert!(registry.by_channel_id(42).is_none());
        assert!(registry.get("md1").is_none());
    }
}
