/*
 * BFX-FIX GATEWAY - MARKET DATA TRANSLATOR
 * =================================================================
 * Component Name: src/translators/market_data.rs
 * Core Responsibility: upstream book/trade channel events <-> FIX
 * MarketDataSnapshotFullRefresh/MarketDataIncrementalRefresh (§4.6.c).
 * Snapshot levels are sorted bid-descending / offer-ascending by price,
 * matching how a FIX consumer expects a book to read top-of-book first.
 * =================================================================
 */

use std::cmp::Ordering;

use crate::models::execution::{BookLevel, BookSide, MdIncrementalEntry, MdUpdateAction};
use crate::upstream::UpstreamBookLevel;

/// Convert a full upstream book snapshot into sorted FIX book levels.
/// Positive `count` with positive `amount` is a bid; positive `count` with
/// negative `amount` is an offer (the upstream signs amount by side); a
/// `count` of zero denotes a level absent from the book entirely and is
/// dropped rather than translated to a `Delete` (there is nothing to
/// delete from an empty snapshot).
pub fn snapshot_to_book_levels(raw: &[UpstreamBookLevel]) -> Vec<BookLevel> {
    let mut bids: Vec<BookLevel> = Vec::new();
    let mut offers: Vec<BookLevel> = Vec::new();

    for level in raw {
        if level.count == 0 {
            continue;
        }
        if level.amount.is_sign_positive() {
            bids.push(BookLevel { side: BookSide::Bid, price: level.price, size: level.amount });
        } else {
            offers.push(BookLevel { side: BookSide::Offer, price: level.price, size: -level.amount });
        }
    }

    bids.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal));
    offers.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap_or(Ordering::Equal));

    bids.into_iter().chain(offers).collect()
}

/// Convert a single incremental book update into the FIX update action:
/// `count == 0` deletes the level, `count == 1` is a new level (the
/// upstream only ever reports `1` for a fresh price point), anything
/// greater is a size change at an existing level.
pub fn book_update_to_incremental(level: &UpstreamBookLevel) -> MdIncrementalEntry {
    let side = if level.amount.is_sign_positive() { BookSide::Bid } else { BookSide::Offer };
    let action = match level.count {
        0 => MdUpdateAction::Delete,
        1 => MdUpdateAction::New,
        _ => MdUpdateAction::Change,
    };
    MdIncrementalEntry {
        action,
        side: Some(side),
        price: level.price,
        size: level.amount.abs(),
        is_trade: false,
    }
}

pub fn trade_tick_to_incremental(price: rust_decimal::Decimal, amount: rust_decimal::Decimal) -> MdIncrementalEntry {
    MdIncrementalEntry {
        action: MdUpdateAction::New,
        side: None,
        price,
        size: amount.abs(),
        is_trade: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn snapshot_sorts_bids_descending_and_offers_ascending() {
        let raw = vec![
            UpstreamBookLevel { price: dec!(100), count: 1, amount: dec!(1) },
            UpstreamBookLevel { price: dec!(102), count: 1, amount: dec!(1) },
            UpstreamBookLevel { price: dec!(105), count: 1, amount: dec!(-1) },
            UpstreamBookLevel { price: dec!(103), count: 1, amount: dec!(-1) },
        ];
        let levels = snapshot_to_book_levels(&raw);
        let bids: Vec<_> = levels.iter().filter(|l| l.side == BookSide::Bid).collect();
        let offers: Vec<_> = levels.iter().filter(|l| l.side == BookSide::Offer).collect();

        assert_eq!(bids[0].price, dec!(102));
        assert_eq!(bids[1].price, dec!(100));
        assert_eq!(offers[0].price, dec!(103));
        assert_eq!(offers[1].price, dec!(105));
    }

    #[test]
    fn zero_count_levels_are_dropped_from_snapshot() {
        let raw = vec![UpstreamBookLevel { price: dec!(100), count: 0, amount: dec!(1) }];
        assert!(snapshot_to_book_levels(&raw).is_empty());
    }

    #[test]
    fn incremental_action_follows_count() {
        let delete = book_update_to_incremental(&UpstreamBookLevel { price: dec!(100), count: 0, amount: dec!(1) });
        assert_eq!(delete.action, MdUpdateAction::Delete);

        let new = book_update_to_incremental(&UpstreamBookLevel { price: dec!(100), count: 1, amount: dec!(1) });
        assert_eq!(new.action, MdUpdateAction::New);

        let change = book_update_to_incremental(&UpstreamBookLevel { price: dec!(100), count: 2, amount: dec!(1) });
        assert_eq!(change.action, MdUpdateAction::Change);
    }
}
