/*
 * BFX-FIX GATEWAY - SYMBOLOGY
 * =================================================================
 * Component Name: src/symbology.rs
 * Core Responsibility: Bidirectional mapping between FIX symbols and the
 * upstream exchange's own instrument encoding, and instrument-class
 * classification (spot vs margin/funding).
 * =================================================================
 */

use std::collections::HashSet;

use crate::error::{GatewayError, OrderRejectReason};

/// Spot instruments are encoded `tXXXYYY` upstream; funding/margin positions
/// are encoded `fXXX`. Nothing else is accepted.
const SPOT_PREFIX: char = 't';
const FUNDING_PREFIX: char = 'f';

/// Pairs the gateway will route to. Anything else is `SymbolUnknown` even if
/// it parses cleanly as `BASEQUOTE` — the upstream doesn't list every
/// alphanumeric combination a client might type.
const KNOWN_SPOT_PAIRS: &[&str] = &[
    "BTCUSD", "ETHUSD", "ETHBTC", "LTCUSD", "LTCBTC", "XRPUSD", "XRPBTC", "EOSUSD", "SOLUSD", "ADAUSD",
];

const KNOWN_FUNDING_CURRENCIES: &[&str] = &["USD", "BTC", "ETH", "USDT"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountType {
    Spot,
    Margin,
}

/// Bidirectional symbol translator. `separator` is the character the FIX
/// client expects between base and quote currency when a spot symbol is
/// rendered back to it (e.g. `BTC/USD`); it never appears upstream.
#[derive(Debug, Clone)]
pub struct Symbology {
    separator: char,
    known_spot_pairs: HashSet<String>,
    known_funding_currencies: HashSet<String>,
}

impl Default for Symbology {
    fn default() -> Self {
        Self {
            separator: '/',
            known_spot_pairs: KNOWN_SPOT_PAIRS.iter().map(|s| s.to_string()).collect(),
            known_funding_currencies: KNOWN_FUNDING_CURRENCIES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Symbology {
    pub fn new(separator: char) -> Self {
        Self { separator, ..Self::default() }
    }

    /// FIX symbol (`BTC/USD`) + account type hint → upstream symbol (`tBTCUSD`).
    ///
    /// `account_type` comes from the FIX `CashMargin`/`Account` fields of the
    /// originating order request; it decides the prefix when the FIX symbol
    /// is ambiguous (a bare currency could plausibly be either).
    pub fn to_upstream(&self, fix_symbol: &str, account_type: AccountType) -> Result<String, GatewayError> {
        let stripped: String = fix_symbol.chars().filter(|c| *c != self.separator).collect();
        if stripped.is_empty() || !stripped.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(GatewayError::order_reject(
                OrderRejectReason::SymbolUnknown,
                format!("malformed symbol '{}'", fix_symbol),
            ));
        }
        let upper = stripped.to_ascii_uppercase();
        match account_type {
            AccountType::Spot => {
                if !self.known_spot_pairs.contains(&upper) {
                    return Err(GatewayError::order_reject(
                        OrderRejectReason::SymbolUnknown,
                        format!("unknown spot pair '{}'", fix_symbol),
                    ));
                }
                Ok(format!("{}{}", SPOT_PREFIX, upper))
            }
            AccountType::Margin => {
                if !self.known_funding_currencies.contains(&upper) {
                    return Err(GatewayError::order_reject(
                        OrderRejectReason::SymbolUnknown,
                        format!("unknown funding currency '{}'", fix_symbol),
                    ));
                }
                Ok(format!("{}{}", FUNDING_PREFIX, upper))
            }
        }
    }

    /// Upstream symbol (`tBTCUSD`, `fUSD`) → FIX symbol.
    ///
    /// For spot symbols the quote currency is assumed to be the trailing
    /// three characters (`BTCUSD` -> `BTC`/`USD`); this matches the vast
    /// majority of the exchange's pairs. Funding symbols have no pair split
    /// and are returned bare.
    pub fn to_fix(&self, upstream_symbol: &str) -> Result<String, GatewayError> {
        let mut chars = upstream_symbol.chars();
        let prefix = chars.next().ok_or_else(|| {
            GatewayError::order_reject(OrderRejectReason::SymbolUnknown, "empty upstream symbol")
        })?;
        let rest: String = chars.collect();

        match prefix {
            c if c == SPOT_PREFIX => {
                if rest.len() <= 3 {
                    return Err(GatewayError::order_reject(
                        OrderRejectReason::SymbolUnknown,
                        format!("unparseable spot symbol '{}'", upstream_symbol),
                    ));
                }
                let (base, quote) = rest.split_at(rest.len() - 3);
                Ok(format!("{}{}{}", base, self.separator, quote))
            }
            c if c == FUNDING_PREFIX => Ok(rest),
            _ => Err(GatewayError::order_reject(
                OrderRejectReason::SymbolUnknown,
                format!("unrecognized symbol prefix in '{}'", upstream_symbol),
            )),
        }
    }

    /// Classify an upstream symbol by its prefix alone. The Order Cache
    /// stores whatever this returns verbatim; it is never re-derived.
    pub fn account_type_of(&self, upstream_symbol: &str) -> Result<AccountType, GatewayError> {
        match upstream_symbol.chars().next() {
            Some(c) if c == SPOT_PREFIX => Ok(AccountType::Spot),
            Some(c) if c == FUNDING_PREFIX => Ok(AccountType::Margin),
            _ => Err(GatewayError::order_reject(
                OrderRejectReason::SymbolUnknown,
                format!("unrecognized symbol '{}'", upstream_symbol),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_round_trip() {
        let sym = Symbology::default();
        let upstream = sym.to_upstream("BTC/USD", AccountType::Spot).unwrap();
        assert_eq!(upstream, "tBTCUSD");
        assert_eq!(sym.to_fix(&upstream).unwrap(), "BTC/USD");
    }

    #[test]
    fn margin_has_no_separator() {
        let sym = Symbology::default();
        let upstream = sym.to_upstream("USD", AccountType::Margin).unwrap();
        assert_eq!(upstream, "fUSD");
        assert_eq!(sym.to_fix(&upstream).unwrap(), "USD");
    }

    #[test]
    fn unknown_symbol_rejects() {
        let sym = Symbology::default();
        assert!(sym.to_fix("xWEIRD").is_err());
        assert!(sym.to_upstream("", AccountType::Spot).is_err());
    }

    #[test]
    fn account_type_from_prefix() {
        let sym = Symbology::default();
        assert_eq!(sym.account_type_of("tBTCUSD").unwrap(), AccountType::Spot);
        assert_eq!(sym.account_type_of("fUSD").unwrap(), AccountType::Margin);
        assert!(sym.account_type_of("BTCUSD").is_err());
    }

    #[test]
    fn custom_separator() {
        let sym = Symbology::new('-');
        let upstream = sym.to_upstream("ETH-USD", AccountType::Spot).unwrap();
        assert_eq!(upstream, "tETHUSD");
        assert_eq!(sym.to_fix(&upstream).unwrap(), "ETH-USD");
    }
}
