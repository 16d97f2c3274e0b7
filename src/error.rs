use thiserror::Error;

/// All failure modes the gateway surfaces, per the error-kind taxonomy.
///
/// Translator errors stay local to the message being handled; session and
/// transport errors propagate up to the owning `Peer`; `Peer`-fatal errors
/// propagate to the `Service`, which drops the peer. A failure in one peer
/// never reaches another peer or the other FIX endpoint.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("protocol reject: {0}")]
    ProtocolReject(String),

    #[error("order reject ({reason}): {detail}")]
    OrderReject { reason: OrderRejectReason, detail: String },

    #[error("upstream authentication failed: {0}")]
    AuthFailed(String),

    #[error("upstream transport error: {0}")]
    TransportError(String),

    #[error("internal invariant violation: {0}")]
    InternalError(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// `OrdRejReason`/`CxlRejReason` style classification carried by `OrderReject`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderRejectReason {
    SymbolUnknown,
    UnknownOrder,
    ExchangeClosed,
    UpstreamRejected,
    Malformed,
}

impl std::fmt::Display for OrderRejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderRejectReason::SymbolUnknown => "SymbolUnknown",
            OrderRejectReason::UnknownOrder => "UnknownOrder",
            OrderRejectReason::ExchangeClosed => "ExchangeClosed",
            OrderRejectReason::UpstreamRejected => "UpstreamRejected",
            OrderRejectReason::Malformed => "Malformed",
        };
        write!(f, "{}", s)
    }
}

impl GatewayError {
    pub fn order_reject(reason: OrderRejectReason, detail: impl Into<String>) -> Self {
        GatewayError::OrderReject { reason, detail: detail.into() }
    }

    /// The `OrdRejReason`/`CxlRejReason` this error carries, or `Malformed`
    /// for error kinds that never went through the reject-classification
    /// path (a protocol-level parse failure, for instance).
    pub fn reject_reason(&self) -> OrderRejectReason {
        match self {
            GatewayError::OrderReject { reason, .. } => *reason,
            _ => OrderRejectReason::Malformed,
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
