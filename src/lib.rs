// BFX-FIX GATEWAY - ROOT LIBRARY

pub mod admin;
pub mod cancel_registry;
pub mod config;
pub mod error;
pub mod fix;
pub mod fix_adapter;
pub mod gateway;
pub mod id_registry;
pub mod logging;
pub mod models;
pub mod order_cache;
pub mod peer;
pub mod service;
pub mod subscription_registry;
pub mod symbology;
pub mod translators;
pub mod upstream;

pub use error::{GatewayError, GatewayResult};

pub mod prelude {
    pub use crate::error::{GatewayError, GatewayResult};
    pub use crate::models::execution::ExecutionReportIntent;
    pub use crate::models::order::OrderRecord;
    pub use crate::peer::{Peer, PeerRole};
}
