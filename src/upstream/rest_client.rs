/*
 * BFX-FIX GATEWAY - UPSTREAM REST CLIENT
 * =================================================================
 * Component Name: src/upstream/rest_client.rs
 * Core Responsibility: REST fallback for order history/active-orders
 * lookups that the WS session cannot answer because the order has
 * already been evicted from the Order Cache (§4.3, §9).
 * =================================================================
 */

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use sha2::Sha384;

use crate::error::{GatewayError, GatewayResult};
use crate::upstream::{HistoricalOrder, UpstreamRestClient as UpstreamRestClientTrait};

type HmacSha384 = Hmac<Sha384>;

pub struct LiveUpstreamRestClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: zeroize::Zeroizing<String>,
}

impl LiveUpstreamRestClient {
    pub fn new(base_url: String, api_key: String, api_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
            api_secret: zeroize::Zeroizing::new(api_secret),
        }
    }

    fn sign(&self, path: &str, nonce: u64, body: &str) -> GatewayResult<String> {
        let payload = format!("/api/{path}{nonce}{body}");
        let mut mac = HmacSha384::new_from_slice(self.api_secret.as_bytes())
            .map_err(|e| GatewayError::AuthFailed(format!("invalid key length: {e}")))?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn post_signed(&self, path: &str, nonce: u64, body: &str) -> GatewayResult<serde_json::Value> {
        let signature = self.sign(path, nonce, body)?;
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, path))
            .header("bfx-apikey", &self.api_key)
            .header("bfx-nonce", nonce.to_string())
            .header("bfx-signature", signature)
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| GatewayError::TransportError(format!("REST request failed: {e}")))?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| GatewayError::TransportError(format!("REST response decode failed: {e}")))
    }
}

#[async_trait]
impl UpstreamRestClientTrait for LiveUpstreamRestClient {
    async fn order_history(&self, symbol: &str, cl_ord_id: &str) -> GatewayResult<Option<HistoricalOrder>> {
        let nonce = 1;
        let body = serde_json::json!({ "symbol": symbol, "limit": 25 }).to_string();
        let value = self.post_signed("v2/auth/r/orders/hist", nonce, &body).await?;

        Ok(value
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(parse_order_row)
            .find(|order| order.cl_ord_id.as_deref() == Some(cl_ord_id)))
    }

    async fn active_orders(&self, symbol: &str) -> GatewayResult<Vec<HistoricalOrder>> {
        let nonce = 1;
        let body = serde_json::json!({ "symbol": symbol }).to_string();
        let value = self.post_signed("v2/auth/r/orders", nonce, &body).await?;

        Ok(value.as_array().into_iter().flatten().filter_map(parse_order_row).collect())
    }
}

fn parse_order_row(row: &serde_json::Value) -> Option<HistoricalOrder> {
    let arr = row.as_array()?;
    Some(HistoricalOrder {
        order_id: arr.first()?.as_i64()?,
        cl_ord_id: arr.get(2).and_then(|v| v.as_str()).map(str::to_string),
        symbol: arr.get(3).and_then(|v| v.as_str())?.to_string(),
        amount: arr.get(6).and_then(|v| v.as_str()).and_then(|s| s.parse().ok())?,
        amount_orig: arr.get(7).and_then(|v| v.as_str()).and_then(|s| s.parse().ok())?,
        price: arr.get(16).and_then(|v| v.as_str()).and_then(|s| s.parse().ok()),
        status: arr.get(13).and_then(|v| v.as_str())?.to_string(),
    })
}
