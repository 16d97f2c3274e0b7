/*
 * BFX-FIX GATEWAY - CONFIGURATION
 * =================================================================
 * Component Name: src/config.rs
 * Core Responsibility: load `GatewaySettings` from defaults, an
 * optional TOML file, environment variables (`BFX_GATEWAY_*`) and CLI
 * flags, in that increasing order of precedence. No hot-reload: unlike
 * the matching-engine configuration this is grounded on, a FIX gateway
 * is restarted rather than reconfigured live, so the `notify` watcher
 * has no counterpart here.
 * =================================================================
 */

use clap::Parser;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{GatewayError, GatewayResult};

#[derive(Debug, Deserialize, Clone)]
pub struct GatewaySettings {
    pub md_config_path: String,
    pub order_config_path: String,
    pub upstream_ws_url: String,
    pub upstream_rest_url: String,
    pub fix_settings_dir: String,
    pub log_dir: String,
    pub log_level: String,
    pub admin_port: u16,
    /// REST signing key, `BFX_GATEWAY__REST_API_KEY` only — deliberately not
    /// a CLI flag so it never lands in shell history or `ps`.
    pub rest_api_key: String,
    pub rest_api_secret: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            md_config_path: "config/md.cfg".into(),
            order_config_path: "config/order.cfg".into(),
            upstream_ws_url: "wss://api.exchange.test/ws/2".into(),
            upstream_rest_url: "https://api.exchange.test".into(),
            fix_settings_dir: "config".into(),
            log_dir: "logs".into(),
            log_level: "info".into(),
            admin_port: 8080,
            rest_api_key: String::new(),
            rest_api_secret: String::new(),
        }
    }
}

/// FIX-to-exchange protocol gateway.
#[derive(Debug, Parser)]
#[command(name = "bfx_fix_gateway")]
pub struct CliArgs {
    /// Path to a TOML configuration file layered on top of the defaults.
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long = "md-config")]
    pub md_config: Option<String>,

    #[arg(long = "order-config")]
    pub order_config: Option<String>,

    #[arg(long = "ws-url")]
    pub ws_url: Option<String>,

    #[arg(long = "rest-url")]
    pub rest_url: Option<String>,

    #[arg(long = "fix-settings-dir")]
    pub fix_settings_dir: Option<String>,

    #[arg(long = "log-dir")]
    pub log_dir: Option<String>,

    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    #[arg(long = "admin-port")]
    pub admin_port: Option<u16>,
}

pub fn load_settings(args: &CliArgs) -> GatewayResult<GatewaySettings> {
    let defaults = GatewaySettings::default();

    let mut builder = Config::builder()
        .set_default("md_config_path", defaults.md_config_path)?
        .set_default("order_config_path", defaults.order_config_path)?
        .set_default("upstream_ws_url", defaults.upstream_ws_url)?
        .set_default("upstream_rest_url", defaults.upstream_rest_url)?
        .set_default("fix_settings_dir", defaults.fix_settings_dir)?
        .set_default("log_dir", defaults.log_dir)?
        .set_default("log_level", defaults.log_level)?
        .set_default("admin_port", defaults.admin_port)?
        .set_default("rest_api_key", defaults.rest_api_key)?
        .set_default("rest_api_secret", defaults.rest_api_secret)?;

    if let Some(path) = &args.config {
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    }

    builder = builder.add_source(Environment::with_prefix("BFX_GATEWAY").separator("__"));

    let mut settings: GatewaySettings = builder
        .build()
        .map_err(|e| GatewayError::Config(format!("failed to assemble configuration: {e}")))?
        .try_deserialize()
        .map_err(|e| GatewayError::Config(format!("failed to parse configuration: {e}")))?;

    if let Some(v) = &args.md_config {
        settings.md_config_path = v.clone();
    }
    if let Some(v) = &args.order_config {
        settings.order_config_path = v.clone();
    }
    if let Some(v) = &args.ws_url {
        settings.upstream_ws_url = v.clone();
    }
    if let Some(v) = &args.rest_url {
        settings.upstream_rest_url = v.clone();
    }
    if let Some(v) = &args.fix_settings_dir {
        settings.fix_settings_dir = v.clone();
    }
    if let Some(v) = &args.log_dir {
        settings.log_dir = v.clone();
    }
    if let Some(v) = &args.log_level {
        settings.log_level = v.clone();
    }
    if let Some(v) = args.admin_port {
        settings.admin_port = v;
    }

    Ok(settings)
}

impl From<config::ConfigError> for GatewayError {
    fn from(e: config::ConfigError) -> Self {
        GatewayError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_win_over_defaults() {
        let args = CliArgs {
            config: None,
            md_config: Some("custom/md.cfg".into()),
            order_config: None,
            ws_url: None,
            rest_url: None,
            fix_settings_dir: None,
            log_dir: None,
            log_level: None,
            admin_port: Some(9090),
        };
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.md_config_path, "custom/md.cfg");
        assert_eq!(settings.admin_port, 9090);
        assert_eq!(settings.order_config_path, GatewaySettings::default().order_config_path);
    }
}
