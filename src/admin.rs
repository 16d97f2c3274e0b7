/*
 * BFX-FIX GATEWAY - ADMIN/STATUS CONSOLE
 * =================================================================
 * Component Name: src/admin.rs
 * Core Responsibility: a loopback-only raw TCP console exposing basic
 * liveness information (STATUS/PEERS/PING). Not a metrics endpoint and
 * not reachable beyond localhost — an operational aid, not a control
 * plane, modeled on the original gateway's stat server (§2.1, C13).
 * =================================================================
 */

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::error::{GatewayError, GatewayResult};

/// A snapshot of peer counts across both Services, refreshed on each
/// `STATUS`/`PEERS` query.
pub trait StatusProvider: Send + Sync {
    fn market_data_peer_count(&self) -> usize;
    fn order_routing_peer_count(&self) -> usize;
}

pub async fn start(port: u16, status: Arc<dyn StatusProvider>) -> GatewayResult<()> {
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| GatewayError::TransportError(format!("admin console bind failed: {e}")))?;

    info!(%addr, "admin console listening");

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    info!(%peer_addr, "admin console connection");
                    let status = status.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, status).await {
                            warn!("admin console connection error: {e}");
                        }
                    });
                }
                Err(e) => warn!("admin console accept error: {e}"),
            }
        }
    });

    Ok(())
}

async fn handle_connection(mut socket: TcpStream, status: Arc<dyn StatusProvider>) -> std::io::Result<()> {
    let (reader, mut writer) = socket.split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    writer.write_all(b"bfx_fix_gateway admin console\n> ").await?;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let response = process_command(line.trim(), status.as_ref());
        writer.write_all(response.as_bytes()).await?;
        writer.write_all(b"\n> ").await?;
    }

    Ok(())
}

fn process_command(cmd: &str, status: &dyn StatusProvider) -> String {
    match cmd.to_uppercase().as_str() {
        "HELP" => "STATUS | PEERS | PING | EXIT".into(),
        "PING" => "PONG".into(),
        "STATUS" => "RUNNING".into(),
        "PEERS" => format!(
            "md_peers={} order_routing_peers={}",
            status.market_data_peer_count(),
            status.order_routing_peer_count()
        ),
        "EXIT" | "QUIT" => "bye".into(),
        "" => "".into(),
        other => format!("unknown command: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeStatus;
    impl StatusProvider for FakeStatus {
        fn market_data_peer_count(&self) -> usize {
            2
        }
        fn order_routing_peer_count(&self) -> usize {
            3
        }
    }

    #[test]
    fn peers_command_reports_both_counts() {
        let response = process_command("PEERS", &FakeStatus);
        assert_eq!(response, "md_peers=2 order_routing_peers=3");
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(process_command("NONSENSE", &FakeStatus), "unknown command: NONSENSE");
    }
}
