//! WebSocket endpoint for the archiving bot

use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::websocket::connection::{read_pump, write_pump};
use crate::websocket::registry::Connection;
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, WebSocket, WebSocketUpgrade},
        ConnectInfo, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use sha2::{Digest, Sha256};
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn};

/// Hex SHA-256 digest clients present as `Authorization: Token <digest>`
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// Check the `Authorization` header against the configured bot token. An
/// empty configured token admits nobody.
pub fn authorize(headers: &HeaderMap, token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(AppError::Authentication(
            "No bot token configured".to_string(),
        ));
    }

    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Token "))
        .map(str::trim)
        .ok_or_else(|| AppError::Authentication("Missing token".to_string()))?;

    if presented.eq_ignore_ascii_case(&token_digest(token)) {
        Ok(())
    } else {
        Err(AppError::Authentication("Invalid token".to_string()))
    }
}

/// Upgrade handler. Authorization is checked before the upgrade, so a
/// rejected client never reaches the registry.
pub async fn websocket_handler(
    State(ctx): State<Arc<AppContext>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    ws: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response> {
    let remote_addr = connect_info.map(|ConnectInfo(addr)| addr.to_string());

    if let Err(e) = authorize(&headers, &ctx.config.bot.token) {
        warn!(remote_addr = ?remote_addr, error = %e, "Rejected WebSocket connection");
        return Err(e);
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    info!(remote_addr = ?remote_addr, "WebSocket connection request");

    Ok(ws
        .max_message_size(ctx.config.websocket.max_message_size)
        .on_upgrade(move |socket| handle_socket(socket, ctx, remote_addr)))
}

async fn handle_socket(socket: WebSocket, ctx: Arc<AppContext>, remote_addr: Option<String>) {
    let (sink, stream) = socket.split();
    let (connection, outbound) =
        Connection::new(remote_addr, ctx.config.websocket.outbound_capacity);
    let connection_id = connection.id.clone();

    ctx.registry.register(connection);

    let writer_ctx = ctx.clone();
    let writer_id = connection_id.clone();
    let mut writer = tokio::spawn(async move {
        write_pump(
            sink,
            outbound,
            writer_id,
            writer_ctx.registry.clone(),
            &writer_ctx.config.websocket,
        )
        .await
    });

    tokio::select! {
        _ = read_pump(
            stream,
            connection_id.clone(),
            ctx.registry.clone(),
            &ctx.pipeline,
            &ctx.config.websocket,
        ) => {
            // Reader unregistered the connection; let the writer drain
            let _ = writer.await;
        }
        _ = &mut writer => {}
    }

    info!(connection_id = %connection_id, "WebSocket session ended");
}
