//! Per-connection reader and writer pumps
//!
//! The reader forwards inbound envelopes to the indexing pipeline and
//! enforces the pong deadline. The writer drains the outbound mailbox and
//! pings the peer. Either side unregisters the connection when it stops.

use crate::error::AppError;
use crate::indexer::{Envelope, IndexingPipeline};
use crate::websocket::registry::ConnectionRegistry;
use crate::websocket::WebSocketConfig;
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

/// Read inbound frames until the peer closes, a read fails or no pong
/// arrives within `pong_wait`
pub async fn read_pump<S, E>(
    mut stream: S,
    connection_id: String,
    registry: ConnectionRegistry,
    pipeline: &IndexingPipeline,
    config: &WebSocketConfig,
) where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let pong_wait = config.pong_wait();
    let mut deadline = Instant::now() + pong_wait;

    loop {
        let frame = match time::timeout_at(deadline, stream.next()).await {
            Err(_) => {
                warn!(connection_id = %connection_id, "Pong wait elapsed");
                break;
            }
            Ok(None) => {
                debug!(connection_id = %connection_id, "Inbound stream ended");
                break;
            }
            Ok(Some(Err(e))) => {
                warn!(connection_id = %connection_id, error = %e, "WebSocket read failed");
                break;
            }
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => forward(&connection_id, &text, pipeline),
            Message::Binary(_) => {
                debug!(connection_id = %connection_id, "Ignoring binary frame");
            }
            Message::Pong(_) => {
                deadline = Instant::now() + pong_wait;
            }
            // Answered by the transport
            Message::Ping(_) => {}
            Message::Close(_) => {
                info!(connection_id = %connection_id, "Client closed connection");
                break;
            }
        }
    }

    registry.unregister(&connection_id);
}

fn forward(connection_id: &str, text: &str, pipeline: &IndexingPipeline) {
    let envelope = match Envelope::from_frame(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "Dropping malformed frame");
            return;
        }
    };

    match pipeline.submit(envelope) {
        Ok(()) => {}
        Err(AppError::PipelineClosed) => {
            debug!(connection_id = %connection_id, "Pipeline closed, frame dropped");
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = %e, "Failed to submit envelope");
        }
    }
}

/// Write queued frames and periodic pings until the mailbox closes or a
/// write fails or exceeds `write_wait`
pub async fn write_pump<K>(
    mut sink: K,
    mut outbound: mpsc::Receiver<String>,
    connection_id: String,
    registry: ConnectionRegistry,
    config: &WebSocketConfig,
) where
    K: Sink<Message> + Unpin,
    K::Error: Display,
{
    let write_wait = config.write_wait();
    let ping_period = config.ping_period();
    let mut ping = time::interval_at(Instant::now() + ping_period, ping_period);

    loop {
        let frame = tokio::select! {
            frame = outbound.recv() => match frame {
                Some(text) => Message::Text(text),
                None => {
                    // Unregistered: say goodbye and stop
                    let _ = time::timeout(write_wait, sink.send(Message::Close(None))).await;
                    break;
                }
            },
            _ = ping.tick() => Message::Ping(Vec::new()),
        };

        match time::timeout(write_wait, sink.send(frame)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(connection_id = %connection_id, error = %e, "WebSocket write failed");
                break;
            }
            Err(_) => {
                warn!(connection_id = %connection_id, "Write wait elapsed");
                break;
            }
        }
    }

    registry.unregister(&connection_id);
    debug!(connection_id = %connection_id, "Writer stopped");
}
