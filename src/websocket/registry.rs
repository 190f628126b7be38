//! Connection registry
//!
//! The set of live connections is owned by a single task. Registration,
//! removal, broadcast and membership queries all travel through one mailbox,
//! so they are applied in the order they were requested.

use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Server side of one client connection
#[derive(Debug)]
pub struct Connection {
    pub id: String,
    pub remote_addr: Option<String>,
    outbound: mpsc::Sender<String>,
}

impl Connection {
    /// Create a connection with a bounded outbound mailbox. The receiver
    /// feeds the connection's writer and ends once the connection is
    /// unregistered.
    pub fn new(remote_addr: Option<String>, capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbound, rx) = mpsc::channel(capacity.max(1));
        let connection = Self {
            id: Uuid::new_v4().to_string(),
            remote_addr,
            outbound,
        };
        (connection, rx)
    }
}

enum Command {
    Register(Connection),
    Unregister(String),
    Broadcast(String),
    Snapshot(oneshot::Sender<Vec<String>>),
}

/// Handle to the registry owner task. Cloning is cheap; the owner stops once
/// every handle is dropped.
#[derive(Clone)]
pub struct ConnectionRegistry {
    commands: mpsc::UnboundedSender<Command>,
}

impl ConnectionRegistry {
    /// Start the owner task
    pub fn spawn() -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx));
        Self { commands }
    }

    pub fn register(&self, connection: Connection) {
        self.send(Command::Register(connection));
    }

    /// Remove a connection and close its outbound mailbox; unknown ids are
    /// ignored
    pub fn unregister(&self, id: &str) {
        self.send(Command::Unregister(id.to_string()));
    }

    /// Queue a text frame for every registered connection
    pub fn broadcast(&self, frame: impl Into<String>) {
        self.send(Command::Broadcast(frame.into()));
    }

    /// Ids of the registered connections, sorted
    pub async fn snapshot(&self) -> Vec<String> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx));
        rx.await.unwrap_or_default()
    }

    pub async fn len(&self) -> usize {
        self.snapshot().await.len()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            debug!("Connection registry is stopped");
        }
    }
}

async fn run(mut commands: mpsc::UnboundedReceiver<Command>) {
    let mut connections: HashMap<String, Connection> = HashMap::new();

    while let Some(command) = commands.recv().await {
        match command {
            Command::Register(connection) => {
                info!(
                    connection_id = %connection.id,
                    remote_addr = ?connection.remote_addr,
                    "Connection registered"
                );
                connections.insert(connection.id.clone(), connection);
            }
            Command::Unregister(id) => {
                // Dropping the connection closes its outbound mailbox
                if connections.remove(&id).is_some() {
                    info!(connection_id = %id, "Connection unregistered");
                }
            }
            Command::Broadcast(frame) => {
                connections.retain(|id, connection| {
                    match connection.outbound.try_send(frame.clone()) {
                        Ok(()) => true,
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            warn!(connection_id = %id, "Outbound mailbox full, dropping connection");
                            false
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            debug!(connection_id = %id, "Writer gone, dropping connection");
                            false
                        }
                    }
                });
            }
            Command::Snapshot(reply) => {
                let mut ids: Vec<String> = connections.keys().cloned().collect();
                ids.sort();
                let _ = reply.send(ids);
            }
        }
    }

    debug!(remaining = connections.len(), "Connection registry stopped");
}
