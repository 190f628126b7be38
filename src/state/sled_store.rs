use crate::error::{AppError, Result};
use crate::models::{Channel, Message, Team, User};
use crate::state::{ArchiveStore, ChannelFilter, MessageFilter, TeamFilter, UserFilter};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

/// Persistent archive store using the Sled embedded database.
///
/// Records are stored as JSON, one tree per record kind, keyed by id.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    messages_tree: sled::Tree,
    teams_tree: sled::Tree,
    channels_tree: sled::Tree,
    users_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let open = |name: &str| {
            db.open_tree(name).map_err(|e| {
                AppError::Database(format!("Failed to open {} tree: {}", name, e))
            })
        };

        let messages_tree = open("messages")?;
        let teams_tree = open("teams")?;
        let channels_tree = open("channels")?;
        let users_tree = open("users")?;

        tracing::info!(path = ?path.as_ref(), "Initialized Sled store");

        Ok(Self {
            db: Arc::new(db),
            messages_tree,
            teams_tree,
            channels_tree,
            users_tree,
        })
    }

    fn put<T: Serialize>(tree: &sled::Tree, id: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|e| AppError::StoreWrite(format!("Failed to serialize {}: {}", id, e)))?;

        tree.insert(id.as_bytes(), bytes)
            .map_err(|e| AppError::StoreWrite(format!("Failed to write {}: {}", id, e)))?;

        Ok(())
    }

    fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::Decode(format!("Failed to deserialize record: {}", e)))
    }

    fn get_many<T: DeserializeOwned>(tree: &sled::Tree, ids: &[String]) -> Result<Vec<T>> {
        let mut seen = std::collections::HashSet::new();
        let mut records = Vec::new();

        for id in ids.iter().filter(|id| seen.insert(id.as_str())) {
            let value = tree
                .get(id.as_bytes())
                .map_err(|e| AppError::Database(format!("Failed to read {}: {}", id, e)))?;

            if let Some(bytes) = value {
                records.push(Self::decode(&bytes)?);
            }
        }

        Ok(records)
    }

    /// Walk a tree in key order, yielding matching records
    fn scan<T: DeserializeOwned>(
        tree: &sled::Tree,
        matches: impl Fn(&T) -> bool,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(String, T)>> {
        Self::collect(tree.iter(), matches, skip, limit)
    }

    fn collect<T: DeserializeOwned>(
        entries: sled::Iter,
        matches: impl Fn(&T) -> bool,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(String, T)>> {
        let mut results = Vec::new();
        let mut skipped = 0;

        for entry in entries {
            if results.len() >= limit {
                break;
            }

            let (key, value) = entry
                .map_err(|e| AppError::Database(format!("Failed to iterate tree: {}", e)))?;

            let record: T = match Self::decode(&value) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable record");
                    continue;
                }
            };

            if !matches(&record) {
                continue;
            }

            if skipped < skip {
                skipped += 1;
                continue;
            }

            results.push((String::from_utf8_lossy(&key).into_owned(), record));
        }

        Ok(results)
    }

    fn count<T: DeserializeOwned>(tree: &sled::Tree, matches: impl Fn(&T) -> bool) -> Result<u64> {
        Ok(Self::scan(tree, matches, 0, usize::MAX)?.len() as u64)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Database(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }

    /// Get database size in bytes
    pub fn size_on_disk(&self) -> Result<u64> {
        self.db
            .size_on_disk()
            .map_err(|e| AppError::Database(format!("Failed to get database size: {}", e)))
    }
}

#[async_trait]
impl ArchiveStore for SledStore {
    async fn upsert_message(&self, id: &str, message: &Message) -> Result<()> {
        Self::put(&self.messages_tree, id, message)?;
        tracing::debug!(message_id = %id, "Message upserted");
        Ok(())
    }

    async fn get_messages(&self, ids: &[String]) -> Result<Vec<Message>> {
        Self::get_many(&self.messages_tree, ids)
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(String, Message)>> {
        Self::scan(&self.messages_tree, |m| filter.matches(m), skip, limit)
    }

    async fn list_messages_after(
        &self,
        filter: &MessageFilter,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(String, Message)>> {
        let entries = match after {
            Some(after) => self
                .messages_tree
                .range::<&[u8], _>((Bound::Excluded(after.as_bytes()), Bound::Unbounded)),
            None => self.messages_tree.iter(),
        };
        Self::collect(entries, |m| filter.matches(m), 0, limit)
    }

    async fn count_messages(&self, filter: &MessageFilter) -> Result<u64> {
        Self::count(&self.messages_tree, |m: &Message| filter.matches(m))
    }

    async fn upsert_team(&self, team: &Team) -> Result<()> {
        Self::put(&self.teams_tree, &team.id, team)
    }

    async fn find_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>> {
        Ok(Self::scan(&self.teams_tree, |t| filter.matches(t), 0, usize::MAX)?
            .into_iter()
            .map(|(_, team)| team)
            .collect())
    }

    async fn upsert_channel(&self, channel: &Channel) -> Result<()> {
        Self::put(&self.channels_tree, &channel.id, channel)
    }

    async fn find_channels(
        &self,
        filter: &ChannelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Channel>> {
        Ok(Self::scan(&self.channels_tree, |c| filter.matches(c), skip, limit)?
            .into_iter()
            .map(|(_, channel)| channel)
            .collect())
    }

    async fn count_channels(&self, filter: &ChannelFilter) -> Result<u64> {
        Self::count(&self.channels_tree, |c: &Channel| filter.matches(c))
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        Self::put(&self.users_tree, &user.id, user)
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        Self::get_many(&self.users_tree, ids)
    }

    async fn find_users(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<User>> {
        Ok(Self::scan(&self.users_tree, |u| filter.matches(u), skip, limit)?
            .into_iter()
            .map(|(_, user)| user)
            .collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64> {
        Self::count(&self.users_tree, |u: &User| filter.matches(u))
    }
}
