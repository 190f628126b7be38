//! Shared fixtures for the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chat_archive::error::{AppError, Result};
use chat_archive::models::{Channel, Message, Team, User, UserProfile};
use chat_archive::search::{EngineResponse, IndexOperation, MessageQuery, SearchEngine};
use chat_archive::state::{
    ArchiveStore, ChannelFilter, InMemoryStore, MessageFilter, TeamFilter, UserFilter,
};
use parking_lot::Mutex;
use std::collections::HashSet;

pub fn team(id: &str, domain: &str, custom_domain: Option<&str>) -> Team {
    Team {
        id: id.to_string(),
        domain: domain.to_string(),
        custom_domain: custom_domain.map(str::to_string),
        name: format!("Team {}", id),
        ..Default::default()
    }
}

pub fn channel(id: &str, team: &str, is_member: bool) -> Channel {
    Channel {
        id: id.to_string(),
        name: format!("channel-{}", id.to_lowercase()),
        team: team.to_string(),
        is_channel: true,
        is_member,
        ..Default::default()
    }
}

pub fn user(id: &str, team: &str) -> User {
    User {
        id: id.to_string(),
        team: team.to_string(),
        name: format!("user-{}", id.to_lowercase()),
        profile: UserProfile {
            real_name: format!("User {}", id),
            email: format!("{}@example.com", id.to_lowercase()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn message(team: &str, channel: &str, ts: &str, text: &str) -> Message {
    Message {
        kind: "message".to_string(),
        team: team.to_string(),
        channel: channel.to_string(),
        user: "U1".to_string(),
        text: text.to_string(),
        ts: ts.to_string(),
        ..Default::default()
    }
}

/// JSON body of a message, as the bot sends it
pub fn message_body(team: &str, channel: &str, ts: &str, text: &str) -> Vec<u8> {
    serde_json::to_vec(&message(team, channel, ts, text)).unwrap()
}

/// Two teams with one archived channel each, plus a channel the bot left
pub async fn seed_workspace(store: &dyn ArchiveStore) {
    store.upsert_team(&team("T1", "archive", None)).await.unwrap();
    store
        .upsert_team(&team("T2", "other", Some("chat.example.org")))
        .await
        .unwrap();

    store.upsert_channel(&channel("C1", "T1", true)).await.unwrap();
    store.upsert_channel(&channel("C2", "T1", true)).await.unwrap();
    store.upsert_channel(&channel("C3", "T1", false)).await.unwrap();
    store.upsert_channel(&channel("D1", "T2", true)).await.unwrap();

    store.upsert_user(&user("U1", "T1")).await.unwrap();
    store.upsert_user(&user("U2", "T1")).await.unwrap();
    store.upsert_user(&user("U9", "T2")).await.unwrap();
}

/// Engine double that records every bulk request
#[derive(Default)]
pub struct RecordingEngine {
    batches: Mutex<Vec<Vec<IndexOperation>>>,
    fail_bulk: Mutex<bool>,
}

impl RecordingEngine {
    pub fn failing() -> Self {
        Self {
            fail_bulk: Mutex::new(true),
            ..Default::default()
        }
    }

    /// Ids of each bulk request, in call order
    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches
            .lock()
            .iter()
            .map(|batch| batch.iter().map(|op| op.id.clone()).collect())
            .collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().iter().map(Vec::len).collect()
    }
}

#[async_trait]
impl SearchEngine for RecordingEngine {
    async fn bulk_index(&self, operations: Vec<IndexOperation>) -> Result<Vec<String>> {
        let ids = operations.iter().map(|op| op.id.clone()).collect();
        self.batches.lock().push(operations);

        if *self.fail_bulk.lock() {
            return Err(AppError::EngineBulk("engine unavailable".to_string()));
        }
        Ok(ids)
    }

    async fn search(&self, _query: &MessageQuery) -> Result<EngineResponse> {
        Ok(EngineResponse::default())
    }
}

/// Store double over `InMemoryStore` that records message writes and page
/// cursors, and can refuse writes for chosen ids
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    upserts: Mutex<Vec<String>>,
    cursors: Mutex<Vec<Option<String>>>,
    rejected: Mutex<HashSet<String>>,
}

impl RecordingStore {
    /// Fail every write of `id` from now on
    pub fn reject(&self, id: &str) {
        self.rejected.lock().insert(id.to_string());
    }

    /// Ids of attempted message writes, in call order
    pub fn upserts(&self) -> Vec<String> {
        self.upserts.lock().clone()
    }

    /// `after` argument of each cursor page request, in call order
    pub fn cursors(&self) -> Vec<Option<String>> {
        self.cursors.lock().clone()
    }
}

#[async_trait]
impl ArchiveStore for RecordingStore {
    async fn upsert_message(&self, id: &str, message: &Message) -> Result<()> {
        self.upserts.lock().push(id.to_string());
        if self.rejected.lock().contains(id) {
            return Err(AppError::StoreWrite(format!("write refused for {}", id)));
        }
        self.inner.upsert_message(id, message).await
    }

    async fn get_messages(&self, ids: &[String]) -> Result<Vec<Message>> {
        self.inner.get_messages(ids).await
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(String, Message)>> {
        self.inner.list_messages(filter, skip, limit).await
    }

    async fn list_messages_after(
        &self,
        filter: &MessageFilter,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(String, Message)>> {
        self.cursors.lock().push(after.map(str::to_string));
        self.inner.list_messages_after(filter, after, limit).await
    }

    async fn count_messages(&self, filter: &MessageFilter) -> Result<u64> {
        self.inner.count_messages(filter).await
    }

    async fn upsert_team(&self, team: &Team) -> Result<()> {
        self.inner.upsert_team(team).await
    }

    async fn find_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>> {
        self.inner.find_teams(filter).await
    }

    async fn upsert_channel(&self, channel: &Channel) -> Result<()> {
        self.inner.upsert_channel(channel).await
    }

    async fn find_channels(
        &self,
        filter: &ChannelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Channel>> {
        self.inner.find_channels(filter, skip, limit).await
    }

    async fn count_channels(&self, filter: &ChannelFilter) -> Result<u64> {
        self.inner.count_channels(filter).await
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.inner.upsert_user(user).await
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        self.inner.get_users(ids).await
    }

    async fn find_users(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<User>> {
        self.inner.find_users(filter, skip, limit).await
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64> {
        self.inner.count_users(filter).await
    }
}
