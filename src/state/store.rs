use crate::error::Result;
use crate::models::{Channel, Message, Team, User};
use crate::state::{ArchiveStore, ChannelFilter, MessageFilter, TeamFilter, UserFilter};
use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::ops::Bound;
use std::sync::Arc;

/// In-memory archive store (for development and testing)
#[derive(Clone, Default)]
pub struct InMemoryStore {
    messages: Arc<DashMap<String, Message>>,
    /// Message ids in order, for cursor paging
    message_ids: Arc<RwLock<BTreeSet<String>>>,
    teams: Arc<DashMap<String, Team>>,
    channels: Arc<DashMap<String, Channel>>,
    users: Arc<DashMap<String, User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Collect matching values sorted by key, then page
fn page_sorted<T: Clone>(
    map: &DashMap<String, T>,
    matches: impl Fn(&T) -> bool,
    skip: usize,
    limit: usize,
) -> Vec<(String, T)> {
    let mut entries: Vec<(String, T)> = map
        .iter()
        .filter(|entry| matches(entry.value()))
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect();

    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries.into_iter().skip(skip).take(limit).collect()
}

fn lookup<T: Clone>(map: &DashMap<String, T>, ids: &[String]) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| map.get(id).map(|entry| entry.clone()))
        .collect()
}

#[async_trait]
impl ArchiveStore for InMemoryStore {
    async fn upsert_message(&self, id: &str, message: &Message) -> Result<()> {
        self.messages.insert(id.to_string(), message.clone());
        self.message_ids.write().insert(id.to_string());
        tracing::debug!(message_id = %id, "Message upserted");
        Ok(())
    }

    async fn get_messages(&self, ids: &[String]) -> Result<Vec<Message>> {
        Ok(lookup(&self.messages, ids))
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(String, Message)>> {
        Ok(page_sorted(&self.messages, |m| filter.matches(m), skip, limit))
    }

    async fn list_messages_after(
        &self,
        filter: &MessageFilter,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(String, Message)>> {
        let lower = match after {
            Some(after) => Bound::Excluded(after),
            None => Bound::Unbounded,
        };

        let ids = self.message_ids.read();
        let mut page = Vec::new();
        for id in ids.range::<str, _>((lower, Bound::Unbounded)) {
            if page.len() >= limit {
                break;
            }
            if let Some(entry) = self.messages.get(id) {
                if filter.matches(entry.value()) {
                    page.push((id.clone(), entry.value().clone()));
                }
            }
        }

        Ok(page)
    }

    async fn count_messages(&self, filter: &MessageFilter) -> Result<u64> {
        Ok(self
            .messages
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }

    async fn upsert_team(&self, team: &Team) -> Result<()> {
        self.teams.insert(team.id.clone(), team.clone());
        Ok(())
    }

    async fn find_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>> {
        Ok(page_sorted(&self.teams, |t| filter.matches(t), 0, usize::MAX)
            .into_iter()
            .map(|(_, team)| team)
            .collect())
    }

    async fn upsert_channel(&self, channel: &Channel) -> Result<()> {
        self.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn find_channels(
        &self,
        filter: &ChannelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Channel>> {
        Ok(page_sorted(&self.channels, |c| filter.matches(c), skip, limit)
            .into_iter()
            .map(|(_, channel)| channel)
            .collect())
    }

    async fn count_channels(&self, filter: &ChannelFilter) -> Result<u64> {
        Ok(self
            .channels
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }

    async fn upsert_user(&self, user: &User) -> Result<()> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>> {
        Ok(lookup(&self.users, ids))
    }

    async fn find_users(
        &self,
        filter: &UserFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<User>> {
        Ok(page_sorted(&self.users, |u| filter.matches(u), skip, limit)
            .into_iter()
            .map(|(_, user)| user)
            .collect())
    }

    async fn count_users(&self, filter: &UserFilter) -> Result<u64> {
        Ok(self
            .users
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count() as u64)
    }
}
