pub mod factory;
pub mod sled_store;
pub mod store;

pub use factory::{create_in_memory_store, create_store};
pub use sled_store::SledStore;
pub use store::InMemoryStore;

use crate::error::Result;
use crate::models::{Channel, Message, Team, User};
use async_trait::async_trait;

/// Durable document store for archived messages and the workspace records
/// they are scoped by. Every call is a self-contained operation; no handle
/// is held between calls.
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    /// Insert or fully replace the message stored under `id`
    async fn upsert_message(&self, id: &str, message: &Message) -> Result<()>;

    /// Fetch messages by id; unknown ids are skipped
    async fn get_messages(&self, ids: &[String]) -> Result<Vec<Message>>;

    /// List `(id, message)` pairs in id order
    async fn list_messages(
        &self,
        filter: &MessageFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<(String, Message)>>;

    /// List up to `limit` matching `(id, message)` pairs whose id sorts
    /// strictly after `after`, in id order. Resuming from the last id of the
    /// previous page walks the whole collection once.
    async fn list_messages_after(
        &self,
        filter: &MessageFilter,
        after: Option<&str>,
        limit: usize,
    ) -> Result<Vec<(String, Message)>>;

    async fn count_messages(&self, filter: &MessageFilter) -> Result<u64>;

    async fn upsert_team(&self, team: &Team) -> Result<()>;

    async fn find_teams(&self, filter: &TeamFilter) -> Result<Vec<Team>>;

    async fn upsert_channel(&self, channel: &Channel) -> Result<()>;

    async fn find_channels(
        &self,
        filter: &ChannelFilter,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Channel>>;

    async fn count_channels(&self, filter: &ChannelFilter) -> Result<u64>;

    async fn upsert_user(&self, user: &User) -> Result<()>;

    /// Fetch users by id in one batch; unknown ids are skipped
    async fn get_users(&self, ids: &[String]) -> Result<Vec<User>>;

    async fn find_users(&self, filter: &UserFilter, skip: usize, limit: usize)
        -> Result<Vec<User>>;

    async fn count_users(&self, filter: &UserFilter) -> Result<u64>;
}

/// Filter for listing messages
#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub team: Option<String>,
    pub channel: Option<String>,
    /// Skip messages flagged `is_deleted`
    pub exclude_deleted: bool,
}

impl MessageFilter {
    pub fn matches(&self, message: &Message) -> bool {
        let team_match = self.team.as_ref().map_or(true, |t| *t == message.team);
        let channel_match = self
            .channel
            .as_ref()
            .map_or(true, |c| *c == message.channel);
        let deleted_match = !self.exclude_deleted || !message.is_deleted;

        team_match && channel_match && deleted_match
    }
}

/// Filter for looking up teams
#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub id: Option<String>,
    pub domain: Option<String>,
    pub custom_domain: Option<String>,
    /// Skip teams flagged `is_disabled`
    pub enabled_only: bool,
}

impl TeamFilter {
    pub fn matches(&self, team: &Team) -> bool {
        let id_match = self.id.as_ref().map_or(true, |id| *id == team.id);
        let domain_match = self.domain.as_ref().map_or(true, |d| *d == team.domain);
        let custom_match = self
            .custom_domain
            .as_ref()
            .map_or(true, |d| team.custom_domain.as_deref() == Some(d.as_str()));
        let enabled_match = !self.enabled_only || !team.is_disabled;

        id_match && domain_match && custom_match && enabled_match
    }
}

/// Filter for listing channels
#[derive(Debug, Clone, Default)]
pub struct ChannelFilter {
    pub id: Option<String>,
    pub team: Option<String>,
    /// Only channels the archiving bot is still a member of
    pub member_only: bool,
}

impl ChannelFilter {
    pub fn matches(&self, channel: &Channel) -> bool {
        let id_match = self.id.as_ref().map_or(true, |id| *id == channel.id);
        let team_match = self.team.as_ref().map_or(true, |t| *t == channel.team);
        let member_match = !self.member_only || channel.is_member;

        id_match && team_match && member_match
    }
}

/// Filter for listing users
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub team: Option<String>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.team.as_ref().map_or(true, |t| *t == user.team)
    }
}
