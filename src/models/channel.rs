use serde::{Deserialize, Serialize};

/// Workspace channel, maintained by the workspace sync process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Owning team id
    #[serde(default)]
    pub team: String,

    #[serde(default)]
    pub is_channel: bool,

    #[serde(default)]
    pub creator: String,

    #[serde(default)]
    pub is_archived: bool,

    #[serde(default)]
    pub is_general: bool,

    #[serde(default)]
    pub is_group: bool,

    #[serde(default)]
    pub is_starred: bool,

    #[serde(default)]
    pub members: Vec<String>,

    #[serde(default)]
    pub topic: ChannelText,

    #[serde(default)]
    pub purpose: ChannelText,

    /// Whether the archiving bot is still a member; only member channels are searchable
    #[serde(default)]
    pub is_member: bool,

    #[serde(default)]
    pub num_members: u32,
}

/// Topic or purpose of a channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelText {
    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub creator: String,

    #[serde(default)]
    pub last_set: i64,
}
