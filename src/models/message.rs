use serde::{Deserialize, Serialize};

/// Subtypes that never show up in search results
pub const SYSTEM_SUBTYPES: [&str; 5] = [
    "message_changed",
    "message_deleted",
    "channel_join",
    "channel_leave",
    "pinned_item",
];

/// An archived chat message as delivered by the workspace event stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Event type, normally "message"
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(default)]
    pub team: String,

    #[serde(default)]
    pub channel: String,

    /// Author id
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,

    #[serde(default)]
    pub text: String,

    /// Seconds since the epoch encoded as a decimal string, e.g. "1490000000.000123"
    #[serde(default)]
    pub ts: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_starred: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pinned_to: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited: Option<Edited>,

    /// Governs which of the optional fields below are meaningful
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub hidden: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_ts: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<String>,

    // bot_message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icons: Option<Icons>,

    // channel_join, group_join
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inviter: Option<String>,

    // channel_topic, channel_purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    // channel_name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,

    // channel_archive
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,

    // file_share, file_comment, file_mention
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<File>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub upload: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,

    // pinned_item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<i64>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub is_deleted: bool,
}

impl Message {
    /// Deterministic archive identity: `{team}-{channel}-{ts}`
    pub fn archive_id(&self) -> String {
        format!("{}-{}-{}", self.team, self.channel, self.ts)
    }

    /// Numeric value of `ts`, if it parses
    pub fn timestamp_secs(&self) -> Option<f64> {
        self.ts.parse::<f64>().ok()
    }

    pub fn thread_timestamp_secs(&self) -> Option<f64> {
        self.thread_ts.as_deref().and_then(|ts| ts.parse::<f64>().ok())
    }

    /// Whether the message is a system notice excluded from search
    pub fn is_system(&self) -> bool {
        self.subtype
            .as_deref()
            .map(|subtype| SYSTEM_SUBTYPES.contains(&subtype))
            .unwrap_or(false)
    }

    /// Concatenated text of all attachments, in order
    pub fn attachment_texts(&self) -> impl Iterator<Item = &str> {
        self.attachments.iter().map(|a| a.text.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Icons {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Edited {
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub ts: String,
}

/// Structured block attached to a message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub fallback: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_subname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,

    #[serde(rename = "mrkdwn_in", default, skip_serializing_if = "Vec::is_empty")]
    pub markdown_in: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_icon: Option<String>,

    /// Sent as either a number or a string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttachmentField {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub value: String,

    #[serde(default)]
    pub short: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub comment: String,
}

/// Shared file reference
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct File {
    #[serde(default)]
    pub id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub mimetype: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub filetype: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub pretty_type: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub user: String,

    #[serde(default)]
    pub size: u64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url_private: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub permalink: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub preview: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub channels: Vec<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}
