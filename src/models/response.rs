//! Public response shapes. Every shape is built field by field from its record
//! so that nothing is exposed by accident.

use super::{Attachment, AttachmentField, Channel, Icons, Message, Team, User};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageResponse {
    pub text: String,
    pub channel: String,
    pub user: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ts: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub is_starred: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pinned_to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<AttachmentResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons: Option<Icons>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inviter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub upload: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub team: String,
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            text: message.text.clone(),
            channel: message.channel.clone(),
            user: message.user.clone(),
            kind: message.kind.clone(),
            ts: message.ts.clone(),
            thread_ts: message.thread_ts.clone(),
            is_starred: message.is_starred,
            pinned_to: message.pinned_to.clone(),
            attachments: message.attachments.iter().map(AttachmentResponse::from).collect(),
            subtype: message.subtype.clone(),
            hidden: message.hidden,
            deleted_ts: message.deleted_ts.clone(),
            event_ts: message.event_ts.clone(),
            bot_id: message.bot_id.clone(),
            username: message.username.clone(),
            icons: message.icons.clone(),
            inviter: message.inviter.clone(),
            topic: message.topic.clone(),
            purpose: message.purpose.clone(),
            name: message.name.clone(),
            old_name: message.old_name.clone(),
            members: message.members.clone(),
            upload: message.upload,
            item_type: message.item_type.clone(),
            reply_to: message.reply_to,
            team: message.team.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub fallback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_subname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,
    #[serde(rename = "mrkdwn_in", skip_serializing_if = "Vec::is_empty")]
    pub markdown_in: Vec<String>,
}

impl From<&Attachment> for AttachmentResponse {
    fn from(attachment: &Attachment) -> Self {
        Self {
            color: attachment.color.clone(),
            fallback: attachment.fallback.clone(),
            author_name: attachment.author_name.clone(),
            author_subname: attachment.author_subname.clone(),
            author_link: attachment.author_link.clone(),
            author_icon: attachment.author_icon.clone(),
            title: attachment.title.clone(),
            title_link: attachment.title_link.clone(),
            pretext: attachment.pretext.clone(),
            text: attachment.text.clone(),
            image_url: attachment.image_url.clone(),
            thumb_url: attachment.thumb_url.clone(),
            fields: attachment.fields.clone(),
            markdown_in: attachment.markdown_in.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserResponse {
    #[serde(rename = "user_id")]
    pub id: String,
    pub name: String,
    pub team: String,
    pub deleted: bool,
    pub color: String,
    pub profile: UserProfileResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfileResponse {
    pub first_name: String,
    pub last_name: String,
    pub real_name: String,
    pub image_24: String,
    pub image_32: String,
    pub image_48: String,
    pub image_72: String,
    pub image_192: String,
    pub image_original: String,
    pub title: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let profile = &user.profile;
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            team: user.team.clone(),
            deleted: user.deleted,
            color: user.color.clone(),
            profile: UserProfileResponse {
                first_name: profile.first_name.clone(),
                last_name: profile.last_name.clone(),
                real_name: profile.real_name.clone(),
                image_24: profile.image_24.clone(),
                image_32: profile.image_32.clone(),
                image_48: profile.image_48.clone(),
                image_72: profile.image_72.clone(),
                image_192: profile.image_192.clone(),
                image_original: profile.image_original.clone(),
                title: profile.title.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelResponse {
    #[serde(rename = "channel_id")]
    pub id: String,
    pub name: String,
    pub team: String,
    pub is_channel: bool,
    pub is_archived: bool,
    pub is_general: bool,
    pub is_group: bool,
    pub is_starred: bool,
    pub is_member: bool,
    pub purpose: PurposeResponse,
    pub num_members: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurposeResponse {
    pub value: String,
}

impl From<&Channel> for ChannelResponse {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id.clone(),
            name: channel.name.clone(),
            team: channel.team.clone(),
            is_channel: channel.is_channel,
            is_archived: channel.is_archived,
            is_general: channel.is_general,
            is_group: channel.is_group,
            is_starred: channel.is_starred,
            is_member: channel.is_member,
            purpose: PurposeResponse {
                value: channel.purpose.value.clone(),
            },
            num_members: channel.num_members,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamResponse {
    #[serde(rename = "team_id")]
    pub id: String,
    pub domain: String,
    pub name: String,
    pub is_disabled: bool,
    pub is_hidden: bool,
    pub plan: String,
    pub icon: BTreeMap<String, serde_json::Value>,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id.clone(),
            domain: team.domain.clone(),
            name: team.name.clone(),
            is_disabled: team.is_disabled,
            is_hidden: team.is_hidden,
            plan: team.plan.clone(),
            icon: team.icon.clone(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
