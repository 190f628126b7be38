//! Message search service: scope resolution, query execution and result assembly

use crate::error::Result;
use crate::models::{Message, MessageResponse, UserResponse};
use crate::search::config::SearchConfig;
use crate::search::engine::{EngineHit, SearchEngine};
use crate::search::query::{QueryBuilder, SearchParams, ATTACHMENTS_TEXT_FIELD, TEXT_FIELD};
use crate::search::tenant::{resolve_channels, resolve_team};
use crate::state::ArchiveStore;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// In-text user mention, e.g. `<@U024BE7LH>`
static MENTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"<@(.+?)>").expect("valid mention pattern"));

/// Assembled search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub messages: Vec<MessageResponse>,
    pub total: u64,
    pub aggs: Aggregations,
    pub related: Related,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregations {
    /// Message count per channel id
    pub buckets: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Related {
    /// Authors and mentioned users, keyed by user id
    pub users: BTreeMap<String, UserResponse>,
}

/// Main search service
pub struct SearchService {
    store: Arc<dyn ArchiveStore>,
    engine: Arc<dyn SearchEngine>,
    config: SearchConfig,
    default_team: String,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn ArchiveStore>,
        engine: Arc<dyn SearchEngine>,
        config: SearchConfig,
        default_team: impl Into<String>,
    ) -> Self {
        Self {
            store,
            engine,
            config,
            default_team: default_team.into(),
        }
    }

    /// Search the archive of the team serving `host`
    pub async fn search(&self, params: &SearchParams, host: Option<&str>) -> Result<SearchResults> {
        let team = resolve_team(self.store.as_ref(), host, &self.default_team).await?;
        let channels = resolve_channels(self.store.as_ref(), &team.id, params.channel()).await?;

        let now = chrono::Utc::now().timestamp() as f64;
        let query = QueryBuilder::new(&self.config).build(params, &team.id, channels, now);

        tracing::debug!(
            team_id = %team.id,
            text = ?query.text,
            channels = query.post_filter_channels.len(),
            offset = query.offset,
            size = query.size,
            "Executing message search"
        );

        let response = self.engine.search(&query).await?;

        let mut messages = Vec::with_capacity(response.hits.len());
        let mut user_ids: Vec<String> = Vec::new();

        for hit in &response.hits {
            let message: Message = match serde_json::from_str(&hit.source) {
                Ok(message) => message,
                Err(e) => {
                    tracing::debug!(message_id = %hit.id, error = %e, "Skipping undecodable hit");
                    continue;
                }
            };

            collect_user_ids(&message, &mut user_ids);
            messages.push(assemble_message(&message, hit));
        }

        let users = self.store.get_users(&user_ids).await?;
        let related = Related {
            users: users
                .iter()
                .map(|user| (user.id.clone(), UserResponse::from(user)))
                .collect(),
        };

        let aggs = Aggregations {
            buckets: response
                .aggregations
                .unwrap_or_default()
                .into_iter()
                .map(|bucket| (bucket.key, bucket.doc_count))
                .collect(),
        };

        tracing::info!(
            team_id = %team.id,
            total = response.total,
            returned = messages.len(),
            "Message search completed"
        );

        Ok(SearchResults {
            messages,
            total: response.total,
            aggs,
            related,
        })
    }
}

/// Map a stored message to its response shape and substitute highlights.
///
/// The text gets the first text fragment. Attachment fragments are applied by
/// position: fragment N replaces the text of attachment N. Fragments beyond the
/// last attachment are ignored.
pub fn assemble_message(message: &Message, hit: &EngineHit) -> MessageResponse {
    let mut response = MessageResponse::from(message);

    if let Some(fragment) = hit.highlight.get(TEXT_FIELD).and_then(|f| f.first()) {
        response.text = fragment.clone();
    }

    if let Some(fragments) = hit.highlight.get(ATTACHMENTS_TEXT_FIELD) {
        for (attachment, fragment) in response.attachments.iter_mut().zip(fragments) {
            attachment.text = fragment.clone();
        }
    }

    response
}

/// Append the author and every mentioned user, skipping ids already seen
fn collect_user_ids(message: &Message, user_ids: &mut Vec<String>) {
    let mentions = MENTION
        .captures_iter(&message.text)
        .filter_map(|captures| captures.get(1))
        .map(|m| m.as_str());

    let author = Some(message.user.as_str()).filter(|u| !u.is_empty());

    for id in mentions.chain(author) {
        if !user_ids.iter().any(|existing| existing == id) {
            user_ids.push(id.to_string());
        }
    }
}
