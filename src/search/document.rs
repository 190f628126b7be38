//! Search document schema and conversion

use crate::models::Message;
use crate::search::error::{SearchError, SearchResult};
use tantivy::schema::{
    self, Facet, FacetOptions, Field, Schema, FAST, INDEXED, STORED, STRING,
};
use tantivy::TantivyDocument;

pub const ID: &str = "id";
pub const TEAM: &str = "team";
pub const CHANNEL: &str = "channel";
pub const CHANNEL_FACET: &str = "channel_facet";
pub const SUBTYPE: &str = "subtype";
pub const HIDDEN: &str = "hidden";
pub const TS: &str = "ts";
pub const THREAD_TS: &str = "thread_ts";
pub const TEXT: &str = "text";
pub const ATTACHMENTS_TEXT: &str = "attachments_text";
pub const SOURCE: &str = "source";

/// Build the search schema for messages
pub fn build_message_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // Archive id, exact match for replace-by-id
    schema_builder.add_text_field(ID, STRING | STORED);

    schema_builder.add_text_field(TEAM, STRING);
    schema_builder.add_text_field(CHANNEL, STRING);

    // Channel as a facet for bucket counts
    schema_builder.add_facet_field(CHANNEL_FACET, FacetOptions::default());

    schema_builder.add_text_field(SUBTYPE, STRING);
    schema_builder.add_bool_field(HIDDEN, INDEXED);

    // Timestamps as float seconds, fast for sorting
    schema_builder.add_f64_field(TS, INDEXED | FAST | STORED);
    schema_builder.add_f64_field(THREAD_TS, INDEXED);

    schema_builder.add_text_field(TEXT, schema::TEXT);

    // Multi-valued, one value per attachment
    schema_builder.add_text_field(ATTACHMENTS_TEXT, schema::TEXT);

    // Full message as JSON
    schema_builder.add_text_field(SOURCE, STORED);

    schema_builder.build()
}

/// Resolved field handles
#[derive(Debug, Clone, Copy)]
pub struct MessageFields {
    pub id: Field,
    pub team: Field,
    pub channel: Field,
    pub channel_facet: Field,
    pub subtype: Field,
    pub hidden: Field,
    pub ts: Field,
    pub thread_ts: Field,
    pub text: Field,
    pub attachments_text: Field,
    pub source: Field,
}

impl MessageFields {
    pub fn from_schema(schema: &Schema) -> SearchResult<Self> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| SearchError::SchemaError(format!("Missing field {}: {}", name, e)))
        };

        Ok(Self {
            id: field(ID)?,
            team: field(TEAM)?,
            channel: field(CHANNEL)?,
            channel_facet: field(CHANNEL_FACET)?,
            subtype: field(SUBTYPE)?,
            hidden: field(HIDDEN)?,
            ts: field(TS)?,
            thread_ts: field(THREAD_TS)?,
            text: field(TEXT)?,
            attachments_text: field(ATTACHMENTS_TEXT)?,
            source: field(SOURCE)?,
        })
    }
}

/// Convert a message into its index document
pub fn to_tantivy_doc(
    id: &str,
    message: &Message,
    fields: &MessageFields,
) -> SearchResult<TantivyDocument> {
    let source = serde_json::to_string(message)
        .map_err(|e| SearchError::IndexingFailed(format!("Failed to encode {}: {}", id, e)))?;

    let mut doc = TantivyDocument::new();
    doc.add_text(fields.id, id);
    doc.add_text(fields.team, &message.team);
    doc.add_text(fields.channel, &message.channel);
    if !message.channel.is_empty() {
        doc.add_facet(fields.channel_facet, Facet::from_path([message.channel.as_str()]));
    }
    doc.add_bool(fields.hidden, message.hidden);
    doc.add_text(fields.text, &message.text);
    doc.add_text(fields.source, &source);

    if let Some(subtype) = &message.subtype {
        doc.add_text(fields.subtype, subtype);
    }

    // Messages without a numeric ts can never fall inside a time window
    match message.timestamp_secs() {
        Some(ts) => doc.add_f64(fields.ts, ts),
        None => tracing::debug!(message_id = %id, ts = %message.ts, "Message has no numeric ts"),
    }

    if let Some(thread_ts) = message.thread_timestamp_secs() {
        doc.add_f64(fields.thread_ts, thread_ts);
    }

    for text in message.attachment_texts() {
        doc.add_text(fields.attachments_text, text);
    }

    Ok(doc)
}
