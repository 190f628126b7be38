//! Search query building
//!
//! Turns raw request parameters into an engine-neutral [`MessageQuery`].
//! Parameters that fail to parse fall back to their defaults.

use crate::models::SYSTEM_SUBTYPES;
use crate::search::config::SearchConfig;
use serde::{Deserialize, Serialize};

/// Highlight markers wrapped around matched terms
pub const HIGHLIGHT_PRE_TAG: &str = "[hl]";
pub const HIGHLIGHT_POST_TAG: &str = "[/hl]";

/// Highlightable fields
pub const TEXT_FIELD: &str = "text";
pub const ATTACHMENTS_TEXT_FIELD: &str = "attachments.text";

/// Number of channel buckets returned by the channel aggregation
pub const CHANNEL_AGGREGATION_SIZE: usize = 100;

/// Raw search parameters as received on the query string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    /// Free-text query
    pub q: Option<String>,

    /// Lower bound of the time window (inclusive)
    pub from: Option<String>,

    /// Upper bound of the time window (exclusive)
    pub to: Option<String>,

    /// Extra scoring range on `ts`, only applied when both bounds parse
    pub qfrom: Option<String>,
    pub qto: Option<String>,

    /// Restrict to a single thread
    pub thread: Option<String>,

    /// Restrict to a single channel
    pub channel: Option<String>,

    /// Explicit tenant host
    pub host: Option<String>,

    pub offset: Option<String>,
    pub size: Option<String>,

    /// "asc" for oldest first
    pub sort: Option<String>,

    /// "1" to include channel buckets
    pub aggs: Option<String>,
}

impl SearchParams {
    /// Free-text query, if one was supplied
    pub fn text(&self) -> Option<&str> {
        self.q.as_deref().map(str::trim).filter(|q| !q.is_empty())
    }

    /// Requested channel, if one was supplied
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref().filter(|c| !c.is_empty())
    }
}

/// Sort order on the message timestamp
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Half-open numeric range `[gte, lt)` on the message timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub gte: f64,
    pub lt: f64,
}

impl TimeRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.gte && value < self.lt
    }
}

/// Non-scoring restrictions every hit must satisfy
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    /// Tenant isolation
    pub team: String,
    pub thread_ts: Option<f64>,
    pub excluded_subtypes: Vec<String>,
    pub exclude_hidden: bool,
    pub window: TimeRange,
}

/// Highlighting request
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSpec {
    pub pre_tag: String,
    pub post_tag: String,
    pub fields: Vec<String>,
}

impl Default for HighlightSpec {
    fn default() -> Self {
        Self {
            pre_tag: HIGHLIGHT_PRE_TAG.to_string(),
            post_tag: HIGHLIGHT_POST_TAG.to_string(),
            fields: vec![TEXT_FIELD.to_string(), ATTACHMENTS_TEXT_FIELD.to_string()],
        }
    }
}

/// Structured, engine-neutral message query
#[derive(Debug, Clone, PartialEq)]
pub struct MessageQuery {
    /// Free-text clause, terms combined with AND
    pub text: Option<String>,
    pub text_range: Option<TimeRange>,
    pub filter: FilterClause,
    /// Channels a hit must belong to; applied after scoring and aggregation
    pub post_filter_channels: Vec<String>,
    pub highlight: HighlightSpec,
    /// Top-N channel buckets, when requested
    pub channel_aggregation: Option<usize>,
    pub offset: usize,
    pub size: usize,
    pub sort: SortOrder,
}

/// Builds tenant-scoped message queries
pub struct QueryBuilder<'a> {
    config: &'a SearchConfig,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    /// Build the query for `team_id`, restricted to `channels`, using `now`
    /// (seconds since the epoch) as the default upper bound of the window
    pub fn build(
        &self,
        params: &SearchParams,
        team_id: &str,
        channels: Vec<String>,
        now: f64,
    ) -> MessageQuery {
        let text_range = match (parse_f64(&params.qfrom), parse_f64(&params.qto)) {
            (Some(gte), Some(lt)) => Some(TimeRange { gte, lt }),
            _ => None,
        };

        let window = TimeRange {
            gte: parse_f64(&params.from).unwrap_or(0.0),
            lt: parse_f64(&params.to).unwrap_or(now),
        };

        let filter = FilterClause {
            team: team_id.to_string(),
            thread_ts: parse_f64(&params.thread),
            excluded_subtypes: SYSTEM_SUBTYPES.iter().map(|s| s.to_string()).collect(),
            exclude_hidden: true,
            window,
        };

        let size = parse_usize(&params.size)
            .unwrap_or(self.config.default_page_size)
            .min(self.config.max_page_size);

        let offset = parse_usize(&params.offset)
            .unwrap_or(0)
            .min(self.config.max_offset);

        let sort = match params.sort.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        let channel_aggregation =
            (params.aggs.as_deref() == Some("1")).then_some(CHANNEL_AGGREGATION_SIZE);

        MessageQuery {
            text: params.text().map(str::to_string),
            text_range,
            filter,
            post_filter_channels: channels,
            highlight: HighlightSpec::default(),
            channel_aggregation,
            offset,
            size,
            sort,
        }
    }
}

fn parse_f64(value: &Option<String>) -> Option<f64> {
    value
        .as_deref()
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

fn parse_usize(value: &Option<String>) -> Option<usize> {
    value.as_deref().and_then(|v| v.trim().parse::<usize>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(params: SearchParams) -> MessageQuery {
        let config = SearchConfig::default();
        QueryBuilder::new(&config).build(&params, "T1", vec!["C1".to_string()], 1_000.0)
    }

    #[test]
    fn test_defaults() {
        let query = build(SearchParams::default());

        assert_eq!(query.text, None);
        assert_eq!(query.text_range, None);
        assert_eq!(query.filter.team, "T1");
        assert_eq!(query.filter.window, TimeRange { gte: 0.0, lt: 1_000.0 });
        assert!(query.filter.exclude_hidden);
        assert_eq!(query.filter.excluded_subtypes.len(), 5);
        assert_eq!(query.post_filter_channels, vec!["C1"]);
        assert_eq!(query.offset, 0);
        assert_eq!(query.size, 100);
        assert_eq!(query.sort, SortOrder::Desc);
        assert_eq!(query.channel_aggregation, None);
        assert_eq!(query.highlight.pre_tag, "[hl]");
        assert_eq!(query.highlight.post_tag, "[/hl]");
    }

    #[test]
    fn test_size_is_capped() {
        let query = build(SearchParams {
            size: Some("10000".to_string()),
            ..Default::default()
        });
        assert_eq!(query.size, 500);

        let query = build(SearchParams {
            size: Some("20".to_string()),
            offset: Some("40".to_string()),
            ..Default::default()
        });
        assert_eq!(query.size, 20);
        assert_eq!(query.offset, 40);

        let query = build(SearchParams {
            size: Some("500".to_string()),
            ..Default::default()
        });
        assert_eq!(query.size, 500);
    }

    #[test]
    fn test_offset_is_capped() {
        let query = build(SearchParams {
            offset: Some("1000000000000".to_string()),
            ..Default::default()
        });
        assert_eq!(query.offset, 10_000);

        let query = build(SearchParams {
            offset: Some(usize::MAX.to_string()),
            ..Default::default()
        });
        assert_eq!(query.offset, 10_000);
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let query = build(SearchParams {
            from: Some("yesterday".to_string()),
            size: Some("-5".to_string()),
            thread: Some("abc".to_string()),
            ..Default::default()
        });

        assert_eq!(query.filter.window.gte, 0.0);
        assert_eq!(query.size, 100);
        assert_eq!(query.filter.thread_ts, None);
    }

    #[test]
    fn test_qrange_requires_both_bounds() {
        let query = build(SearchParams {
            qfrom: Some("10".to_string()),
            ..Default::default()
        });
        assert_eq!(query.text_range, None);

        let query = build(SearchParams {
            qfrom: Some("10".to_string()),
            qto: Some("20".to_string()),
            ..Default::default()
        });
        assert_eq!(query.text_range, Some(TimeRange { gte: 10.0, lt: 20.0 }));
    }

    #[test]
    fn test_sort_aggs_and_text() {
        let query = build(SearchParams {
            q: Some("  deploy failed ".to_string()),
            sort: Some("asc".to_string()),
            aggs: Some("1".to_string()),
            thread: Some("1490000000.000100".to_string()),
            ..Default::default()
        });

        assert_eq!(query.text.as_deref(), Some("deploy failed"));
        assert_eq!(query.sort, SortOrder::Asc);
        assert_eq!(query.channel_aggregation, Some(100));
        assert_eq!(query.filter.thread_ts, Some(1490000000.0001));
    }

    #[test]
    fn test_window_is_half_open() {
        let range = TimeRange { gte: 0.0, lt: 10.0 };
        assert!(range.contains(0.0));
        assert!(range.contains(9.99));
        assert!(!range.contains(10.0));
    }
}
