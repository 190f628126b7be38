use crate::context::AppContext;
use crate::error::Result;
use crate::indexer::PipelineStats;
use crate::models::{ChannelResponse, TeamResponse, UserResponse};
use crate::search::{request_host, resolve_team, SearchParams, SearchResults};
use crate::state::{ChannelFilter, TeamFilter, UserFilter};
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check(State(ctx): State<Arc<AppContext>>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: ctx.uptime_secs(),
        connections: ctx.registry.len().await,
        pipeline: ctx.pipeline.stats(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub connections: usize,
    pub pipeline: PipelineStats,
}

/// Search messages
pub async fn search_messages(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>> {
    let host = request_host(
        params.host.as_deref(),
        &headers,
        &ctx.config.server.referer_header,
    );

    let results = ctx.search.search(&params, host.as_deref()).await?;
    Ok(Json(results))
}

/// Pagination shared by the listing endpoints. Values that do not parse
/// fall back to the endpoint default.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub host: Option<String>,
    pub offset: Option<String>,
    pub size: Option<String>,
}

impl ListQuery {
    fn offset(&self) -> usize {
        parse_or(&self.offset, 0)
    }

    fn size(&self, default: usize) -> usize {
        parse_or(&self.size, default)
    }
}

fn parse_or(value: &Option<String>, default: usize) -> usize {
    value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// List the archived channels of the requesting team
pub async fn list_channels(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListChannelsResponse>> {
    let host = request_host(
        params.host.as_deref(),
        &headers,
        &ctx.config.server.referer_header,
    );
    let team = resolve_team(ctx.store.as_ref(), host.as_deref(), &ctx.config.team).await?;

    let filter = ChannelFilter {
        team: Some(team.id.clone()),
        member_only: true,
        ..Default::default()
    };

    let channels = ctx
        .store
        .find_channels(&filter, params.offset(), params.size(100))
        .await?;
    let total = ctx.store.count_channels(&filter).await?;

    Ok(Json(ListChannelsResponse {
        channels: channels.iter().map(ChannelResponse::from).collect(),
        total,
    }))
}

#[derive(Debug, Serialize)]
pub struct ListChannelsResponse {
    pub channels: Vec<ChannelResponse>,
    pub total: u64,
}

/// List the users of the requesting team
pub async fn list_users(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(params): Query<ListQuery>,
) -> Result<Json<ListUsersResponse>> {
    let host = request_host(
        params.host.as_deref(),
        &headers,
        &ctx.config.server.referer_header,
    );
    let team = resolve_team(ctx.store.as_ref(), host.as_deref(), &ctx.config.team).await?;

    let filter = UserFilter {
        team: Some(team.id.clone()),
    };

    let users = ctx
        .store
        .find_users(&filter, params.offset(), params.size(1000))
        .await?;
    let total = ctx.store.count_users(&filter).await?;

    Ok(Json(ListUsersResponse {
        users: users.iter().map(UserResponse::from).collect(),
        total,
    }))
}

#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<UserResponse>,
    pub total: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TeamQuery {
    pub host: Option<String>,
}

/// Enabled teams; narrowed to the requesting team when the request carries
/// a host that resolves
pub async fn list_teams(
    State(ctx): State<Arc<AppContext>>,
    headers: HeaderMap,
    Query(params): Query<TeamQuery>,
) -> Result<Json<TeamsResponse>> {
    let mut filter = TeamFilter {
        enabled_only: true,
        ..Default::default()
    };

    let host = request_host(
        params.host.as_deref(),
        &headers,
        &ctx.config.server.referer_header,
    );
    if let Some(host) = host {
        match resolve_team(ctx.store.as_ref(), Some(&host), &ctx.config.team).await {
            Ok(team) => filter.id = Some(team.id),
            Err(e) => tracing::debug!(host = %host, error = %e, "Listing all enabled teams"),
        }
    }

    let teams = ctx.store.find_teams(&filter).await?;

    Ok(Json(TeamsResponse {
        team: teams.iter().map(TeamResponse::from).collect(),
        status: "ok".to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct TeamsResponse {
    pub team: Vec<TeamResponse>,
    pub status: String,
}
