//! Tenant and channel scope resolution

use crate::error::{AppError, Result};
use crate::models::Team;
use crate::state::{ArchiveStore, ChannelFilter, TeamFilter};
use axum::http::{header, HeaderMap, Uri};

/// Host the request is scoped to.
///
/// An explicit `host` parameter wins. Otherwise the host of the referring
/// page is used, where `trusted_header` (set by a trusted proxy) overrides
/// the standard `Referer`. Ports are dropped.
pub fn request_host(
    explicit: Option<&str>,
    headers: &HeaderMap,
    trusted_header: &str,
) -> Option<String> {
    if let Some(host) = explicit.map(str::trim).filter(|h| !h.is_empty()) {
        return Some(host.to_string());
    }

    let referer = headers
        .get(trusted_header)
        .filter(|value| !value.is_empty())
        .or_else(|| headers.get(header::REFERER))
        .and_then(|value| value.to_str().ok())?;

    referer
        .parse::<Uri>()
        .ok()
        .and_then(|uri| uri.host().map(str::to_string))
}

/// Resolve the team for `host`: an exact custom-domain match first, then the
/// configured default team as long as it is enabled
pub async fn resolve_team(
    store: &dyn ArchiveStore,
    host: Option<&str>,
    default_domain: &str,
) -> Result<Team> {
    if let Some(host) = host {
        let filter = TeamFilter {
            custom_domain: Some(host.to_string()),
            ..Default::default()
        };
        if let Some(team) = store.find_teams(&filter).await?.into_iter().next() {
            return Ok(team);
        }
    }

    let filter = TeamFilter {
        domain: Some(default_domain.to_string()),
        enabled_only: true,
        ..Default::default()
    };

    match store.find_teams(&filter).await?.into_iter().next() {
        Some(team) => Ok(team),
        None => {
            tracing::warn!(host = ?host, default_domain, "No team for request");
            Err(AppError::TeamUnresolved(
                host.unwrap_or(default_domain).to_string(),
            ))
        }
    }
}

/// Channel ids eligible for search: the requested channel when it belongs to
/// the team and is still archived, otherwise every archived channel of the team
pub async fn resolve_channels(
    store: &dyn ArchiveStore,
    team_id: &str,
    channel: Option<&str>,
) -> Result<Vec<String>> {
    let filter = ChannelFilter {
        id: channel.map(str::to_string),
        team: Some(team_id.to_string()),
        member_only: true,
    };

    Ok(store
        .find_channels(&filter, 0, usize::MAX)
        .await?
        .into_iter()
        .map(|channel| channel.id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Channel;
    use crate::state::InMemoryStore;
    use axum::http::HeaderValue;

    #[test]
    fn test_explicit_host_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static("https://a.com/"));

        let host = request_host(Some("b.com"), &headers, "X-Alt-Referer");
        assert_eq!(host.as_deref(), Some("b.com"));
    }

    #[test]
    fn test_trusted_header_overrides_referer_and_strips_port() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static("https://a.com/"));
        headers.insert(
            "x-alt-referer",
            HeaderValue::from_static("https://archive.acme.com:8443/search?q=x"),
        );

        let host = request_host(None, &headers, "X-Alt-Referer");
        assert_eq!(host.as_deref(), Some("archive.acme.com"));
    }

    #[test]
    fn test_missing_referer() {
        assert_eq!(request_host(None, &HeaderMap::new(), "X-Alt-Referer"), None);
    }

    #[tokio::test]
    async fn test_resolve_team_custom_domain_then_default() {
        let store = InMemoryStore::new();
        store
            .upsert_team(&Team {
                id: "T1".to_string(),
                domain: "acme".to_string(),
                custom_domain: Some("archive.acme.com".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        store
            .upsert_team(&Team {
                id: "T2".to_string(),
                domain: "default".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let team = resolve_team(&store, Some("archive.acme.com"), "default")
            .await
            .unwrap();
        assert_eq!(team.id, "T1");

        let team = resolve_team(&store, Some("unknown.com"), "default")
            .await
            .unwrap();
        assert_eq!(team.id, "T2");
    }

    #[tokio::test]
    async fn test_disabled_default_team_is_unresolved() {
        let store = InMemoryStore::new();
        store
            .upsert_team(&Team {
                id: "T2".to_string(),
                domain: "default".to_string(),
                is_disabled: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let result = resolve_team(&store, None, "default").await;
        assert!(matches!(result, Err(AppError::TeamUnresolved(_))));
    }

    #[tokio::test]
    async fn test_resolve_channels_checks_team_and_membership() {
        let store = InMemoryStore::new();
        for (id, team, is_member) in [("C1", "T1", true), ("C2", "T1", false), ("C3", "T2", true)] {
            store
                .upsert_channel(&Channel {
                    id: id.to_string(),
                    team: team.to_string(),
                    is_member,
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        assert_eq!(resolve_channels(&store, "T1", None).await.unwrap(), vec!["C1"]);
        assert!(resolve_channels(&store, "T1", Some("C3")).await.unwrap().is_empty());
        assert!(resolve_channels(&store, "T1", Some("C2")).await.unwrap().is_empty());
    }
}
