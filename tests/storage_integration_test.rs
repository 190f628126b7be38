mod common;

use chat_archive::config::{StateBackend, StateConfig};
use chat_archive::state::{
    create_store, ArchiveStore, ChannelFilter, InMemoryStore, MessageFilter, SledStore,
    TeamFilter, UserFilter,
};
use common::{channel, message, team, user};
use std::sync::Arc;
use tempfile::TempDir;

/// Test suite that runs against any ArchiveStore implementation
async fn test_message_operations<S: ArchiveStore + 'static>(store: Arc<S>) {
    // Test 1: Upsert and fetch
    let msg = message("T1", "C1", "1500000001.000100", "original");
    let id = msg.archive_id();
    store.upsert_message(&id, &msg).await.unwrap();

    let fetched = store.get_messages(&[id.clone()]).await.unwrap();
    assert_eq!(fetched, vec![msg.clone()]);

    // Test 2: Upsert replaces the whole document
    let mut edited = message("T1", "C1", "1500000001.000100", "edited");
    edited.thread_ts = Some("1500000000.000001".to_string());
    store.upsert_message(&id, &edited).await.unwrap();

    let fetched = store.get_messages(&[id.clone()]).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0].text, "edited");
    assert_eq!(fetched[0].thread_ts.as_deref(), Some("1500000000.000001"));

    // Test 3: Unknown ids are skipped
    let fetched = store
        .get_messages(&["missing".to_string(), id.clone()])
        .await
        .unwrap();
    assert_eq!(fetched.len(), 1);

    // Test 4: Count
    let count = store.count_messages(&MessageFilter::default()).await.unwrap();
    assert_eq!(count, 1);
}

async fn test_message_listing<S: ArchiveStore + 'static>(store: Arc<S>) {
    for (channel, ts) in [("C1", "1"), ("C1", "2"), ("C2", "3"), ("C2", "4"), ("C1", "5")] {
        let mut msg = message("T1", channel, ts, "x");
        msg.is_deleted = ts == "4";
        store.upsert_message(&msg.archive_id(), &msg).await.unwrap();
    }

    let all = MessageFilter::default();
    let page1 = store.list_messages(&all, 0, 2).await.unwrap();
    let page2 = store.list_messages(&all, 2, 2).await.unwrap();
    let page3 = store.list_messages(&all, 4, 2).await.unwrap();
    assert_eq!(page1.len(), 2);
    assert_eq!(page2.len(), 2);
    assert_eq!(page3.len(), 1);

    // Pages are disjoint and in id order
    let ids: Vec<String> = page1
        .into_iter()
        .chain(page2)
        .chain(page3)
        .map(|(id, _)| id)
        .collect();
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(ids, sorted);

    let live = MessageFilter {
        exclude_deleted: true,
        ..Default::default()
    };
    assert_eq!(store.count_messages(&live).await.unwrap(), 4);

    let c2 = MessageFilter {
        channel: Some("C2".to_string()),
        ..Default::default()
    };
    assert_eq!(store.count_messages(&c2).await.unwrap(), 2);

    // Cursor pages resume strictly after the last id and skip filtered ones
    let first = store.list_messages_after(&live, None, 3).await.unwrap();
    let first_ids: Vec<&str> = first.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(first_ids, vec!["T1-C1-1", "T1-C1-2", "T1-C1-5"]);

    let rest = store
        .list_messages_after(&live, Some("T1-C1-5"), 3)
        .await
        .unwrap();
    let rest_ids: Vec<&str> = rest.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(rest_ids, vec!["T1-C2-3"]);

    assert!(store
        .list_messages_after(&live, Some("T1-C2-3"), 3)
        .await
        .unwrap()
        .is_empty());
}

async fn test_workspace_records<S: ArchiveStore + 'static>(store: Arc<S>) {
    let mut disabled = team("T3", "gone", Some("gone.example.com"));
    disabled.is_disabled = true;
    store.upsert_team(&team("T1", "archive", None)).await.unwrap();
    store.upsert_team(&disabled).await.unwrap();

    let enabled = TeamFilter {
        enabled_only: true,
        ..Default::default()
    };
    let teams = store.find_teams(&enabled).await.unwrap();
    assert_eq!(teams.len(), 1);
    assert_eq!(teams[0].id, "T1");

    let by_custom_domain = TeamFilter {
        custom_domain: Some("gone.example.com".to_string()),
        ..Default::default()
    };
    assert_eq!(store.find_teams(&by_custom_domain).await.unwrap().len(), 1);

    store.upsert_channel(&channel("C1", "T1", true)).await.unwrap();
    store.upsert_channel(&channel("C2", "T1", false)).await.unwrap();
    store.upsert_channel(&channel("D1", "T3", true)).await.unwrap();

    let member = ChannelFilter {
        team: Some("T1".to_string()),
        member_only: true,
        ..Default::default()
    };
    let channels = store.find_channels(&member, 0, 100).await.unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].id, "C1");
    assert_eq!(store.count_channels(&member).await.unwrap(), 1);

    for id in ["U1", "U2", "U3"] {
        store.upsert_user(&user(id, "T1")).await.unwrap();
    }
    store.upsert_user(&user("U9", "T3")).await.unwrap();

    let team_users = UserFilter {
        team: Some("T1".to_string()),
    };
    assert_eq!(store.count_users(&team_users).await.unwrap(), 3);
    assert_eq!(store.find_users(&team_users, 1, 10).await.unwrap().len(), 2);

    let users = store
        .get_users(&["U2".to_string(), "U404".to_string(), "U2".to_string()])
        .await
        .unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, "U2");
}

#[tokio::test]
async fn test_in_memory_store() {
    test_message_operations(Arc::new(InMemoryStore::new())).await;
    test_message_listing(Arc::new(InMemoryStore::new())).await;
    test_workspace_records(Arc::new(InMemoryStore::new())).await;
}

#[tokio::test]
async fn test_sled_store() {
    let temp_dir = TempDir::new().unwrap();

    test_message_operations(Arc::new(SledStore::new(temp_dir.path().join("ops")).unwrap())).await;
    test_message_listing(Arc::new(SledStore::new(temp_dir.path().join("list")).unwrap())).await;
    test_workspace_records(Arc::new(SledStore::new(temp_dir.path().join("ws")).unwrap())).await;
}

#[tokio::test]
async fn test_sled_store_persists_across_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let msg = message("T1", "C1", "42", "durable");

    {
        let store = SledStore::new(temp_dir.path()).unwrap();
        store.upsert_message(&msg.archive_id(), &msg).await.unwrap();
        store.flush().await.unwrap();
    }

    let store = SledStore::new(temp_dir.path()).unwrap();
    let fetched = store.get_messages(&[msg.archive_id()]).await.unwrap();
    assert_eq!(fetched, vec![msg]);
}

#[tokio::test]
async fn test_factory_backends() {
    let temp_dir = TempDir::new().unwrap();

    let sled = create_store(&StateConfig {
        backend: StateBackend::Sled,
        path: Some(temp_dir.path().to_path_buf()),
    })
    .unwrap();
    sled.upsert_team(&team("T1", "archive", None)).await.unwrap();

    let memory = create_store(&StateConfig {
        backend: StateBackend::Memory,
        path: None,
    })
    .unwrap();
    assert!(memory.find_teams(&TeamFilter::default()).await.unwrap().is_empty());

    assert!(create_store(&StateConfig {
        backend: StateBackend::Sled,
        path: None,
    })
    .is_err());
}
