mod support;

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use blogline::application::posts::CreatePostCommand;
use blogline::cache::{CacheStore, InMemoryCacheStore, InvalidationMode, InvalidationTarget};
use blogline::domain::posts::PostPatch;
use blogline::domain::types::ActorId;
use blogline::infra::memory::InMemoryPostsRepo;

use support::{FailingCacheStore, Harness, RecordingObserver, WriteFailingCacheStore, service_over};

const ALICE: ActorId = ActorId(1);
const BOB: ActorId = ActorId(2);

fn command(title: &str) -> CreatePostCommand {
    CreatePostCommand::new(title, "body")
}

fn titles(posts: Vec<blogline::domain::entities::PostRecord>) -> Vec<String> {
    posts.into_iter().map(|post| post.title).collect()
}

#[tokio::test]
async fn exact_mode_leaves_paginated_listing_stale_after_create() {
    let h = Harness::new(InvalidationMode::Exact);
    h.service.create(ALICE, command("one")).await.unwrap();

    assert_eq!(titles(h.service.list_all(0, 100).await.unwrap()), ["one"]);
    h.service.list_by_author(ALICE).await.unwrap();

    h.service.create(ALICE, command("two")).await.unwrap();

    // The bare "all_posts" key never matches a paginated entry.
    assert_eq!(titles(h.service.list_all(0, 100).await.unwrap()), ["one"]);
    assert_eq!(
        titles(h.service.list_by_author(ALICE).await.unwrap()),
        ["one", "two"]
    );
}

#[tokio::test]
async fn pattern_mode_refreshes_every_cached_page_after_create() {
    let h = Harness::new(InvalidationMode::Pattern);
    h.service.create(ALICE, command("one")).await.unwrap();
    h.service.list_all(0, 100).await.unwrap();
    h.service.list_all(0, 1).await.unwrap();
    assert!(h.store.inner().contains_key("all_posts:0:1"));

    h.service.create(BOB, command("two")).await.unwrap();

    assert!(h.store.inner().keys().iter().all(|key| !key.starts_with("all_posts")));
    assert_eq!(
        titles(h.service.list_all(0, 100).await.unwrap()),
        ["one", "two"]
    );
}

#[tokio::test]
async fn update_refreshes_listings_and_the_post() {
    let h = Harness::new(InvalidationMode::Pattern);
    let post = h.service.create(ALICE, command("before")).await.unwrap();
    h.service.get_by_id(post.id).await.unwrap();
    h.service.list_all(0, 100).await.unwrap();
    h.service.list_by_author(ALICE).await.unwrap();

    h.service
        .update(post.id, ALICE, PostPatch::default().title("after"))
        .await
        .unwrap();

    assert_eq!(h.service.get_by_id(post.id).await.unwrap().title, "after");
    assert_eq!(titles(h.service.list_all(0, 100).await.unwrap()), ["after"]);
    assert_eq!(
        titles(h.service.list_by_author(ALICE).await.unwrap()),
        ["after"]
    );
}

#[tokio::test]
async fn other_authors_listing_survives_a_mutation() {
    let h = Harness::new(InvalidationMode::Pattern);
    h.service.create(BOB, command("bob's")).await.unwrap();
    h.service.list_by_author(BOB).await.unwrap();
    assert!(h.store.inner().contains_key("user_posts:2"));

    h.service.create(ALICE, command("alice's")).await.unwrap();

    assert!(h.store.inner().contains_key("user_posts:2"));
}

#[tokio::test]
async fn unreachable_cache_degrades_to_storage() {
    let repo = Arc::new(InMemoryPostsRepo::new());
    let observer = Arc::new(RecordingObserver::default());
    let service = service_over(repo.clone(), Arc::new(FailingCacheStore), InvalidationMode::Pattern)
        .with_observer(observer.clone());

    let post = service.create(ALICE, command("resilient")).await.unwrap();
    assert_eq!(observer.failures().len(), 2);

    assert_eq!(service.get_by_id(post.id).await.unwrap(), post);
    assert_eq!(service.list_all(0, 100).await.unwrap().len(), 1);
    assert_eq!(service.list_by_author(ALICE).await.unwrap().len(), 1);

    service
        .update(post.id, ALICE, PostPatch::default().content("still works"))
        .await
        .unwrap();
    assert_eq!(observer.failures().len(), 5);

    service.delete(post.id, ALICE).await.unwrap();
    let failures = observer.failures();
    assert_eq!(failures.len(), 8);
    assert_eq!(
        failures[5..],
        [
            InvalidationTarget::Key(format!("post:{}", post.id)),
            InvalidationTarget::Pattern("all_posts:*".into()),
            InvalidationTarget::Pattern("user_posts:1*".into()),
        ]
    );
    assert!(repo.is_empty());
}

#[tokio::test]
async fn corrupt_entry_is_treated_as_a_miss_and_overwritten() {
    let h = Harness::new(InvalidationMode::Pattern);
    let post = h.service.create(ALICE, command("real")).await.unwrap();
    let key = format!("post:{}", post.id);
    h.store
        .inner()
        .set(&key, "{not json".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(h.service.get_by_id(post.id).await.unwrap(), post);

    let stored = h.store.inner().get(&key).await.unwrap().unwrap();
    assert!(stored.contains("\"title\":\"real\""));
}

#[tokio::test]
async fn populate_failure_still_returns_the_loaded_value() {
    let repo = Arc::new(InMemoryPostsRepo::new());
    let service = service_over(
        repo.clone(),
        Arc::new(WriteFailingCacheStore),
        InvalidationMode::Pattern,
    );

    let post = service.create(ALICE, command("uncached")).await.unwrap();

    assert_eq!(service.get_by_id(post.id).await.unwrap(), post);
    assert_eq!(service.list_all(0, 10).await.unwrap(), vec![post]);
}

#[tokio::test]
async fn process_local_cache_stays_within_its_capacity() {
    let capacity = NonZeroUsize::new(64).unwrap();
    let repo = Arc::new(InMemoryPostsRepo::new());
    let store = Arc::new(InMemoryCacheStore::with_capacity(capacity));
    let service = service_over(repo, store.clone(), InvalidationMode::Exact);
    service.create(ALICE, command("only")).await.unwrap();

    for offset in 0..2_000 {
        service.list_all(offset, 1).await.unwrap();
    }

    assert_eq!(store.len(), capacity.get());
    // The most recent page is still cached.
    assert!(store.contains_key("all_posts:1999:1"));
    assert!(!store.contains_key("all_posts:0:1"));
}
