use std::sync::Barrier;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::Utc;
use uuid::Uuid;

use super::*;
use crate::content::model::{ContentDocument, Depth, Section};
use crate::content::parse::ParseOutcome;
use crate::foundation::error::{GenerationFailure, SlidecastError};

fn request(topic: &str) -> ContentRequest {
    ContentRequest::new(topic, "en", Depth::Basic).unwrap()
}

fn content(topic: &str) -> GeneratedContent {
    GeneratedContent {
        id: Uuid::new_v4(),
        document: ContentDocument {
            topic: topic.to_string(),
            title: topic.to_string(),
            description: "d".to_string(),
            sections: vec![Section::new("s", "c")],
            key_points: vec![],
            learning_objectives: vec![],
            fun_facts: vec![],
            language: "en".to_string(),
            depth: Depth::Basic,
        },
        outcome: ParseOutcome::Parsed,
        tokens_used: 1,
        created_at: Utc::now(),
    }
}

#[test]
fn fingerprint_normalizes_topic_and_language() {
    let a = Fingerprint::of(&request("Machine   Learning"));
    let b = Fingerprint::of(&ContentRequest::new("machine learning", "EN", Depth::Basic).unwrap());
    assert_eq!(a, b);

    let deeper = Fingerprint::of(&ContentRequest::new("machine learning", "en", Depth::Advanced).unwrap());
    assert_ne!(a, deeper);
    assert_ne!(a, Fingerprint::of(&request("Deep Learning")));
    assert_eq!(a.to_string().len(), 32);
}

#[test]
fn second_lookup_hits() {
    let cache = ContentCache::default();
    let key = Fingerprint::of(&request("Rust"));
    let (first, status) = cache
        .get_or_try_insert_with(key, || Ok(content("Rust")))
        .unwrap();
    assert_eq!(status, CacheStatus::Miss);

    let (second, status) = cache
        .get_or_try_insert_with(key, || panic!("must not regenerate"))
        .unwrap();
    assert_eq!(status, CacheStatus::Hit);
    assert_eq!(first.id, second.id);
    assert_eq!(cache.get(key).unwrap().id, first.id);
    assert_eq!(cache.len(), 1);
}

#[test]
fn failures_are_not_cached() {
    let cache = ContentCache::default();
    let key = Fingerprint::of(&request("Rust"));
    let err = cache
        .get_or_try_insert_with(key, || {
            Err(SlidecastError::generation(GenerationFailure::Transport, "down"))
        })
        .unwrap_err();
    assert!(matches!(err, SlidecastError::Generation { .. }));
    assert!(cache.get(key).is_none());

    let (_, status) = cache
        .get_or_try_insert_with(key, || Ok(content("Rust")))
        .unwrap();
    assert_eq!(status, CacheStatus::Miss);
}

#[test]
fn concurrent_identical_requests_generate_once() {
    let cache = Arc::new(ContentCache::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(8));
    let key = Fingerprint::of(&request("Concurrency"));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                let (value, _) = cache
                    .get_or_try_insert_with(key, || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        std::thread::sleep(Duration::from_millis(50));
                        Ok(content("Concurrency"))
                    })
                    .unwrap();
                value.id
            })
        })
        .collect();

    let ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(ids.iter().all(|id| *id == ids[0]));
}

#[test]
fn expired_entries_regenerate() {
    let cache = ContentCache::new(Some(Duration::ZERO));
    let key = Fingerprint::of(&request("Rust"));
    cache
        .get_or_try_insert_with(key, || Ok(content("Rust")))
        .unwrap();
    assert!(cache.get(key).is_none());
    let (_, status) = cache
        .get_or_try_insert_with(key, || Ok(content("Rust")))
        .unwrap();
    assert_eq!(status, CacheStatus::Miss);
}

#[test]
fn invalidate_and_clear() {
    let cache = ContentCache::default();
    let a = Fingerprint::of(&request("A"));
    let b = Fingerprint::of(&request("B"));
    cache.get_or_try_insert_with(a, || Ok(content("A"))).unwrap();
    cache.get_or_try_insert_with(b, || Ok(content("B"))).unwrap();
    assert_eq!(cache.len(), 2);

    cache.invalidate(a);
    assert!(cache.get(a).is_none());
    assert!(cache.get(b).is_some());

    cache.clear();
    assert!(cache.is_empty());
}

#[test]
fn invalidate_and_clear_release_slots() {
    let cache = ContentCache::default();
    let a = Fingerprint::of(&request("A"));
    let b = Fingerprint::of(&request("B"));
    cache.get_or_try_insert_with(a, || Ok(content("A"))).unwrap();
    cache.get_or_try_insert_with(b, || Ok(content("B"))).unwrap();
    assert_eq!(cache.slots.lock().len(), 2);

    cache.invalidate(a);
    assert_eq!(cache.slots.lock().len(), 1);

    cache.clear();
    assert!(cache.slots.lock().is_empty());
}

#[test]
fn expired_and_failed_slots_are_swept() {
    let cache = ContentCache::new(Some(Duration::from_millis(1)));
    for i in 0..100 {
        let topic = format!("topic {i}");
        let key = Fingerprint::of(&request(&topic));
        cache
            .get_or_try_insert_with(key, || Ok(content(&topic)))
            .unwrap();
    }
    let failed = Fingerprint::of(&request("unlucky"));
    let _ = cache.get_or_try_insert_with(failed, || {
        Err(SlidecastError::generation(GenerationFailure::Transport, "offline"))
    });
    std::thread::sleep(Duration::from_millis(20));

    let key = Fingerprint::of(&request("fresh"));
    cache
        .get_or_try_insert_with(key, || Ok(content("fresh")))
        .unwrap();
    assert_eq!(cache.slots.lock().len(), 1);
}
