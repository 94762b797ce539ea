// Tests for max age handling, both scheduled by the memoizer and delegated to the cache
mod common;

use common::{settle, RecordingCache};
use memento_core::{memoize, memoize_async, MemoryCache, Options};
use serial_test::serial;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn counted(runs: &Arc<AtomicUsize>) -> impl Fn((u32,)) -> usize + Send + Sync + 'static {
    let runs = Arc::clone(runs);
    move |(_,)| runs.fetch_add(1, Ordering::SeqCst)
}

#[tokio::test(start_paused = true)]
async fn test_value_expires_after_max_age() {
    let runs = Arc::new(AtomicUsize::new(0));
    let m = memoize(counted(&runs), Options::default().with_max_age_millis(100));

    assert_eq!(m.call((1,)).ready(), Some(0));

    sleep(Duration::from_millis(50)).await;
    assert_eq!(m.call((1,)).ready(), Some(0));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(m.call((1,)).ready(), Some(1));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_reads_do_not_extend_lifetime() {
    let runs = Arc::new(AtomicUsize::new(0));
    let m = memoize(counted(&runs), Options::default().with_max_age_millis(100));

    m.call((1,));
    for _ in 0..9 {
        sleep(Duration::from_millis(10)).await;
        m.call((1,));
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(15)).await;
    m.call((1,));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_first_timer_deletes_overwritten_entry() {
    let runs = Arc::new(AtomicUsize::new(0));
    let m = memoize(counted(&runs), Options::default().with_max_age_millis(100));

    // T+0: stored, deletion due at T+100
    m.call((1,));

    // T+60: replaced, a second deletion due at T+160
    sleep(Duration::from_millis(60)).await;
    assert!(m.delete(&(1,)));
    assert_eq!(m.call((1,)).ready(), Some(1));

    // T+110: the first timer already removed the replacement
    sleep(Duration::from_millis(50)).await;
    assert_eq!(m.call((1,)).ready(), Some(2));
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_without_max_age_entries_persist() {
    let runs = Arc::new(AtomicUsize::new(0));
    let m = memoize(counted(&runs), Options::default().with_max_age_millis(0));

    m.call((1,));
    sleep(Duration::from_secs(3600)).await;
    m.call((1,));
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_cache_handles_expiration_receives_max_age() {
    let runs = Arc::new(AtomicUsize::new(0));
    let recording = Arc::new(RecordingCache::default());
    let cache = Arc::clone(&recording);
    let m = memoize(
        counted(&runs),
        Options::default()
            .with_cache(move || Arc::clone(&cache))
            .with_max_age(Duration::from_millis(100))
            .with_cache_handles_expiration(true),
    );

    m.call((1,));
    assert_eq!(
        recording.set_calls.lock().as_slice(),
        &[("(1)".to_string(), Some(Duration::from_millis(100)))]
    );

    // Still cached before the deadline
    sleep(Duration::from_millis(90)).await;
    m.call((1,));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // The memory cache drops the entry on its own
    sleep(Duration::from_millis(20)).await;
    m.call((1,));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_memoizer_managed_expiration_does_not_pass_max_age() {
    let recording = Arc::new(RecordingCache::default());
    let cache = Arc::clone(&recording);
    let m = memoize(
        |(x,): (u32,)| x,
        Options::default()
            .with_cache(move || Arc::clone(&cache))
            .with_max_age(Duration::from_millis(100)),
    );

    m.call((1,));
    assert_eq!(
        recording.set_calls.lock().as_slice(),
        &[("(1)".to_string(), None)]
    );
}

#[tokio::test(start_paused = true)]
async fn test_delegation_without_max_age_stores_forever() {
    let recording = Arc::new(RecordingCache::default());
    let cache = Arc::clone(&recording);
    let m = memoize(
        |(x,): (u32,)| x,
        Options::default()
            .with_cache(move || Arc::clone(&cache))
            .with_cache_handles_expiration(true),
    );

    m.call((1,));
    assert_eq!(
        recording.set_calls.lock().as_slice(),
        &[("(1)".to_string(), None)]
    );
}

#[test]
#[serial]
fn test_expiration_without_runtime() {
    let shared = Arc::new(MemoryCache::new());
    let cache = Arc::clone(&shared);
    let m = memoize(
        |(x,): (u32,)| x,
        Options::default()
            .with_cache(move || Arc::clone(&cache))
            .with_max_age_millis(20),
    );

    m.call((1,));
    assert_eq!(shared.len(), 1);

    std::thread::sleep(Duration::from_millis(500));
    assert!(shared.is_empty());
}

#[test]
#[serial]
fn test_expiration_outlives_the_calling_runtime() {
    let shared = Arc::new(MemoryCache::new());
    let cache = Arc::clone(&shared);
    let m = memoize(
        |(x,): (u32,)| x,
        Options::default()
            .with_cache(move || Arc::clone(&cache))
            .with_max_age_millis(20),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        m.call((1,));
    });
    drop(runtime);
    assert_eq!(shared.len(), 1);

    std::thread::sleep(Duration::from_millis(500));
    assert!(shared.is_empty());
}

#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_pending_expirations_share_one_thread() {
    fn thread_count() -> usize {
        std::fs::read_dir("/proc/self/task").unwrap().count()
    }

    let m = memoize(
        |(x,): (u32,)| x,
        Options::default().with_max_age_millis(60_000),
    );
    // Starts the background scheduler before measuring.
    m.call((0,));

    let before = thread_count();
    for i in 1..2000 {
        m.call((i,));
    }
    let after = thread_count();

    assert!(
        after < before + 64,
        "threads grew from {} to {}",
        before,
        after
    );
}

#[tokio::test(start_paused = true)]
async fn test_resolved_values_expire_after_max_age() {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    let m = memoize_async(
        move |(x,): (u32,)| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, String>(x) }
        },
        Options::default().with_max_age_millis(100),
    );

    assert_eq!(m.call((1,)).await, Ok(1));
    settle().await;

    sleep(Duration::from_millis(50)).await;
    assert_eq!(m.call((1,)).await, Ok(1));
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    sleep(Duration::from_millis(100)).await;
    assert_eq!(m.call((1,)).await, Ok(1));
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}
