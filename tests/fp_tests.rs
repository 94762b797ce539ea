use memento::fp;
use memento::{Cache, MemoryCache, Options};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn counting(runs: &Arc<AtomicUsize>) -> impl Fn((u32,)) -> u32 + Send + Sync + 'static {
    let runs = Arc::clone(runs);
    move |(x,)| {
        runs.fetch_add(1, Ordering::SeqCst);
        x * 10
    }
}

#[test]
fn test_each_wrapped_function_gets_its_own_cache() {
    let runs = Arc::new(AtomicUsize::new(0));
    let adapter = fp::memoize(Options::default());

    let first = adapter.wrap(counting(&runs));
    let second = adapter.wrap(counting(&runs));

    assert_eq!(first.call((1,)).ready(), Some(10));
    assert_eq!(second.call((1,)).ready(), Some(10));
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    assert_eq!(first.cache().get("(1)"), Some(10));
    first.clear().unwrap();
    assert_eq!(first.cache().get("(1)"), None);
    assert_eq!(second.cache().get("(1)"), Some(10));
}

#[test]
fn test_shared_cache_factory_shares_entries() {
    let shared = Arc::new(MemoryCache::<u32>::new());
    let handle = Arc::clone(&shared);
    let adapter = fp::memoize(Options::default().with_cache(move || Arc::clone(&handle)));

    let tens = adapter.wrap(|(x,): (u32,)| x * 10);
    let hundreds = adapter.wrap(|(x,): (u32,)| x * 100);

    assert_eq!(tens.call((2,)).ready(), Some(20));
    // Same key in the same cache: the second function sees the first's value.
    assert_eq!(hundreds.call((2,)).ready(), Some(20));
    assert_eq!(shared.len(), 1);
}

#[test]
fn test_memoize_fn_behaves_like_memoize() {
    let runs = Arc::new(AtomicUsize::new(0));
    let curried = fp::memoize_fn(Options::default(), counting(&runs));
    let direct = memento::memoize(counting(&runs), Options::default());

    for _ in 0..3 {
        assert_eq!(curried.call((4,)).ready(), direct.call((4,)).ready());
    }
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(curried.delete(&(4,)));
    assert!(!curried.delete(&(4,)));
}

#[tokio::test(start_paused = true)]
async fn test_options_carry_max_age() {
    let runs = Arc::new(AtomicUsize::new(0));
    let adapter = fp::memoize(Options::default().with_max_age(Duration::from_millis(100)));
    let m = adapter.wrap(counting(&runs));

    m.call((1,)).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    m.call((1,)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    m.call((1,)).await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_wrap_async_with_predicate() {
    let runs = Arc::new(AtomicUsize::new(0));
    let adapter = fp::memoize(
        Options::<(i32,), i32, String>::default()
            .with_value_accept(|result| matches!(result, Ok(v) if *v >= 0)),
    );

    let counter = Arc::clone(&runs);
    let m = adapter.wrap_async(move |(x,): (i32,)| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(x) }
    });

    assert_eq!(m.call((-1,)).await, Ok(-1));
    assert_eq!(m.call((3,)).await, Ok(3));
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    assert_eq!(m.call((-1,)).await, Ok(-1));
    assert_eq!(m.call((3,)).await, Ok(3));
    assert_eq!(runs.load(Ordering::SeqCst), 3);
}

#[cfg(feature = "stats")]
#[test]
fn test_stats_through_facade() {
    let m = fp::memoize_fn(Options::default(), |(x,): (u8,)| x);
    m.call((1,));
    m.call((1,));
    m.call((2,));

    assert_eq!(m.stats().hits(), 1);
    assert_eq!(m.stats().misses(), 2);
    assert_eq!(m.stats().stores(), 2);
}
