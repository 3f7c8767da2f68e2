use crate::TimerRegistry;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{task, time};

/// Lets countdown tasks woken by `time::advance` run to completion on the
/// current-thread test runtime.
async fn settle_tasks() {
    for _ in 0..8 {
        task::yield_now().await;
    }
}

fn counting_callback(counter: &Arc<AtomicUsize>) -> impl FnOnce(String) + Send + 'static {
    let counter = Arc::clone(counter);
    move |_key| {
        counter.fetch_add(1, Ordering::SeqCst);
    }
}

/// WHAT: Re-arming with a shorter duration fires once, at the new deadline
/// WHY: The central invariant: a superseded countdown must never fire
#[tokio::test(start_paused = true)]
async fn given_rearmed_key_when_shorter_deadline_passes_then_fires_exactly_once() {
    // Given: A key armed for 60s, then re-armed for 10s
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    assert!(registry.arm("Alice", Duration::from_secs(60), counting_callback(&fired)));
    assert!(registry.arm("Alice", Duration::from_secs(10), counting_callback(&fired)));
    task::yield_now().await;

    // When: The shorter deadline passes
    time::advance(Duration::from_secs(10)).await;
    settle_tasks().await;

    // Then: Exactly one firing, and none more at the original deadline
    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!registry.is_armed("Alice"));

    time::advance(Duration::from_secs(60)).await;
    settle_tasks().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// WHAT: Cancel before expiry suppresses the callback
/// WHY: Canceled countdowns must never fire, even with near-zero remaining
#[tokio::test(start_paused = true)]
async fn given_armed_key_when_canceled_just_before_expiry_then_never_fires() {
    // Given: A key armed for 10s, with almost all of it elapsed
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    registry.arm("Alice", Duration::from_secs(10), counting_callback(&fired));
    task::yield_now().await;
    time::advance(Duration::from_millis(9_999)).await;

    // When: Canceling with ~1ms remaining, then letting the deadline pass
    registry.cancel("Alice");
    time::advance(Duration::from_secs(1)).await;
    settle_tasks().await;

    // Then: The callback never fires
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(!registry.is_armed("Alice"));
}

/// WHAT: Canceling an absent key is a no-op
/// WHY: Cancel must be idempotent
#[tokio::test(start_paused = true)]
async fn given_empty_registry_when_canceling_unknown_key_then_nothing_happens() {
    let registry = TimerRegistry::new();

    registry.cancel("Nobody");
    registry.cancel("Nobody");

    assert_eq!(registry.armed_count(), 0);
}

/// WHAT: Synthetic keys are rejected at the arm entry point
/// WHY: Bot sessions must never reach the timer registry
#[tokio::test(start_paused = true)]
async fn given_synthetic_key_when_arming_then_no_countdown_is_created() {
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    assert!(!registry.arm("Steve_fake", Duration::from_secs(10), counting_callback(&fired)));
    assert!(!registry.arm("steve_FAKE", Duration::from_secs(10), counting_callback(&fired)));

    assert_eq!(registry.armed_count(), 0);

    time::advance(Duration::from_secs(60)).await;
    settle_tasks().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

/// WHAT: A zero duration is rejected synchronously
/// WHY: Arming with a non-positive duration is a programming error
#[tokio::test(start_paused = true)]
async fn given_zero_duration_when_arming_then_rejected() {
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    assert!(!registry.arm("Alice", Duration::ZERO, counting_callback(&fired)));
    assert!(!registry.is_armed("Alice"));
}

/// WHAT: Expiry removes the entry from the registry
/// WHY: Fired countdowns must not linger as armed state
#[tokio::test(start_paused = true)]
async fn given_armed_key_when_countdown_expires_then_entry_is_removed() {
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    registry.arm("Alice", Duration::from_secs(5), counting_callback(&fired));
    task::yield_now().await;
    assert!(registry.is_armed("Alice"));

    time::advance(Duration::from_secs(5)).await;
    settle_tasks().await;

    assert_eq!(fired.load(Ordering::SeqCst), 1);
    assert!(!registry.is_armed("Alice"));
    assert_eq!(registry.armed_count(), 0);
}

/// WHAT: Independent keys run independent countdowns
/// WHY: There is no ordering coupling across keys
#[tokio::test(start_paused = true)]
async fn given_two_keys_when_one_is_canceled_then_other_still_fires() {
    let registry = TimerRegistry::new();
    let alice_fired = Arc::new(AtomicUsize::new(0));
    let bob_fired = Arc::new(AtomicUsize::new(0));

    registry.arm("Alice", Duration::from_secs(10), counting_callback(&alice_fired));
    registry.arm("Bob", Duration::from_secs(10), counting_callback(&bob_fired));
    task::yield_now().await;

    registry.cancel("Alice");
    time::advance(Duration::from_secs(10)).await;
    settle_tasks().await;

    assert_eq!(alice_fired.load(Ordering::SeqCst), 0);
    assert_eq!(bob_fired.load(Ordering::SeqCst), 1);
}

/// WHAT: Heavy interleaved arm/cancel churn leaves a consistent registry
/// WHY: Join/leave storms must not leak entries or lose cancellations
#[tokio::test(start_paused = true)]
#[allow(clippy::unwrap_used)]
async fn given_concurrent_arm_cancel_churn_when_settled_then_at_most_one_live_entry() {
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..2 {
        let registry = registry.clone();
        let fired = Arc::clone(&fired);
        handles.push(tokio::spawn(async move {
            for i in 0..500 {
                let counter = Arc::clone(&fired);
                registry.arm("Alice", Duration::from_secs(3600), move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                });
                if i % 3 == 0 {
                    registry.cancel("Alice");
                }
                task::yield_now().await;
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // At most one live entry for the key, and aborted timers never fire.
    assert!(registry.armed_count() <= 1);

    registry.cancel("Alice");
    assert_eq!(registry.armed_count(), 0);

    time::advance(Duration::from_secs(7200)).await;
    settle_tasks().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

/// WHAT: cancel_all sweeps every armed countdown
/// WHY: Shutdown performs best-effort cancellation of all entries
#[tokio::test(start_paused = true)]
async fn given_several_armed_keys_when_cancel_all_then_registry_is_empty() {
    let registry = TimerRegistry::new();
    let fired = Arc::new(AtomicUsize::new(0));

    registry.arm("Alice", Duration::from_secs(10), counting_callback(&fired));
    registry.arm("Bob", Duration::from_secs(20), counting_callback(&fired));
    registry.arm("Carol", Duration::from_secs(30), counting_callback(&fired));
    task::yield_now().await;
    assert_eq!(registry.armed_count(), 3);

    registry.cancel_all();

    assert_eq!(registry.armed_count(), 0);
    time::advance(Duration::from_secs(60)).await;
    settle_tasks().await;
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}
