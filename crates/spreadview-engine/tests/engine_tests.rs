mod common;

use std::sync::Arc;

use common::{AnimatorCall, MockLoader, RecordingAnimator, drain, settle};
use spreadview_engine::{
    Direction, DropReason, ImageCache, ImageStyle, InstantAnimator, Layer, NavigationOutcome, Navigator,
    NavigatorConfig, NavigatorError, NavigatorEvent, PrefetchScheduler, Scrubber, SlotState,
    TransformOrigin, TransitionPhase, TransitionStyle, Viewport, WheelInput,
};

fn config(total: usize) -> NavigatorConfig {
    NavigatorConfig::new("pages/K3519", total)
}

fn positions(events: &[NavigatorEvent]) -> Vec<(usize, i64)> {
    events
        .iter()
        .filter_map(|event| match event {
            NavigatorEvent::PositionChanged { relative, absolute } => Some((*relative, *absolute)),
            _ => None,
        })
        .collect()
}

fn instant_navigator(config: NavigatorConfig) -> (Navigator, Arc<MockLoader>) {
    let loader = Arc::new(MockLoader::new());
    let navigator = Navigator::new(config, loader.clone(), Arc::new(InstantAnimator));
    (navigator, loader)
}

#[tokio::test]
async fn test_concurrent_loads_share_one_fetch() {
    let (loader, gate) = MockLoader::gated();
    let loader = Arc::new(loader);
    let cache = ImageCache::new(&config(5), loader.clone());

    let first = tokio::spawn({
        let cache = cache.clone();
        async move { cache.ensure_loaded(2).await }
    });
    let second = tokio::spawn({
        let cache = cache.clone();
        async move { cache.ensure_loaded(2).await }
    });

    settle(|| loader.calls().len() == 1).await;
    assert!(cache.is_pending(2));
    assert_eq!(cache.get(2).state, SlotState::Loading);

    gate.add_permits(1);
    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();

    assert_eq!(first.url(), "pages/K3519_0003.webp");
    assert_eq!(first.url(), second.url());
    assert_eq!(loader.calls_for("pages/K3519_0003.webp"), 1);
    assert!(cache.is_loaded(2));

    // A loaded slot is served without another fetch.
    cache.ensure_loaded(2).await.unwrap();
    assert_eq!(loader.calls().len(), 1);
}

#[tokio::test]
async fn test_out_of_range_load_is_rejected() {
    let loader = Arc::new(MockLoader::new());
    let cache = ImageCache::new(&config(3), loader.clone());

    assert!(cache.ensure_loaded(3).await.is_err());
    assert!(loader.calls().is_empty());
}

#[tokio::test]
async fn test_requests_while_busy_are_dropped() {
    let (animator, gate) = RecordingAnimator::gated();
    let animator = Arc::new(animator);
    let navigator = Navigator::new(config(5), Arc::new(MockLoader::new()), animator.clone());
    let mut events = navigator.subscribe();

    let running = tokio::spawn({
        let navigator = navigator.clone();
        async move { navigator.next().await }
    });
    settle(|| matches!(navigator.phase(), TransitionPhase::FadingIn { target: 1, .. })).await;

    assert_eq!(
        navigator.next().await,
        NavigationOutcome::Dropped(DropReason::Busy)
    );
    assert_eq!(
        navigator.goto(4).await,
        NavigationOutcome::Dropped(DropReason::Busy)
    );
    assert_eq!(navigator.current_relative(), 0);

    gate.add_permits(2);
    let outcome = running.await.unwrap();
    let transition = outcome.transition().unwrap();
    assert_eq!((transition.from, transition.to), (0, 1));
    assert_eq!(navigator.current_relative(), 1);
    assert!(!navigator.is_busy());

    // Only the first request animated and committed.
    let animated: Vec<usize> = animator.animations().iter().map(|(slot, _)| *slot).collect();
    assert_eq!(animated, vec![1, 0]);
    assert_eq!(positions(&drain(&mut events)), vec![(1, 2)]);
}

#[tokio::test]
async fn test_zoom_ignored_while_busy() {
    let config = NavigatorConfig::builder()
        .base_path("pages/K3519")
        .total_count(5usize)
        .zoom_enabled(true)
        .build()
        .unwrap();
    let (animator, gate) = RecordingAnimator::gated();
    let navigator = Navigator::new(config, Arc::new(MockLoader::new()), Arc::new(animator));
    let viewport = Viewport::new(800.0, 600.0);
    navigator.mount().await.unwrap();
    let mut events = navigator.subscribe();

    let running = tokio::spawn({
        let navigator = navigator.clone();
        async move { navigator.next().await }
    });
    settle(|| matches!(navigator.phase(), TransitionPhase::FadingIn { .. })).await;

    assert_eq!(navigator.zoom(WheelInput::ZoomIn, viewport), None);
    assert_eq!(navigator.zoom_level(0), 1.0);

    gate.add_permits(2);
    assert!(running.await.unwrap().is_committed());
    assert!(
        !drain(&mut events)
            .iter()
            .any(|event| matches!(event, NavigatorEvent::ZoomChanged { .. }))
    );

    // Idle again, the wheel works on the new spread.
    assert!(navigator.zoom(WheelInput::ZoomIn, viewport).is_some());
}

#[tokio::test]
async fn test_goto_accepts_extreme_page_numbers() {
    let (navigator, _loader) = instant_navigator(config(5));

    let outcome = navigator.goto(i64::MIN).await;
    let transition = outcome.transition().unwrap();
    assert_eq!((transition.to, transition.absolute), (1, 2));

    assert_eq!(
        navigator.goto(i64::MAX).await,
        NavigationOutcome::Dropped(DropReason::AlreadyCurrent)
    );
    assert_eq!(navigator.current_absolute(), 2);
}

#[tokio::test]
async fn test_position_changed_emitted_once_per_commit() {
    let (navigator, _loader) = instant_navigator(config(5));
    let mut events = navigator.subscribe();

    navigator.next().await;
    let emitted = drain(&mut events);

    assert_eq!(positions(&emitted), vec![(1, 2)]);
    assert_eq!(
        emitted.first(),
        Some(&NavigatorEvent::LoadingIndicator { visible: true })
    );
}

#[tokio::test]
async fn test_next_wraps_after_last_spread() {
    let (navigator, _loader) = instant_navigator(config(5));
    navigator.mount().await.unwrap();

    for _ in 0..3 {
        assert!(navigator.next().await.is_committed());
    }
    assert_eq!(navigator.current_relative(), 3);
    assert_eq!(navigator.current_absolute(), 4);

    navigator.next().await;
    navigator.next().await;
    assert_eq!(navigator.current_relative(), 0);
    assert_eq!(navigator.current_absolute(), 1);

    let outcome = navigator.previous().await;
    assert_eq!(outcome.transition().map(|t| t.direction), Some(Direction::Backward));
    assert_eq!(navigator.current_absolute(), 5);
}

#[tokio::test]
async fn test_goto_wraps_absolute_numbers() {
    let (navigator, _loader) = instant_navigator(config(5));

    let outcome = navigator.goto(0).await;
    let transition = outcome.transition().unwrap();
    assert_eq!(transition.to, 4);
    assert_eq!(transition.absolute, 5);
    assert_eq!(transition.direction, Direction::Backward);

    assert_eq!(
        navigator.goto(10).await,
        NavigationOutcome::Dropped(DropReason::AlreadyCurrent)
    );
    assert_eq!(navigator.goto(12).await.transition().map(|t| t.to), Some(1));
}

#[tokio::test]
async fn test_initial_index_selects_start_position() {
    let config = NavigatorConfig::builder()
        .base_path("pages/K3519")
        .total_count(8usize)
        .initial_index(Some(6i64))
        .build()
        .unwrap();
    let (navigator, loader) = instant_navigator(config);
    assert_eq!(navigator.current_relative(), 5);

    let handle = navigator.mount().await.unwrap();
    assert_eq!(handle.url(), "pages/K3519_0006.webp");
    assert_eq!(loader.calls()[0], "pages/K3519_0006.webp");
}

#[tokio::test]
async fn test_transition_plays_fade_then_slide() {
    let config = config(5);
    let style = TransitionStyle::from_config(&config);
    let animator = Arc::new(RecordingAnimator::new());
    let navigator = Navigator::new(config, Arc::new(MockLoader::new()), animator.clone());

    navigator.previous().await;

    let animations = animator.animations();
    assert_eq!(animations.len(), 2);

    let (faded, fade) = animations[0];
    assert_eq!(faded, 4);
    assert_eq!(fade, style.fade_in_tween());
    assert_eq!(fade.to.layer, Layer::Incoming);

    let (slid, slide) = animations[1];
    assert_eq!(slid, 0);
    assert_eq!(slide, style.slide_out_tween(Direction::Backward));
    assert_eq!(slide.to.origin, TransformOrigin::LeftTop);
    assert!(slide.to.translate_x < 0.0);

    // Commit resets the outgoing image and shows the new one.
    let calls = animator.calls();
    assert_eq!(
        calls[calls.len() - 2..],
        [
            AnimatorCall::Set(0, ImageStyle::hidden()),
            AnimatorCall::Set(4, ImageStyle::active()),
        ]
    );
    assert!(ImageStyle::hidden().is_identity());
}

#[tokio::test]
async fn test_zoom_resets_on_commit() {
    let config = NavigatorConfig::builder()
        .base_path("pages/K3519")
        .total_count(5usize)
        .zoom_enabled(true)
        .build()
        .unwrap();
    let (navigator, _loader) = instant_navigator(config);
    let viewport = Viewport::new(800.0, 600.0);

    // Zoom needs a loaded image.
    assert_eq!(navigator.zoom(WheelInput::ZoomIn, viewport), None);
    navigator.mount().await.unwrap();

    let level = navigator.zoom(WheelInput::ZoomIn, viewport).unwrap();
    assert!(level > 1.0);
    assert_eq!(navigator.zoom_level(0), level);

    let mut events = navigator.subscribe();
    navigator.next().await;

    assert_eq!(navigator.zoom_level(0), 1.0);
    assert_eq!(navigator.zoom_level(1), 1.0);
    assert_eq!(
        drain(&mut events).first(),
        Some(&NavigatorEvent::ZoomChanged {
            relative: 0,
            level: 1.0
        })
    );
}

#[tokio::test]
async fn test_zoom_disabled_by_default() {
    let (navigator, _loader) = instant_navigator(config(5));
    navigator.mount().await.unwrap();

    assert_eq!(
        navigator.zoom(WheelInput::ZoomIn, Viewport::new(800.0, 600.0)),
        None
    );
    assert_eq!(navigator.zoom_level(0), 1.0);
}

#[tokio::test]
async fn test_load_failure_keeps_position() {
    let (navigator, loader) = instant_navigator(config(5));
    let url = "pages/K3519_0002.webp";
    loader.fail(url);
    let mut events = navigator.subscribe();

    let outcome = navigator.next().await;
    assert!(matches!(outcome, NavigationOutcome::LoadFailed(_)));
    assert_eq!(navigator.current_relative(), 0);
    assert!(!navigator.is_busy());

    let emitted = drain(&mut events);
    assert!(positions(&emitted).is_empty());
    assert_eq!(
        emitted,
        vec![
            NavigatorEvent::LoadingIndicator { visible: true },
            NavigatorEvent::LoadingIndicator { visible: false },
            NavigatorEvent::LoadFailed {
                relative: 1,
                absolute: 2,
                message: format!("Image not found: {url}"),
            },
        ]
    );

    // A failed slot is retried on the next request.
    loader.heal(url);
    assert!(navigator.next().await.is_committed());
    assert_eq!(navigator.current_relative(), 1);
    assert!(loader.calls_for(url) >= 2);
}

#[tokio::test]
async fn test_mount_failure_reports_error() {
    let (navigator, loader) = instant_navigator(config(3));
    loader.fail("pages/K3519_0001.webp");

    let result = navigator.mount().await;
    assert!(matches!(result, Err(NavigatorError::Load(_))));
    assert!(!navigator.is_busy());
}

#[tokio::test]
async fn test_aborted_request_returns_to_idle() {
    let (loader, gate) = MockLoader::gated();
    let navigator = Navigator::new(config(5), Arc::new(loader), Arc::new(InstantAnimator));

    let running = tokio::spawn({
        let navigator = navigator.clone();
        async move { navigator.next().await }
    });
    settle(|| matches!(navigator.phase(), TransitionPhase::Loading { target: 1, .. })).await;

    running.abort();
    assert!(running.await.unwrap_err().is_cancelled());
    assert_eq!(navigator.phase(), TransitionPhase::Idle);
    assert_eq!(navigator.current_relative(), 0);

    // The fetch kept running on its own task; the retry joins it.
    gate.add_permits(16);
    assert!(navigator.next().await.is_committed());
}

#[tokio::test]
async fn test_configure_rejected_while_busy() {
    let (animator, gate) = RecordingAnimator::gated();
    let navigator = Navigator::new(config(5), Arc::new(MockLoader::new()), Arc::new(animator));

    let running = tokio::spawn({
        let navigator = navigator.clone();
        async move { navigator.next().await }
    });
    settle(|| navigator.is_busy()).await;

    assert!(matches!(
        navigator.configure(NavigatorConfig::new("pages/other", 3)),
        Err(NavigatorError::Busy)
    ));

    gate.add_permits(2);
    running.await.unwrap();

    navigator
        .configure(NavigatorConfig::new("pages/other", 3))
        .unwrap();
    assert_eq!(navigator.total(), 3);
    assert_eq!(navigator.current_relative(), 0);
    assert_eq!(navigator.cache().url_for(0), "pages/other_0001.webp");
}

#[tokio::test]
async fn test_configure_rejects_invalid_config() {
    let (navigator, _loader) = instant_navigator(config(5));
    let result = navigator.configure(NavigatorConfig::new("", 3));
    assert!(matches!(result, Err(NavigatorError::Config(_))));
    assert_eq!(navigator.total(), 5);
}

#[tokio::test]
async fn test_empty_sequence_drops_everything() {
    let (navigator, loader) = instant_navigator(config(0));

    assert_eq!(navigator.next().await, NavigationOutcome::Dropped(DropReason::Empty));
    assert_eq!(navigator.goto(3).await, NavigationOutcome::Dropped(DropReason::Empty));
    assert!(matches!(navigator.mount().await, Err(NavigatorError::Empty)));
    assert!(loader.calls().is_empty());
}

#[tokio::test]
async fn test_single_spread_never_transitions() {
    let (navigator, _loader) = instant_navigator(config(1));
    assert_eq!(
        navigator.next().await,
        NavigationOutcome::Dropped(DropReason::AlreadyCurrent)
    );
}

#[tokio::test]
async fn test_prefetch_skips_loaded_slots() {
    let loader = Arc::new(MockLoader::new());
    let cache = ImageCache::new(&config(5), loader.clone());
    let prefetch = PrefetchScheduler::new(cache.clone(), 3);

    cache.ensure_loaded(4).await.unwrap();
    let scheduled = prefetch.warm_neighbors(3, Direction::Forward);
    assert_eq!(scheduled, vec![0, 1]);

    settle(|| cache.is_loaded(0) && cache.is_loaded(1)).await;
    assert_eq!(loader.calls_for("pages/K3519_0005.webp"), 1);

    // Nothing left to warm.
    assert!(prefetch.warm_neighbors(3, Direction::Forward).is_empty());
    assert_eq!(prefetch.warm(0, Direction::Backward, 1), vec![]);
}

#[tokio::test]
async fn test_commit_warms_in_direction_of_travel() {
    let (navigator, _loader) = instant_navigator(config(10));
    navigator.previous().await;

    let cache = navigator.cache();
    settle(|| (6..=8).all(|slot| cache.is_loaded(slot))).await;
    assert!(!cache.is_loaded(0));
    assert!(!cache.is_loaded(5));
}

#[tokio::test]
async fn test_scrubber_inert_until_strip_loads() {
    let loader = Arc::new(MockLoader::new());
    loader.fail("strips/K3519.webp");
    let scrubber = Scrubber::new(10, 1, loader.clone());

    assert_eq!(scrubber.hover(50.0, 1000.0), None);
    assert!(scrubber.load_strip("strips/K3519.webp").await.is_err());
    assert!(!scrubber.is_ready());
    assert_eq!(scrubber.click(50.0, 1000.0), None);

    loader.heal("strips/K3519.webp");
    scrubber.load_strip("strips/K3519.webp").await.unwrap();
    assert!(scrubber.is_ready());
    assert_eq!(scrubber.click(50.0, 1000.0), Some(1));
}

#[tokio::test]
async fn test_scrubber_hover_and_click() {
    let scrubber = Scrubber::new(10, 1, Arc::new(MockLoader::new()));
    scrubber.load_strip("strips/K3519.webp").await.unwrap();
    let mut events = scrubber.subscribe();

    assert_eq!(scrubber.hover(0.0, 1000.0), Some(1));
    assert_eq!(scrubber.hover(99.0, 1000.0), Some(1));
    assert_eq!(scrubber.hover(999.0, 1000.0), Some(10));
    assert_eq!(scrubber.hover(2000.0, 1000.0), Some(10));
    assert_eq!(scrubber.hovered(), Some(10));

    assert_eq!(scrubber.click(150.0, 1000.0), Some(2));

    let emitted = drain(&mut events);
    assert_eq!(positions(&emitted), vec![(0, 1), (9, 10)]);
    assert_eq!(
        emitted.last(),
        Some(&NavigatorEvent::PageActivated { absolute: 2 })
    );

    scrubber.set_total(5);
    assert_eq!(scrubber.hovered(), None);
    assert_eq!(scrubber.click(999.0, 1000.0), Some(5));
}
