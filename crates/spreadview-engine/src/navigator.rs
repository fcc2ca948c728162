//! The transition controller.
//!
//! A [`Navigator`] is idle or busy. A navigation request moves it from idle
//! to busy, resolves the target slot, waits for the target image if needed,
//! plays the two animation phases and finally commits the new position and
//! goes idle again. Requests that arrive while busy are dropped.
//!
//! The busy flag lives under a mutex together with the current position, and
//! a guard returns the navigator to idle on every exit path, including the
//! request future being dropped mid-transition.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum::Display;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use spreadview_core::{
    Direction, ImageHandle, IndexMapper, LoadError, NavigationIntent, NavigatorConfig,
    NavigatorError, NavigatorEvent, TransitionPhase,
};
use spreadview_input::WheelInput;

use crate::EVENT_CHANNEL_SIZE;
use crate::animator::{Animator, ImageStyle, TransitionStyle};
use crate::cache::ImageCache;
use crate::loader::ResourceLoader;
use crate::prefetch::PrefetchScheduler;
use crate::zoom::{Viewport, ZoomLevels};

/// Why a navigation request had no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DropReason {
    /// The sequence has no pages.
    #[strum(to_string = "empty sequence")]
    Empty,
    /// Another transition is in flight.
    #[strum(to_string = "transition in progress")]
    Busy,
    /// The request resolved to the spread already shown.
    #[strum(to_string = "already current")]
    AlreadyCurrent,
}

/// A committed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Relative slot shown before the transition.
    pub from: usize,
    /// Relative slot shown after the transition.
    pub to: usize,
    pub direction: Direction,
    /// Absolute page number of `to`.
    pub absolute: i64,
}

/// Result of a navigation request.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationOutcome {
    /// The transition ran and the position changed.
    Committed(Transition),
    /// The request was ignored; nothing changed.
    Dropped(DropReason),
    /// The target image could not be loaded; the position did not change.
    LoadFailed(LoadError),
}

impl NavigationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    /// The committed transition, if any.
    pub fn transition(&self) -> Option<Transition> {
        match self {
            Self::Committed(transition) => Some(*transition),
            _ => None,
        }
    }
}

/// Everything derived from one configuration.
#[derive(Clone)]
struct Session {
    config: Arc<NavigatorConfig>,
    mapper: IndexMapper,
    cache: ImageCache,
    prefetch: PrefetchScheduler,
    style: TransitionStyle,
}

impl Session {
    fn new(config: NavigatorConfig, loader: Arc<dyn ResourceLoader>) -> Self {
        let cache = ImageCache::new(&config, loader);
        Self {
            mapper: config.mapper(),
            prefetch: PrefetchScheduler::new(cache.clone(), config.prefetch_radius),
            style: TransitionStyle::from_config(&config),
            cache,
            config: Arc::new(config),
        }
    }
}

struct State {
    current: usize,
    phase: TransitionPhase,
    session: Session,
    zoom: ZoomLevels,
}

impl State {
    fn new(session: Session) -> Self {
        Self {
            current: session.config.initial_relative(),
            phase: TransitionPhase::Idle,
            zoom: ZoomLevels::new(session.config.zoom_step, session.config.min_max_zoom),
            session,
        }
    }
}

struct Shared {
    state: Mutex<State>,
    loader: Arc<dyn ResourceLoader>,
    animator: Arc<dyn Animator>,
    events: broadcast::Sender<NavigatorEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: NavigatorEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}

/// Holds the navigator busy; returns it to idle when dropped.
struct BusyGuard {
    shared: Arc<Shared>,
    armed: bool,
}

impl BusyGuard {
    fn new(shared: Arc<Shared>) -> Self {
        Self { shared, armed: true }
    }

    fn set_phase(&self, phase: TransitionPhase) {
        self.shared.lock().phase = phase;
    }

    /// Commit the new position and go idle in one step.
    fn commit(mut self, target: usize) {
        let mut state = self.shared.lock();
        state.current = target;
        state.phase = TransitionPhase::Idle;
        drop(state);
        self.armed = false;
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        if self.armed {
            self.shared.lock().phase = TransitionPhase::Idle;
        }
    }
}

struct Plan {
    from: usize,
    target: usize,
    direction: Direction,
    session: Session,
}

/// Shows one spread at a time and animates between them.
///
/// Cloning is cheap; clones drive the same navigator.
#[derive(Clone)]
pub struct Navigator {
    shared: Arc<Shared>,
}

impl Navigator {
    /// Create a navigator positioned on the configured initial page.
    ///
    /// Nothing is loaded until [`Navigator::mount`] or the first navigation.
    pub fn new(
        config: NavigatorConfig,
        loader: Arc<dyn ResourceLoader>,
        animator: Arc<dyn Animator>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let session = Session::new(config, Arc::clone(&loader));
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State::new(session)),
                loader,
                animator,
                events,
            }),
        }
    }

    /// Subscribe to navigator events.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigatorEvent> {
        self.shared.events.subscribe()
    }

    /// The active configuration.
    pub fn config(&self) -> Arc<NavigatorConfig> {
        Arc::clone(&self.shared.lock().session.config)
    }

    /// The image cache of the active configuration.
    pub fn cache(&self) -> ImageCache {
        self.shared.lock().session.cache.clone()
    }

    pub fn total(&self) -> usize {
        self.shared.lock().session.mapper.total()
    }

    /// Relative slot of the spread on screen.
    ///
    /// During a transition this is still the outgoing spread.
    pub fn current_relative(&self) -> usize {
        self.shared.lock().current
    }

    /// Absolute page number of the spread on screen.
    pub fn current_absolute(&self) -> i64 {
        let state = self.shared.lock();
        state.session.mapper.to_absolute(state.current)
    }

    pub fn phase(&self) -> TransitionPhase {
        self.shared.lock().phase
    }

    pub fn is_busy(&self) -> bool {
        !self.phase().is_idle()
    }

    /// Zoom level of a slot.
    pub fn zoom_level(&self, relative: usize) -> f32 {
        self.shared.lock().zoom.level(relative)
    }

    /// Step to the next spread, wrapping after the last.
    pub async fn next(&self) -> NavigationOutcome {
        self.request(NavigationIntent::next()).await
    }

    /// Step to the previous spread, wrapping before the first.
    pub async fn previous(&self) -> NavigationOutcome {
        self.request(NavigationIntent::previous()).await
    }

    /// Jump to an absolute page number, wrapped into range.
    pub async fn goto(&self, absolute: i64) -> NavigationOutcome {
        self.request(NavigationIntent::Goto(absolute)).await
    }

    /// Run one navigation request to completion.
    pub async fn request(&self, intent: NavigationIntent) -> NavigationOutcome {
        match self.begin(intent) {
            Ok((guard, plan)) => self.run(guard, plan).await,
            Err(reason) => {
                debug!(?intent, %reason, "navigation dropped");
                NavigationOutcome::Dropped(reason)
            }
        }
    }

    /// Replace the configuration, resetting position, cache and zoom.
    ///
    /// Fails while a transition is in flight. Call [`Navigator::mount`]
    /// afterwards to show the new initial page.
    pub fn configure(&self, config: NavigatorConfig) -> Result<(), NavigatorError> {
        config.check()?;

        let mut state = self.shared.lock();
        if !state.phase.is_idle() {
            return Err(NavigatorError::Busy);
        }
        info!(base_path = %config.base_path, total = config.total_count, "navigator reconfigured");
        *state = State::new(Session::new(config, Arc::clone(&self.shared.loader)));
        Ok(())
    }

    /// Load and show the current spread, then warm the pages after it.
    ///
    /// The loading indicator is shown while the image loads. On failure the
    /// navigator stays idle on the same position and the error is returned.
    pub async fn mount(&self) -> Result<ImageHandle, NavigatorError> {
        let (guard, current, session) = {
            let mut state = self.shared.lock();
            if state.session.mapper.is_empty() {
                return Err(NavigatorError::Empty);
            }
            if !state.phase.is_idle() {
                return Err(NavigatorError::Busy);
            }
            let current = state.current;
            state.phase = TransitionPhase::Loading {
                target: current,
                direction: Direction::Forward,
            };
            let guard = BusyGuard::new(Arc::clone(&self.shared));
            (guard, current, state.session.clone())
        };

        self.shared.emit(NavigatorEvent::LoadingIndicator { visible: true });
        let loaded = session.cache.ensure_loaded(current).await;
        self.shared.emit(NavigatorEvent::LoadingIndicator { visible: false });

        let absolute = session.mapper.to_absolute(current);
        let result = match loaded {
            Ok(handle) => {
                self.shared.animator.set(current, ImageStyle::active());
                self.shared.emit(NavigatorEvent::PositionChanged {
                    relative: current,
                    absolute,
                });
                session.prefetch.warm_neighbors(current, Direction::Forward);
                Ok(handle)
            }
            Err(err) => {
                warn!(relative = current, absolute, error = %err, "initial image failed to load");
                self.shared.emit(NavigatorEvent::LoadFailed {
                    relative: current,
                    absolute,
                    message: err.to_string(),
                });
                Err(err.into())
            }
        };
        drop(guard);
        result
    }

    /// Apply a wheel event to the spread on screen.
    ///
    /// Ignored unless zoom is enabled, the navigator is idle and the current
    /// image is loaded. Returns the new level when it changed.
    pub fn zoom(&self, wheel: WheelInput, viewport: Viewport) -> Option<f32> {
        let (relative, level) = {
            let mut state = self.shared.lock();
            if !state.session.config.zoom_enabled || !state.phase.is_idle() {
                return None;
            }
            let relative = state.current;
            let handle = state.session.cache.handle(relative)?;
            let level = state.zoom.apply(relative, wheel, &handle, viewport)?;
            (relative, level)
        };
        self.shared.emit(NavigatorEvent::ZoomChanged { relative, level });
        Some(level)
    }

    /// Check and enter the busy state.
    fn begin(&self, intent: NavigationIntent) -> Result<(BusyGuard, Plan), DropReason> {
        let mut state = self.shared.lock();
        if state.session.mapper.is_empty() {
            return Err(DropReason::Empty);
        }
        if !state.phase.is_idle() {
            return Err(DropReason::Busy);
        }
        let from = state.current;
        let (target, direction) = state
            .session
            .mapper
            .resolve(intent, from)
            .ok_or(DropReason::Empty)?;
        if target == from {
            return Err(DropReason::AlreadyCurrent);
        }

        state.phase = TransitionPhase::Loading { target, direction };
        let zoomed: Vec<usize> = [from, target]
            .into_iter()
            .filter(|&slot| state.zoom.level(slot) != 1.0)
            .collect();
        for &slot in &zoomed {
            state.zoom.reset(slot);
        }
        let plan = Plan {
            from,
            target,
            direction,
            session: state.session.clone(),
        };
        drop(state);

        for relative in zoomed {
            self.shared.emit(NavigatorEvent::ZoomChanged { relative, level: 1.0 });
        }
        Ok((BusyGuard::new(Arc::clone(&self.shared)), plan))
    }

    async fn run(&self, guard: BusyGuard, plan: Plan) -> NavigationOutcome {
        let Plan {
            from,
            target,
            direction,
            session,
        } = plan;
        let animator = &self.shared.animator;
        let absolute = session.mapper.to_absolute(target);

        if !session.cache.is_loaded(target) {
            self.shared.emit(NavigatorEvent::LoadingIndicator { visible: true });
            let loaded = session.cache.ensure_loaded(target).await;
            self.shared.emit(NavigatorEvent::LoadingIndicator { visible: false });

            if let Err(err) = loaded {
                warn!(relative = target, absolute, error = %err, "navigation target failed to load");
                self.shared.emit(NavigatorEvent::LoadFailed {
                    relative: target,
                    absolute,
                    message: err.to_string(),
                });
                drop(guard);
                return NavigationOutcome::LoadFailed(err);
            }
        }

        let fade = session.style.fade_in_tween();
        guard.set_phase(TransitionPhase::FadingIn { target, direction });
        animator.set(target, fade.from);
        animator.animate(target, fade).await;

        let slide = session.style.slide_out_tween(direction);
        guard.set_phase(TransitionPhase::SlidingOut { target, direction });
        animator.set(from, slide.from);
        animator.animate(from, slide).await;

        animator.set(from, ImageStyle::hidden());
        animator.set(target, ImageStyle::active());
        guard.commit(target);

        debug!(from, to = target, absolute, %direction, "transition committed");
        self.shared.emit(NavigatorEvent::PositionChanged {
            relative: target,
            absolute,
        });
        session.prefetch.warm_neighbors(target, direction);

        NavigationOutcome::Committed(Transition {
            from,
            to: target,
            direction,
            absolute,
        })
    }
}

impl std::fmt::Debug for Navigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("Navigator")
            .field("current", &state.current)
            .field("phase", &state.phase)
            .field("cache", &state.session.cache)
            .finish()
    }
}
