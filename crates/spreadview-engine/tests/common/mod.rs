#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::{Semaphore, broadcast};

use spreadview_engine::{
    Animator, BoxFuture, ImageHandle, ImageStyle, LoadError, NavigatorEvent, ResourceLoader, Tween,
};

/// Loader that records every fetch and can hold or fail them.
pub struct MockLoader {
    calls: Mutex<Vec<String>>,
    failing: Mutex<HashSet<String>>,
    gate: Option<Arc<Semaphore>>,
    width: u32,
    height: u32,
}

impl MockLoader {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            gate: None,
            width: 1600,
            height: 1131,
        }
    }

    /// Fetches wait for a permit on the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let loader = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new()
        };
        (loader, gate)
    }

    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn heal(&self, url: &str) {
        self.failing.lock().unwrap().remove(url);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == url).count()
    }
}

impl ResourceLoader for MockLoader {
    fn load<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ImageHandle, LoadError>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(url.to_string());
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            if self.failing.lock().unwrap().contains(url) {
                return Err(LoadError::NotFound {
                    url: url.to_string(),
                });
            }
            Ok(ImageHandle::new(url, self.width, self.height))
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnimatorCall {
    Animate(usize, Tween),
    Set(usize, ImageStyle),
}

/// Animator that records calls and can hold each tween until released.
#[derive(Default)]
pub struct RecordingAnimator {
    calls: Mutex<Vec<AnimatorCall>>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each tween waits for a permit on the returned semaphore.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let animator = Self {
            calls: Mutex::new(Vec::new()),
            gate: Some(Arc::clone(&gate)),
        };
        (animator, gate)
    }

    pub fn calls(&self) -> Vec<AnimatorCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn animations(&self) -> Vec<(usize, Tween)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                AnimatorCall::Animate(target, tween) => Some((target, tween)),
                AnimatorCall::Set(..) => None,
            })
            .collect()
    }
}

impl Animator for RecordingAnimator {
    fn animate(&self, target: usize, tween: Tween) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            self.calls
                .lock()
                .unwrap()
                .push(AnimatorCall::Animate(target, tween));
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
        })
    }

    fn set(&self, target: usize, style: ImageStyle) {
        self.calls.lock().unwrap().push(AnimatorCall::Set(target, style));
    }
}

/// Drain every event currently buffered.
pub fn drain(rx: &mut broadcast::Receiver<NavigatorEvent>) -> Vec<NavigatorEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Yield to the scheduler until `condition` holds.
pub async fn settle(mut condition: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}
