use std::cell::{Cell, OnceCell, RefCell};
use std::fmt::{Debug, Formatter};
use std::rc::{Rc, Weak};

use crate::{
    Notification, NotificationCallback, TrackerConfig, ViewportWatcher, WatcherError,
    WatcherFactory,
};

/// Where a [`VisibilityTracker`] is in its subscription lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// No element is bound, or the tracker has been released.
    Idle,

    /// A watcher is observing the element and every notification updates the signal.
    Watching,

    /// The element was seen with `trigger_once` set. It is no longer observed and the signal is
    /// pinned to `true` until the tracker is rebound.
    Triggered,
}

/// Tracks whether one element is visible in the viewport.
///
/// The tracker owns at most one watcher at a time. Every change of element or config goes through
/// [`VisibilityTracker::update`], which releases the previous watcher before creating the next
/// one, so each activation is disconnected exactly once.
///
/// ```rust
/// use dioxus_visibility::testing::{FakeElement, FakeViewport};
/// use dioxus_visibility::{TrackerConfig, TrackerState, VisibilityTracker};
///
/// let viewport = FakeViewport::default();
/// let mut tracker = VisibilityTracker::new(viewport.clone(), TrackerConfig::default());
///
/// tracker.bind(Some(FakeElement(1))).unwrap();
/// assert!(!tracker.is_intersecting());
///
/// viewport.emit(true);
/// assert!(tracker.is_intersecting());
/// assert_eq!(tracker.state(), TrackerState::Triggered);
/// ```
pub struct VisibilityTracker<F: WatcherFactory> {
    factory: F,
    config: TrackerConfig,
    target: Option<F::Target>,
    signal: Rc<IntersectionSignal>,
    subscription: Option<Subscription<F::Watcher>>,
    torn_down: bool,
}

impl<F: WatcherFactory> VisibilityTracker<F> {
    /// Create an idle tracker. Nothing is observed until an element is bound.
    pub fn new(factory: F, config: TrackerConfig) -> Self {
        Self {
            factory,
            config,
            target: None,
            signal: Rc::new(IntersectionSignal::default()),
            subscription: None,
            torn_down: false,
        }
    }

    /// Run `listener` every time the intersection signal changes value.
    ///
    /// Replaces any previously installed listener. Ignored once the tracker is torn down.
    pub fn on_change(&mut self, listener: impl FnMut(bool) + 'static) {
        if self.signal.detached.get() {
            return;
        }
        self.signal.listener.replace(Some(Box::new(listener)));
    }

    /// Whether the element currently satisfies the threshold.
    pub fn is_intersecting(&self) -> bool {
        self.signal.value.get()
    }

    /// Where the tracker is in its subscription lifecycle.
    pub fn state(&self) -> TrackerState {
        self.subscription
            .as_ref()
            .map_or(TrackerState::Idle, |subscription| subscription.state.get())
    }

    /// The config of the current (or next) subscription.
    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// The element the tracker is bound to, if any.
    pub fn target(&self) -> Option<&F::Target> {
        self.target.as_ref()
    }

    /// Bind to a new element, keeping the current config.
    pub fn bind(&mut self, target: Option<F::Target>) -> Result<TrackerState, WatcherError> {
        self.update(target, self.config)
    }

    /// Switch to a new config, keeping the current element.
    pub fn reconfigure(&mut self, config: TrackerConfig) -> Result<TrackerState, WatcherError> {
        let target = self.target.clone();
        self.update(target, config)
    }

    /// Make the tracker follow `target` with `config`.
    ///
    /// If neither changed this is a no-op. Otherwise the current watcher is released and, when
    /// `target` is set, a new one is created for it. An unset target leaves the tracker idle.
    ///
    /// The signal keeps its value across rebinds and only moves when the new watcher reports.
    pub fn update(
        &mut self,
        target: Option<F::Target>,
        config: TrackerConfig,
    ) -> Result<TrackerState, WatcherError> {
        if self.torn_down {
            tracing::debug!("ignoring visibility update on a torn down tracker");
            return Ok(TrackerState::Idle);
        }

        let unchanged = self.target == target && self.config == config;
        if unchanged && (self.subscription.is_some() || target.is_none()) {
            return Ok(self.state());
        }

        self.release();
        self.target = target;
        self.config = config;

        let Some(target) = self.target.clone() else {
            tracing::trace!("no element to observe, staying idle");
            return Ok(TrackerState::Idle);
        };

        self.subscribe(target)?;
        Ok(self.state())
    }

    /// Disconnect the current watcher, if any. The tracker can be bound again afterwards.
    pub fn release(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release();
        }
    }

    /// Permanently deactivate the tracker.
    ///
    /// The watcher is disconnected, the change listener is dropped and later updates are ignored.
    pub fn teardown(&mut self) {
        self.release();
        self.torn_down = true;
        self.signal.detached.set(true);
        self.signal.listener.take();
    }

    fn subscribe(&mut self, target: F::Target) -> Result<(), WatcherError> {
        let slot = Rc::new(OnceCell::new());
        let state = Rc::new(Cell::new(TrackerState::Watching));

        let callback = notification_handler::<F::Watcher>(
            Rc::clone(&self.signal),
            Rc::clone(&state),
            Rc::downgrade(&slot),
            target.clone(),
            self.config.trigger_once(),
        );

        let watcher = self.factory.create(callback, self.config.threshold())?;
        slot.get_or_init(|| watcher).observe(&target);

        tracing::trace!("observing element with {}", self.config);
        self.subscription = Some(Subscription {
            watcher: slot,
            state,
        });

        Ok(())
    }
}

impl<F: WatcherFactory> Drop for VisibilityTracker<F> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<F: WatcherFactory> Debug for VisibilityTracker<F>
where
    F::Target: Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisibilityTracker")
            .field("config", &self.config)
            .field("target", &self.target)
            .field("state", &self.state())
            .field("is_intersecting", &self.is_intersecting())
            .finish()
    }
}

/// Build the callback handed to the watcher.
///
/// The callback only holds a weak reference to the watcher so that the watcher (which in turn owns
/// the callback) is freed when the subscription is dropped.
fn notification_handler<W: ViewportWatcher + 'static>(
    signal: Rc<IntersectionSignal>,
    state: Rc<Cell<TrackerState>>,
    watcher: Weak<OnceCell<W>>,
    target: W::Target,
    trigger_once: bool,
) -> NotificationCallback
where
    W::Target: 'static,
{
    Box::new(move |notification: Notification| {
        if state.get() != TrackerState::Watching {
            tracing::debug!(
                "dropping stale visibility notification ({:?})",
                notification
            );
            return;
        }

        tracing::trace!(
            "element intersecting={} ratio={}",
            notification.is_intersecting,
            notification.intersection_ratio
        );

        if notification.is_intersecting {
            if trigger_once {
                state.set(TrackerState::Triggered);
                if let Some(watcher) = watcher.upgrade() {
                    if let Some(watcher) = watcher.get() {
                        watcher.unobserve(&target);
                    }
                }
            }
            signal.set(true);
        } else if !trigger_once {
            signal.set(false);
        }
    })
}

struct Subscription<W> {
    watcher: Rc<OnceCell<W>>,
    state: Rc<Cell<TrackerState>>,
}

impl<W: ViewportWatcher> Subscription<W> {
    fn release(self) {
        self.state.set(TrackerState::Idle);
        if let Some(watcher) = self.watcher.get() {
            watcher.disconnect();
        }
        tracing::trace!("released viewport watcher");
    }
}

#[derive(Default)]
struct IntersectionSignal {
    value: Cell<bool>,
    listener: RefCell<Option<Box<dyn FnMut(bool)>>>,
    detached: Cell<bool>,
}

impl IntersectionSignal {
    fn set(&self, value: bool) {
        if self.value.replace(value) == value {
            return;
        }
        // The listener may call back into the tracker, so it must not stay borrowed while it runs.
        let Some(mut listener) = self.listener.borrow_mut().take() else {
            return;
        };
        listener(value);

        let mut slot = self.listener.borrow_mut();
        if slot.is_none() && !self.detached.get() {
            *slot = Some(listener);
        }
    }
}
