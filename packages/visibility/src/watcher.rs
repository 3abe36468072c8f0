//! The capability surface the tracker needs from the platform's viewport observer.
//!
//! A browser provides this through `IntersectionObserver`; tests provide it through
//! [`FakeViewport`](crate::testing::FakeViewport). Anything that can create an observer for a
//! threshold and then observe, unobserve and disconnect targets can drive a
//! [`VisibilityTracker`](crate::VisibilityTracker).

/// A single visibility change reported by a watcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Notification {
    /// Whether the target currently satisfies the watcher's threshold.
    pub is_intersecting: bool,

    /// The fraction of the target that is visible, in `0.0..=1.0`.
    pub intersection_ratio: f64,
}

impl Notification {
    /// A notification for a target that just became visible.
    pub fn visible(intersection_ratio: f64) -> Self {
        Self {
            is_intersecting: true,
            intersection_ratio,
        }
    }

    /// A notification for a target that just left the viewport.
    pub fn hidden() -> Self {
        Self {
            is_intersecting: false,
            intersection_ratio: 0.0,
        }
    }
}

/// The callback a watcher invokes for every notification it delivers.
pub type NotificationCallback = Box<dyn FnMut(Notification)>;

/// An error raised by the platform while creating a watcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WatcherError {
    /// The platform refused to construct an observer.
    #[error("failed to create viewport watcher: {0}")]
    Create(String),
}

/// A live viewport observer.
pub trait ViewportWatcher {
    /// The kind of element this watcher can observe.
    type Target;

    /// Start delivering notifications for `target`.
    fn observe(&self, target: &Self::Target);

    /// Stop delivering notifications for `target` while keeping the watcher alive.
    fn unobserve(&self, target: &Self::Target);

    /// Stop delivering notifications for every target and release the watcher.
    fn disconnect(&self);
}

/// Creates [`ViewportWatcher`]s.
pub trait WatcherFactory {
    /// The handle type of an observable element.
    type Target: Clone + PartialEq + 'static;

    /// The watcher this factory produces.
    type Watcher: ViewportWatcher<Target = Self::Target> + 'static;

    /// Create a watcher that calls `callback` whenever an observed target crosses `threshold`.
    fn create(
        &self,
        callback: NotificationCallback,
        threshold: f64,
    ) -> Result<Self::Watcher, WatcherError>;
}
