//! An in-memory viewport for driving trackers and hooks without a browser.
//!
//! [`FakeViewport`] hands out watchers that never fire on their own. Tests deliver notifications
//! explicitly with [`FakeViewport::emit`] and inspect what the tracker asked the platform to do.

use std::cell::RefCell;
use std::rc::Rc;

use crate::{Notification, NotificationCallback, ViewportWatcher, WatcherError, WatcherFactory};

/// A stand-in for a mounted element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeElement(pub u32);

/// What happened to one watcher created by a [`FakeViewport`].
#[derive(Debug, Clone, PartialEq)]
pub struct WatcherRecord {
    pub threshold: f64,
    pub observed: Vec<FakeElement>,
    pub unobserved: Vec<FakeElement>,
    pub disconnects: usize,
}

impl WatcherRecord {
    /// Whether the watcher still has a target it has not unobserved or disconnected.
    pub fn is_active(&self) -> bool {
        self.disconnects == 0 && self.observed.len() > self.unobserved.len()
    }
}

struct Entry {
    record: WatcherRecord,
    callback: Rc<RefCell<NotificationCallback>>,
}

#[derive(Default)]
struct ViewportState {
    entries: Vec<Entry>,
    fail_next: Option<String>,
}

/// A [`WatcherFactory`] that records every call and delivers notifications on demand.
///
/// Clones share the same state, so a test can keep one handle while a tracker owns another.
#[derive(Clone, Default)]
pub struct FakeViewport {
    state: Rc<RefCell<ViewportState>>,
}

impl PartialEq for FakeViewport {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl FakeViewport {
    /// The number of watchers created so far.
    pub fn created(&self) -> usize {
        self.state.borrow().entries.len()
    }

    /// The history of the `index`th watcher.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `index + 1` watchers were created.
    pub fn watcher(&self, index: usize) -> WatcherRecord {
        self.state.borrow().entries[index].record.clone()
    }

    /// The number of watchers still observing something.
    pub fn active(&self) -> usize {
        self.state
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.record.is_active())
            .count()
    }

    /// The total number of `disconnect` calls across all watchers.
    pub fn disconnects(&self) -> usize {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|entry| entry.record.disconnects)
            .sum()
    }

    /// Make the next call to [`WatcherFactory::create`] fail with `reason`.
    pub fn fail_next_create(&self, reason: impl Into<String>) {
        self.state.borrow_mut().fail_next = Some(reason.into());
    }

    /// Deliver a notification to the most recently created watcher.
    ///
    /// Does nothing if no watcher was ever created.
    pub fn emit(&self, is_intersecting: bool) {
        let latest = self.created().checked_sub(1);
        if let Some(index) = latest {
            self.emit_to(index, is_intersecting);
        }
    }

    /// Deliver a notification to the `index`th watcher, even if it has been disconnected.
    pub fn emit_to(&self, index: usize, is_intersecting: bool) {
        let notification = match is_intersecting {
            true => Notification::visible(1.0),
            false => Notification::hidden(),
        };
        self.deliver(index, notification);
    }

    /// Deliver an arbitrary notification to the `index`th watcher.
    pub fn deliver(&self, index: usize, notification: Notification) {
        // The callback may call back into the viewport, so release the borrow first.
        let callback = self.state.borrow().entries[index].callback.clone();
        let mut callback = callback.borrow_mut();
        (*callback)(notification);
    }

    fn with_record(&self, id: usize, f: impl FnOnce(&mut WatcherRecord)) {
        if let Some(entry) = self.state.borrow_mut().entries.get_mut(id) {
            f(&mut entry.record);
        }
    }
}

impl WatcherFactory for FakeViewport {
    type Target = FakeElement;
    type Watcher = FakeWatcher;

    fn create(
        &self,
        callback: NotificationCallback,
        threshold: f64,
    ) -> Result<Self::Watcher, WatcherError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.fail_next.take() {
            return Err(WatcherError::Create(reason));
        }

        state.entries.push(Entry {
            record: WatcherRecord {
                threshold,
                observed: Vec::new(),
                unobserved: Vec::new(),
                disconnects: 0,
            },
            callback: Rc::new(RefCell::new(callback)),
        });

        Ok(FakeWatcher {
            id: state.entries.len() - 1,
            viewport: self.clone(),
        })
    }
}

/// A watcher handed out by [`FakeViewport`].
pub struct FakeWatcher {
    id: usize,
    viewport: FakeViewport,
}

impl ViewportWatcher for FakeWatcher {
    type Target = FakeElement;

    fn observe(&self, target: &FakeElement) {
        self.viewport
            .with_record(self.id, |record| record.observed.push(*target));
    }

    fn unobserve(&self, target: &FakeElement) {
        self.viewport
            .with_record(self.id, |record| record.unobserved.push(*target));
    }

    fn disconnect(&self) {
        self.viewport
            .with_record(self.id, |record| record.disconnects += 1);
    }
}
