//! A viewport backed by the browser's `IntersectionObserver`.

use wasm_bindgen::prelude::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::{Notification, NotificationCallback, ViewportWatcher, WatcherError, WatcherFactory};

/// Creates one `IntersectionObserver` per watcher, rooted at the document viewport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WebViewport;

impl WatcherFactory for WebViewport {
    type Target = Element;
    type Watcher = WebWatcher;

    fn create(
        &self,
        mut callback: NotificationCallback,
        threshold: f64,
    ) -> Result<Self::Watcher, WatcherError> {
        // Entries arrive oldest first, so the last one forwarded wins.
        let listener: Closure<dyn FnMut(js_sys::Array)> =
            Closure::new(move |entries: js_sys::Array| {
                for entry in entries.iter() {
                    let entry: IntersectionObserverEntry = entry.unchecked_into();
                    callback(Notification {
                        is_intersecting: entry.is_intersecting(),
                        intersection_ratio: entry.intersection_ratio(),
                    });
                }
            });

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));

        let observer =
            IntersectionObserver::new_with_options(listener.as_ref().unchecked_ref(), &options)
                .map_err(|err| WatcherError::Create(format!("{err:?}")))?;

        Ok(WebWatcher {
            observer,
            _listener: listener,
        })
    }
}

/// A live `IntersectionObserver` together with the closure it calls into.
///
/// The closure must outlive the observer's last delivery, which the tracker guarantees by
/// disconnecting before dropping the watcher.
pub struct WebWatcher {
    observer: IntersectionObserver,
    _listener: Closure<dyn FnMut(js_sys::Array)>,
}

impl ViewportWatcher for WebWatcher {
    type Target = Element;

    fn observe(&self, target: &Element) {
        self.observer.observe(target);
    }

    fn unobserve(&self, target: &Element) {
        self.observer.unobserve(target);
    }

    fn disconnect(&self) {
        self.observer.disconnect();
    }
}
