use std::cell::RefCell;
use std::rc::Rc;

use dioxus::prelude::*;

use crate::{TrackerConfig, VisibilityTracker, WatcherFactory};

/// Track whether `element` is visible in the viewport, using watchers from any [`WatcherFactory`].
///
/// The returned signal starts out `false` and is updated whenever the watcher reports. The
/// tracker is rebound whenever `element` changes or the component is rendered with a different
/// `config`, and it is torn down when the component is dropped.
///
/// Most apps want [`use_intersection_observer`] instead, which plugs in the browser's
/// `IntersectionObserver`.
///
/// ```rust, no_run
/// use dioxus::prelude::*;
/// use dioxus_visibility::testing::{FakeElement, FakeViewport};
/// use dioxus_visibility::{use_visibility_with, TrackerConfig};
///
/// fn Card() -> Element {
///     let element = use_signal(|| Some(FakeElement(1)));
///     let visible = use_visibility_with(FakeViewport::default, element, TrackerConfig::default());
///
///     rsx! { "visible: {visible}" }
/// }
/// ```
#[must_use]
pub fn use_visibility_with<F, R>(
    make_factory: impl FnOnce() -> F,
    element: R,
    config: TrackerConfig,
) -> ReadSignal<bool>
where
    F: WatcherFactory + 'static,
    R: Readable<Target = Option<F::Target>> + Copy + 'static,
{
    let mut visible = use_signal(|| false);

    let tracker = use_hook(move || {
        let mut tracker = VisibilityTracker::new(make_factory(), config);
        tracker.on_change(move |value| visible.set(value));
        Rc::new(RefCell::new(tracker))
    });

    // `config` is a plain value, `use_reactive` reruns the effect when a render passes a different one.
    use_effect(use_reactive((&config,), {
        let tracker = tracker.clone();
        move |(config,)| {
            let target = element.cloned();
            if let Err(err) = tracker.borrow_mut().update(target, config) {
                tracing::error!("Failed to observe element visibility: {err}");
            }
        }
    }));

    use_drop(move || tracker.borrow_mut().teardown());

    visible.into()
}

/// Track whether a mounted element is visible in the browser viewport.
///
/// `element` is the handle filled in by `onmounted`. Until it is set nothing is observed.
///
/// ```rust, ignore
/// use dioxus::prelude::*;
/// use dioxus_visibility::{use_intersection_observer, TrackerConfig};
///
/// fn LazyImage(src: String) -> Element {
///     let mut element = use_signal(|| None);
///     let visible = use_intersection_observer(element, TrackerConfig::default());
///
///     rsx! {
///         div {
///             onmounted: move |event| element.set(Some(event.data())),
///             if visible() {
///                 img { src }
///             }
///         }
///     }
/// }
/// ```
#[cfg(feature = "web")]
#[must_use]
pub fn use_intersection_observer(
    element: impl Readable<Target = Option<Rc<MountedData>>> + Copy + 'static,
    config: TrackerConfig,
) -> ReadSignal<bool> {
    let target = use_memo(move || {
        element
            .cloned()
            .and_then(|mounted| mounted.downcast::<web_sys::Element>().cloned())
    });

    use_visibility_with(crate::web::WebViewport::default, target, config)
}
