//! Images that only load once they scroll into view, and a banner that follows the viewport.
//!
//! Run with:
//!
//! ```sh
//! dx serve --platform web
//! ```

use std::rc::Rc;

use dioxus::prelude::*;
use dioxus_visibility::{use_intersection_observer, TrackerConfig};

fn main() {
    dioxus::launch(app);
}

fn app() -> Element {
    rsx! {
        h1 { "Scroll down" }
        Banner {}
        for id in 0..40 {
            LazyImage { key: "{id}", id }
        }
    }
}

#[component]
fn LazyImage(id: u32) -> Element {
    let mut element: Signal<Option<Rc<MountedData>>> = use_signal(|| None);
    let visible = use_intersection_observer(element, TrackerConfig::default());

    use_effect(move || {
        if visible() {
            tracing::info!("loading image {id}");
        }
    });

    rsx! {
        div {
            style: "min-height: 320px; margin: 16px 0;",
            onmounted: move |event| element.set(Some(event.data())),
            if visible() {
                img { src: "https://picsum.photos/seed/{id}/480/320", alt: "image {id}" }
            } else {
                "image {id} is waiting"
            }
        }
    }
}

#[component]
fn Banner() -> Element {
    let mut element: Signal<Option<Rc<MountedData>>> = use_signal(|| None);
    let config = TrackerConfig::new(0.5, false).unwrap_or_default();
    let visible = use_intersection_observer(element, config);

    rsx! {
        div {
            onmounted: move |event| element.set(Some(event.data())),
            if visible() { "the banner is on screen" } else { "the banner scrolled away" }
        }
    }
}
