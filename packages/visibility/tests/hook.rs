#![allow(non_snake_case)]

//! Mount the hook inside a real virtual dom with a fake viewport.
//!
//! Effects only run from the dom's work loop, so every step is followed by `settle`, which pumps
//! `wait_for_work` until nothing is left and renders whatever became dirty.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use dioxus::prelude::*;
use dioxus_core::{NoOpMutations, VirtualDom};
use dioxus_visibility::testing::{FakeElement, FakeViewport};
use dioxus_visibility::{use_visibility_with, TrackerConfig};
use pretty_assertions::assert_eq;

#[derive(Clone)]
struct Harness {
    viewport: FakeViewport,
    initial: Option<FakeElement>,
    threshold: Rc<Cell<f64>>,
    trigger_once: bool,
    element: Rc<Cell<Option<Signal<Option<FakeElement>>>>>,
    seen: Rc<Cell<Option<bool>>>,
}

impl Harness {
    fn new(initial: Option<FakeElement>, trigger_once: bool) -> Self {
        Self {
            viewport: FakeViewport::default(),
            initial,
            threshold: Rc::new(Cell::new(0.1)),
            trigger_once,
            element: Rc::new(Cell::new(None)),
            seen: Rc::new(Cell::new(None)),
        }
    }

    fn mount(&self) -> VirtualDom {
        let mut dom = VirtualDom::new_with_props(App, self.clone());
        dom.rebuild_in_place();
        dom
    }

    fn element(&self) -> Signal<Option<FakeElement>> {
        self.element.get().expect("the app has rendered")
    }
}

fn App(props: Harness) -> Element {
    let element = use_signal(|| props.initial);
    props.element.set(Some(element));

    let config = TrackerConfig::new(props.threshold.get(), props.trigger_once).unwrap();
    let visible = use_visibility_with(|| props.viewport.clone(), element, config);

    let current = visible.cloned();
    props.seen.set(Some(current));

    rsx! { "visible: {current}" }
}

async fn settle(dom: &mut VirtualDom) {
    for _ in 0..4 {
        let work = tokio::time::timeout(Duration::from_millis(20), dom.wait_for_work()).await;
        if work.is_err() {
            break;
        }
        dom.render_immediate(&mut NoOpMutations);
    }
}

#[tokio::test]
async fn mounting_observes_the_element() {
    let harness = Harness::new(Some(FakeElement(1)), true);
    let mut dom = harness.mount();
    assert_eq!(harness.seen.get(), Some(false));

    settle(&mut dom).await;

    let viewport = &harness.viewport;
    assert_eq!(viewport.created(), 1);
    assert_eq!(viewport.watcher(0).observed, vec![FakeElement(1)]);
    assert_eq!(viewport.watcher(0).threshold, 0.1);
    assert_eq!(harness.seen.get(), Some(false));
}

#[tokio::test]
async fn notifications_reach_the_rendered_value() {
    let harness = Harness::new(Some(FakeElement(1)), false);
    let mut dom = harness.mount();
    settle(&mut dom).await;

    dom.in_runtime(|| harness.viewport.emit(true));
    settle(&mut dom).await;
    assert_eq!(harness.seen.get(), Some(true));

    dom.in_runtime(|| harness.viewport.emit(false));
    settle(&mut dom).await;
    assert_eq!(harness.seen.get(), Some(false));
}

#[tokio::test]
async fn trigger_once_keeps_the_rendered_value() {
    let harness = Harness::new(Some(FakeElement(1)), true);
    let mut dom = harness.mount();
    settle(&mut dom).await;

    dom.in_runtime(|| harness.viewport.emit(true));
    settle(&mut dom).await;
    dom.in_runtime(|| harness.viewport.emit(false));
    settle(&mut dom).await;

    assert_eq!(harness.seen.get(), Some(true));
    assert_eq!(harness.viewport.watcher(0).unobserved, vec![FakeElement(1)]);
}

#[tokio::test]
async fn config_change_on_rerender_swaps_one_watcher() {
    let harness = Harness::new(Some(FakeElement(1)), false);
    let mut dom = harness.mount();
    settle(&mut dom).await;

    harness.threshold.set(0.6);
    dom.mark_dirty(ScopeId::ROOT);
    dom.render_immediate(&mut NoOpMutations);
    settle(&mut dom).await;

    let viewport = &harness.viewport;
    assert_eq!(viewport.created(), 2);
    assert_eq!(viewport.watcher(0).disconnects, 1);
    assert_eq!(viewport.watcher(1).threshold, 0.6);
    assert_eq!(viewport.watcher(1).disconnects, 0);
    assert_eq!(viewport.active(), 1);

    // Rendering again with the same config leaves the watcher alone.
    dom.mark_dirty(ScopeId::ROOT);
    dom.render_immediate(&mut NoOpMutations);
    settle(&mut dom).await;
    assert_eq!(viewport.created(), 2);
}

#[tokio::test]
async fn element_change_rebinds() {
    let harness = Harness::new(Some(FakeElement(1)), false);
    let mut dom = harness.mount();
    settle(&mut dom).await;

    let mut element = harness.element();
    dom.in_runtime(|| element.set(Some(FakeElement(2))));
    settle(&mut dom).await;

    let viewport = &harness.viewport;
    assert_eq!(viewport.created(), 2);
    assert_eq!(viewport.watcher(0).disconnects, 1);
    assert_eq!(viewport.watcher(1).observed, vec![FakeElement(2)]);

    dom.in_runtime(|| element.set(None));
    settle(&mut dom).await;
    assert_eq!(viewport.created(), 2);
    assert_eq!(viewport.active(), 0);
}

#[tokio::test]
async fn unmounted_element_is_never_observed() {
    let harness = Harness::new(None, true);
    let mut dom = harness.mount();
    settle(&mut dom).await;
    drop(dom);

    assert_eq!(harness.seen.get(), Some(false));
    assert_eq!(harness.viewport.created(), 0);
}

#[tokio::test]
async fn dropping_the_component_leaves_no_live_watcher() {
    let harness = Harness::new(Some(FakeElement(3)), false);
    let mut dom = harness.mount();
    settle(&mut dom).await;
    assert_eq!(harness.viewport.active(), 1);

    drop(dom);

    let viewport = &harness.viewport;
    assert_eq!(viewport.created(), 1);
    assert_eq!(viewport.disconnects(), 1);
    assert_eq!(viewport.active(), 0);

    // Anything the platform still had queued must not reach the dropped signal.
    viewport.emit(true);
    assert_eq!(harness.seen.get(), Some(false));
}
