//! Dioxus Visibility
//!
//! ## Overview
//! ------------
//! Hooks for tracking whether an element is visible in the viewport. Lazy images, scroll-triggered
//! animations and infinite lists all need the same thing: create an observer for one element, flip
//! a boolean when it crosses a threshold, and clean the observer up when the component goes away.
//!
//! The moving parts are:
//! - [`TrackerConfig`]: the threshold and whether to stop after the first sighting
//! - [`VisibilityTracker`]: owns at most one watcher and the intersection flag
//! - [`WatcherFactory`] / [`ViewportWatcher`]: the platform observer, abstracted so it can be faked
//! - [`use_visibility_with`] and, with the `web` feature, `use_intersection_observer`
//!
//! ## Features
//! ------------
//! - `web`: the `IntersectionObserver` backend in [`web`](crate::web) and `use_intersection_observer`
//! - `serialize`: serde support for [`TrackerConfig`]
//! - `testing`: [`FakeViewport`](crate::testing::FakeViewport), a viewport that only reports when told to

mod config;
pub use config::*;

mod watcher;
pub use watcher::*;

mod tracker;
pub use tracker::*;

mod use_visibility;
pub use use_visibility::*;

#[cfg(feature = "web")]
pub mod web;

#[cfg(any(test, feature = "testing"))]
pub mod testing;
