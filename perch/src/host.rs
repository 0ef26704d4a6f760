//! Host integration.
//!
//! [`OverlayHost`] is everything the overlay system needs from the
//! surrounding UI framework: element bounds, the current viewport metrics, a
//! source of metric-change subscriptions, and a way to find the overlay root
//! for an element. [`HeadlessHost`] implements it in memory for tests, demos
//! and hosts that drive layout themselves.

use crate::element::ElementId;
use crate::layout_snapshot::{LayoutQuery, LayoutSnapshot};
use crate::metrics::{MetricsChange, MetricsHub, MetricsSource, ViewportMetrics};
use crate::primitives::Rect;

pub trait OverlayHost: LayoutQuery {
    /// Metrics observed for the frame being built.
    fn viewport(&self) -> ViewportMetrics;

    fn metrics_source(&mut self) -> &mut dyn MetricsSource;

    /// The overlay root that should host popups opened from `origin`.
    fn overlay_root(&self, origin: ElementId) -> Option<ElementId>;
}

/// In-memory host with a single overlay root covering the viewport.
#[derive(Debug)]
pub struct HeadlessHost {
    snapshot: LayoutSnapshot,
    hub: MetricsHub,
    root: ElementId,
}

impl HeadlessHost {
    pub fn new(metrics: ViewportMetrics) -> Self {
        let root = ElementId::new();
        let mut snapshot = LayoutSnapshot::new(metrics);
        snapshot.register_element(root, metrics.bounds());
        Self {
            snapshot,
            hub: MetricsHub::new(metrics),
            root,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn snapshot(&self) -> &LayoutSnapshot {
        &self.snapshot
    }

    pub fn hub(&self) -> &MetricsHub {
        &self.hub
    }

    /// Lay out an element at `bounds` (surface coordinates).
    pub fn place(&mut self, id: ElementId, bounds: Rect) {
        self.snapshot.register_element(id, bounds);
    }

    /// Unmount an element.
    pub fn remove(&mut self, id: ElementId) {
        self.snapshot.unregister_element(id);
    }

    /// Start a fresh layout pass. Only the root survives; re-place the rest.
    pub fn begin_frame(&mut self) {
        let metrics = self.hub.metrics();
        self.snapshot.begin_frame(metrics);
        self.snapshot.register_element(self.root, metrics.bounds());
    }

    /// Apply new viewport metrics, notifying subscribers if anything changed.
    pub fn set_viewport(&mut self, metrics: ViewportMetrics) -> Option<MetricsChange> {
        let change = self.hub.update(metrics);
        self.snapshot.set_viewport(metrics);
        self.snapshot.register_element(self.root, metrics.bounds());
        change
    }
}

impl LayoutQuery for HeadlessHost {
    fn element_bounds(&self, id: ElementId) -> Option<Rect> {
        self.snapshot.element_bounds(id)
    }
}

impl OverlayHost for HeadlessHost {
    fn viewport(&self) -> ViewportMetrics {
        self.snapshot.viewport()
    }

    fn metrics_source(&mut self) -> &mut dyn MetricsSource {
        &mut self.hub
    }

    fn overlay_root(&self, origin: ElementId) -> Option<ElementId> {
        if origin == self.root || self.snapshot.element_bounds(origin).is_some() {
            Some(self.root)
        } else {
            None
        }
    }
}
