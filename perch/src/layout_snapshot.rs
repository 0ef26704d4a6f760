//! Layout Snapshot
//!
//! The host's per-frame record of where elements ended up. Overlays query it
//! to resolve anchors and to read the viewport metrics observed during the
//! same frame, so a placement never mixes geometry from two frames.

use std::collections::HashMap;

use crate::element::ElementId;
use crate::metrics::ViewportMetrics;
use crate::primitives::Rect;

/// Read access to laid-out element bounds.
///
/// Bounds are in surface coordinates with transforms and scrolling already
/// applied. `None` means the element is not currently rendered.
pub trait LayoutQuery {
    fn element_bounds(&self, id: ElementId) -> Option<Rect>;
}

/// Layout information captured for one frame.
#[derive(Debug, Clone, Default)]
pub struct LayoutSnapshot {
    /// Bounds of elements registered during layout.
    element_bounds: HashMap<ElementId, Rect>,

    /// Viewport metrics observed for this frame.
    viewport: ViewportMetrics,

    /// Frame counter, bumped by `begin_frame`.
    frame: u64,
}

impl LayoutSnapshot {
    pub fn new(viewport: ViewportMetrics) -> Self {
        Self {
            element_bounds: HashMap::new(),
            viewport,
            frame: 0,
        }
    }

    /// Start a new layout pass: forget all bounds and adopt `viewport`.
    pub fn begin_frame(&mut self, viewport: ViewportMetrics) {
        self.element_bounds.clear();
        self.viewport = viewport;
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Register an element with its bounds.
    pub fn register_element(&mut self, id: ElementId, bounds: Rect) {
        self.element_bounds.insert(id, bounds);
    }

    /// Remove an element, e.g. when it is unmounted mid-frame.
    pub fn unregister_element(&mut self, id: ElementId) -> Option<Rect> {
        self.element_bounds.remove(&id)
    }

    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
    }

    pub fn len(&self) -> usize {
        self.element_bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.element_bounds.is_empty()
    }
}

impl LayoutQuery for LayoutSnapshot {
    fn element_bounds(&self, id: ElementId) -> Option<Rect> {
        self.element_bounds.get(&id).copied()
    }
}
