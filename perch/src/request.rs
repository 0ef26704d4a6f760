//! Popup requests and panel content.
//!
//! The positioning engine never looks inside a panel. Content is produced by
//! a [`PanelContent`] implementation (usually a closure) that receives a
//! [`PanelContext`] and returns the host's renderable node together with the
//! size it wants.

use std::marker::PhantomData;

use crate::alignment::Alignment;
use crate::element::ElementId;
use crate::handle::Completer;
use crate::metrics::ViewportMetrics;
use crate::primitives::{Offset, Rect, Size};

/// A renderable node and its laid-out size.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<N> {
    pub node: N,
    pub size: Size,
}

impl<N> Panel<N> {
    pub fn new(node: N, size: Size) -> Self {
        Self { node, size }
    }
}

/// Capabilities handed to panel content while it builds.
pub struct PanelContext<'a, T> {
    pub(crate) viewport: ViewportMetrics,
    pub(crate) max_size: Size,
    pub(crate) anchor: Option<Rect>,
    pub(crate) completer: &'a Completer<T>,
}

impl<T> PanelContext<'_, T> {
    pub fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    /// Largest size that fits between the clamping insets.
    pub fn max_size(&self) -> Size {
        self.max_size
    }

    /// The anchor rectangle for this frame in surface coordinates, if one
    /// resolved.
    pub fn anchor(&self) -> Option<Rect> {
        self.anchor
    }

    /// End the popup with `value`.
    pub fn complete(&self, value: T) -> bool {
        self.completer.complete(value)
    }

    /// End the popup without a value.
    pub fn dismiss(&self) -> bool {
        self.completer.dismiss()
    }

    /// A completer to keep for later, e.g. inside an event handler.
    pub fn completer(&self) -> Completer<T> {
        self.completer.clone()
    }
}

/// Produces the panel for each frame.
pub trait PanelContent<T> {
    type Node;

    fn build(&mut self, cx: &PanelContext<'_, T>) -> Panel<Self::Node>;
}

impl<T, N, F> PanelContent<T> for F
where
    F: FnMut(&PanelContext<'_, T>) -> Panel<N>,
{
    type Node = N;

    fn build(&mut self, cx: &PanelContext<'_, T>) -> Panel<N> {
        self(cx)
    }
}

/// Parameters of one popup invocation.
pub struct OverlayRequest<T, C> {
    pub(crate) content: C,
    pub(crate) alignment: Alignment,
    pub(crate) offset: Offset,
    pub(crate) anchor: Option<ElementId>,
    pub(crate) safe_area: bool,
    pub(crate) dim_background: bool,
    pub(crate) dismissible: Option<bool>,
    _result: PhantomData<fn() -> T>,
}

impl<T, C: PanelContent<T>> OverlayRequest<T, C> {
    /// A centered, unanchored, non-dimmed request.
    pub fn new(content: C) -> Self {
        Self {
            content,
            alignment: Alignment::CENTER,
            offset: Offset::ZERO,
            anchor: None,
            safe_area: false,
            dim_background: false,
            dismissible: None,
            _result: PhantomData,
        }
    }
}

impl<T, N, F> OverlayRequest<T, F>
where
    F: FnMut(&PanelContext<'_, T>) -> Panel<N>,
{
    /// Same as [`OverlayRequest::new`], with closure signature inference.
    pub fn from_fn(content: F) -> Self {
        Self::new(content)
    }
}

impl<T, C> OverlayRequest<T, C> {
    pub fn alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn offset(mut self, offset: Offset) -> Self {
        self.offset = offset;
        self
    }

    /// Position relative to this element instead of the screen.
    pub fn anchor(mut self, anchor: ElementId) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Keep the panel clear of notches and system bars.
    pub fn safe_area(mut self, safe_area: bool) -> Self {
        self.safe_area = safe_area;
        self
    }

    /// Dim everything behind the panel.
    pub fn dim_background(mut self, dim: bool) -> Self {
        self.dim_background = dim;
        self
    }

    /// Whether a tap outside the panel dismisses it. Defaults to the
    /// overlay config.
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = Some(dismissible);
        self
    }

    pub fn anchor_element(&self) -> Option<ElementId> {
        self.anchor
    }
}
