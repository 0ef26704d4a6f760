//! Overlay stack.
//!
//! Hosts keep one [`OverlayStack`] per window. It owns every live popup,
//! drives their lifecycles once per frame, and routes pointer and key input
//! to the topmost one. Popups with different result types share a stack;
//! only the node type `N` they render to must match.

use std::time::Instant;

use crate::barrier::BarrierHit;
use crate::config::OverlayConfig;
use crate::element::ElementId;
use crate::error::{PerchError, Result};
use crate::event::{KeyEvent, MouseEvent};
use crate::handle::{OverlayHandle, OverlayId};
use crate::host::OverlayHost;
use crate::lifecycle::{OverlayLayer, OverlayLifecycle, OverlayState};
use crate::primitives::Point;
use crate::request::{OverlayRequest, PanelContent};

/// Object-safe view of a lifecycle, erasing its result and content types.
trait OverlayEntry<N> {
    fn id(&self) -> OverlayId;
    fn state(&self) -> OverlayState;
    fn is_dismissible(&self) -> bool;
    fn frame(&mut self, host: &mut dyn OverlayHost, now: Instant, frame: u64) -> Option<OverlayLayer<N>>;
    fn handle_tap(&mut self, point: Point, now: Instant) -> BarrierHit;
    fn panel_contains(&self, point: Point) -> bool;
    fn force_remove(&mut self, now: Instant) -> bool;
    fn dispose(&mut self, host: &mut dyn OverlayHost);
}

impl<T, C> OverlayEntry<C::Node> for OverlayLifecycle<T, C>
where
    C: PanelContent<T>,
{
    fn id(&self) -> OverlayId {
        OverlayLifecycle::id(self)
    }

    fn state(&self) -> OverlayState {
        OverlayLifecycle::state(self)
    }

    fn is_dismissible(&self) -> bool {
        self.barrier().dismissible
    }

    fn frame(&mut self, host: &mut dyn OverlayHost, now: Instant, frame: u64) -> Option<OverlayLayer<C::Node>> {
        OverlayLifecycle::frame(self, host, now, frame)
    }

    fn handle_tap(&mut self, point: Point, now: Instant) -> BarrierHit {
        OverlayLifecycle::handle_tap(self, point, now)
    }

    fn panel_contains(&self, point: Point) -> bool {
        OverlayLifecycle::panel_contains(self, point)
    }

    fn force_remove(&mut self, now: Instant) -> bool {
        OverlayLifecycle::force_remove(self, now)
    }

    fn dispose(&mut self, host: &mut dyn OverlayHost) {
        OverlayLifecycle::dispose(self, host)
    }
}

/// Result of routing an input event through the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    /// No overlay is interested; deliver the event to the app.
    Ignored,
    /// The event landed inside this overlay's panel; deliver it to the
    /// panel content.
    Panel(OverlayId),
    /// The overlay consumed the event (barrier tap, escape).
    Captured,
}

/// Layers for one frame, bottom to top.
#[derive(Debug)]
pub struct StackFrame<N> {
    pub layers: Vec<OverlayLayer<N>>,
    /// Some overlay is animating or settling; schedule another frame.
    pub needs_frame: bool,
}

/// Every live popup in one window, bottom to top.
///
/// Dropping a stack does not unsubscribe its overlays from the host's
/// metrics source, since that needs the host. Call
/// [`dispose_all`](Self::dispose_all) first; a lifecycle dropped while still
/// subscribed logs a warning.
pub struct OverlayStack<N> {
    config: OverlayConfig,
    entries: Vec<Box<dyn OverlayEntry<N>>>,
    frame: u64,
}

impl<N: 'static> OverlayStack<N> {
    pub fn new() -> Self {
        Self {
            config: OverlayConfig::default(),
            entries: Vec::new(),
            frame: 0,
        }
    }

    /// A stack using `config`, which is validated first.
    pub fn with_config(config: OverlayConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            entries: Vec::new(),
            frame: 0,
        })
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Show a popup from `origin`, which must be mounted under an overlay
    /// root.
    ///
    /// The returned handle resolves when the popup is disposed.
    pub fn show<T, C>(
        &mut self,
        host: &mut dyn OverlayHost,
        origin: ElementId,
        request: OverlayRequest<T, C>,
        now: Instant,
    ) -> Result<OverlayHandle<T>>
    where
        T: 'static,
        C: PanelContent<T, Node = N> + 'static,
    {
        let root = host.overlay_root(origin).ok_or(PerchError::NoOverlayRoot(origin))?;
        let (mut lifecycle, handle) = OverlayLifecycle::new(root, request, &self.config);
        lifecycle.install(host, now);
        tracing::info!(id = ?lifecycle.id(), ?origin, depth = self.entries.len() + 1, "overlay shown");
        self.entries.push(Box::new(lifecycle));
        Ok(handle)
    }

    /// Advance every overlay by one frame and collect what to draw.
    ///
    /// Overlays whose exit finished are disposed and dropped here.
    pub fn frame(&mut self, host: &mut dyn OverlayHost, now: Instant) -> StackFrame<N> {
        self.frame += 1;
        let frame = self.frame;
        let mut layers = Vec::with_capacity(self.entries.len());
        for entry in &mut self.entries {
            if let Some(layer) = entry.frame(host, now, frame) {
                layers.push(layer);
            }
        }
        let before = self.entries.len();
        self.entries.retain(|entry| entry.state() != OverlayState::Disposed);
        if self.entries.len() != before {
            tracing::trace!(removed = before - self.entries.len(), "disposed overlays dropped");
        }
        let needs_frame = layers.iter().any(|layer| layer.needs_frame);
        StackFrame { layers, needs_frame }
    }

    /// Route a pointer event to the topmost overlay.
    pub fn on_mouse(&mut self, event: &MouseEvent, now: Instant) -> EventResult {
        let Some(top) = self.entries.iter_mut().rev().find(|entry| entry.state() != OverlayState::Disposed)
        else {
            return EventResult::Ignored;
        };
        if top.state() != OverlayState::Active {
            return EventResult::Captured;
        }
        let id = top.id();
        if event.is_press() {
            match top.handle_tap(event.position(), now) {
                BarrierHit::Panel => EventResult::Panel(id),
                BarrierHit::Dismiss | BarrierHit::Absorb => EventResult::Captured,
            }
        } else if top.panel_contains(event.position()) {
            EventResult::Panel(id)
        } else {
            // Hover and release over the barrier never reach the app.
            EventResult::Captured
        }
    }

    /// Route a key event. Escape dismisses the topmost dismissible overlay.
    pub fn on_key(&mut self, event: &KeyEvent, now: Instant) -> EventResult {
        if !(self.config.dismiss_on_escape && event.is_escape_press()) {
            return EventResult::Ignored;
        }
        match self.entries.iter_mut().rev().find(|entry| entry.state().is_live()) {
            Some(top) if top.is_dismissible() => {
                tracing::debug!(id = ?top.id(), "escape pressed");
                top.force_remove(now);
                EventResult::Captured
            }
            _ => EventResult::Ignored,
        }
    }

    /// Dismiss the topmost live overlay, as a route pop would.
    pub fn pop(&mut self, now: Instant) -> Option<OverlayId> {
        let top = self.entries.iter_mut().rev().find(|entry| entry.state().is_live())?;
        top.force_remove(now);
        Some(top.id())
    }

    /// Dismiss a specific overlay. Returns false if it is unknown or already
    /// on its way out.
    pub fn dismiss(&mut self, id: OverlayId, now: Instant) -> bool {
        self.entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .is_some_and(|entry| entry.force_remove(now))
    }

    /// Tear everything down immediately, e.g. when the window closes.
    pub fn dispose_all(&mut self, host: &mut dyn OverlayHost) {
        for entry in &mut self.entries {
            entry.dispose(host);
        }
        self.entries.clear();
    }

    pub fn state_of(&self, id: OverlayId) -> Option<OverlayState> {
        self.entries.iter().find(|entry| entry.id() == id).map(|entry| entry.state())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: 'static> Default for OverlayStack<N> {
    fn default() -> Self {
        Self::new()
    }
}
