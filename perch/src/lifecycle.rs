//! Overlay lifecycle.
//!
//! One [`OverlayLifecycle`] per shown popup. It owns the request, the result
//! channel, the metrics subscription, the barrier and the transition, and
//! moves through
//!
//! ```text
//! Installing -> Active -> Dismissing -> Disposed
//! ```
//!
//! Every frame it reads the viewport metrics and anchor bounds observed for
//! that frame, builds the content, and solves the panel position from
//! scratch. Nothing from a previous frame feeds into placement.
//!
//! Teardown happens exactly once. Whichever trigger arrives first (an
//! explicit completion, a barrier tap, escape, or an external removal) wins;
//! later triggers are ignored. On disposal the metrics subscription is
//! returned, queued settle passes are dropped, and the result future
//! resolves.

use std::time::Instant;

use crate::alignment::Alignment;
use crate::anchor::AnchorResolver;
use crate::barrier::{Barrier, BarrierHit};
use crate::config::OverlayConfig;
use crate::element::ElementId;
use crate::handle::{result_channel, Dismissal, OverlayHandle, OverlayId, ResultSlot};
use crate::host::OverlayHost;
use crate::metrics::{MetricsWatcher, SettlePoll};
use crate::primitives::{Color, Insets, Point, Rect, Size};
use crate::request::{OverlayRequest, PanelContent, PanelContext};
use crate::solver::PositionSolver;
use crate::transition::{scale_origin, Transition, TransitionFrame};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Created, not yet subscribed or animating.
    Installing,
    /// On screen and accepting input.
    Active,
    /// Exit transition running; input is ignored.
    Dismissing,
    /// Torn down. Terminal.
    Disposed,
}

impl OverlayState {
    /// Installing or Active: a dismissal would still take effect.
    pub fn is_live(self) -> bool {
        matches!(self, OverlayState::Installing | OverlayState::Active)
    }
}

/// Everything a host needs to draw one overlay for one frame.
///
/// Rects and points are in surface coordinates, the space pointer events
/// arrive in.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLayer<N> {
    pub id: OverlayId,
    pub state: OverlayState,
    /// Area covered by the barrier (the whole overlay root).
    pub barrier_rect: Rect,
    /// Barrier fill for this frame, already faded by the transition.
    pub barrier_color: Color,
    pub panel_rect: Rect,
    pub node: N,
    pub transition: TransitionFrame,
    /// Anchor bounds used for this frame, `None` for screen placement.
    pub anchor: Option<Rect>,
    /// The host should schedule another frame (animation or settle passes).
    pub needs_frame: bool,
}

/// Inputs the solver works with for one frame.
struct Placement {
    /// Overlay root bounds in surface coordinates.
    root: Rect,
    /// Space the panel is placed in, relative to the root.
    area: Rect,
    insets: Insets,
    /// Anchor bounds relative to the root.
    anchor: Option<Rect>,
}

pub struct OverlayLifecycle<T, C> {
    id: OverlayId,
    state: OverlayState,
    root: ElementId,
    request: Option<OverlayRequest<T, C>>,
    solver: PositionSolver,
    barrier: Barrier,
    edge_insets: Insets,
    settle_passes: u8,
    watcher: Option<MetricsWatcher>,
    transition: Transition,
    slot: ResultSlot<T>,
    pending_result: Option<T>,
    last_panel: Option<Rect>,
}

impl<T, C: PanelContent<T>> OverlayLifecycle<T, C> {
    /// Create a lifecycle hosted under `root`. Call [`install`](Self::install)
    /// before the first frame.
    pub fn new(
        root: ElementId,
        request: OverlayRequest<T, C>,
        config: &OverlayConfig,
    ) -> (Self, OverlayHandle<T>) {
        let id = OverlayId::new();
        let (slot, handle) = result_channel(id);
        let dismissible = request.dismissible.unwrap_or(config.barrier_dismissible);
        let barrier = Barrier::new(request.dim_background, config.barrier_dim_color, dismissible);
        let lifecycle = Self {
            id,
            state: OverlayState::Installing,
            root,
            request: Some(request),
            solver: PositionSolver::new(config.clamp_policy),
            barrier,
            edge_insets: config.edge_insets(),
            settle_passes: config.settle_passes,
            watcher: None,
            transition: Transition::new(config.transition_duration(), config.initial_scale, config.easing),
            slot,
            pending_result: None,
            last_panel: None,
        };
        (lifecycle, handle)
    }

    pub fn id(&self) -> OverlayId {
        self.id
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn barrier(&self) -> Barrier {
        self.barrier
    }

    /// Settle passes still queued for this overlay.
    pub fn pending_settle_passes(&self) -> u8 {
        self.watcher.as_ref().map_or(0, MetricsWatcher::pending_passes)
    }

    /// Subscribe to metric changes and start the entrance.
    pub fn install(&mut self, host: &mut dyn OverlayHost, now: Instant) {
        if self.state != OverlayState::Installing {
            return;
        }
        self.watcher = Some(MetricsWatcher::attach(host.metrics_source(), self.settle_passes));
        self.transition.enter(now);
        self.state = OverlayState::Active;
        tracing::debug!(id = ?self.id, root = ?self.root, "overlay installed");
    }

    /// Produce this frame's layer.
    ///
    /// Returns `None` once the overlay is disposed, including on the frame
    /// where the exit transition finishes.
    pub fn frame(
        &mut self,
        host: &mut dyn OverlayHost,
        now: Instant,
        frame: u64,
    ) -> Option<OverlayLayer<C::Node>> {
        if self.state == OverlayState::Disposed {
            return None;
        }

        let poll = match self.watcher.as_mut() {
            Some(watcher) => watcher.poll(frame, self.state == OverlayState::Active),
            None => SettlePoll::default(),
        };
        if let Some(change) = poll.change {
            tracing::debug!(id = ?self.id, ?change, frame, "recomputing after metrics change");
        }

        self.transition.tick(now);
        // An exit requested now starts animating from this frame's progress.
        self.drain_dismissals(now);
        if self.state == OverlayState::Dismissing && self.transition.is_finished_exit() {
            self.dispose(host);
            return None;
        }

        let layer = self.layout(&*host)?;
        let needs_frame = self.transition.is_animating()
            || self.pending_settle_passes() > 0
            || self.state == OverlayState::Dismissing;
        Some(OverlayLayer { needs_frame, ..layer })
    }

    /// Route a pointer press. Only an Active overlay reacts.
    pub fn handle_tap(&mut self, point: Point, now: Instant) -> BarrierHit {
        if self.state != OverlayState::Active {
            return BarrierHit::Absorb;
        }
        let hit = match self.last_panel {
            Some(panel) => self.barrier.hit(panel, point),
            None if self.barrier.dismissible => BarrierHit::Dismiss,
            None => BarrierHit::Absorb,
        };
        if hit == BarrierHit::Dismiss {
            tracing::debug!(id = ?self.id, ?point, "barrier tapped");
            self.begin_dismiss(None, now);
        }
        hit
    }

    /// Whether `point` falls inside the panel drawn last frame.
    pub fn panel_contains(&self, point: Point) -> bool {
        self.last_panel.is_some_and(|panel| panel.contains(point))
    }

    /// Dismiss without a value, as if the barrier had been tapped.
    ///
    /// Used for external removal (route pops, escape). Runs the same exit
    /// path as any other dismissal. Returns false if teardown had already
    /// started.
    pub fn force_remove(&mut self, now: Instant) -> bool {
        self.begin_dismiss(None, now)
    }

    /// Tear down immediately, skipping any remaining exit animation.
    ///
    /// Idempotent. A value completed earlier is still delivered.
    pub fn dispose(&mut self, host: &mut dyn OverlayHost) {
        if self.state == OverlayState::Disposed {
            return;
        }
        if let Some(watcher) = self.watcher.as_mut() {
            watcher.release(host.metrics_source());
        }
        self.watcher = None;
        self.slot.close();
        let result = self.pending_result.take();
        let completed = result.is_some();
        self.slot.deliver(result);
        self.request = None;
        self.last_panel = None;
        self.state = OverlayState::Disposed;
        tracing::debug!(id = ?self.id, completed, "overlay disposed");
    }

    fn drain_dismissals(&mut self, now: Instant) {
        while self.state.is_live() {
            let Ok(dismissal) = self.slot.dismissals.try_recv() else {
                break;
            };
            let result = match dismissal {
                Dismissal::Complete(value) => Some(value),
                Dismissal::Dismiss => None,
            };
            self.begin_dismiss(result, now);
        }
    }

    fn begin_dismiss(&mut self, result: Option<T>, now: Instant) -> bool {
        if !self.state.is_live() {
            return false;
        }
        // First trigger wins; completers go quiet from here on.
        self.slot.close();
        self.pending_result = result;
        self.transition.exit(now);
        self.state = OverlayState::Dismissing;
        tracing::debug!(id = ?self.id, completed = self.pending_result.is_some(), "overlay dismissing");
        true
    }

    fn placement(&self, host: &dyn OverlayHost, request: &OverlayRequest<T, C>) -> Placement {
        let viewport = host.viewport();
        let root = host.element_bounds(self.root).unwrap_or_else(|| {
            tracing::trace!(id = ?self.id, root = ?self.root, "overlay root not laid out; using viewport");
            viewport.bounds()
        });
        let local = Rect::from_origin_size(Point::ORIGIN, root.size());
        let safe = viewport.safe_area.within(viewport.size, root);

        let anchor = request.anchor.and_then(|anchor| {
            let resolved = AnchorResolver::resolve(host, anchor, self.root);
            if resolved.is_none() {
                tracing::trace!(id = ?self.id, ?anchor, "anchor unresolved; placing on screen");
            }
            resolved
        });

        match (anchor, request.safe_area) {
            (Some(_), safe_area) => Placement {
                root,
                area: local,
                insets: if safe_area { safe + self.edge_insets } else { self.edge_insets },
                anchor,
            },
            // Unanchored content is wrapped in the safe area.
            (None, true) => Placement {
                root,
                area: safe.deflate(local),
                insets: self.edge_insets,
                anchor: None,
            },
            (None, false) => Placement {
                root,
                area: local,
                insets: self.edge_insets,
                anchor: None,
            },
        }
    }

    fn layout(&mut self, host: &dyn OverlayHost) -> Option<OverlayLayer<C::Node>> {
        let request = self.request.as_ref()?;
        let placement = self.placement(host, request);
        let alignment: Alignment = request.alignment;
        let offset = request.offset;
        let to_surface = placement.root.origin() - Point::ORIGIN;
        let anchor = placement.anchor.map(|rect| rect.translate(to_surface));

        let overlay = placement.area.size();
        let max_size = available_size(overlay, placement.insets);
        let cx = PanelContext {
            viewport: host.viewport(),
            max_size,
            anchor,
            completer: &self.slot.completer,
        };
        let request = self.request.as_mut()?;
        let panel = request.content.build(&cx);

        let local = self.solver.solve(
            overlay,
            panel.size,
            placement.anchor,
            alignment,
            offset,
            placement.insets,
        ) + (placement.area.origin() - Point::ORIGIN);
        let panel_rect = Rect::from_origin_size(local + to_surface, panel.size);
        self.last_panel = Some(panel_rect);

        let transition = self
            .transition
            .frame(scale_origin(panel_rect, alignment, anchor.is_some()));
        Some(OverlayLayer {
            id: self.id,
            state: self.state,
            barrier_rect: placement.root,
            barrier_color: self.barrier.color_at(transition.opacity),
            panel_rect,
            node: panel.node,
            transition,
            anchor,
            needs_frame: false,
        })
    }
}

impl<T, C> Drop for OverlayLifecycle<T, C> {
    fn drop(&mut self) {
        // The subscription can only be returned through the host.
        if self.watcher.as_ref().is_some_and(MetricsWatcher::is_attached) {
            tracing::warn!(
                id = ?self.id,
                state = ?self.state,
                "overlay dropped while still subscribed; call dispose first"
            );
        }
    }
}

impl<T, C> std::fmt::Debug for OverlayLifecycle<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayLifecycle")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("root", &self.root)
            .field("phase", &self.transition.phase())
            .finish_non_exhaustive()
    }
}

/// Size the panel is given when nothing constrains it further.
pub fn available_size(area: Size, insets: Insets) -> Size {
    insets.deflate(Rect::from_origin_size(Point::ORIGIN, area)).size()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::host::HeadlessHost;
    use crate::metrics::ViewportMetrics;
    use crate::request::Panel;
    use crate::transition::TransitionPhase;

    fn host() -> HeadlessHost {
        HeadlessHost::new(ViewportMetrics::new(Size::new(400.0, 300.0)))
    }

    fn menu(_: &PanelContext<'_, &'static str>) -> Panel<&'static str> {
        Panel::new("menu", Size::new(120.0, 80.0))
    }

    fn install(
        host: &mut HeadlessHost,
        request: OverlayRequest<&'static str, fn(&PanelContext<'_, &'static str>) -> Panel<&'static str>>,
        now: Instant,
    ) -> (
        OverlayLifecycle<&'static str, fn(&PanelContext<'_, &'static str>) -> Panel<&'static str>>,
        OverlayHandle<&'static str>,
    ) {
        let (mut lifecycle, handle) = OverlayLifecycle::new(host.root(), request, &OverlayConfig::default());
        lifecycle.install(host, now);
        (lifecycle, handle)
    }

    fn request() -> OverlayRequest<&'static str, fn(&PanelContext<'_, &'static str>) -> Panel<&'static str>> {
        OverlayRequest::new(menu as fn(&PanelContext<'_, &'static str>) -> Panel<&'static str>)
    }

    #[test]
    fn install_subscribes_and_activates() {
        let mut host = host();
        let now = Instant::now();
        let (lifecycle, _handle) = install(&mut host, request(), now);
        assert_eq!(lifecycle.state(), OverlayState::Active);
        assert_eq!(host.hub().subscriber_count(), 1);
    }

    #[test]
    fn screen_mode_centers_panel() {
        let mut host = host();
        let now = Instant::now();
        let (mut lifecycle, _handle) = install(&mut host, request(), now);
        let layer = lifecycle.frame(&mut host, now, 1).unwrap();
        assert_eq!(layer.panel_rect, Rect::new(140.0, 110.0, 120.0, 80.0));
        assert_eq!(layer.anchor, None);
        assert!(layer.needs_frame);
        assert_eq!(layer.barrier_color, Color::TRANSPARENT);
    }

    #[test]
    fn safe_area_wraps_screen_placement() {
        let mut host = host();
        host.set_viewport(
            ViewportMetrics::new(Size::new(400.0, 300.0)).with_safe_area(Insets::new(40.0, 0.0, 20.0, 0.0)),
        );
        let now = Instant::now();
        let (mut lifecycle, _handle) = install(
            &mut host,
            request().alignment(Alignment::TOP_CENTER).safe_area(true),
            now,
        );
        let layer = lifecycle.frame(&mut host, now, 1).unwrap();
        assert_eq!(layer.panel_rect.y, 40.0);
    }

    #[test]
    fn unresolved_anchor_falls_back_to_screen() {
        let mut host = host();
        let now = Instant::now();
        let (mut lifecycle, _handle) = install(&mut host, request().anchor(ElementId::new()), now);
        let layer = lifecycle.frame(&mut host, now, 1).unwrap();
        assert_eq!(layer.anchor, None);
        assert_eq!(layer.panel_rect, Rect::new(140.0, 110.0, 120.0, 80.0));
    }

    #[test]
    fn completion_runs_exit_then_delivers() {
        let mut host = host();
        let start = Instant::now();
        let (mut lifecycle, mut handle) = install(&mut host, request(), start);
        lifecycle.frame(&mut host, start, 1);

        assert!(handle.complete("X"));
        let t1 = start + Duration::from_millis(200);
        let layer = lifecycle.frame(&mut host, t1, 2).unwrap();
        assert_eq!(layer.state, OverlayState::Dismissing);
        assert_eq!(handle.try_result(), None);

        // A later completion loses.
        assert!(!handle.complete("Y"));

        let t2 = t1 + Duration::from_millis(200);
        assert!(lifecycle.frame(&mut host, t2, 3).is_none());
        assert_eq!(lifecycle.state(), OverlayState::Disposed);
        assert_eq!(handle.try_result(), Some(Some("X")));
        assert_eq!(host.hub().subscriber_count(), 0);
        assert_eq!(host.hub().unsubscribe_count(), 1);
    }

    #[test]
    fn barrier_tap_dismisses_without_value() {
        let mut host = host();
        let now = Instant::now();
        let (mut lifecycle, mut handle) = install(&mut host, request(), now);
        lifecycle.frame(&mut host, now, 1);

        assert_eq!(lifecycle.handle_tap(Point::new(150.0, 120.0), now), BarrierHit::Panel);
        assert_eq!(lifecycle.handle_tap(Point::new(5.0, 5.0), now), BarrierHit::Dismiss);
        assert_eq!(lifecycle.state(), OverlayState::Dismissing);
        // Input is ignored while the exit runs.
        assert_eq!(lifecycle.handle_tap(Point::new(5.0, 5.0), now), BarrierHit::Absorb);

        lifecycle.dispose(&mut host);
        assert_eq!(handle.try_result(), Some(None));
    }

    #[test]
    fn non_dismissible_barrier_absorbs() {
        let mut host = host();
        let now = Instant::now();
        let (mut lifecycle, _handle) = install(&mut host, request().dismissible(false), now);
        lifecycle.frame(&mut host, now, 1);
        assert_eq!(lifecycle.handle_tap(Point::new(5.0, 5.0), now), BarrierHit::Absorb);
        assert_eq!(lifecycle.state(), OverlayState::Active);
    }

    #[test]
    fn dispose_is_idempotent() {
        let mut host = host();
        let now = Instant::now();
        let (mut lifecycle, _handle) = install(&mut host, request(), now);
        lifecycle.dispose(&mut host);
        lifecycle.dispose(&mut host);
        assert!(!lifecycle.force_remove(now));
        assert!(lifecycle.frame(&mut host, now, 1).is_none());
        assert_eq!(host.hub().unsubscribe_count(), 1);
    }

    #[test]
    fn entrance_scales_up_to_identity() {
        let mut host = host();
        let start = Instant::now();
        let (mut lifecycle, _handle) = install(&mut host, request(), start);
        let first = lifecycle.frame(&mut host, start, 1).unwrap();
        assert_eq!(first.transition.opacity, 0.0);
        assert!((first.transition.scale - 0.98).abs() < 1e-6);

        let done = lifecycle
            .frame(&mut host, start + Duration::from_millis(160), 2)
            .unwrap();
        assert_eq!(lifecycle.transition.phase(), TransitionPhase::Shown);
        assert_eq!(done.transition.opacity, 1.0);
        assert_eq!(done.transition.scale, 1.0);
        assert!(!done.needs_frame);
    }

    #[test]
    fn available_size_respects_insets() {
        assert_eq!(
            available_size(Size::new(400.0, 300.0), Insets::new(40.0, 8.0, 20.0, 8.0)),
            Size::new(384.0, 240.0)
        );
    }
}
