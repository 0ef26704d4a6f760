//! Viewport metrics and the settle-pass watcher.
//!
//! A host owns a [`MetricsHub`] and pushes every new set of viewport metrics
//! into it. Each live overlay holds exactly one [`MetricsSubscription`],
//! wrapped in a [`MetricsWatcher`] that drains change notifications once per
//! frame and schedules a short burst of follow-up recompute passes so that
//! anchors whose layout settles a few frames late are tracked.
//!
//! Subscriptions are explicit handles: `subscribe()` hands one out and
//! `unsubscribe()` consumes it, so a handle can only be returned once.

use tokio::sync::mpsc;

use crate::primitives::{Insets, Rect, Size};

/// Orientation derived from the viewport aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Current viewport size and system intrusions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportMetrics {
    /// Logical size of the overlay root.
    pub size: Size,
    /// Safe-area insets (notches, status and navigation bars).
    pub safe_area: Insets,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl ViewportMetrics {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            safe_area: Insets::ZERO,
            scale_factor: 1.0,
        }
    }

    pub fn with_safe_area(mut self, safe_area: Insets) -> Self {
        self.safe_area = safe_area;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn orientation(&self) -> Orientation {
        if self.size.width > self.size.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// The full viewport as a rectangle at the origin.
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width, self.size.height)
    }

    /// Classify the difference between two metric sets.
    ///
    /// Returns the most significant change, or `None` if nothing an overlay
    /// cares about has changed.
    pub fn change_from(&self, previous: &ViewportMetrics) -> Option<MetricsChange> {
        if self.size != previous.size {
            if self.orientation() != previous.orientation() {
                return Some(MetricsChange::Rotation);
            }
            return Some(MetricsChange::Resize);
        }
        if self.safe_area != previous.safe_area {
            return Some(MetricsChange::SafeArea);
        }
        if self.scale_factor != previous.scale_factor {
            return Some(MetricsChange::ScaleFactor);
        }
        None
    }
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

/// Kind of viewport metric change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsChange {
    Resize,
    Rotation,
    SafeArea,
    ScaleFactor,
}

/// Identifies one subscription on a metrics source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A live subscription to viewport metric changes.
///
/// Dropping the handle closes the channel; the hub prunes it on the next
/// broadcast. Prefer returning it through [`MetricsSource::unsubscribe`].
#[derive(Debug)]
pub struct MetricsSubscription {
    id: SubscriptionId,
    rx: mpsc::UnboundedReceiver<MetricsChange>,
}

impl MetricsSubscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Receive one pending change without blocking.
    pub fn try_recv(&mut self) -> Option<MetricsChange> {
        self.rx.try_recv().ok()
    }

    /// Drain every pending change, returning the most recent one.
    pub fn drain(&mut self) -> Option<MetricsChange> {
        let mut last = None;
        while let Some(change) = self.try_recv() {
            last = Some(change);
        }
        last
    }
}

/// Anything that can hand out and take back metric subscriptions.
pub trait MetricsSource {
    fn subscribe(&mut self) -> MetricsSubscription;

    fn unsubscribe(&mut self, subscription: MetricsSubscription);
}

/// Host-side broadcaster of viewport metric changes.
///
/// Not a global: each host (window, surface, test) owns its own hub.
#[derive(Debug)]
pub struct MetricsHub {
    current: ViewportMetrics,
    next_id: u64,
    subscribers: Vec<(SubscriptionId, mpsc::UnboundedSender<MetricsChange>)>,
    unsubscribed: u64,
}

impl MetricsHub {
    pub fn new(metrics: ViewportMetrics) -> Self {
        Self {
            current: metrics,
            next_id: 1,
            subscribers: Vec::new(),
            unsubscribed: 0,
        }
    }

    /// The metrics most recently pushed into the hub.
    pub fn metrics(&self) -> ViewportMetrics {
        self.current
    }

    /// Replace the current metrics and notify subscribers if they changed.
    pub fn update(&mut self, metrics: ViewportMetrics) -> Option<MetricsChange> {
        let change = metrics.change_from(&self.current);
        self.current = metrics;
        if let Some(change) = change {
            self.notify(change);
        }
        change
    }

    /// Broadcast a change to every live subscriber.
    pub fn notify(&mut self, change: MetricsChange) {
        tracing::debug!(?change, subscribers = self.subscribers.len(), "viewport metrics changed");
        self.subscribers.retain(|(_, tx)| tx.send(change).is_ok());
    }

    /// Number of subscriptions currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Number of subscriptions returned through `unsubscribe`.
    pub fn unsubscribe_count(&self) -> u64 {
        self.unsubscribed
    }
}

impl MetricsSource for MetricsHub {
    fn subscribe(&mut self) -> MetricsSubscription {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push((id, tx));
        MetricsSubscription { id, rx }
    }

    fn unsubscribe(&mut self, subscription: MetricsSubscription) {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription.id);
        if self.subscribers.len() != before {
            self.unsubscribed += 1;
        }
    }
}

/// Scheduler for forced recompute passes after a metric change.
///
/// Passes run one per frame, strictly in sequence. Arming again while a
/// burst is pending restarts it with the full pass count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettleBurst {
    remaining: u8,
    due_frame: u64,
}

impl SettleBurst {
    pub fn idle() -> Self {
        Self::default()
    }

    /// Schedule `passes` recomputes, the first on the frame after `frame`.
    pub fn arm(&mut self, passes: u8, frame: u64) {
        self.remaining = passes;
        self.due_frame = frame.saturating_add(1);
    }

    /// Drop every pending pass. Returns how many were dropped.
    pub fn cancel(&mut self) -> u8 {
        std::mem::take(&mut self.remaining)
    }

    pub fn remaining(&self) -> u8 {
        self.remaining
    }

    pub fn is_pending(&self) -> bool {
        self.remaining > 0
    }

    /// Advance to `frame`. Returns true if a settle pass fires on this frame.
    pub fn tick(&mut self, frame: u64) -> bool {
        if self.remaining == 0 || frame < self.due_frame {
            return false;
        }
        self.remaining -= 1;
        self.due_frame = frame.saturating_add(1);
        true
    }
}

/// Outcome of polling a watcher for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettlePoll {
    /// Most recent metric change drained this frame.
    pub change: Option<MetricsChange>,
    /// A scheduled settle pass fired this frame.
    pub settle_pass: bool,
}

impl SettlePoll {
    /// Whether this frame must recompute even if nothing else asked for it.
    pub fn forces_recompute(&self) -> bool {
        self.change.is_some() || self.settle_pass
    }
}

/// One overlay's view of viewport metric changes.
#[derive(Debug)]
pub struct MetricsWatcher {
    subscription: Option<MetricsSubscription>,
    burst: SettleBurst,
    passes: u8,
}

impl MetricsWatcher {
    /// Subscribe to `source`, scheduling `passes` settle passes per change.
    pub fn attach(source: &mut dyn MetricsSource, passes: u8) -> Self {
        let subscription = source.subscribe();
        tracing::trace!(id = ?subscription.id(), "metrics watcher attached");
        Self {
            subscription: Some(subscription),
            burst: SettleBurst::idle(),
            passes,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_some()
    }

    /// Settle passes still queued.
    pub fn pending_passes(&self) -> u8 {
        self.burst.remaining()
    }

    /// Drain notifications and run the settle scheduler for `frame`.
    ///
    /// When `active` is false any queued passes are dropped and new changes
    /// do not schedule more.
    pub fn poll(&mut self, frame: u64, active: bool) -> SettlePoll {
        let change = self.subscription.as_mut().and_then(MetricsSubscription::drain);

        if !active {
            let dropped = self.burst.cancel();
            if dropped > 0 {
                tracing::trace!(dropped, "settle burst cancelled");
            }
            return SettlePoll {
                change,
                settle_pass: false,
            };
        }

        if change.is_some() && self.passes > 0 {
            self.burst.arm(self.passes, frame);
        }
        let settle_pass = self.burst.tick(frame);
        if settle_pass {
            tracing::trace!(frame, remaining = self.burst.remaining(), "settle pass");
        }
        SettlePoll { change, settle_pass }
    }

    /// Return the subscription to `source`.
    ///
    /// Only the first call unsubscribes; later calls are no-ops and return
    /// false.
    pub fn release(&mut self, source: &mut dyn MetricsSource) -> bool {
        self.burst.cancel();
        match self.subscription.take() {
            Some(subscription) => {
                tracing::trace!(id = ?subscription.id(), "metrics watcher released");
                source.unsubscribe(subscription);
                true
            }
            None => false,
        }
    }
}
