//! Result plumbing between a popup and whoever opened it.
//!
//! `show` hands the caller an [`OverlayHandle`], a future that resolves once
//! the overlay is disposed. [`Completer`]s (cloneable, also reachable from the
//! panel content) end the overlay early with or without a value. Both sides
//! are channels, so a completer outliving its overlay simply stops working.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::task::{Context, Poll};

use tokio::sync::{mpsc, oneshot};
use tokio::sync::oneshot::error::TryRecvError;

static OVERLAY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies one overlay instance for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u64);

impl OverlayId {
    pub fn new() -> Self {
        Self(OVERLAY_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for OverlayId {
    fn default() -> Self {
        Self::new()
    }
}

/// Request to end an overlay.
#[derive(Debug)]
pub(crate) enum Dismissal<T> {
    Complete(T),
    Dismiss,
}

/// Ends an overlay from anywhere: the caller, the panel content, a timer.
///
/// Once the overlay is disposed every call is a silent no-op.
pub struct Completer<T> {
    id: OverlayId,
    tx: mpsc::UnboundedSender<Dismissal<T>>,
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            tx: self.tx.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("id", &self.id)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl<T> Completer<T> {
    pub fn id(&self) -> OverlayId {
        self.id
    }

    /// End the overlay with `value`. Returns false if it is already disposed.
    pub fn complete(&self, value: T) -> bool {
        self.send(Dismissal::Complete(value))
    }

    /// End the overlay without a value. Returns false if it is already
    /// disposed.
    pub fn dismiss(&self) -> bool {
        self.send(Dismissal::Dismiss)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    fn send(&self, dismissal: Dismissal<T>) -> bool {
        let sent = self.tx.send(dismissal).is_ok();
        if !sent {
            tracing::debug!(id = ?self.id, "overlay already disposed; completion ignored");
        }
        sent
    }
}

/// Future for an overlay's result.
///
/// Resolves exactly once, when the overlay reaches `Disposed`: to
/// `Some(value)` after an explicit completion, otherwise to `None`.
pub struct OverlayHandle<T> {
    completer: Completer<T>,
    rx: oneshot::Receiver<Option<T>>,
}

impl<T> OverlayHandle<T> {
    pub fn id(&self) -> OverlayId {
        self.completer.id
    }

    /// A completer for this overlay, e.g. to hand to a timer.
    pub fn completer(&self) -> Completer<T> {
        self.completer.clone()
    }

    pub fn complete(&self, value: T) -> bool {
        self.completer.complete(value)
    }

    pub fn dismiss(&self) -> bool {
        self.completer.dismiss()
    }

    /// Non-blocking check for hosts that don't await.
    ///
    /// `None` while the overlay is live, `Some(result)` once disposed.
    pub fn try_result(&mut self) -> Option<Option<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(None),
        }
    }
}

impl<T> Future for OverlayHandle<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // An overlay dropped without being disposed reads as "no result".
        Pin::new(&mut self.rx).poll(cx).map(|result| result.ok().flatten())
    }
}

/// Overlay-side ends of the channels.
pub(crate) struct ResultSlot<T> {
    pub(crate) dismissals: mpsc::UnboundedReceiver<Dismissal<T>>,
    pub(crate) completer: Completer<T>,
    result: Option<oneshot::Sender<Option<T>>>,
}

impl<T> ResultSlot<T> {
    /// Deliver the final result. Only the first call has any effect.
    pub(crate) fn deliver(&mut self, value: Option<T>) -> bool {
        match self.result.take() {
            Some(tx) => {
                // The caller may have dropped the handle; that is fine.
                let _ = tx.send(value);
                true
            }
            None => false,
        }
    }

    /// Stop accepting completions; pending and future sends are dropped.
    pub(crate) fn close(&mut self) {
        self.dismissals.close();
    }
}

pub(crate) fn result_channel<T>(id: OverlayId) -> (ResultSlot<T>, OverlayHandle<T>) {
    let (tx, dismissals) = mpsc::unbounded_channel();
    let (result_tx, result_rx) = oneshot::channel();
    let completer = Completer { id, tx };
    let slot = ResultSlot {
        dismissals,
        completer: completer.clone(),
        result: Some(result_tx),
    };
    let handle = OverlayHandle {
        completer,
        rx: result_rx,
    };
    (slot, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_is_received() {
        let (mut slot, handle) = result_channel::<u32>(OverlayId::new());
        assert!(handle.complete(7));
        match slot.dismissals.try_recv() {
            Ok(Dismissal::Complete(7)) => {}
            other => panic!("expected Complete(7), got {:?}", other),
        }
    }

    #[test]
    fn closed_slot_ignores_completions() {
        let (mut slot, handle) = result_channel::<u32>(OverlayId::new());
        slot.close();
        // The slot keeps its own completer, so only `close` stops delivery.
        assert!(!handle.dismiss());
        assert!(handle.completer().is_closed());
    }

    #[test]
    fn deliver_only_once() {
        let (mut slot, mut handle) = result_channel::<&'static str>(OverlayId::new());
        assert_eq!(handle.try_result(), None);
        assert!(slot.deliver(Some("X")));
        assert!(!slot.deliver(None));
        assert_eq!(handle.try_result(), Some(Some("X")));
    }

    #[tokio::test]
    async fn dropped_slot_resolves_to_none() {
        let (slot, handle) = result_channel::<u32>(OverlayId::new());
        drop(slot);
        assert_eq!(handle.await, None);
    }
}
