//! Perch: anchored overlay positioning
//!
//! Perch places floating panels (menus, dropdowns, popovers, dialogs) over a
//! host UI and keeps them placed while the window resizes, rotates or gains
//! insets:
//! - Placement relative to the screen or to an anchor element
//! - Clamping into the viewport, optionally clear of the safe area
//! - A barrier behind each popup that dims and dismisses
//! - Scale-and-fade entrance and exit transitions
//! - A typed result future per popup
//!
//! # Architecture
//!
//! The host publishes element bounds through a `LayoutQuery` (usually a
//! `LayoutSnapshot` rebuilt every frame) and viewport metric changes through
//! a `MetricsSource`. Each popup is an `OverlayLifecycle` that, every frame,
//! resolves its anchor with `AnchorResolver` and solves its position with
//! `PositionSolver` from that frame's inputs only. `OverlayStack` drives all
//! lifecycles of a window and routes input to the topmost one.
//!
//! # Usage
//!
//! ```ignore
//! use perch::{HeadlessHost, OverlayRequest, OverlayStack, Panel, PanelContext, Alignment};
//!
//! let mut stack = OverlayStack::new();
//! let handle = stack.show(
//!     &mut host,
//!     button,
//!     OverlayRequest::from_fn(|_cx: &PanelContext<'_, String>| Panel::new(menu(), menu_size))
//!         .anchor(button)
//!         .alignment(Alignment::BOTTOM_LEFT),
//!     Instant::now(),
//! )?;
//!
//! // every frame
//! let frame = stack.frame(&mut host, Instant::now());
//!
//! // later
//! let choice: Option<String> = handle.await;
//! ```

// Core primitives
pub mod primitives;
pub mod element;
pub mod layout_snapshot;
pub mod event;
pub mod error;

// Viewport metrics and settle passes
pub mod metrics;

// Placement
pub mod alignment;
pub mod anchor;
pub mod solver;

// Popup pieces
pub mod barrier;
pub mod transition;
pub mod handle;
pub mod request;
pub mod config;

// Lifecycle and host integration
pub mod lifecycle;
pub mod stack;
pub mod host;

// Re-export core types
pub use primitives::{Color, Insets, Offset, Point, Rect, Size};
pub use element::ElementId;
pub use layout_snapshot::{LayoutQuery, LayoutSnapshot};
pub use event::{Key, KeyEvent, MouseButton, MouseEvent, NamedKey};
pub use error::{PerchError, Result};
pub use metrics::{
    MetricsChange, MetricsHub, MetricsSource, MetricsSubscription, MetricsWatcher, Orientation, SettleBurst,
    SettlePoll, ViewportMetrics,
};
pub use alignment::Alignment;
pub use anchor::AnchorResolver;
pub use solver::{ClampPolicy, PositionSolver};
pub use barrier::{Barrier, BarrierHit};
pub use transition::{Easing, Transition, TransitionFrame, TransitionPhase};
pub use handle::{Completer, OverlayHandle, OverlayId};
pub use request::{OverlayRequest, Panel, PanelContent, PanelContext};
pub use config::OverlayConfig;
pub use lifecycle::{OverlayLayer, OverlayLifecycle, OverlayState};
pub use stack::{EventResult, OverlayStack, StackFrame};
pub use host::{HeadlessHost, OverlayHost};
