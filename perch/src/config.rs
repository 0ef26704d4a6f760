//! Overlay configuration.
//!
//! Defaults give the usual popup feel (a quick scale-and-fade, a 54% scrim
//! when dimming, outside taps dismiss). Hosts can load overrides
//! from any serde format; missing fields keep their defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PerchError, Result};
use crate::primitives::{Color, Insets};
use crate::solver::ClampPolicy;
use crate::transition::Easing;

/// Upper bound for `settle_passes`.
pub const MAX_SETTLE_PASSES: u8 = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Entrance and exit duration in milliseconds.
    pub transition_ms: u64,
    /// Panel scale at the start of the entrance (and end of the exit).
    pub initial_scale: f32,
    pub easing: Easing,
    /// Forced recompute passes scheduled after each viewport metric change.
    pub settle_passes: u8,
    /// Scrim color used when a request asks for a dimmed background.
    pub barrier_dim_color: Color,
    /// Default for requests that don't set `dismissible` explicitly.
    pub barrier_dismissible: bool,
    pub clamp_policy: ClampPolicy,
    /// Extra margin kept between a clamped panel and the viewport edges.
    pub edge_margin: f32,
    /// Escape dismisses the topmost dismissible overlay.
    pub dismiss_on_escape: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            transition_ms: 160,
            initial_scale: 0.98,
            easing: Easing::EaseOut,
            settle_passes: 3,
            barrier_dim_color: Color::rgba(0.0, 0.0, 0.0, 0.54),
            barrier_dismissible: true,
            clamp_policy: ClampPolicy::AnchoredOnly,
            edge_margin: 0.0,
            dismiss_on_escape: true,
        }
    }
}

impl OverlayConfig {
    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn edge_insets(&self) -> Insets {
        Insets::uniform(self.edge_margin)
    }

    /// Reject values the lifecycle cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.initial_scale.is_finite() && self.initial_scale > 0.0 && self.initial_scale <= 1.0) {
            return Err(PerchError::InvalidConfig(format!(
                "initial_scale must be in (0, 1], got {}",
                self.initial_scale
            )));
        }
        if !(self.edge_margin.is_finite() && self.edge_margin >= 0.0) {
            return Err(PerchError::InvalidConfig(format!(
                "edge_margin must be a non-negative number, got {}",
                self.edge_margin
            )));
        }
        if self.settle_passes > MAX_SETTLE_PASSES {
            return Err(PerchError::InvalidConfig(format!(
                "settle_passes must be at most {MAX_SETTLE_PASSES}, got {}",
                self.settle_passes
            )));
        }
        let c = self.barrier_dim_color;
        if [c.r, c.g, c.b, c.a].iter().any(|v| !(0.0..=1.0).contains(v)) {
            return Err(PerchError::InvalidConfig("barrier_dim_color components must be in [0, 1]".into()));
        }
        Ok(())
    }
}
