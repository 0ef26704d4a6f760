//! Entrance and exit transition.
//!
//! A fade from transparent to opaque combined with a slight scale-up about
//! [`scale_origin`]. Exit runs the same curve backwards over the same
//! duration.
//!
//! # Invariants
//!
//! - Progress is always in `[0.0, 1.0]` (0 = hidden, 1 = fully shown).
//! - Reversing mid-flight keeps the current progress, so nothing jumps.
//! - A zero duration completes on the first tick.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use crate::primitives::{Point, Rect};

/// Easing curve applied to transition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Decelerating cubic.
    #[default]
    EaseOut,
    /// Accelerating cubic.
    EaseIn,
    EaseInOut,
}

impl Easing {
    /// Apply the curve to a progress value (clamped to `[0, 1]`).
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::EaseIn => t * t * t,
            Self::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
        }
    }
}

/// Where the transition is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionPhase {
    #[default]
    Hidden,
    Entering,
    Shown,
    Exiting,
}

/// Visual values for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionFrame {
    pub opacity: f32,
    pub scale: f32,
    /// Fixed point of the scale transform, in surface coordinates.
    pub origin: Point,
}

#[derive(Debug, Clone)]
pub struct Transition {
    duration: Duration,
    initial_scale: f32,
    easing: Easing,
    phase: TransitionPhase,
    progress: f32,
    last_tick: Option<Instant>,
}

impl Transition {
    pub fn new(duration: Duration, initial_scale: f32, easing: Easing) -> Self {
        Self {
            duration,
            initial_scale,
            easing,
            phase: TransitionPhase::Hidden,
            progress: 0.0,
            last_tick: None,
        }
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Raw linear progress (before easing).
    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, TransitionPhase::Entering | TransitionPhase::Exiting)
    }

    /// True once an exit has fully run.
    pub fn is_finished_exit(&self) -> bool {
        self.phase == TransitionPhase::Hidden && self.last_tick.is_some()
    }

    /// Start (or resume) the entrance at `now`.
    pub fn enter(&mut self, now: Instant) {
        if matches!(self.phase, TransitionPhase::Hidden | TransitionPhase::Exiting) {
            self.phase = TransitionPhase::Entering;
            self.last_tick = Some(now);
        }
    }

    /// Start (or resume) the exit at `now`.
    pub fn exit(&mut self, now: Instant) {
        match self.phase {
            TransitionPhase::Entering | TransitionPhase::Shown => {
                self.phase = TransitionPhase::Exiting;
                self.last_tick = Some(now);
            }
            // Never shown: nothing to animate out of.
            TransitionPhase::Hidden => {
                self.progress = 0.0;
                self.last_tick = Some(now);
            }
            TransitionPhase::Exiting => {}
        }
    }

    /// Advance to `now`. Returns true if the phase changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last_tick else {
            return false;
        };
        let delta = now.saturating_duration_since(last);
        self.last_tick = Some(now);

        let step = if self.duration.is_zero() {
            1.0
        } else {
            (delta.as_nanos() as f64 / self.duration.as_nanos() as f64) as f32
        };

        match self.phase {
            TransitionPhase::Entering => {
                self.progress = (self.progress + step).min(1.0);
                if self.progress >= 1.0 {
                    self.phase = TransitionPhase::Shown;
                    return true;
                }
            }
            TransitionPhase::Exiting => {
                self.progress = (self.progress - step).max(0.0);
                if self.progress <= 0.0 {
                    self.phase = TransitionPhase::Hidden;
                    return true;
                }
            }
            TransitionPhase::Hidden | TransitionPhase::Shown => {}
        }
        false
    }

    /// Opacity and scale for the current progress, scaling about `origin`.
    pub fn frame(&self, origin: Point) -> TransitionFrame {
        let eased = self.easing.apply(self.progress);
        TransitionFrame {
            opacity: eased,
            scale: self.initial_scale + (1.0 - self.initial_scale) * eased,
            origin,
        }
    }
}

/// Fixed point of the scale for `panel`.
///
/// Anchored panels grow out of the edge that meets the anchor. Vertically
/// they hang outside it, so that edge is the opposite of the alignment's.
/// Screen-placed panels scale about their alignment point.
pub fn scale_origin(panel: Rect, alignment: Alignment, anchored: bool) -> Point {
    if anchored {
        Alignment::new(alignment.x, -alignment.y).point_in(panel)
    } else {
        alignment.point_in(panel)
    }
}
