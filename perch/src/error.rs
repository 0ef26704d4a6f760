//! Perch error types.
//!
//! Positioning never fails; these cover the few boundary calls that can.

use thiserror::Error;

use crate::element::ElementId;

#[derive(Debug, Error, PartialEq)]
pub enum PerchError {
    #[error("no overlay root found for element {0:?}")]
    NoOverlayRoot(ElementId),

    #[error("alignment component out of range [-1, 1]: ({x}, {y})")]
    InvalidAlignment { x: f32, y: f32 },

    #[error("invalid overlay config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PerchError>;
