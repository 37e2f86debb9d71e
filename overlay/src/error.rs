//! Overlay error types.

use std::fmt;

use thiserror::Error;

/// The kind of collection a handle addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// A [`LineId`](crate::LineId).
    Line,
    /// A [`PointId`](crate::PointId).
    Point,
    /// A [`TriangleId`](crate::TriangleId).
    Triangle,
    /// An internal material-group index.
    MaterialGroup,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line => write!(f, "line"),
            Self::Point => write!(f, "point"),
            Self::Triangle => write!(f, "triangle"),
            Self::MaterialGroup => write!(f, "material group"),
        }
    }
}

/// Errors returned by overlay operations.
///
/// Handle errors are programmer errors: hosts are expected to check
/// validity before mutating. They are returned rather than panicking so the
/// host decides how loudly to fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// The handle does not address an occupied slot.
    #[error("invalid {kind} handle {index}")]
    InvalidHandle { kind: HandleKind, index: u32 },

    /// An explicit insert targeted a slot that is already occupied.
    #[error("{kind} handle {index} is already in use")]
    HandleInUse { kind: HandleKind, index: u32 },

    /// The undo stack is empty.
    #[error("nothing to undo")]
    NothingToUndo,

    /// The redo stack is empty.
    #[error("nothing to redo")]
    NothingToRedo,
}

/// Convenience alias for results using [`OverlayError`].
pub type Result<T> = std::result::Result<T, OverlayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OverlayError::InvalidHandle {
            kind: HandleKind::Line,
            index: 7,
        };
        assert_eq!(err.to_string(), "invalid line handle 7");

        let err = OverlayError::HandleInUse {
            kind: HandleKind::MaterialGroup,
            index: 0,
        };
        assert_eq!(err.to_string(), "material group handle 0 is already in use");

        assert_eq!(OverlayError::NothingToRedo.to_string(), "nothing to redo");
    }
}
