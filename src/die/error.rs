//! Die model errors

/// Errors raised by the die model
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DieError {
    /// Face index outside 1..=6 (a caller bug, never recovered at runtime)
    #[error("invalid face index {0}: expected 1..=6")]
    InvalidFace(u8),
}
