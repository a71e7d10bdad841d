//! Error taxonomy for the engine.
//!
//! Only four classes of error ever cross a component boundary: usage errors
//! (bad dimensions, unknown algorithm), I/O errors (bad magic, truncation,
//! decompression), cooperative cancellation, and internal invariant
//! violations. A solver that exhausts the grid without reaching the exit is
//! *not* an error — it reports `found = false` in its outcome and leaves the
//! decision to the caller.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// All failure modes surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Grid dimensions outside the supported envelope.
    #[error("invalid dimensions {width}x{height}: {reason}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Which constraint was violated.
        reason: &'static str,
    },

    /// An option value outside its documented range (e.g. `braid` ∉ [0, 1]).
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Algorithm name that matches no known generator or solver.
    #[error("unknown algorithm `{0}`")]
    UnknownAlgorithm(String),

    /// A coordinate or carve target outside the grid.
    #[error("coordinate ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds {
        /// Offending x coordinate.
        x: u32,
        /// Offending y coordinate.
        y: u32,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },

    /// Underlying I/O failure while reading or writing a file.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The file does not start with the expected magic bytes.
    #[error("bad magic: not a {expected} file")]
    BadMagic {
        /// Human-readable name of the expected format.
        expected: &'static str,
    },

    /// The file's format version is newer than this build understands.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),

    /// Structurally invalid file contents (short payload, bad record, …).
    #[error("corrupt file: {0}")]
    Corrupt(&'static str),

    /// Cooperative cancellation was observed. The grid is left well-typed
    /// but in an unspecified state; callers should discard it.
    #[error("operation cancelled")]
    Cancelled,

    /// An internal invariant was broken. Always a bug, never recoverable.
    #[error("invariant violated: {0}")]
    InvariantViolation(&'static str),
}
