//! Error types for the astrometric pipeline

use thiserror::Error;

/// Main error type for astrometric transformations
///
/// The transform pipeline itself never fails: degenerate geometry is clamped
/// or guarded. The only fatal condition enters through the time-scale seam,
/// when a caller supplies a date the conversion tables cannot represent.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The supplied date cannot be converted between time scales
    #[error("unacceptable date: JD {jd}")]
    UnacceptableDate { jd: f64 },
}

/// Result type for astrometric operations
pub type Result<T> = std::result::Result<T, Error>;
