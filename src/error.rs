use std::error::Error;
use std::fmt;

pub type DynResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Clone, PartialEq)]
pub enum MixError {
    /// y = 0, the projection to tristimulus space is undefined
    DegenerateChromaticity,
    /// Input outside the valid xyY domain
    InvalidColor(String),
    /// No combination of primaries reproduces the chromaticity
    OutOfGamut { x: f64, y: f64 },
    /// The chromaticity is reproducible but not at the requested luminance.
    /// `primary` is the one limiting the first containing subset,
    /// `available` the highest luminance that can be delivered.
    CapacityExceeded {
        primary: String,
        requested: f64,
        available: f64,
    },
    InvalidPalette(String),
    InvalidWiring(String),
}

impl fmt::Display for MixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixError::DegenerateChromaticity => {
                write!(f, "Degenerate chromaticity (y = 0)")
            }
            MixError::InvalidColor(reason) => write!(f, "Invalid color: {}", reason),
            MixError::OutOfGamut { x, y } => {
                write!(f, "Chromaticity ({:.4}, {:.4}) is out of gamut", x, y)
            }
            MixError::CapacityExceeded {
                primary,
                requested,
                available,
            } => write!(
                f,
                "Luminance {:.3} requested but only {:.3} available, limited by {}",
                requested, available, primary
            ),
            MixError::InvalidPalette(reason) => write!(f, "Invalid palette: {}", reason),
            MixError::InvalidWiring(reason) => write!(f, "Invalid wiring: {}", reason),
        }
    }
}

impl Error for MixError {}
