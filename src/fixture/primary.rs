use crate::color::chromaticity::{Chromaticity, Tristimulus};
use crate::error::MixError;
use serde_derive::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Maps a fraction of full output to a fraction of full duty cycle.
///
/// Every curve is monotonic and maps 0 to 0 and 1 to 1.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseCurve {
    Linear,
    /// Output is proportional to duty^gamma
    Gamma(f64),
}

impl ResponseCurve {
    pub fn validate(&self) -> Result<(), MixError> {
        match *self {
            ResponseCurve::Linear => Ok(()),
            ResponseCurve::Gamma(g) if g.is_finite() && g > 0.0 => Ok(()),
            ResponseCurve::Gamma(g) => Err(MixError::InvalidPalette(format!(
                "gamma {} is not a positive number",
                g
            ))),
        }
    }

    /// `fraction` must be in [0, 1]
    pub fn duty(&self, fraction: f64) -> f64 {
        match *self {
            ResponseCurve::Linear => fraction,
            ResponseCurve::Gamma(g) => fraction.powf(1.0 / g),
        }
    }
}

impl Default for ResponseCurve {
    fn default() -> Self {
        ResponseCurve::Linear
    }
}

/// Luminance outside [0, capacity] was given to [`Primary::quantize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Clamped {
    pub primary: String,
    /// Code of the clamped luminance
    pub code: u8,
    pub luminance: f64,
    pub capacity: f64,
}

impl fmt::Display for Clamped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Luminance {} of {} clamped to [0, {}]",
            self.luminance, self.primary, self.capacity
        )
    }
}

impl Error for Clamped {}

impl From<Clamped> for MixError {
    fn from(c: Clamped) -> MixError {
        MixError::CapacityExceeded {
            primary: c.primary,
            requested: c.luminance,
            available: c.capacity,
        }
    }
}

/// One kind of emitter in a fixture
#[derive(Clone, Debug, PartialEq)]
pub struct Primary {
    name: String,
    chromaticity: Chromaticity,
    capacity: f64,
    curve: ResponseCurve,
    unit: Tristimulus,
}

impl Primary {
    /// # Arguments
    /// * `name` - Name used by the wiring table
    /// * `chromaticity` - Color of the emitter
    /// * `capacity` - Maximum luminous output, same unit as the target luminance
    pub fn new(name: &str, chromaticity: Chromaticity, capacity: f64) -> Result<Primary, MixError> {
        chromaticity
            .validate()
            .map_err(|e| MixError::InvalidPalette(format!("{}: {}", name, e)))?;
        let unit = chromaticity.unit_tristimulus()?;
        if !capacity.is_finite() || capacity <= 0.0 {
            return Err(MixError::InvalidPalette(format!(
                "{}: capacity {} must be positive",
                name, capacity
            )));
        }
        Ok(Primary {
            name: name.to_string(),
            chromaticity,
            capacity,
            curve: ResponseCurve::Linear,
            unit,
        })
    }

    pub fn with_curve(mut self, curve: ResponseCurve) -> Result<Primary, MixError> {
        curve.validate()?;
        self.curve = curve;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chromaticity(&self) -> Chromaticity {
        self.chromaticity
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn curve(&self) -> ResponseCurve {
        self.curve
    }

    /// Tristimulus value of one unit of luminance from this primary
    pub fn unit_tristimulus(&self) -> Tristimulus {
        self.unit
    }

    /// Duty code for a luminance
    ///
    /// # Arguments
    /// * `luminance` - Requested output, 0..=capacity
    /// * `max_code` - Code for full output
    pub fn quantize(&self, luminance: f64, max_code: u8) -> Result<u8, Clamped> {
        let fraction = luminance / self.capacity;
        let in_range = (0.0..=1.0).contains(&fraction);
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let code = (self.curve.duty(fraction) * f64::from(max_code))
            .round()
            .clamp(0.0, f64::from(max_code)) as u8;
        if in_range {
            Ok(code)
        } else {
            Err(Clamped {
                primary: self.name.clone(),
                code,
                luminance,
                capacity: self.capacity,
            })
        }
    }
}
