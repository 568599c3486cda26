use crate::error::MixError;
use core::ops::{Add, AddAssign, Mul};

/// CIE 1931 xy coordinate
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Chromaticity {
    x: f64,
    y: f64,
}

impl Chromaticity {
    /// Create without validation. Use [`Chromaticity::validate`] on
    /// coordinates that come from outside.
    pub const fn new(x: f64, y: f64) -> Chromaticity {
        Chromaticity { x, y }
    }

    pub fn try_new(x: f64, y: f64) -> Result<Chromaticity, MixError> {
        let c = Chromaticity { x, y };
        c.validate()?;
        Ok(c)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn validate(&self) -> Result<(), MixError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(MixError::InvalidColor("non-finite chromaticity".to_string()));
        }
        if !(0.0..=1.0).contains(&self.x) || !(0.0..=1.0).contains(&self.y) {
            return Err(MixError::InvalidColor(format!(
                "chromaticity ({}, {}) outside [0, 1]",
                self.x, self.y
            )));
        }
        if self.x + self.y > 1.0 + 1e-12 {
            return Err(MixError::InvalidColor(format!(
                "x + y = {} exceeds 1",
                self.x + self.y
            )));
        }
        Ok(())
    }

    /// Tristimulus vector of this chromaticity at luminance 1: (x/y, 1, z/y)
    pub fn unit_tristimulus(&self) -> Result<Tristimulus, MixError> {
        if self.y == 0.0 {
            return Err(MixError::DegenerateChromaticity);
        }
        Ok(Tristimulus {
            x: self.x / self.y,
            y: 1.0,
            z: (1.0 - self.x - self.y) / self.y,
        })
    }
}

/// Chromaticity plus luminance (CIE xyY)
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Color {
    pub chromaticity: Chromaticity,
    pub luminance: f64,
}

impl Color {
    pub const fn new(x: f64, y: f64, luminance: f64) -> Color {
        Color {
            chromaticity: Chromaticity::new(x, y),
            luminance,
        }
    }

    pub fn validate(&self) -> Result<(), MixError> {
        self.chromaticity.validate()?;
        if !self.luminance.is_finite() || self.luminance < 0.0 {
            return Err(MixError::InvalidColor(format!(
                "luminance {} is not a finite, non-negative value",
                self.luminance
            )));
        }
        Ok(())
    }

    /// X = x/y·Y, Y = Y, Z = (1 - x - y)/y·Y
    pub fn to_tristimulus(&self) -> Result<Tristimulus, MixError> {
        if self.chromaticity.y == 0.0 {
            return Err(MixError::DegenerateChromaticity);
        }
        self.validate()?;
        Ok(self.chromaticity.unit_tristimulus()? * self.luminance)
    }
}

/// CIE XYZ. Mixtures of lights add component-wise.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Tristimulus {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Tristimulus {
    pub const fn new(x: f64, y: f64, z: f64) -> Tristimulus {
        Tristimulus { x, y, z }
    }

    /// Largest absolute component difference
    pub fn max_abs_diff(&self, other: &Tristimulus) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    /// Convert to xyY. Fails for black (X + Y + Z = 0) since the
    /// chromaticity is undefined.
    pub fn to_color(&self) -> Result<Color, MixError> {
        let sum = self.x + self.y + self.z;
        if sum == 0.0 || !sum.is_finite() {
            return Err(MixError::DegenerateChromaticity);
        }
        let color = Color::new(self.x / sum, self.y / sum, self.y);
        color.validate()?;
        Ok(color)
    }
}

impl Add for Tristimulus {
    type Output = Tristimulus;
    fn add(self, b: Tristimulus) -> Self::Output {
        Tristimulus {
            x: self.x + b.x,
            y: self.y + b.y,
            z: self.z + b.z,
        }
    }
}

impl AddAssign for Tristimulus {
    fn add_assign(&mut self, b: Tristimulus) {
        self.x += b.x;
        self.y += b.y;
        self.z += b.z;
    }
}

impl Mul<f64> for Tristimulus {
    type Output = Tristimulus;
    fn mul(self, s: f64) -> Self::Output {
        Tristimulus {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Chromaticity, Color, Tristimulus};
    use crate::error::MixError;

    #[test]
    fn color_to_tristimulus() {
        let xyz = Color::new(0.25, 0.5, 10.0).to_tristimulus().unwrap();
        assert!((xyz.x - 5.0).abs() < 1e-12);
        assert_eq!(xyz.y, 10.0);
        assert!((xyz.z - 5.0).abs() < 1e-12);
    }

    #[test]
    fn zero_y_is_degenerate() {
        assert_eq!(
            Color::new(0.3, 0.0, 10.0).to_tristimulus(),
            Err(MixError::DegenerateChromaticity)
        );
        assert_eq!(
            Color::new(0.0, 0.0, 0.0).to_tristimulus(),
            Err(MixError::DegenerateChromaticity)
        );
        assert_eq!(
            Chromaticity::new(1.0, 0.0).unit_tristimulus(),
            Err(MixError::DegenerateChromaticity)
        );
    }

    #[test]
    fn invalid_input() {
        assert!(matches!(
            Color::new(0.7, 0.4, 1.0).to_tristimulus(),
            Err(MixError::InvalidColor(_))
        ));
        assert!(matches!(
            Color::new(0.3, 0.3, -1.0).to_tristimulus(),
            Err(MixError::InvalidColor(_))
        ));
        assert!(matches!(
            Color::new(f64::NAN, 0.3, 1.0).to_tristimulus(),
            Err(MixError::InvalidColor(_))
        ));
        assert!(Chromaticity::try_new(-0.1, 0.3).is_err());
        assert!(Chromaticity::try_new(0.3127, 0.329).is_ok());
    }

    #[test]
    fn tristimulus_back_to_color() {
        let c = Color::new(0.434, 0.403, 675.0);
        let back = c.to_tristimulus().unwrap().to_color().unwrap();
        assert!((back.chromaticity.x() - 0.434).abs() < 1e-12);
        assert!((back.chromaticity.y() - 0.403).abs() < 1e-12);
        assert!((back.luminance - 675.0).abs() < 1e-9);
        assert_eq!(
            Tristimulus::default().to_color(),
            Err(MixError::DegenerateChromaticity)
        );
    }

    #[test]
    fn additive_mix() {
        let a = Tristimulus::new(1.0, 2.0, 3.0);
        let mut b = a * 2.0;
        b += a;
        assert_eq!(b, Tristimulus::new(3.0, 6.0, 9.0));
        assert_eq!(a + a, a * 2.0);
        assert_eq!(b.max_abs_diff(&a), 6.0);
    }
}
