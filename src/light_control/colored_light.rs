use crate::color::chromaticity::{Color, Tristimulus};
use crate::error::MixError;

/// Valid range of [`cct_to_xy`]
pub const MIN_CCT: u32 = 1667;
pub const MAX_CCT: u32 = 25000;

#[derive(PartialEq, Clone, Debug)]
pub enum ColoredLight {
    ColorTemp { kelvin: u32 },
    Coordinate { x: f64, y: f64 }, // CIE 1931 color coordinates
    /// Only the chromaticity is used, luminance comes from [`LightValue`]
    Tristimulus { x: f64, y: f64, z: f64 },
}

#[derive(PartialEq, Clone, Debug)]
pub struct LightValue {
    pub luminance: f64,
    pub color: ColoredLight,
}

impl LightValue {
    pub fn to_color(&self) -> Result<Color, MixError> {
        let (x, y) = match self.color {
            ColoredLight::ColorTemp { kelvin } => cct_to_xy(kelvin)?,
            ColoredLight::Coordinate { x, y } => (x, y),
            ColoredLight::Tristimulus { x, y, z } => {
                let c = Tristimulus::new(x, y, z).to_color()?;
                (c.chromaticity.x(), c.chromaticity.y())
            }
        };
        let color = Color::new(x, y, self.luminance);
        color.validate()?;
        Ok(color)
    }
}

// Algorithm from:
// Bongsoon Kang; Ohak Moon; Changhee Hong; Honam Lee; Bonghwan Cho; Youngsun Kim (December 2002).
// "Design of Advanced Color Temperature Control System for HDTV Applications"
// Equations 8 and 9

/// Chromaticity of a black body at `kelvin`
pub fn cct_to_xy(kelvin: u32) -> Result<(f64, f64), MixError> {
    if !(MIN_CCT..=MAX_CCT).contains(&kelvin) {
        return Err(MixError::InvalidColor(format!(
            "color temperature {} K outside {}-{} K",
            kelvin, MIN_CCT, MAX_CCT
        )));
    }
    let t = 1.0 / f64::from(kelvin);
    let t2 = t * t;
    let t3 = t2 * t;
    let x = if kelvin < 4000 {
        -0.2661239e9 * t3 - 0.2343589e6 * t2 + 0.8776956e3 * t + 0.179910
    } else {
        -3.0258469e9 * t3 + 2.1070379e6 * t2 + 0.2226347e3 * t + 0.240390
    };
    let x2 = x * x;
    let x3 = x2 * x;
    let y = if kelvin < 2222 {
        -1.1063814 * x3 - 1.34811020 * x2 + 2.18555832 * x - 0.20219683
    } else if kelvin < 4000 {
        -0.9549476 * x3 - 1.37418593 * x2 + 2.09137015 * x - 0.16748867
    } else {
        3.0817580 * x3 - 5.8733867 * x2 + 3.75112997 * x - 0.37001483
    };
    Ok((x, y))
}

#[cfg(test)]
mod test {
    use super::{cct_to_xy, ColoredLight, LightValue};
    use crate::error::MixError;
    use crate::fixture::palette::Palette;
    use crate::mixing::allocator::MixingAllocator;
    use std::sync::Arc;

    fn near(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < 1e-3 && (a.1 - b.1).abs() < 1e-3
    }

    #[test]
    fn planckian_locus() {
        assert!(near(cct_to_xy(6500).unwrap(), (0.3135, 0.3237)));
        assert!(near(cct_to_xy(2700).unwrap(), (0.4593, 0.4107)));
        assert!(near(cct_to_xy(5000).unwrap(), (0.3450, 0.3516)));
        assert!(near(cct_to_xy(1667).unwrap(), (0.5646, 0.4029)));
        let mut last = 1.0;
        for k in (1667..=25000).step_by(100) {
            let (x, _) = cct_to_xy(k).unwrap();
            assert!(x < last);
            last = x;
        }
    }

    #[test]
    fn outside_range() {
        assert!(matches!(cct_to_xy(1000), Err(MixError::InvalidColor(_))));
        assert!(matches!(cct_to_xy(30000), Err(MixError::InvalidColor(_))));
    }

    #[test]
    fn light_values() {
        let v = LightValue {
            luminance: 10.0,
            color: ColoredLight::Tristimulus {
                x: 2.0,
                y: 2.0,
                z: 1.0,
            },
        };
        let c = v.to_color().unwrap();
        assert!((c.chromaticity.x() - 0.4).abs() < 1e-12);
        assert!((c.chromaticity.y() - 0.4).abs() < 1e-12);
        assert_eq!(c.luminance, 10.0);

        let v = LightValue {
            luminance: -1.0,
            color: ColoredLight::Coordinate { x: 0.3, y: 0.3 },
        };
        assert!(v.to_color().is_err());
    }

    #[test]
    fn warm_white_is_mixable() {
        let alloc = MixingAllocator::new(Arc::new(Palette::reference().unwrap()));
        for kelvin in [1667, 2700, 6500] {
            let v = LightValue {
                luminance: 100.0,
                color: ColoredLight::ColorTemp { kelvin },
            };
            let a = alloc.allocate(&v.to_color().unwrap()).unwrap();
            assert!((a.total_luminance() - 100.0).abs() < 1e-9);
        }
    }
}
