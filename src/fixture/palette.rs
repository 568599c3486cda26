use crate::color::chromaticity::Chromaticity;
use crate::error::MixError;
use crate::fixture::primary::Primary;
use crate::mixing::geometry::EPSILON;

/// Primaries of the reference lamp as (name, x, y, capacity), in order of
/// decreasing priority.
///
/// White is a LedEngin LZ9-00WW00 driven at 700 mA, the others come from a
/// LedEngin LZ4-00MA00 RGBA package with chromaticities from Nichia data.
pub const REFERENCE_PRIMARIES: [(&str, f64, f64, f64); 5] = [
    ("white", 0.434, 0.403, 1350.0 / 2.0),
    ("green", 0.18, 0.7, 160.0 * 4.0),
    ("red", 0.68, 0.3, 100.0 * 4.0),
    ("blue", 0.13, 0.06, 30.0 * 4.0),
    ("amber", 0.57, 0.43, 90.0 * 2.0),
];

/// Ordered set of primaries. Index 0 has the highest priority.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    primaries: Vec<Primary>,
}

impl Palette {
    pub fn new(primaries: Vec<Primary>) -> Result<Palette, MixError> {
        if primaries.is_empty() {
            return Err(MixError::InvalidPalette("no primaries".to_string()));
        }
        for (i, a) in primaries.iter().enumerate() {
            for b in &primaries[..i] {
                if a.name() == b.name() {
                    return Err(MixError::InvalidPalette(format!(
                        "primary {} appears twice",
                        a.name()
                    )));
                }
                let (ca, cb) = (a.chromaticity(), b.chromaticity());
                if (ca.x() - cb.x()).hypot(ca.y() - cb.y()) <= EPSILON {
                    return Err(MixError::InvalidPalette(format!(
                        "{} and {} have the same chromaticity",
                        b.name(),
                        a.name()
                    )));
                }
            }
        }
        Ok(Palette { primaries })
    }

    pub fn reference() -> Result<Palette, MixError> {
        let primaries = REFERENCE_PRIMARIES
            .iter()
            .map(|&(name, x, y, capacity)| Primary::new(name, Chromaticity::new(x, y), capacity))
            .collect::<Result<Vec<Primary>, MixError>>()?;
        Palette::new(primaries)
    }

    pub fn len(&self) -> usize {
        self.primaries.len()
    }

    /// Always false, a palette has at least one primary
    pub fn is_empty(&self) -> bool {
        self.primaries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Primary> {
        self.primaries.get(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.primaries.iter().position(|p| p.name() == name)
    }

    pub fn primaries(&self) -> &[Primary] {
        &self.primaries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Primary> {
        self.primaries.iter()
    }
}

impl std::ops::Index<usize> for Palette {
    type Output = Primary;
    fn index(&self, index: usize) -> &Primary {
        &self.primaries[index]
    }
}
