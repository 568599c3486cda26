use crate::color::chromaticity::{Chromaticity, Color, Tristimulus};
use crate::error::MixError;
use crate::fixture::palette::Palette;
use crate::mixing::geometry::{self, Containment};
use crate::utils::combinations;
use log::{debug, trace};
use std::sync::Arc;

/// Largest subset tried. A point, a segment or a triangle.
pub const MAX_FIGURE_SIZE: usize = 3;

/// Relative overshoot of a primary's capacity accepted as rounding error
const CAPACITY_TOLERANCE: f64 = 1e-9;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Contribution {
    /// Index in the palette
    pub primary: usize,
    pub luminance: f64,
}

/// Luminance per primary. Only primaries with non-zero output are present,
/// in palette order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Allocation {
    entries: Vec<Contribution>,
}

impl Allocation {
    pub fn new() -> Allocation {
        Allocation {
            entries: Vec::new(),
        }
    }

    /// Set the luminance of the primary at `index`. Zero removes it.
    pub fn insert(&mut self, index: usize, luminance: f64) {
        match self.entries.binary_search_by_key(&index, |c| c.primary) {
            Ok(pos) if luminance == 0.0 => {
                self.entries.remove(pos);
            }
            Ok(pos) => self.entries[pos].luminance = luminance,
            Err(_) if luminance == 0.0 => {}
            Err(pos) => self.entries.insert(
                pos,
                Contribution {
                    primary: index,
                    luminance,
                },
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Contribution> {
        self.entries.iter()
    }

    /// Luminance of the primary at `index`, if it contributes
    pub fn get(&self, index: usize) -> Option<f64> {
        self.entries
            .iter()
            .find(|c| c.primary == index)
            .map(|c| c.luminance)
    }

    pub fn total_luminance(&self) -> f64 {
        self.entries.iter().map(|c| c.luminance).sum()
    }

    /// Sum of the contributions in tristimulus space
    pub fn tristimulus(&self, palette: &Palette) -> Tristimulus {
        let mut sum = Tristimulus::default();
        for c in &self.entries {
            sum += palette[c.primary].unit_tristimulus() * c.luminance;
        }
        sum
    }

    /// (name, luminance) pairs
    pub fn named<'a>(&self, palette: &'a Palette) -> Vec<(&'a str, f64)> {
        self.entries
            .iter()
            .map(|c| (palette[c.primary].name(), c.luminance))
            .collect()
    }
}

/// Result of solving one subset
enum Solution {
    Feasible(Allocation),
    /// (index of the most overloaded primary, luminance it would need)
    Overloaded(usize, f64),
}

/// Splits a target color between the primaries of a palette.
///
/// The fewest primaries that can reproduce the color are used and among
/// those the ones earliest in the palette win.
#[derive(Clone, Debug)]
pub struct MixingAllocator {
    palette: Arc<Palette>,
}

impl MixingAllocator {
    pub fn new(palette: Arc<Palette>) -> MixingAllocator {
        MixingAllocator { palette }
    }

    pub fn palette(&self) -> &Arc<Palette> {
        &self.palette
    }

    fn candidates(&self) -> impl Iterator<Item = Vec<usize>> {
        combinations::by_size(self.palette.len(), MAX_FIGURE_SIZE)
    }

    /// Barycentric weights of `target` in the figure spanned by `subset`
    fn weights(&self, subset: &[usize], target: Chromaticity) -> Option<Vec<f64>> {
        let vertices: Vec<Chromaticity> = subset
            .iter()
            .map(|&i| self.palette[i].chromaticity())
            .collect();
        match geometry::locate(&vertices, target) {
            Containment::Inside(w) => Some(w),
            Containment::Outside | Containment::Degenerate => None,
        }
    }

    /// Luminance each primary in the subset must deliver per unit of target
    /// luminance. A mix's chromaticity is weighted by X + Y + Z = Y / y, so
    /// a primary with barycentric weight w needs w * y_primary / y_target.
    fn unit_luminances<'a>(
        &'a self,
        subset: &'a [usize],
        weights: &'a [f64],
        target: Chromaticity,
    ) -> impl Iterator<Item = (usize, f64)> + 'a {
        subset.iter().zip(weights).map(move |(&i, &w)| {
            (i, w * self.palette[i].chromaticity().y() / target.y())
        })
    }

    /// Highest target luminance the subset delivers before a primary saturates
    fn limit(&self, subset: &[usize], weights: &[f64], target: Chromaticity) -> f64 {
        self.unit_luminances(subset, weights, target)
            .filter(|&(_, unit)| unit > 0.0)
            .map(|(i, unit)| self.palette[i].capacity() / unit)
            .fold(f64::INFINITY, f64::min)
    }

    fn solve(&self, subset: &[usize], weights: &[f64], color: &Color) -> Solution {
        let mut allocation = Allocation::new();
        let mut worst: Option<(usize, f64, f64)> = None;
        for (i, unit) in self.unit_luminances(subset, weights, color.chromaticity) {
            let luminance = unit * color.luminance;
            if luminance <= 0.0 {
                continue;
            }
            let capacity = self.palette[i].capacity();
            let load = luminance / capacity;
            if load > 1.0 + CAPACITY_TOLERANCE && worst.map_or(true, |(_, _, l)| load > l) {
                worst = Some((i, luminance, load));
            }
            allocation.entries.push(Contribution {
                primary: i,
                luminance: luminance.min(capacity),
            });
        }
        match worst {
            Some((i, luminance, _)) => Solution::Overloaded(i, luminance),
            None => Solution::Feasible(allocation),
        }
    }

    /// Find the luminance of each primary needed to produce `color`.
    ///
    /// # Errors
    /// * `DegenerateChromaticity` - y of the target is 0
    /// * `InvalidColor` - target outside the xyY domain
    /// * `OutOfGamut` - no subset of primaries can produce the chromaticity
    /// * `CapacityExceeded` - the chromaticity can be produced, but not this bright
    pub fn allocate(&self, color: &Color) -> Result<Allocation, MixError> {
        color.to_tristimulus()?;
        if color.luminance == 0.0 {
            return Ok(Allocation::new());
        }
        // Limiting primary of the first containing subset
        let mut limiting: Option<usize> = None;
        let mut available = 0.0f64;
        for subset in self.candidates() {
            let Some(weights) = self.weights(&subset, color.chromaticity) else {
                continue;
            };
            match self.solve(&subset, &weights, color) {
                Solution::Feasible(allocation) => {
                    debug!(
                        "{:?} mixed from {:?}",
                        color,
                        allocation.named(&self.palette)
                    );
                    return Ok(allocation);
                }
                Solution::Overloaded(i, luminance) => {
                    let primary = &self.palette[i];
                    trace!(
                        "Subset {:?} rejected, {} needs {:.3} of {:.3}",
                        subset,
                        primary.name(),
                        luminance,
                        primary.capacity()
                    );
                    limiting.get_or_insert(i);
                    let limit = self.limit(&subset, &weights, color.chromaticity);
                    available = available.max(limit);
                }
            }
        }
        match limiting {
            Some(i) => Err(MixError::CapacityExceeded {
                primary: self.palette[i].name().to_string(),
                requested: color.luminance,
                available,
            }),
            None => Err(MixError::OutOfGamut {
                x: color.chromaticity.x(),
                y: color.chromaticity.y(),
            }),
        }
    }

    /// True if some combination of primaries produces the chromaticity
    pub fn contains(&self, target: Chromaticity) -> bool {
        target.validate().is_ok()
            && target.y() > 0.0
            && self
                .candidates()
                .any(|subset| self.weights(&subset, target).is_some())
    }

    /// Highest luminance [`MixingAllocator::allocate`] accepts for this
    /// chromaticity.
    pub fn max_luminance(&self, target: Chromaticity) -> Result<f64, MixError> {
        target.unit_tristimulus()?;
        target.validate()?;
        let mut best: Option<f64> = None;
        for subset in self.candidates() {
            let Some(weights) = self.weights(&subset, target) else {
                continue;
            };
            let limit = self.limit(&subset, &weights, target);
            if best.map_or(true, |b| limit > b) {
                best = Some(limit);
            }
        }
        best.ok_or(MixError::OutOfGamut {
            x: target.x(),
            y: target.y(),
        })
    }
}

#[cfg(test)]
mod test {
    use super::{Allocation, MixingAllocator};
    use crate::color::chromaticity::{Chromaticity, Color};
    use crate::error::MixError;
    use crate::fixture::palette::Palette;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    const WHITE: usize = 0;
    const GREEN: usize = 1;
    const RED: usize = 2;
    const BLUE: usize = 3;

    fn reference() -> MixingAllocator {
        MixingAllocator::new(Arc::new(Palette::reference().unwrap()))
    }

    fn check_exact(alloc: &MixingAllocator, color: &Color, a: &Allocation) {
        let target = color.to_tristimulus().unwrap();
        let mixed = a.tristimulus(alloc.palette());
        assert!(
            target.max_abs_diff(&mixed) < 1e-6,
            "{:?} mixed to {:?}",
            target,
            mixed
        );
        for c in a.iter() {
            assert!(c.luminance > 0.0);
            assert!(c.luminance <= alloc.palette()[c.primary].capacity());
        }
    }

    #[test]
    fn degenerate_target() {
        let alloc = reference();
        assert_eq!(
            alloc.allocate(&Color::new(0.3, 0.0, 10.0)),
            Err(MixError::DegenerateChromaticity)
        );
        assert_eq!(
            alloc.max_luminance(Chromaticity::new(0.3, 0.0)),
            Err(MixError::DegenerateChromaticity)
        );
    }

    #[test]
    fn single_primary() {
        let alloc = reference();
        for (i, p) in alloc.palette().iter().enumerate() {
            let c = p.chromaticity();
            for luminance in [1.0, p.capacity() / 2.0, p.capacity()] {
                let a = alloc
                    .allocate(&Color::new(c.x(), c.y(), luminance))
                    .unwrap();
                assert_eq!(a.len(), 1, "{}", p.name());
                assert_eq!(a.get(i), Some(luminance));
            }
        }
    }

    #[test]
    fn inside_white_red_blue() {
        let alloc = reference();
        let p = alloc.palette();
        let (w, r, b) = (
            p[WHITE].chromaticity(),
            p[RED].chromaticity(),
            p[BLUE].chromaticity(),
        );
        let color = Color::new(
            (w.x() + r.x() + b.x()) / 3.0,
            (w.y() + r.y() + b.y()) / 3.0,
            50.0,
        );
        let a = alloc.allocate(&color).unwrap();
        assert!(a.len() <= 3);
        check_exact(&alloc, &color, &a);
        assert!((a.total_luminance() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_gamut() {
        let alloc = reference();
        for (x, y) in [(0.1, 0.8), (0.33, 0.02), (0.7, 0.25), (0.05, 0.3)] {
            assert_eq!(
                alloc.allocate(&Color::new(x, y, 10.0)),
                Err(MixError::OutOfGamut { x, y })
            );
            assert!(!alloc.contains(Chromaticity::new(x, y)));
            assert!(alloc.max_luminance(Chromaticity::new(x, y)).is_err());
        }
    }

    #[test]
    fn zero_luminance() {
        let alloc = reference();
        assert_eq!(alloc.allocate(&Color::new(0.3, 0.3, 0.0)), Ok(Allocation::new()));
        // Out of gamut is irrelevant for black
        assert!(alloc.allocate(&Color::new(0.1, 0.8, 0.0)).unwrap().is_empty());
    }

    #[test]
    fn hull_edge_uses_two_primaries() {
        let alloc = reference();
        let p = alloc.palette();
        let (r, b) = (p[RED].chromaticity(), p[BLUE].chromaticity());
        let color = Color::new((r.x() + b.x()) / 2.0, (r.y() + b.y()) / 2.0, 100.0);
        let a = alloc.allocate(&color).unwrap();
        let names: Vec<&str> = a.named(p).iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["red", "blue"]);
        check_exact(&alloc, &color, &a);
        // Blue is 5 times darker per unit of X + Y + Z
        assert!((a.get(RED).unwrap() - 250.0 / 3.0).abs() < 1e-9);
        assert!((a.get(BLUE).unwrap() - 50.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn capacity_exceeded() {
        let alloc = reference();
        let b = alloc.palette()[BLUE].chromaticity();
        assert_eq!(
            alloc.allocate(&Color::new(b.x(), b.y(), 200.0)),
            Err(MixError::CapacityExceeded {
                primary: "blue".to_string(),
                requested: 200.0,
                available: 120.0
            })
        );
        assert_eq!(alloc.max_luminance(b), Ok(120.0));
    }

    #[test]
    fn saturated_white_falls_back() {
        let alloc = reference();
        let w = alloc.palette()[WHITE].chromaticity();
        let a = alloc.allocate(&Color::new(w.x(), w.y(), 600.0)).unwrap();
        assert_eq!(a.get(WHITE), Some(600.0));
        assert_eq!(a.len(), 1);

        let color = Color::new(w.x(), w.y(), 700.0);
        let a = alloc.allocate(&color).unwrap();
        assert_eq!(a.get(WHITE), None);
        assert!(a.get(GREEN).is_some());
        assert!(a.get(RED).is_some());
        assert!(a.get(BLUE).is_some());
        check_exact(&alloc, &color, &a);
    }

    #[test]
    fn max_luminance_is_the_limit() {
        let alloc = reference();
        let c = Chromaticity::new(0.35, 0.3);
        let max = alloc.max_luminance(c).unwrap();
        assert!(max > 0.0);
        let color = Color::new(c.x(), c.y(), max);
        let a = alloc.allocate(&color).unwrap();
        check_exact(&alloc, &color, &a);
        assert!(matches!(
            alloc.allocate(&Color::new(c.x(), c.y(), max * 1.001)),
            Err(MixError::CapacityExceeded { .. })
        ));
    }

    #[test]
    fn capacity_error_reports_what_is_available() {
        let alloc = reference();
        let c = Chromaticity::new(0.35, 0.3);
        let max = alloc.max_luminance(c).unwrap();
        match alloc.allocate(&Color::new(c.x(), c.y(), 2.0 * max)) {
            Err(MixError::CapacityExceeded {
                primary,
                requested,
                available,
            }) => {
                assert_eq!(primary, "white");
                assert_eq!(requested, 2.0 * max);
                assert_eq!(available, max);
            }
            r => panic!("Unexpected result {:?}", r),
        }
    }

    #[test]
    fn deterministic() {
        let alloc = reference();
        let color = Color::new(0.4, 0.35, 321.0);
        let a = alloc.allocate(&color).unwrap();
        let b = reference().allocate(&color).unwrap();
        assert_eq!(a, b);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.luminance.to_bits(), y.luminance.to_bits());
        }
    }

    #[test]
    fn random_targets() {
        let alloc = reference();
        let mut rng = StdRng::seed_from_u64(0x1ed1a3);
        let mut mixed = 0;
        for _ in 0..2000 {
            let x: f64 = rng.gen_range(0.0..0.75);
            let y = rng.gen_range(0.01..(1.0 - x).min(0.85));
            let luminance = rng.gen_range(0.0..800.0);
            let color = Color::new(x, y, luminance);
            let result = alloc.allocate(&color);
            assert_eq!(result, alloc.allocate(&color));
            match result {
                Ok(a) => {
                    check_exact(&alloc, &color, &a);
                    mixed += 1;
                }
                Err(MixError::OutOfGamut { .. }) => {
                    assert!(!alloc.contains(color.chromaticity));
                }
                Err(MixError::CapacityExceeded {
                    requested,
                    available,
                    ..
                }) => {
                    let max = alloc.max_luminance(color.chromaticity).unwrap();
                    assert!(max < luminance);
                    assert_eq!(requested, luminance);
                    assert_eq!(available, max);
                }
                Err(e) => panic!("Unexpected error: {}", e),
            }
        }
        assert!(mixed > 100);
    }
}
