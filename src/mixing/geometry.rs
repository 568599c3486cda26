//! Point, segment and triangle membership in chromaticity space

use crate::color::chromaticity::Chromaticity;

/// Distance in chromaticity units treated as zero
pub const EPSILON: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub enum Containment {
    /// Barycentric coordinates, one per vertex, non-negative and summing to 1
    Inside(Vec<f64>),
    Outside,
    /// Coincident segment ends or collinear triangle
    Degenerate,
}

/// Locate `p` relative to the figure spanned by 1 to 3 vertices.
pub fn locate(vertices: &[Chromaticity], p: Chromaticity) -> Containment {
    match vertices {
        [a] => point(*a, p),
        [a, b] => segment(*a, *b, p),
        [a, b, c] => triangle(*a, *b, *c, p),
        _ => Containment::Degenerate,
    }
}

fn point(a: Chromaticity, p: Chromaticity) -> Containment {
    if (p.x() - a.x()).hypot(p.y() - a.y()) <= EPSILON {
        Containment::Inside(vec![1.0])
    } else {
        Containment::Outside
    }
}

fn segment(a: Chromaticity, b: Chromaticity, p: Chromaticity) -> Containment {
    let (dx, dy) = (b.x() - a.x(), b.y() - a.y());
    let (px, py) = (p.x() - a.x(), p.y() - a.y());
    let len2 = dx * dx + dy * dy;
    let len = len2.sqrt();
    if len <= EPSILON {
        return Containment::Degenerate;
    }
    // Distance from the line
    if (dx * py - dy * px).abs() / len > EPSILON {
        return Containment::Outside;
    }
    let t = (px * dx + py * dy) / len2;
    let slack = EPSILON / len;
    if t < -slack || t > 1.0 + slack {
        return Containment::Outside;
    }
    let t = t.clamp(0.0, 1.0);
    Containment::Inside(vec![1.0 - t, t])
}

fn triangle(a: Chromaticity, b: Chromaticity, c: Chromaticity, p: Chromaticity) -> Containment {
    let (abx, aby) = (b.x() - a.x(), b.y() - a.y());
    let (acx, acy) = (c.x() - a.x(), c.y() - a.y());
    let (apx, apy) = (p.x() - a.x(), p.y() - a.y());
    let det = abx * acy - acx * aby;
    if det.abs() <= EPSILON {
        return Containment::Degenerate;
    }
    let wb = (apx * acy - acx * apy) / det;
    let wc = (abx * apy - apx * aby) / det;
    let wa = 1.0 - wb - wc;
    if wa < -EPSILON || wb < -EPSILON || wc < -EPSILON {
        return Containment::Outside;
    }
    let (wa, wb, wc) = (wa.max(0.0), wb.max(0.0), wc.max(0.0));
    let sum = wa + wb + wc;
    Containment::Inside(vec![wa / sum, wb / sum, wc / sum])
}
