//! Joint geometry helpers used by the strike detector.

use crate::models::Landmark;

/// Angle at `vertex` between the rays toward `a` and `b`, in degrees [0, 180].
pub fn angle(a: &Landmark, vertex: &Landmark, b: &Landmark) -> f64 {
    let radians = (b.y - vertex.y).atan2(b.x - vertex.x) - (a.y - vertex.y).atan2(a.x - vertex.x);
    let degrees = radians.to_degrees().abs();

    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Planar distance in normalized frame space; depth is ignored.
pub fn distance(a: &Landmark, b: &Landmark) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}
