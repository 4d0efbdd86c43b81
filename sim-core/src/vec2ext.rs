//! Small geometry helpers on top of [`glam::Vec2`].
//!
//! glam already covers arithmetic, normalization
//! ([`Vec2::normalize_or_zero`] handles the zero vector) and magnitude
//! limiting ([`Vec2::clamp_length_max`]); this module adds the two
//! operations a wrap-around world needs.

use glam::Vec2;

/// Distance between two points, optionally on a torus.
///
/// With `wrap > 0` the world's opposite edges are treated as adjacent:
/// per axis the separation is `min(d, wrap - d)` where `d = |Δ| mod wrap`.
/// With `wrap <= 0` this is plain Euclidean distance, so callers opt in
/// to toroidal behavior explicitly.
pub fn torus_distance(a: Vec2, b: Vec2, wrap: f32) -> f32 {
    if wrap <= 0.0 {
        return a.distance(b);
    }
    let dx = axis_separation(a.x - b.x, wrap);
    let dy = axis_separation(a.y - b.y, wrap);
    (dx * dx + dy * dy).sqrt()
}

fn axis_separation(delta: f32, wrap: f32) -> f32 {
    let d = delta.abs().rem_euclid(wrap);
    d.min(wrap - d)
}

/// Maps a position into `[0, size)` on both axes.
///
/// `rem_euclid` handles negative overflow, so this is the
/// `(c + size) % size` wrap generalized to arbitrary magnitudes.
pub fn wrap_to(v: Vec2, size: f32) -> Vec2 {
    Vec2::new(v.x.rem_euclid(size), v.y.rem_euclid(size))
}
