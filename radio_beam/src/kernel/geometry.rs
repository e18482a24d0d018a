//! Ellipse geometry helpers used to size kernels.

/// Half-extents `(dx, dy)` of the axis-aligned box enclosing an ellipse with
/// semi-axes `a`, `b` rotated by `theta` radians.
///
/// ```
/// use radio_beam::kernel::ellipse_extent;
///
/// let (dx, dy) = ellipse_extent(30.0, 10.0, 0.0);
/// assert!((dx - 30.0).abs() < 1e-12 && (dy - 10.0).abs() < 1e-12);
/// ```
pub fn ellipse_extent(a: f64, b: f64, theta: f64) -> (f64, f64) {
    let (sin_t, cos_t) = theta.sin_cos();
    let tan_t = theta.tan();

    let t = (-b * tan_t).atan2(a);
    let dx = a * t.cos() * cos_t - b * t.sin() * sin_t;

    let t = b.atan2(a * tan_t);
    let dy = b * t.sin() * cos_t + a * t.cos() * sin_t;

    (dx.abs(), dy.abs())
}

/// Round up to the nearest odd integer.
pub fn round_up_to_odd(value: f64) -> usize {
    let n = value.ceil().max(0.0) as usize;
    if n % 2 == 0 {
        n + 1
    } else {
        n
    }
}
