use crate::path::Path;
use crate::types::Matrix;

const TWO_PI: f64 = std::f64::consts::PI * 2.0;

/// Appends the SVG elliptical arc from `(last_x, last_y)` to `(x, y)` as
/// cubic Beziers, via the endpoint-to-center parameterization from the
/// SVG 1.1 implementation notes.
///
/// Degenerate inputs take the documented fallbacks instead of failing:
/// identical endpoints append nothing, a zero radius appends a line, radii
/// too small for the chord are scaled up, and a zero sweep collapses to a
/// line. Internal math runs in f64; the final endpoint is snapped exactly
/// to the requested coordinates to cancel accumulated rounding (observed
/// drift is around 2e-5 otherwise).
pub(crate) fn arc_to(
    path: &mut Path,
    last_x: f32,
    last_y: f32,
    rx: f32,
    ry: f32,
    angle: f32,
    large_arc: bool,
    sweep: bool,
    x: f32,
    y: f32,
) {
    if last_x == x && last_y == y {
        // Identical endpoints mean the arc segment is omitted entirely.
        return;
    }

    if rx == 0.0 || ry == 0.0 {
        path.line_to(x, y);
        return;
    }

    // The sign of the radii is ignored.
    let mut rx = rx.abs();
    let mut ry = ry.abs();

    let angle_rad = ((angle as f64) % 360.0).to_radians();
    let cos_angle = libm::cos(angle_rad);
    let sin_angle = libm::sin(angle_rad);

    // Move the origin to the chord midpoint and rotate the axes onto the
    // ellipse axes.
    let dx2 = (last_x as f64 - x as f64) / 2.0;
    let dy2 = (last_y as f64 - y as f64) / 2.0;

    let x1 = cos_angle * dx2 + sin_angle * dy2;
    let y1 = -sin_angle * dx2 + cos_angle * dy2;

    let mut rx_sq = (rx * rx) as f64;
    let mut ry_sq = (ry * ry) as f64;
    let x1_sq = x1 * x1;
    let y1_sq = y1 * y1;

    // Radii too small for the chord are scaled up, with a little slack for
    // rounding differences between implementations.
    let radii_check = x1_sq / rx_sq + y1_sq / ry_sq;
    if radii_check > 0.99999 {
        let radii_scale = libm::sqrt(radii_check) * 1.00001;
        rx = (radii_scale * rx as f64) as f32;
        ry = (radii_scale * ry as f64) as f32;
        rx_sq = (rx * rx) as f64;
        ry_sq = (ry * ry) as f64;
    }

    // Transformed center point.
    let sign = if large_arc == sweep { -1.0 } else { 1.0 };
    let mut sq = ((rx_sq * ry_sq) - (rx_sq * y1_sq) - (ry_sq * x1_sq))
        / ((rx_sq * y1_sq) + (ry_sq * x1_sq));
    if sq < 0.0 {
        sq = 0.0;
    }
    let coef = sign * libm::sqrt(sq);
    let cx1 = coef * ((rx as f64 * y1) / ry as f64);
    let cy1 = coef * -((ry as f64 * x1) / rx as f64);

    // Center in the original coordinates.
    let sx2 = (last_x as f64 + x as f64) / 2.0;
    let sy2 = (last_y as f64 + y as f64) / 2.0;
    let cx = sx2 + (cos_angle * cx1 - sin_angle * cy1);
    let cy = sy2 + (sin_angle * cx1 + cos_angle * cy1);

    // Start angle and sweep extent. The angle between two vectors is
    // +/- acos(u.v / |u||v|), signed by the cross product.
    let ux = (x1 - cx1) / rx as f64;
    let uy = (y1 - cy1) / ry as f64;
    let vx = (-x1 - cx1) / rx as f64;
    let vy = (-y1 - cy1) / ry as f64;

    let n = libm::sqrt(ux * ux + uy * uy);
    let p = ux;
    let sign = if uy < 0.0 { -1.0 } else { 1.0 };
    let mut angle_start = sign * checked_acos(p / n);

    let n = libm::sqrt((ux * ux + uy * uy) * (vx * vx + vy * vy));
    let p = ux * vx + uy * vy;
    let sign = if ux * vy - uy * vx < 0.0 { -1.0 } else { 1.0 };
    let mut angle_extent = sign * checked_acos(p / n);

    // A zero extent would break the segment subdivision below.
    if angle_extent == 0.0 {
        path.line_to(x, y);
        return;
    }

    if !sweep && angle_extent > 0.0 {
        angle_extent -= TWO_PI;
    } else if sweep && angle_extent < 0.0 {
        angle_extent += TWO_PI;
    }
    angle_extent %= TWO_PI;
    angle_start %= TWO_PI;

    // Axis-aligned unit-circle beziers covering the swept angles, then
    // scaled, rotated and moved into place.
    let mut bezier_points = arc_to_beziers(angle_start, angle_extent);

    let m = Matrix::translate(cx as f32, cy as f32)
        .mul(Matrix::rotate(angle))
        .mul(Matrix::scale(rx, ry));
    for pair in bezier_points.chunks_exact_mut(2) {
        let (px, py) = m.apply(pair[0], pair[1]);
        pair[0] = px;
        pair[1] = py;
    }

    // The mathematical endpoint is bound to be off by a tiny fraction, so
    // pin it to exactly what was asked for.
    let len = bezier_points.len();
    if len >= 2 {
        bezier_points[len - 2] = x;
        bezier_points[len - 1] = y;
    }

    for c in bezier_points.chunks_exact(6) {
        path.cubic_to(c[0], c[1], c[2], c[3], c[4], c[5]);
    }
}

/// `acos` with the input pinned to `[-1, 1]` so rounding drift cannot
/// produce NaN: below the range reads as pi, above as zero.
fn checked_acos(val: f64) -> f64 {
    if val < -1.0 {
        std::f64::consts::PI
    } else if val > 1.0 {
        0.0
    } else {
        libm::acos(val)
    }
}

/// Control points and endpoints for unit-circle beziers sweeping
/// `angle_extent` from `angle_start`, centered on the origin. Each curve
/// covers at most a quarter turn, so the sweep divides into at most four
/// segments. The returned coordinates exclude the start point.
fn arc_to_beziers(angle_start: f64, angle_extent: f64) -> Vec<f32> {
    let num_segments = libm::ceil(angle_extent.abs() * 2.0 / std::f64::consts::PI) as usize;

    let angle_increment = angle_extent / num_segments as f64;
    let control_length =
        4.0 / 3.0 * libm::sin(angle_increment / 2.0) / (1.0 + libm::cos(angle_increment / 2.0));

    let mut coords = Vec::with_capacity(num_segments * 6);
    for i in 0..num_segments {
        let mut angle = angle_start + i as f64 * angle_increment;
        let mut dx = libm::cos(angle);
        let mut dy = libm::sin(angle);
        // First control point.
        coords.push((dx - control_length * dy) as f32);
        coords.push((dy + control_length * dx) as f32);
        // Second control point.
        angle += angle_increment;
        dx = libm::cos(angle);
        dy = libm::sin(angle);
        coords.push((dx + control_length * dy) as f32);
        coords.push((dy - control_length * dx) as f32);
        // Endpoint.
        coords.push(dx as f32);
        coords.push(dy as f32);
    }
    coords
}
