/// 2x3 affine transform. Column-vector convention:
/// `x' = a*x + c*y + e`, `y' = b*x + d*y + f`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn translate(tx: f32, ty: f32) -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: tx,
            f: ty,
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: sy,
            e: 0.0,
            f: 0.0,
        }
    }

    pub fn rotate(deg: f32) -> Self {
        let rad = deg.to_radians();
        let s = libm::sinf(rad);
        let c = libm::cosf(rad);
        Self {
            a: c,
            b: s,
            c: -s,
            d: c,
            e: 0.0,
            f: 0.0,
        }
    }

    /// Matrix from `[a, b, c, d, e, f]` as produced by transform lists.
    pub fn from_values(values: [f32; 6]) -> Self {
        Self {
            a: values[0],
            b: values[1],
            c: values[2],
            d: values[3],
            e: values[4],
            f: values[5],
        }
    }

    /// `[self] * [other]`. `other` applies first, so concatenating a local
    /// transform onto a state transform is `state.mul(local)`.
    pub fn mul(self, other: Self) -> Self {
        Self {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn apply(self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    pub fn is_identity(self) -> bool {
        self == Self::identity()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::identity()
    }
}

/// Axis-aligned rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// 32-bit ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const TRANSPARENT: Color = Color(0);

    pub fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(0xFF, r, g, b)
    }

    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Scales the alpha channel by `opacity`, rounding, clamped to
    /// `[0, 255]`. RGB channels pass through untouched.
    pub fn with_opacity(self, opacity: f32) -> Color {
        let alpha = ((self.alpha() as f32 * opacity).round() as i32).clamp(0, 255) as u32;
        Color((alpha << 24) | (self.0 & 0x00FF_FFFF))
    }
}

/// Maps a fractional opacity onto an 8-bit coverage value: `(opacity * 256)`
/// truncated, clamped to `[0, 255]`, so 1.0 saturates at 255.
pub fn clamp_opacity(opacity: f32) -> u8 {
    ((opacity * 256.0) as i32).clamp(0, 255) as u8
}

/// Per-axis placement of a view box inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    None,
    Min,
    #[default]
    Mid,
    Max,
}

/// How the view box scale is chosen: `None` stretches per axis, `Meet` fits
/// the whole box inside the viewport, `Slice` covers the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMode {
    None,
    #[default]
    Meet,
    Slice,
}

/// Transform mapping `view_box` coordinates into `viewport`.
///
/// A degenerate view box (zero or negative extent) maps to identity rather
/// than dividing by zero.
pub fn view_box_transform(
    viewport: Rect,
    view_box: Rect,
    align_x: Align,
    align_y: Align,
    scale: ScaleMode,
) -> Matrix {
    if view_box.width <= 0.0 || view_box.height <= 0.0 {
        return Matrix::identity();
    }

    let x_scale = viewport.width / view_box.width;
    let y_scale = viewport.height / view_box.height;
    let mut x_offset = -view_box.x;
    let mut y_offset = -view_box.y;

    if scale == ScaleMode::None {
        return Matrix::translate(viewport.x, viewport.y)
            .mul(Matrix::scale(x_scale, y_scale))
            .mul(Matrix::translate(x_offset, y_offset));
    }

    let uniform = match scale {
        ScaleMode::Slice => x_scale.max(y_scale),
        _ => x_scale.min(y_scale),
    };

    match align_x {
        Align::Mid => x_offset -= (view_box.width - viewport.width / uniform) / 2.0,
        Align::Max => x_offset -= view_box.width - viewport.width / uniform,
        Align::None | Align::Min => {}
    }
    match align_y {
        Align::Mid => y_offset -= (view_box.height - viewport.height / uniform) / 2.0,
        Align::Max => y_offset -= view_box.height - viewport.height / uniform,
        Align::None | Align::Min => {}
    }

    Matrix::translate(viewport.x, viewport.y)
        .mul(Matrix::scale(uniform, uniform))
        .mul(Matrix::translate(x_offset, y_offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_mul_applies_right_operand_first() {
        let m = Matrix::translate(10.0, 0.0).mul(Matrix::scale(2.0, 2.0));
        // Scale first, then translate.
        assert_eq!(m.apply(3.0, 4.0), (16.0, 8.0));

        let n = Matrix::scale(2.0, 2.0).mul(Matrix::translate(10.0, 0.0));
        assert_eq!(n.apply(3.0, 4.0), (26.0, 8.0));
    }

    #[test]
    fn matrix_rotate_quarter_turn() {
        let m = Matrix::rotate(90.0);
        let (x, y) = m.apply(1.0, 0.0);
        assert!(x.abs() < 1e-6);
        assert!((y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn matrix_from_values_matches_field_order() {
        let m = Matrix::from_values([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.apply(1.0, 0.0), (6.0, 8.0));
        assert_eq!(m.apply(0.0, 1.0), (8.0, 10.0));
    }

    #[test]
    fn color_with_opacity_scales_alpha_only() {
        let c = Color(0x80FF_0000).with_opacity(0.5);
        assert_eq!(c.0, 0x40FF_0000);

        let opaque = Color(0xFF11_2233).with_opacity(2.0);
        assert_eq!(opaque.alpha(), 0xFF);
        assert_eq!(opaque.0 & 0x00FF_FFFF, 0x0011_2233);

        let gone = Color(0xFF11_2233).with_opacity(-1.0);
        assert_eq!(gone.alpha(), 0);
    }

    #[test]
    fn clamp_opacity_saturates_at_the_ends() {
        assert_eq!(clamp_opacity(1.0), 255);
        assert_eq!(clamp_opacity(0.0), 0);
        assert_eq!(clamp_opacity(-0.5), 0);
        assert_eq!(clamp_opacity(0.5), 128);
        assert_eq!(clamp_opacity(1.5), 255);
    }

    #[test]
    fn view_box_mid_meet_centers_square_into_square() {
        let m = view_box_transform(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Align::Mid,
            Align::Mid,
            ScaleMode::Meet,
        );
        assert_eq!(m.a, 2.0);
        assert_eq!(m.d, 2.0);
        assert_eq!(m.e, 0.0);
        assert_eq!(m.f, 0.0);
    }

    #[test]
    fn view_box_meet_picks_smaller_scale_and_centers() {
        let m = view_box_transform(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Align::Mid,
            Align::Mid,
            ScaleMode::Meet,
        );
        assert_eq!(m.a, 1.0);
        // Centered horizontally: the 50-wide box sits at x 25 in a 100-wide viewport.
        assert_eq!(m.e, 25.0);
        assert_eq!(m.f, 0.0);
    }

    #[test]
    fn view_box_slice_picks_larger_scale_and_crops() {
        let m = view_box_transform(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Align::Mid,
            Align::Mid,
            ScaleMode::Slice,
        );
        assert_eq!(m.a, 2.0);
        assert_eq!(m.e, 0.0);
        assert_eq!(m.f, -25.0);
    }

    #[test]
    fn view_box_scale_none_stretches_both_axes() {
        let m = view_box_transform(
            Rect::new(10.0, 20.0, 100.0, 50.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Align::Mid,
            Align::Mid,
            ScaleMode::None,
        );
        assert_eq!(m.a, 2.0);
        assert_eq!(m.d, 1.0);
        assert_eq!(m.e, 10.0);
        assert_eq!(m.f, 20.0);
    }

    #[test]
    fn view_box_align_max_pushes_to_far_edge() {
        let m = view_box_transform(
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Align::Max,
            Align::Min,
            ScaleMode::Meet,
        );
        // x offset: -(50 - 100/1) = 50.
        assert_eq!(m.e, 50.0);
        assert_eq!(m.f, 0.0);
    }

    #[test]
    fn view_box_origin_offset_is_subtracted() {
        let m = view_box_transform(
            Rect::new(0.0, 0.0, 50.0, 50.0),
            Rect::new(10.0, 5.0, 50.0, 50.0),
            Align::Min,
            Align::Min,
            ScaleMode::Meet,
        );
        assert_eq!(m.apply(10.0, 5.0), (0.0, 0.0));
    }

    #[test]
    fn degenerate_view_box_maps_to_identity() {
        let m = view_box_transform(
            Rect::new(0.0, 0.0, 100.0, 100.0),
            Rect::new(0.0, 0.0, 0.0, 50.0),
            Align::Mid,
            Align::Mid,
            ScaleMode::Meet,
        );
        assert!(m.is_identity());
    }
}
