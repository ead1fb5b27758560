use std::sync::Arc;

use rustybuzz::{Face as HbFace, UnicodeBuffer};
use tiny_skia::{
    FillRule as SkFillRule, FilterQuality, GradientStop, LineCap as SkLineCap,
    LineJoin as SkLineJoin, LinearGradient, Mask, Paint, Path as SkPath, PathBuilder, Pixmap,
    PixmapPaint, Point, RadialGradient, Shader, SpreadMode as SkSpreadMode, Stroke, StrokeDash,
    Transform,
};
use ttf_parser::{GlyphId, OutlineBuilder};

use crate::assets::Bitmap;
use crate::canvas::Canvas;
use crate::error::ResourceError;
use crate::font::{FontStore, StyledText, detect_direction};
use crate::gradient::{ResolvedStop, SpreadMode};
use crate::paint::{FillRule, LineCap, LineJoin, ResolvedBrush, ResolvedFill, ResolvedStroke};
use crate::path::{Path, PathSeg};
use crate::types::{Color, Matrix, clamp_opacity};

/// Per-frame backend state: the device transform and the accumulated clip.
/// Paint never lives here; every draw call arrives fully resolved.
#[derive(Clone)]
struct RasterState {
    transform: Transform,
    clip_mask: Option<Mask>,
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            clip_mask: None,
        }
    }
}

/// Rasterizing backend over a `tiny_skia::Pixmap`. One canvas pixel per
/// user unit; the y axis points down, matching the render pass.
pub struct PixmapCanvas {
    pixmap: Pixmap,
    state: RasterState,
    stack: Vec<RasterState>,
    fonts: Option<Arc<FontStore>>,
}

impl PixmapCanvas {
    /// White-backed surface. Returns `None` when either dimension is zero
    /// or the allocation is too large.
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Self::with_background(width, height, Color::WHITE)
    }

    pub fn with_background(width: u32, height: u32, background: Color) -> Option<Self> {
        let mut pixmap = Pixmap::new(width, height)?;
        pixmap.fill(to_sk_color(background, 1.0));
        Some(Self {
            pixmap,
            state: RasterState::default(),
            stack: Vec::new(),
            fonts: None,
        })
    }

    /// Installs the face source for text runs. Text draws are skipped
    /// while no store is installed or the store has no faces.
    pub fn set_font_store(&mut self, fonts: Arc<FontStore>) {
        self.fonts = Some(fonts);
    }

    /// Flood-fills the whole surface, discarding everything drawn so far.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(to_sk_color(color, 1.0));
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn into_png(self) -> Result<Vec<u8>, ResourceError> {
        self.pixmap
            .encode_png()
            .map_err(|err| ResourceError::new(format!("png encode failed: {err}")))
    }
}

impl Canvas for PixmapCanvas {
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.pre_translate(dx, dy);
    }

    fn concat(&mut self, matrix: &Matrix) {
        self.state.transform = self.state.transform.pre_concat(to_transform(matrix));
    }

    fn clip_path(&mut self, path: &Path, rule: FillRule) {
        let Some(sk_path) = convert_path(path) else {
            return;
        };
        let transform = self.state.transform;
        if let Some(mask) = self.state.clip_mask.as_mut() {
            mask.intersect_path(&sk_path, to_fill_rule(rule), true, transform);
            return;
        }
        let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) else {
            return;
        };
        mask.fill_path(&sk_path, to_fill_rule(rule), true, transform);
        self.state.clip_mask = Some(mask);
    }

    fn fill_path(&mut self, path: &Path, fill: &ResolvedFill) {
        let Some(sk_path) = convert_path(path) else {
            return;
        };
        let Some(paint) = brush_paint(&fill.brush) else {
            return;
        };
        self.pixmap.fill_path(
            &sk_path,
            &paint,
            to_fill_rule(fill.rule),
            self.state.transform,
            self.state.clip_mask.as_ref(),
        );
    }

    fn stroke_path(&mut self, path: &Path, stroke: &ResolvedStroke) {
        let Some(sk_path) = convert_path(path) else {
            return;
        };
        let Some(paint) = brush_paint(&stroke.brush) else {
            return;
        };
        let sk_stroke = build_stroke(stroke);
        self.pixmap.stroke_path(
            &sk_path,
            &paint,
            &sk_stroke,
            self.state.transform,
            self.state.clip_mask.as_ref(),
        );
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, placement: &Matrix) {
        let Some(source) = bitmap_pixmap(bitmap) else {
            return;
        };
        let mut paint = PixmapPaint::default();
        paint.quality = FilterQuality::Bilinear;
        let transform = self.state.transform.pre_concat(to_transform(placement));
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            transform,
            self.state.clip_mask.as_ref(),
        );
    }

    fn draw_text(&mut self, text: &StyledText, x: f32, y: f32) {
        let Some(fonts) = self.fonts.clone() else {
            return;
        };
        let Some(font_data) = fonts.primary_data() else {
            return;
        };
        let Ok(face) = ttf_parser::Face::parse(font_data, 0) else {
            return;
        };
        let units_per_em = face.units_per_em().max(1) as f32;

        let mut pen_x = x;
        for span in text.spans() {
            if span.size <= 0.0 {
                continue;
            }
            let scale = span.size / units_per_em;
            let paint = solid_paint(span.color);
            let (placements, next_x) =
                layout_span_glyphs(font_data, &span.text, span.size, pen_x, y);
            pen_x = next_x;
            for placement in placements {
                let mut builder =
                    GlyphPathBuilder::new(placement.origin_x, placement.origin_y, scale);
                if face.outline_glyph(placement.glyph, &mut builder).is_none() {
                    continue;
                }
                let Some(glyph_path) = builder.finish() else {
                    continue;
                };
                self.pixmap.fill_path(
                    &glyph_path,
                    &paint,
                    SkFillRule::Winding,
                    self.state.transform,
                    self.state.clip_mask.as_ref(),
                );
            }
        }
    }
}

#[derive(Clone, Copy)]
struct GlyphPlacement {
    glyph: GlyphId,
    origin_x: f32,
    origin_y: f32,
}

/// Shapes one span and returns glyph origins plus the advanced pen
/// position. Falls back to per-character layout when shaping fails.
fn layout_span_glyphs(
    font_data: &[u8],
    text: &str,
    size: f32,
    start_x: f32,
    baseline_y: f32,
) -> (Vec<GlyphPlacement>, f32) {
    let Some(face) = HbFace::from_slice(font_data, 0) else {
        return layout_span_unshaped(font_data, text, size, start_x, baseline_y);
    };
    let units_per_em = face.units_per_em().max(1) as f32;
    let scale = size / units_per_em;
    let mut buffer = UnicodeBuffer::new();
    buffer.set_direction(detect_direction(text));
    buffer.push_str(text);
    let output = rustybuzz::shape(&face, &[], buffer);
    let infos = output.glyph_infos();
    let positions = output.glyph_positions();
    if infos.is_empty() || infos.len() != positions.len() {
        return layout_span_unshaped(font_data, text, size, start_x, baseline_y);
    }

    let mut out = Vec::with_capacity(infos.len());
    let mut pen_x = start_x;
    for (info, pos) in infos.iter().zip(positions.iter()) {
        let gid = info.glyph_id as u16;
        if gid != 0 {
            out.push(GlyphPlacement {
                glyph: GlyphId(gid),
                origin_x: pen_x + pos.x_offset as f32 * scale,
                origin_y: baseline_y - pos.y_offset as f32 * scale,
            });
        }
        pen_x += pos.x_advance as f32 * scale;
    }
    (out, pen_x)
}

fn layout_span_unshaped(
    font_data: &[u8],
    text: &str,
    size: f32,
    start_x: f32,
    baseline_y: f32,
) -> (Vec<GlyphPlacement>, f32) {
    let Ok(face) = ttf_parser::Face::parse(font_data, 0) else {
        return (Vec::new(), start_x);
    };
    let units_per_em = face.units_per_em().max(1) as f32;
    let scale = size / units_per_em;

    let mut out = Vec::new();
    let mut pen_x = start_x;
    for ch in text.chars() {
        let Some(glyph) = face.glyph_index(ch) else {
            pen_x += size * 0.5;
            continue;
        };
        out.push(GlyphPlacement {
            glyph,
            origin_x: pen_x,
            origin_y: baseline_y,
        });
        let advance = face.glyph_hor_advance(glyph).unwrap_or(0) as f32 * scale;
        pen_x += if advance > 0.0 { advance } else { size * 0.5 };
    }
    (out, pen_x)
}

/// Builds a glyph outline in user space. Font units are y-up; the builder
/// flips them across the baseline while scaling.
struct GlyphPathBuilder {
    builder: PathBuilder,
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl GlyphPathBuilder {
    fn new(origin_x: f32, origin_y: f32, scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            origin_x,
            origin_y,
            scale,
        }
    }

    fn finish(self) -> Option<SkPath> {
        self.builder.finish()
    }
}

impl OutlineBuilder for GlyphPathBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            self.origin_x + x1 * self.scale,
            self.origin_y - y1 * self.scale,
            self.origin_x + x2 * self.scale,
            self.origin_y - y2 * self.scale,
            self.origin_x + x * self.scale,
            self.origin_y - y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

fn convert_path(path: &Path) -> Option<SkPath> {
    if path.is_empty() {
        return None;
    }
    let mut builder = PathBuilder::new();
    for seg in path.segments() {
        match *seg {
            PathSeg::MoveTo(x, y) => builder.move_to(x, y),
            PathSeg::LineTo(x, y) => builder.line_to(x, y),
            PathSeg::QuadTo(cx, cy, x, y) => builder.quad_to(cx, cy, x, y),
            PathSeg::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                builder.cubic_to(c1x, c1y, c2x, c2y, x, y)
            }
            PathSeg::Close => builder.close(),
        }
    }
    builder.finish()
}

fn brush_paint(brush: &ResolvedBrush) -> Option<Paint<'static>> {
    let mut paint = Paint::default();
    paint.anti_alias = true;
    match brush {
        ResolvedBrush::Solid(color) => paint.set_color(to_sk_color(*color, 1.0)),
        gradient => paint.shader = gradient_shader(gradient)?,
    }
    Some(paint)
}

/// Maps a resolved gradient brush onto a tiny-skia shader. Stop colors
/// already carry their own alpha; the brush opacity scales every stop.
fn gradient_shader(brush: &ResolvedBrush) -> Option<Shader<'static>> {
    match brush {
        ResolvedBrush::Solid(_) => None,
        ResolvedBrush::Linear {
            x1,
            y1,
            x2,
            y2,
            stops,
            spread,
            transform,
            opacity,
        } => LinearGradient::new(
            Point::from_xy(*x1, *y1),
            Point::from_xy(*x2, *y2),
            shader_stops(stops, *opacity),
            to_spread_mode(*spread),
            local_matrix(transform),
        ),
        ResolvedBrush::Radial {
            cx,
            cy,
            r,
            stops,
            spread,
            transform,
            opacity,
        } => {
            let center = Point::from_xy(*cx, *cy);
            RadialGradient::new(
                center,
                center,
                r.max(0.0001),
                shader_stops(stops, *opacity),
                to_spread_mode(*spread),
                local_matrix(transform),
            )
        }
    }
}

fn shader_stops(stops: &[ResolvedStop], opacity: f32) -> Vec<GradientStop> {
    let mut out = Vec::with_capacity(stops.len());
    for stop in stops {
        out.push(GradientStop::new(
            stop.offset.clamp(0.0, 1.0),
            to_sk_color(stop.color, opacity),
        ));
    }
    out
}

fn build_stroke(stroke: &ResolvedStroke) -> Stroke {
    let mut out = Stroke::default();
    out.width = stroke.width.max(0.0);
    out.miter_limit = stroke.miter_limit.max(0.0);
    out.line_cap = match stroke.cap {
        LineCap::Butt => SkLineCap::Butt,
        LineCap::Round => SkLineCap::Round,
        LineCap::Square => SkLineCap::Square,
    };
    out.line_join = match stroke.join {
        LineJoin::Miter => SkLineJoin::Miter,
        LineJoin::Round => SkLineJoin::Round,
        LineJoin::Bevel => SkLineJoin::Bevel,
    };
    if let Some(dash) = &stroke.dash {
        out.dash = StrokeDash::new(dash.intervals.clone(), dash.offset);
    }
    out
}

/// Bitmaps arrive as straight RGBA; tiny-skia composites premultiplied
/// pixels.
fn bitmap_pixmap(bitmap: &Bitmap) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(bitmap.width(), bitmap.height())?;
    let dst = pixmap.data_mut();
    for (src_px, dst_px) in bitmap.data().chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let a = src_px[3];
        dst_px[0] = premul_u8(src_px[0], a);
        dst_px[1] = premul_u8(src_px[1], a);
        dst_px[2] = premul_u8(src_px[2], a);
        dst_px[3] = a;
    }
    Some(pixmap)
}

fn premul_u8(channel: u8, alpha: u8) -> u8 {
    let prod = (channel as u16) * (alpha as u16) + 127;
    ((prod + (prod >> 8)) >> 8) as u8
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_sk_color(color, 1.0));
    paint.anti_alias = true;
    paint
}

fn to_sk_color(color: Color, opacity: f32) -> tiny_skia::Color {
    let coverage = clamp_opacity(opacity) as f32 / 255.0;
    tiny_skia::Color::from_rgba(
        color.red() as f32 / 255.0,
        color.green() as f32 / 255.0,
        color.blue() as f32 / 255.0,
        (color.alpha() as f32 / 255.0) * coverage,
    )
    .unwrap_or_else(|| tiny_skia::Color::from_rgba8(0, 0, 0, 255))
}

fn to_transform(matrix: &Matrix) -> Transform {
    Transform::from_row(matrix.a, matrix.b, matrix.c, matrix.d, matrix.e, matrix.f)
}

fn local_matrix(transform: &Option<Matrix>) -> Transform {
    transform.as_ref().map_or_else(Transform::identity, to_transform)
}

fn to_fill_rule(rule: FillRule) -> SkFillRule {
    match rule {
        FillRule::NonZero => SkFillRule::Winding,
        FillRule::EvenOdd => SkFillRule::EvenOdd,
    }
}

fn to_spread_mode(spread: SpreadMode) -> SkSpreadMode {
    match spread {
        SpreadMode::Pad => SkSpreadMode::Pad,
        SpreadMode::Reflect => SkSpreadMode::Reflect,
        SpreadMode::Repeat => SkSpreadMode::Repeat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::Dash;
    use crate::path::{line_path, rect_path};

    fn solid_fill(color: Color) -> ResolvedFill {
        ResolvedFill {
            brush: ResolvedBrush::Solid(color),
            rule: FillRule::NonZero,
        }
    }

    fn solid_stroke(color: Color, width: f32) -> ResolvedStroke {
        ResolvedStroke {
            brush: ResolvedBrush::Solid(color),
            width,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dash: None,
        }
    }

    fn px(canvas: &PixmapCanvas, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let p = canvas.pixmap().pixel(x, y).expect("pixel in bounds");
        (p.red(), p.green(), p.blue(), p.alpha())
    }

    fn is_white(sample: (u8, u8, u8, u8)) -> bool {
        sample == (255, 255, 255, 255)
    }

    #[test]
    fn solid_fill_covers_the_path_interior() {
        let mut canvas = PixmapCanvas::new(10, 10).expect("canvas");
        let red = Color::from_rgb(255, 0, 0);
        canvas.fill_path(&rect_path(2.0, 2.0, 0.0, 0.0, 6.0, 6.0), &solid_fill(red));

        assert_eq!(px(&canvas, 5, 5), (255, 0, 0, 255));
        assert!(is_white(px(&canvas, 0, 0)));
        assert!(is_white(px(&canvas, 9, 9)));
    }

    #[test]
    fn transforms_apply_locally_and_restore_with_the_frame() {
        let mut canvas = PixmapCanvas::new(10, 10).expect("canvas");
        let red = Color::from_rgb(255, 0, 0);

        canvas.save();
        canvas.translate(4.0, 4.0);
        canvas.concat(&Matrix::scale(2.0, 2.0));
        // Unit rect scales first, then translates: covers (4,4)-(6,6).
        canvas.fill_path(&rect_path(0.0, 0.0, 0.0, 0.0, 1.0, 1.0), &solid_fill(red));
        canvas.restore();
        canvas.fill_path(&rect_path(8.0, 8.0, 0.0, 0.0, 1.0, 1.0), &solid_fill(red));

        assert_eq!(px(&canvas, 5, 5), (255, 0, 0, 255));
        assert!(is_white(px(&canvas, 1, 1)));
        assert!(is_white(px(&canvas, 7, 7)));
        assert_eq!(px(&canvas, 8, 8), (255, 0, 0, 255));
    }

    #[test]
    fn clip_masks_pixels_and_rewinds_on_restore() {
        let mut canvas = PixmapCanvas::new(10, 10).expect("canvas");
        let red = Color::from_rgb(255, 0, 0);
        let blue = Color::from_rgb(0, 0, 255);

        canvas.save();
        canvas.clip_path(
            &rect_path(0.0, 0.0, 0.0, 0.0, 5.0, 10.0),
            FillRule::NonZero,
        );
        canvas.fill_path(&rect_path(0.0, 0.0, 0.0, 0.0, 10.0, 10.0), &solid_fill(red));
        canvas.restore();
        canvas.fill_path(&rect_path(7.0, 0.0, 0.0, 0.0, 2.0, 2.0), &solid_fill(blue));

        assert_eq!(px(&canvas, 2, 5), (255, 0, 0, 255));
        assert!(is_white(px(&canvas, 8, 5)));
        assert_eq!(px(&canvas, 7, 1), (0, 0, 255, 255));
    }

    #[test]
    fn linear_gradient_shades_across_its_span() {
        let mut canvas = PixmapCanvas::new(10, 10).expect("canvas");
        let fill = ResolvedFill {
            brush: ResolvedBrush::Linear {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 0.0,
                stops: vec![
                    ResolvedStop {
                        offset: 0.0,
                        color: Color::BLACK,
                    },
                    ResolvedStop {
                        offset: 1.0,
                        color: Color::WHITE,
                    },
                ],
                spread: SpreadMode::Pad,
                transform: None,
                opacity: 1.0,
            },
            rule: FillRule::NonZero,
        };
        canvas.fill_path(&rect_path(0.0, 0.0, 0.0, 0.0, 10.0, 10.0), &fill);

        let left = px(&canvas, 1, 5);
        let right = px(&canvas, 8, 5);
        assert!(left.0 < right.0, "expected shade from dark to light, got {left:?} vs {right:?}");
        assert_eq!(left.3, 255);
        assert_eq!(right.3, 255);
    }

    #[test]
    fn radial_gradient_radiates_from_the_center() {
        let mut canvas = PixmapCanvas::new(11, 11).expect("canvas");
        let fill = ResolvedFill {
            brush: ResolvedBrush::Radial {
                cx: 5.0,
                cy: 5.0,
                r: 5.0,
                stops: vec![
                    ResolvedStop {
                        offset: 0.0,
                        color: Color::from_rgb(255, 0, 0),
                    },
                    ResolvedStop {
                        offset: 1.0,
                        color: Color::from_rgb(0, 0, 255),
                    },
                ],
                spread: SpreadMode::Pad,
                transform: None,
                opacity: 1.0,
            },
            rule: FillRule::NonZero,
        };
        canvas.fill_path(&rect_path(0.0, 0.0, 0.0, 0.0, 11.0, 11.0), &fill);

        let center = px(&canvas, 5, 5);
        let corner = px(&canvas, 0, 0);
        assert!(center.0 > center.2, "center should lean red, got {center:?}");
        assert!(corner.2 > corner.0, "corner should lean blue, got {corner:?}");
    }

    #[test]
    fn repeat_spread_restarts_the_gradient_past_its_span() {
        let mut canvas = PixmapCanvas::new(12, 4).expect("canvas");
        let fill = |spread: SpreadMode| ResolvedFill {
            brush: ResolvedBrush::Linear {
                x1: 0.0,
                y1: 0.0,
                x2: 4.0,
                y2: 0.0,
                stops: vec![
                    ResolvedStop {
                        offset: 0.0,
                        color: Color::from_rgb(255, 0, 0),
                    },
                    ResolvedStop {
                        offset: 1.0,
                        color: Color::from_rgb(0, 0, 255),
                    },
                ],
                spread,
                transform: None,
                opacity: 1.0,
            },
            rule: FillRule::NonZero,
        };
        let surface = rect_path(0.0, 0.0, 0.0, 0.0, 12.0, 4.0);

        canvas.fill_path(&surface, &fill(SpreadMode::Repeat));
        // Pixel centers at x = 8.5 sit an eighth into the third period.
        let restarted = px(&canvas, 8, 2);
        assert!(restarted.0 > restarted.2, "expected the period to restart red, got {restarted:?}");

        canvas.clear(Color::WHITE);
        canvas.fill_path(&surface, &fill(SpreadMode::Pad));
        let clamped = px(&canvas, 8, 2);
        assert!(clamped.2 > clamped.0, "expected pad to clamp to the last stop, got {clamped:?}");
    }

    #[test]
    fn stroke_follows_the_line_and_dashes_leave_gaps() {
        let mut canvas = PixmapCanvas::new(20, 10).expect("canvas");
        let stroke = ResolvedStroke {
            dash: Dash::resolve(&[4.0, 4.0], 0.0),
            ..solid_stroke(Color::BLACK, 2.0)
        };
        canvas.stroke_path(&line_path(0.0, 5.0, 20.0, 5.0), &stroke);

        assert_eq!(px(&canvas, 2, 5), (0, 0, 0, 255));
        assert!(is_white(px(&canvas, 6, 5)));
        assert_eq!(px(&canvas, 9, 5), (0, 0, 0, 255));
        assert!(is_white(px(&canvas, 2, 1)));
    }

    #[test]
    fn bitmap_draws_through_its_placement_transform() {
        let mut canvas = PixmapCanvas::new(10, 10).expect("canvas");
        let bitmap = Bitmap::from_rgba8(1, 1, vec![0, 0, 255, 255]).expect("bitmap");
        canvas.draw_bitmap(&bitmap, &Matrix::from_values([4.0, 0.0, 0.0, 4.0, 2.0, 2.0]));

        let inside = px(&canvas, 4, 4);
        assert!(inside.2 > 200 && inside.0 < 50, "expected blue, got {inside:?}");
        assert!(is_white(px(&canvas, 0, 0)));
        assert!(is_white(px(&canvas, 9, 9)));
    }

    #[test]
    fn text_without_faces_leaves_the_surface_untouched() {
        let mut canvas = PixmapCanvas::new(8, 8).expect("canvas");
        let text = StyledText::plain("Ag", Color::BLACK, 6.0);
        canvas.draw_text(&text, 1.0, 6.0);
        canvas.set_font_store(Arc::new(FontStore::new()));
        canvas.draw_text(&text, 1.0, 6.0);

        assert!(
            canvas
                .pixmap()
                .pixels()
                .iter()
                .all(|p| (p.red(), p.green(), p.blue()) == (255, 255, 255))
        );
    }

    #[test]
    fn glyph_outlines_flip_the_font_y_axis() {
        let mut builder = GlyphPathBuilder::new(2.0, 10.0, 0.5);
        builder.move_to(0.0, 0.0);
        builder.line_to(10.0, 0.0);
        builder.line_to(10.0, 12.0);
        builder.close();
        let path = builder.finish().expect("path");

        let bounds = path.bounds();
        assert_eq!(bounds.left(), 2.0);
        assert_eq!(bounds.right(), 7.0);
        assert_eq!(bounds.top(), 4.0);
        assert_eq!(bounds.bottom(), 10.0);
    }

    #[test]
    fn premultiply_matches_the_rounding_identity() {
        assert_eq!(premul_u8(255, 255), 255);
        assert_eq!(premul_u8(255, 0), 0);
        assert_eq!(premul_u8(255, 128), 128);
        assert_eq!(premul_u8(128, 128), 64);
    }

    #[test]
    fn png_round_trips_through_the_image_crate() {
        let canvas = PixmapCanvas::new(3, 2).expect("canvas");
        let png = canvas.into_png().expect("png");
        let decoded = image::load_from_memory(&png).expect("decode").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }
}
