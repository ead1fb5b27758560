use crate::arc::arc_to;
use crate::error::GeometryError;
use crate::types::{Matrix, Rect};

/// Control-point distance for approximating a quarter circle with one
/// cubic Bezier.
pub(crate) const KAPPA: f32 = 0.5522847498;

pub const OP_MOVE_TO: u8 = 0;
pub const OP_LINE_TO: u8 = 1;
pub const OP_CUBIC_BEZ: u8 = 2;
pub const OP_QUAD_ARC: u8 = 3;
pub const OP_ELLIPTICAL_ARC: u8 = 4;
pub const OP_CLOSE: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSeg {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo(f32, f32, f32, f32),
    CubicTo(f32, f32, f32, f32, f32, f32),
    Close,
}

/// An append-only segment list in user space. Paths carry no paint or
/// transform; draw calls borrow them and resolve everything else.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    segs: Vec<PathSeg>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.segs.push(PathSeg::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.segs.push(PathSeg::LineTo(x, y));
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.segs.push(PathSeg::QuadTo(cx, cy, x, y));
    }

    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.segs.push(PathSeg::CubicTo(c1x, c1y, c2x, c2y, x, y));
    }

    pub fn close(&mut self) {
        self.segs.push(PathSeg::Close);
    }

    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }

    pub fn segments(&self) -> &[PathSeg] {
        &self.segs
    }

    /// Axis-aligned hull over every stored coordinate, control points
    /// included. Matches the reference renderer's bounds, which are the
    /// control-point hull rather than the tight curve extent.
    pub fn bounds(&self) -> Rect {
        let mut min_x = f32::INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        let mut seen = false;

        let mut visit = |x: f32, y: f32| {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            seen = true;
        };

        for seg in &self.segs {
            match *seg {
                PathSeg::MoveTo(x, y) | PathSeg::LineTo(x, y) => visit(x, y),
                PathSeg::QuadTo(cx, cy, x, y) => {
                    visit(cx, cy);
                    visit(x, y);
                }
                PathSeg::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                    visit(c1x, c1y);
                    visit(c2x, c2y);
                    visit(x, y);
                }
                PathSeg::Close => {}
            }
        }

        if !seen {
            return Rect::default();
        }
        Rect::from_ltrb(min_x, min_y, max_x, max_y)
    }

    /// Appends `other` as additional subpaths.
    pub fn append(&mut self, other: &Path) {
        self.segs.extend_from_slice(&other.segs);
    }

    /// Maps every stored coordinate through `matrix` in place.
    pub fn transform(&mut self, matrix: &Matrix) {
        for seg in &mut self.segs {
            match seg {
                PathSeg::MoveTo(x, y) | PathSeg::LineTo(x, y) => {
                    (*x, *y) = matrix.apply(*x, *y);
                }
                PathSeg::QuadTo(cx, cy, x, y) => {
                    (*cx, *cy) = matrix.apply(*cx, *cy);
                    (*x, *y) = matrix.apply(*x, *y);
                }
                PathSeg::CubicTo(c1x, c1y, c2x, c2y, x, y) => {
                    (*c1x, *c1y) = matrix.apply(*c1x, *c1y);
                    (*c2x, *c2y) = matrix.apply(*c2x, *c2y);
                    (*x, *y) = matrix.apply(*x, *y);
                }
                PathSeg::Close => {}
            }
        }
    }
}

/// Replays a tagged opcode stream against a shared value buffer.
///
/// Each opcode consumes a fixed number of values: move/line 2, quad 4,
/// cubic 6, close 0, elliptical arc 9 (start point, radii, rotation, both
/// flags, end point; flags are truncated to integer and read as nonzero).
/// A malformed stream fails without touching paths built earlier.
pub fn build_path(ops: &[u8], values: &[f32]) -> Result<Path, GeometryError> {
    let mut path = Path::new();
    let mut pos = 0usize;

    for (index, &op) in ops.iter().enumerate() {
        match op {
            OP_MOVE_TO => {
                let v = take_values(values, &mut pos, op, index, 2)?;
                path.move_to(v[0], v[1]);
            }
            OP_LINE_TO => {
                let v = take_values(values, &mut pos, op, index, 2)?;
                path.line_to(v[0], v[1]);
            }
            OP_CUBIC_BEZ => {
                let v = take_values(values, &mut pos, op, index, 6)?;
                path.cubic_to(v[0], v[1], v[2], v[3], v[4], v[5]);
            }
            OP_QUAD_ARC => {
                let v = take_values(values, &mut pos, op, index, 4)?;
                path.quad_to(v[0], v[1], v[2], v[3]);
            }
            OP_CLOSE => path.close(),
            OP_ELLIPTICAL_ARC => {
                let v = take_values(values, &mut pos, op, index, 9)?;
                let large_arc = v[5] as i32 != 0;
                let sweep = v[6] as i32 != 0;
                arc_to(
                    &mut path, v[0], v[1], v[2], v[3], v[4], large_arc, sweep, v[7], v[8],
                );
            }
            _ => {
                return Err(GeometryError::UnknownOpcode { opcode: op, index });
            }
        }
    }

    Ok(path)
}

fn take_values<'a>(
    values: &'a [f32],
    pos: &mut usize,
    opcode: u8,
    index: usize,
    needed: usize,
) -> Result<&'a [f32], GeometryError> {
    let available = values.len() - *pos;
    if available < needed {
        return Err(GeometryError::TruncatedValues {
            opcode,
            index,
            needed,
            available,
        });
    }
    let start = *pos;
    *pos += needed;
    Ok(&values[start..start + needed])
}

/// Rectangle, optionally with elliptical corners. Zero corner radii on
/// either axis produce a plain clockwise rectangle. Radii are used as
/// given, without clamping to the half extents.
pub fn rect_path(x: f32, y: f32, rx: f32, ry: f32, width: f32, height: f32) -> Path {
    let right = x + width;
    let bottom = y + height;
    let mut p = Path::new();

    if rx == 0.0 || ry == 0.0 {
        p.move_to(x, y);
        p.line_to(right, y);
        p.line_to(right, bottom);
        p.line_to(x, bottom);
        p.close();
        return p;
    }

    let cpx = rx * KAPPA;
    let cpy = ry * KAPPA;
    p.move_to(x, y + ry);
    p.cubic_to(x, y + ry - cpy, x + rx - cpx, y, x + rx, y);
    p.line_to(right - rx, y);
    p.cubic_to(right - rx + cpx, y, right, y + ry - cpy, right, y + ry);
    p.line_to(right, bottom - ry);
    p.cubic_to(right, bottom - ry + cpy, right - rx + cpx, bottom, right - rx, bottom);
    p.line_to(x + rx, bottom);
    p.cubic_to(x + rx - cpx, bottom, x, bottom - ry + cpy, x, bottom - ry);
    p.line_to(x, y + ry);
    p.close();
    p
}

/// Circle as four cubics, starting at the rightmost point and sweeping
/// through the bottom first (clockwise with y pointing down).
pub fn circle_path(cx: f32, cy: f32, r: f32) -> Path {
    let left = cx - r;
    let top = cy - r;
    let right = cx + r;
    let bottom = cy + r;
    let cp = r * KAPPA;

    let mut p = Path::new();
    p.move_to(right, cy);
    p.cubic_to(right, cy + cp, cx + cp, bottom, cx, bottom);
    p.cubic_to(cx - cp, bottom, left, cy + cp, left, cy);
    p.cubic_to(left, cy - cp, cx - cp, top, cx, top);
    p.cubic_to(cx + cp, top, right, cy - cp, right, cy);
    p.close();
    p
}

/// Ellipse as four cubics, starting at the topmost point.
pub fn ellipse_path(cx: f32, cy: f32, rx: f32, ry: f32) -> Path {
    let left = cx - rx;
    let top = cy - ry;
    let right = cx + rx;
    let bottom = cy + ry;
    let cpx = rx * KAPPA;
    let cpy = ry * KAPPA;

    let mut p = Path::new();
    p.move_to(cx, top);
    p.cubic_to(cx + cpx, top, right, cy - cpy, right, cy);
    p.cubic_to(right, cy + cpy, cx + cpx, bottom, cx, bottom);
    p.cubic_to(cx - cpx, bottom, left, cy + cpy, left, cy);
    p.cubic_to(left, cy - cpy, cx - cpx, top, cx, top);
    p.close();
    p
}

pub fn line_path(x1: f32, y1: f32, x2: f32, y2: f32) -> Path {
    let mut p = Path::new();
    p.move_to(x1, y1);
    p.line_to(x2, y2);
    p
}

/// Closed polygon from interleaved x,y coordinates. Fewer than two values
/// yield an empty path; a trailing unpaired value is ignored.
pub fn polygon_path(points: &[f32]) -> Path {
    poly_path(points, true)
}

/// Open polyline from interleaved x,y coordinates.
pub fn polyline_path(points: &[f32]) -> Path {
    poly_path(points, false)
}

fn poly_path(points: &[f32], close: bool) -> Path {
    let mut p = Path::new();
    if points.len() < 2 {
        return p;
    }
    let mut pairs = points.chunks_exact(2);
    if let Some(first) = pairs.next() {
        p.move_to(first[0], first[1]);
    }
    for pair in pairs {
        p.line_to(pair[0], pair[1]);
    }
    if close {
        p.close();
    }
    p
}

/// Boolean combination modes, in the reference engine's dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineMode {
    Difference = 0,
    Intersect = 1,
    Union = 2,
    Xor = 3,
    ReverseDifference = 4,
}

/// Injected path boolean geometry. The engine never computes combined
/// outlines itself; a renderer with a combiner installed uses it to
/// collapse clip chains, and `None` from the combiner falls back to
/// chaining.
pub trait PathCombiner {
    fn combine(&self, a: &Path, b: &Path, mode: CombineMode) -> Option<Path>;
}
