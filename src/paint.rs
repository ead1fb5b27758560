use crate::gradient::{GradientRegistry, ResolvedStop, SpreadMode};
use crate::types::{Color, Matrix, Rect};

/// What a fill or stroke paints with. `None` is an explicit no-paint (the
/// draw is skipped), distinct from an absent model, which for fills means
/// the default paint.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintRef {
    None,
    Color { color: Color, opacity: f32 },
    Reference { iri: String, opacity: f32 },
}

impl PaintRef {
    pub fn color(color: Color) -> Self {
        PaintRef::Color {
            color,
            opacity: 1.0,
        }
    }

    pub fn reference(iri: impl Into<String>) -> Self {
        PaintRef::Reference {
            iri: iri.into(),
            opacity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillRule {
    #[default]
    NonZero = 0,
    EvenOdd = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt = 0,
    Round = 1,
    Square = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter = 0,
    Round = 1,
    Bevel = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FillPaint {
    pub paint: PaintRef,
    pub rule: FillRule,
}

impl Default for FillPaint {
    fn default() -> Self {
        Self {
            paint: PaintRef::color(Color::BLACK),
            rule: FillRule::NonZero,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokePaint {
    pub paint: PaintRef,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    pub dash_array: Vec<f32>,
    pub dash_offset: f32,
}

impl Default for StrokePaint {
    fn default() -> Self {
        Self {
            paint: PaintRef::color(Color::BLACK),
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: 4.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

/// Normalized dash pattern: an even number of intervals and a
/// non-negative phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Dash {
    pub intervals: Vec<f32>,
    pub offset: f32,
}

impl Dash {
    /// Resolves a raw dash array and offset. An empty array or a zero
    /// interval sum disables dashing. An odd-length array repeats itself
    /// once. A negative offset wraps forward by whole pattern lengths:
    /// `sum + (offset % sum)`, which lands an exact multiple of the sum on
    /// `sum` rather than zero.
    pub fn resolve(dash_array: &[f32], dash_offset: f32) -> Option<Dash> {
        if dash_array.is_empty() {
            return None;
        }
        let mut intervals = dash_array.to_vec();
        if intervals.len() % 2 != 0 {
            intervals.extend_from_within(..);
        }
        let sum: f32 = intervals.iter().sum();
        if sum == 0.0 {
            return None;
        }
        let mut offset = dash_offset;
        if offset < 0.0 {
            offset = sum + (offset % sum);
        }
        Some(Dash { intervals, offset })
    }
}

/// Fully resolved paint source, ready for any backend: either a flat color
/// with opacity already composited into alpha, or gradient geometry in
/// user space with clamped stops. Gradient brushes carry the paint-level
/// `opacity` separately so backends can modulate shader output the way the
/// reference renderer's paint alpha does.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedBrush {
    Solid(Color),
    Linear {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stops: Vec<ResolvedStop>,
        spread: SpreadMode,
        transform: Option<Matrix>,
        opacity: f32,
    },
    Radial {
        cx: f32,
        cy: f32,
        r: f32,
        stops: Vec<ResolvedStop>,
        spread: SpreadMode,
        transform: Option<Matrix>,
        opacity: f32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFill {
    pub brush: ResolvedBrush,
    pub rule: FillRule,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStroke {
    pub brush: ResolvedBrush,
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    pub dash: Option<Dash>,
}

/// Resolves a fill model against the gradient registry and the target
/// path's bounds. An absent model falls back to the default opaque black
/// fill; an explicit `PaintRef::None` (or an unresolvable gradient
/// reference) resolves to nothing and the fill pass is skipped.
pub fn resolve_fill(
    model: Option<&FillPaint>,
    gradients: &GradientRegistry,
    bounds: Rect,
) -> Option<ResolvedFill> {
    let Some(model) = model else {
        return Some(ResolvedFill {
            brush: ResolvedBrush::Solid(Color::BLACK),
            rule: FillRule::NonZero,
        });
    };
    let brush = resolve_paint_ref(&model.paint, gradients, bounds)?;
    Some(ResolvedFill {
        brush,
        rule: model.rule,
    })
}

/// Resolves a stroke model. An absent model means no stroke pass at all.
pub fn resolve_stroke(
    model: Option<&StrokePaint>,
    gradients: &GradientRegistry,
    bounds: Rect,
) -> Option<ResolvedStroke> {
    let model = model?;
    let brush = resolve_paint_ref(&model.paint, gradients, bounds)?;
    Some(ResolvedStroke {
        brush,
        width: model.width,
        cap: model.cap,
        join: model.join,
        miter_limit: model.miter_limit,
        dash: Dash::resolve(&model.dash_array, model.dash_offset),
    })
}

fn resolve_paint_ref(
    paint: &PaintRef,
    gradients: &GradientRegistry,
    bounds: Rect,
) -> Option<ResolvedBrush> {
    match paint {
        PaintRef::None => None,
        PaintRef::Color { color, opacity } => {
            Some(ResolvedBrush::Solid(color.with_opacity(*opacity)))
        }
        PaintRef::Reference { iri, opacity } => {
            let gradient = gradients.get(iri)?;
            gradient.resolve(*opacity, bounds)
        }
    }
}
