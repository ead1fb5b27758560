use std::collections::HashMap;

use crate::paint::ResolvedBrush;
use crate::types::{Color, Matrix, Rect};

/// One color stop as authored. `opacity` is the stop's own opacity and is
/// composited into the color's alpha channel during resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
    pub opacity: f32,
}

/// A stop after resolution: offset forced to be non-decreasing relative to
/// its predecessors and stop opacity already folded into the color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStop {
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientUnits {
    UserSpaceOnUse = 0,
    #[default]
    ObjectBoundingBox = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpreadMode {
    #[default]
    Pad = 0,
    Reflect = 1,
    Repeat = 2,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearGradient {
    pub units: GradientUnits,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stops: Vec<GradientStop>,
    pub spread: SpreadMode,
    pub transform: Option<Matrix>,
}

/// Radial gradient definition. The focal point attributes of the source
/// document are not carried: rendering always radiates from the center.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RadialGradient {
    pub units: GradientUnits,
    pub cx: f32,
    pub cy: f32,
    pub r: f32,
    pub stops: Vec<GradientStop>,
    pub spread: SpreadMode,
    pub transform: Option<Matrix>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Gradient {
    Linear(LinearGradient),
    Radial(RadialGradient),
}

impl Gradient {
    /// Resolves the definition against a concrete geometry. `opacity` is
    /// the referencing paint's opacity and rides along on gradient brushes;
    /// when the gradient degenerates to a flat color the last stop's
    /// composited color wins outright and `opacity` is dropped.
    ///
    /// Zero stops mean no paint at all and the caller skips its draw pass.
    pub fn resolve(&self, opacity: f32, bounds: Rect) -> Option<ResolvedBrush> {
        match self {
            Gradient::Linear(linear) => linear.resolve(opacity, bounds),
            Gradient::Radial(radial) => radial.resolve(opacity, bounds),
        }
    }
}

impl LinearGradient {
    fn resolve(&self, opacity: f32, bounds: Rect) -> Option<ResolvedBrush> {
        if self.stops.is_empty() {
            return None;
        }
        let stops = resolve_stops(&self.stops);
        let mut x1 = self.x1;
        let mut y1 = self.y1;
        let mut x2 = self.x2;
        let mut y2 = self.y2;
        if self.units == GradientUnits::ObjectBoundingBox {
            x1 = bounds.x + x1 * bounds.width;
            y1 = bounds.y + y1 * bounds.height;
            x2 = bounds.x + x2 * bounds.width;
            y2 = bounds.y + y2 * bounds.height;
        }
        // A zero-length gradient vector collapses to the last stop color.
        // The check runs on mapped coordinates, so a bounding box with zero
        // extent can degenerate a non-degenerate definition.
        if (x1 == x2 && y1 == y2) || stops.len() == 1 {
            return Some(ResolvedBrush::Solid(stops[stops.len() - 1].color));
        }
        Some(ResolvedBrush::Linear {
            x1,
            y1,
            x2,
            y2,
            stops,
            spread: self.spread,
            transform: self.transform,
            opacity,
        })
    }
}

impl RadialGradient {
    fn resolve(&self, opacity: f32, bounds: Rect) -> Option<ResolvedBrush> {
        if self.stops.is_empty() {
            return None;
        }
        let stops = resolve_stops(&self.stops);
        let mut r = self.r;
        let mut cx = self.cx;
        let mut cy = self.cy;
        if self.units == GradientUnits::ObjectBoundingBox {
            // Both the radius and the center scale by the larger box extent.
            let max_size = bounds.width.max(bounds.height);
            r *= max_size;
            cx = bounds.x + cx * max_size;
            cy = bounds.y + cy * max_size;
        }
        if r == 0.0 || stops.len() == 1 {
            return Some(ResolvedBrush::Solid(stops[stops.len() - 1].color));
        }
        Some(ResolvedBrush::Radial {
            cx,
            cy,
            r,
            stops,
            spread: self.spread,
            transform: self.transform,
            opacity,
        })
    }
}

/// Offsets must be non-decreasing. The first stop is always taken as
/// written; a later stop that regresses is pinned to the highest offset
/// seen so far.
fn resolve_stops(stops: &[GradientStop]) -> Vec<ResolvedStop> {
    let mut resolved = Vec::with_capacity(stops.len());
    let mut last_offset = -1.0f32;
    for (i, stop) in stops.iter().enumerate() {
        let offset = if i == 0 || stop.offset >= last_offset {
            last_offset = stop.offset;
            stop.offset
        } else {
            last_offset
        };
        resolved.push(ResolvedStop {
            offset,
            color: stop.color.with_opacity(stop.opacity),
        });
    }
    resolved
}

/// Gradient definitions keyed by local IRI (`#id`). The registry is filled
/// while the source document's defs are walked and stays read-only for the
/// rest of the render pass.
#[derive(Debug, Default)]
pub struct GradientRegistry {
    gradients: HashMap<String, Gradient>,
}

impl GradientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under the fragment form `#id` so paint references carry
    /// their IRI straight into lookup.
    pub fn register(&mut self, id: &str, gradient: Gradient) {
        self.gradients.insert(format!("#{id}"), gradient);
    }

    pub fn register_linear(&mut self, id: &str, gradient: LinearGradient) {
        self.register(id, Gradient::Linear(gradient));
    }

    pub fn register_radial(&mut self, id: &str, gradient: RadialGradient) {
        self.register(id, Gradient::Radial(gradient));
    }

    pub fn get(&self, iri: &str) -> Option<&Gradient> {
        self.gradients.get(iri)
    }

    pub fn len(&self) -> usize {
        self.gradients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gradients.is_empty()
    }
}
