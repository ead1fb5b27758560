use std::sync::{Arc, Mutex};

use crate::assets::ResourceProvider;
use crate::canvas::Canvas;
use crate::debug::DebugLog;
use crate::font::{StyledText, TextAnchor, TextShaper};
use crate::gradient::GradientRegistry;
use crate::paint::{FillPaint, FillRule, StrokePaint, resolve_fill, resolve_stroke};
use crate::path::{CombineMode, Path, PathCombiner};
use crate::types::{Align, Matrix, Rect, ScaleMode, view_box_transform};

/// One frame of render state. The transform and clip chain restore by
/// construction when the frame is popped.
#[derive(Debug, Clone, Default)]
struct RenderState {
    transform: Matrix,
    clips: Vec<(Path, FillRule)>,
}

/// Drives one render pass against a backend canvas.
///
/// The canvas rides behind a shared handle because image draws complete
/// through a provider callback that may land after the call returns, or on
/// another thread. Everything else is plain call-order state: paints
/// resolve against the gradient registry at draw time, and the registry is
/// expected to be fully populated before the first draw.
pub struct Renderer {
    canvas: Arc<Mutex<dyn Canvas + Send>>,
    gradients: GradientRegistry,
    resources: Option<Arc<dyn ResourceProvider + Send + Sync>>,
    shaper: Option<Arc<dyn TextShaper + Send + Sync>>,
    combiner: Option<Box<dyn PathCombiner>>,
    state_stack: Vec<RenderState>,
    current_state: RenderState,
    max_depth: usize,
    debug: DebugLog,
}

impl Renderer {
    pub fn new(canvas: Arc<Mutex<dyn Canvas + Send>>) -> Self {
        Self::with_debug(canvas, DebugLog::from_env())
    }

    pub fn with_debug(canvas: Arc<Mutex<dyn Canvas + Send>>, debug: DebugLog) -> Self {
        Self {
            canvas,
            gradients: GradientRegistry::new(),
            resources: None,
            shaper: None,
            combiner: None,
            state_stack: Vec::new(),
            current_state: RenderState::default(),
            max_depth: 1,
            debug,
        }
    }

    pub fn set_resource_provider(&mut self, provider: Arc<dyn ResourceProvider + Send + Sync>) {
        self.resources = Some(provider);
    }

    pub fn set_text_shaper(&mut self, shaper: Arc<dyn TextShaper + Send + Sync>) {
        self.shaper = Some(shaper);
    }

    pub fn set_path_combiner(&mut self, combiner: Box<dyn PathCombiner>) {
        self.combiner = Some(combiner);
    }

    pub fn gradients(&self) -> &GradientRegistry {
        &self.gradients
    }

    /// Registration phase access. Gradients must be in place before draws
    /// that reference them; resolution never retries.
    pub fn gradients_mut(&mut self) -> &mut GradientRegistry {
        &mut self.gradients
    }

    pub fn save(&mut self) {
        self.state_stack.push(self.current_state.clone());
        let depth = self.state_stack.len() + 1;
        if depth > self.max_depth {
            self.max_depth = depth;
        }
        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.save();
        }
    }

    /// Pops one frame. The bottom frame stays put: restoring there is a
    /// counted no-op and nothing reaches the backend.
    pub fn restore(&mut self) {
        match self.state_stack.pop() {
            Some(state) => {
                self.current_state = state;
                if let Ok(mut canvas) = self.canvas.lock() {
                    canvas.restore();
                }
            }
            None => self.debug.increment("render.restore.underflow", 1),
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.current_state.transform = self.current_state.transform.mul(Matrix::translate(dx, dy));
        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.translate(dx, dy);
        }
    }

    pub fn transform(&mut self, matrix: &Matrix) {
        self.current_state.transform = self.current_state.transform.mul(*matrix);
        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.concat(matrix);
        }
    }

    pub fn transform_values(&mut self, values: [f32; 6]) {
        self.transform(&Matrix::from_values(values));
    }

    pub fn current_transform(&self) -> Matrix {
        self.current_state.transform
    }

    /// Frame count including the bottom frame.
    pub fn state_depth(&self) -> usize {
        self.state_stack.len() + 1
    }

    /// Clip entries on the current frame.
    pub fn clip_depth(&self) -> usize {
        self.current_state.clips.len()
    }

    /// Intersects the current clip with `path`. With a combiner installed a
    /// single stored entry collapses into one combined outline; otherwise
    /// (or when the combiner declines) the chain grows by one entry. The
    /// backend always sees the clip as issued.
    pub fn clip_path(&mut self, path: &Path, rule: FillRule) {
        self.debug.increment("render.clip", 1);
        let combined = match (&self.combiner, self.current_state.clips.as_slice()) {
            (Some(combiner), [(existing, _)]) => {
                combiner.combine(existing, path, CombineMode::Intersect)
            }
            _ => None,
        };
        match combined {
            Some(merged) => {
                self.current_state.clips = vec![(merged, FillRule::NonZero)];
            }
            None => self.current_state.clips.push((path.clone(), rule)),
        }
        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.clip_path(path, rule);
        }
    }

    /// Paints a path: fill pass first, then stroke pass. A missing fill
    /// model means the default opaque black fill; an explicit no-paint or
    /// an unresolvable gradient reference skips that pass.
    pub fn draw_path(
        &mut self,
        path: &Path,
        fill: Option<&FillPaint>,
        stroke: Option<&StrokePaint>,
    ) {
        let bounds = path.bounds();
        if let Some(fill) = resolve_fill(fill, &self.gradients, bounds) {
            self.debug.increment("render.fill", 1);
            if let Ok(mut canvas) = self.canvas.lock() {
                canvas.fill_path(path, &fill);
            }
        }
        if let Some(stroke) = resolve_stroke(stroke, &self.gradients, bounds) {
            self.debug.increment("render.stroke", 1);
            if let Ok(mut canvas) = self.canvas.lock() {
                canvas.stroke_path(path, &stroke);
            }
        }
    }

    /// Requests `url` from the resource provider and, on success, draws the
    /// bitmap fitted into the destination rect. Without a provider, or with
    /// an empty URL, no request is made. Extent checks happen in the
    /// callback: a degenerate destination still requests, then draws
    /// nothing. The placement concat is bracketed by save/restore so later
    /// draws are unaffected, under whatever canvas state holds when the
    /// provider completes.
    pub fn draw_image(
        &mut self,
        url: &str,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        align_x: Align,
        align_y: Align,
        scale: ScaleMode,
    ) {
        if url.is_empty() {
            return;
        }
        let Some(provider) = &self.resources else {
            return;
        };
        self.debug.increment("render.image.request", 1);
        let canvas = Arc::clone(&self.canvas);
        let debug = self.debug.clone();
        let dest = Rect::new(x, y, width, height);
        provider.request_bitmap(
            url,
            Box::new(move |result| match result {
                Ok(bitmap) => {
                    debug.increment("render.image.success", 1);
                    let bitmap_width = bitmap.width() as f32;
                    let bitmap_height = bitmap.height() as f32;
                    if dest.width > 0.0
                        && dest.height > 0.0
                        && bitmap_width > 0.0
                        && bitmap_height > 0.0
                    {
                        let placement = view_box_transform(
                            dest,
                            Rect::new(0.0, 0.0, bitmap_width, bitmap_height),
                            align_x,
                            align_y,
                            scale,
                        );
                        if let Ok(mut canvas) = canvas.lock() {
                            canvas.save();
                            canvas.draw_bitmap(&bitmap, &placement);
                            canvas.restore();
                        }
                    } else {
                        debug.increment("render.image.degenerate", 1);
                    }
                }
                Err(_) => debug.increment("render.image.failure", 1),
            }),
        );
    }

    /// Draws a styled run anchored at `(x, y)`, with `y` treated as the
    /// vertical center of the line. Without a shaper nothing is drawn.
    pub fn draw_text(&mut self, text: &StyledText, anchor: TextAnchor, x: f32, y: f32) {
        if text.is_empty() {
            return;
        }
        let Some(shaper) = &self.shaper else {
            return;
        };
        let metrics = shaper.measure(text);
        let mut anchored_x = x;
        match anchor {
            TextAnchor::Middle => anchored_x -= metrics.width / 2.0,
            TextAnchor::End => anchored_x -= metrics.width,
            TextAnchor::Start => {}
        }
        let baseline = y + (metrics.ascent - metrics.descent) / 2.0;
        self.debug.increment("render.text", 1);
        if let Ok(mut canvas) = self.canvas.lock() {
            canvas.draw_text(text, anchored_x, baseline);
        }
    }

    /// Flushes the pass's counters as one summary line. Image callbacks
    /// that complete later keep counting into the next summary.
    pub fn finish_pass(&mut self, context: &str) {
        if !self.debug.is_enabled() {
            return;
        }
        self.debug
            .increment("render.state.high_water", self.max_depth as u64);
        self.debug.emit_summary(context);
        self.debug.flush();
    }
}
