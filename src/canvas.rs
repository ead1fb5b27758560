use crate::assets::Bitmap;
use crate::font::StyledText;
use crate::paint::{FillRule, ResolvedFill, ResolvedStroke};
use crate::path::Path;
use crate::types::Matrix;

/// Drawing backend seam. The render pass resolves geometry and paint fully
/// before calling in, so implementations never consult the gradient
/// registry or providers. Calls arrive in draw order; save/restore bracket
/// state exactly as issued.
pub trait Canvas {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);
    fn concat(&mut self, matrix: &Matrix);
    fn clip_path(&mut self, path: &Path, rule: FillRule);
    fn fill_path(&mut self, path: &Path, fill: &ResolvedFill);
    fn stroke_path(&mut self, path: &Path, stroke: &ResolvedStroke);
    fn draw_bitmap(&mut self, bitmap: &Bitmap, placement: &Matrix);
    fn draw_text(&mut self, text: &StyledText, x: f32, y: f32);
}

/// Owned mirror of one `Canvas` call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Save,
    Restore,
    Translate(f32, f32),
    Concat(Matrix),
    ClipPath {
        path: Path,
        rule: FillRule,
    },
    FillPath {
        path: Path,
        fill: ResolvedFill,
    },
    StrokePath {
        path: Path,
        stroke: ResolvedStroke,
    },
    DrawBitmap {
        bitmap: Bitmap,
        placement: Matrix,
    },
    DrawText {
        text: StyledText,
        x: f32,
        y: f32,
    },
}

/// Backend that records every call for inspection or later replay against
/// a real backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Recording {
    commands: Vec<Command>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Re-issues every recorded call, in order.
    pub fn replay(&self, canvas: &mut dyn Canvas) {
        for command in &self.commands {
            match command {
                Command::Save => canvas.save(),
                Command::Restore => canvas.restore(),
                Command::Translate(dx, dy) => canvas.translate(*dx, *dy),
                Command::Concat(matrix) => canvas.concat(matrix),
                Command::ClipPath { path, rule } => canvas.clip_path(path, *rule),
                Command::FillPath { path, fill } => canvas.fill_path(path, fill),
                Command::StrokePath { path, stroke } => canvas.stroke_path(path, stroke),
                Command::DrawBitmap { bitmap, placement } => {
                    canvas.draw_bitmap(bitmap, placement)
                }
                Command::DrawText { text, x, y } => canvas.draw_text(text, *x, *y),
            }
        }
    }
}

impl Canvas for Recording {
    fn save(&mut self) {
        self.commands.push(Command::Save);
    }

    fn restore(&mut self) {
        self.commands.push(Command::Restore);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.commands.push(Command::Translate(dx, dy));
    }

    fn concat(&mut self, matrix: &Matrix) {
        self.commands.push(Command::Concat(*matrix));
    }

    fn clip_path(&mut self, path: &Path, rule: FillRule) {
        self.commands.push(Command::ClipPath {
            path: path.clone(),
            rule,
        });
    }

    fn fill_path(&mut self, path: &Path, fill: &ResolvedFill) {
        self.commands.push(Command::FillPath {
            path: path.clone(),
            fill: fill.clone(),
        });
    }

    fn stroke_path(&mut self, path: &Path, stroke: &ResolvedStroke) {
        self.commands.push(Command::StrokePath {
            path: path.clone(),
            stroke: stroke.clone(),
        });
    }

    fn draw_bitmap(&mut self, bitmap: &Bitmap, placement: &Matrix) {
        self.commands.push(Command::DrawBitmap {
            bitmap: bitmap.clone(),
            placement: *placement,
        });
    }

    fn draw_text(&mut self, text: &StyledText, x: f32, y: f32) {
        self.commands.push(Command::DrawText {
            text: text.clone(),
            x,
            y,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::ResolvedBrush;
    use crate::path::line_path;
    use crate::types::Color;

    #[test]
    fn recording_preserves_call_order() {
        let mut rec = Recording::new();
        rec.save();
        rec.translate(5.0, 6.0);
        rec.fill_path(
            &line_path(0.0, 0.0, 1.0, 1.0),
            &ResolvedFill {
                brush: ResolvedBrush::Solid(Color::BLACK),
                rule: FillRule::NonZero,
            },
        );
        rec.restore();

        assert_eq!(rec.len(), 4);
        assert_eq!(rec.commands()[0], Command::Save);
        assert_eq!(rec.commands()[1], Command::Translate(5.0, 6.0));
        assert!(matches!(rec.commands()[2], Command::FillPath { .. }));
        assert_eq!(rec.commands()[3], Command::Restore);
    }

    #[test]
    fn replay_reproduces_the_recording() {
        let mut rec = Recording::new();
        rec.save();
        rec.concat(&Matrix::scale(2.0, 3.0));
        rec.clip_path(&line_path(0.0, 0.0, 4.0, 4.0), FillRule::EvenOdd);
        rec.draw_text(&StyledText::plain("x", Color::BLACK, 10.0), 1.0, 2.0);
        rec.restore();

        let mut copy = Recording::new();
        rec.replay(&mut copy);
        assert_eq!(copy, rec);
    }
}
