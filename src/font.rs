use rustybuzz::{Direction as HbDirection, Face as HbFace, UnicodeBuffer};

use crate::error::ResourceError;
use crate::types::Color;

/// A run of characters sharing one color and size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub color: Color,
    pub size: f32,
}

/// Styled text as the engine receives it: a flat span list drawn left to
/// right on a single baseline. No wrapping, no per-span font selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledText {
    spans: Vec<TextSpan>,
}

impl StyledText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>, color: Color, size: f32) -> Self {
        let mut styled = Self::new();
        styled.span(text, color, size);
        styled
    }

    /// Appends a span. Empty text is dropped.
    pub fn span(&mut self, text: impl Into<String>, color: Color, size: f32) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        self.spans.push(TextSpan { text, color, size });
    }

    pub fn spans(&self) -> &[TextSpan] {
        &self.spans
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn max_size(&self) -> f32 {
        self.spans.iter().fold(0.0, |acc, span| acc.max(span.size))
    }
}

/// Horizontal placement of a run relative to its anchor x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start = 0,
    Middle = 1,
    End = 2,
}

/// Measured extent of a styled run. Ascent and descent are positive
/// distances from the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    pub ascent: f32,
    pub descent: f32,
}

/// Measurement seam used by the render pass for anchoring and baseline
/// placement. Backends that rasterize text do their own glyph work.
pub trait TextShaper {
    fn measure(&self, text: &StyledText) -> TextMetrics;
}

struct StoredFace {
    name: String,
    data: Vec<u8>,
    units_per_em: u16,
    ascent: i16,
    descent: i16,
}

impl StoredFace {
    fn span_width(&self, text: &str, size: f32) -> f32 {
        let Some(face) = HbFace::from_slice(&self.data, 0) else {
            return estimated_width(text, size);
        };
        let units_per_em = face.units_per_em().max(1) as f32;
        let mut buffer = UnicodeBuffer::new();
        buffer.set_direction(detect_direction(text));
        buffer.push_str(text);
        let output = rustybuzz::shape(&face, &[], buffer);
        let units: i32 = output
            .glyph_positions()
            .iter()
            .map(|pos| pos.x_advance)
            .sum();
        units as f32 * size / units_per_em
    }
}

/// Face collection. Faces are validated as they are registered and the
/// first registered face measures every span; later faces are kept for
/// backends that want the raw programs. An empty store still measures,
/// with deterministic estimates, so layout works without any fonts.
#[derive(Default)]
pub struct FontStore {
    faces: Vec<StoredFace>,
}

impl FontStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a TrueType/OpenType program. Returns the face's name from
    /// its name table, falling back to `source_name`.
    pub fn register_bytes(
        &mut self,
        data: Vec<u8>,
        source_name: Option<&str>,
    ) -> Result<String, ResourceError> {
        let source = source_name.unwrap_or("EmbeddedFont");
        let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
            return Err(ResourceError::new(format!("invalid font data for {source}")));
        };
        let name = face_name(&face, source);
        let units_per_em = face.units_per_em();
        let ascent = face.ascender();
        let descent = face.descender();
        self.faces.push(StoredFace {
            name: name.clone(),
            data,
            units_per_em,
            ascent,
            descent,
        });
        Ok(name)
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn face_names(&self) -> impl Iterator<Item = &str> {
        self.faces.iter().map(|face| face.name.as_str())
    }

    /// Raw program bytes of the measuring face, for backends that draw
    /// glyph outlines.
    pub fn primary_data(&self) -> Option<&[u8]> {
        self.faces.first().map(|face| face.data.as_slice())
    }

    fn fallback(&self) -> Option<&StoredFace> {
        self.faces.first()
    }
}

impl TextShaper for FontStore {
    fn measure(&self, text: &StyledText) -> TextMetrics {
        let mut width = 0.0f32;
        let mut ascent = 0.0f32;
        let mut descent = 0.0f32;
        for span in text.spans() {
            match self.fallback() {
                Some(face) => {
                    width += face.span_width(&span.text, span.size);
                    let scale = span.size / face.units_per_em.max(1) as f32;
                    ascent = ascent.max(face.ascent as f32 * scale);
                    descent = descent.max(-(face.descent as f32) * scale);
                }
                None => width += estimated_width(&span.text, span.size),
            }
        }
        if self.is_empty() {
            let size = text.max_size();
            ascent = size * 0.8;
            descent = size * 0.2;
        }
        TextMetrics {
            width,
            ascent,
            descent,
        }
    }
}

/// Width estimate used when no face is available: half an em per
/// character.
fn estimated_width(text: &str, size: f32) -> f32 {
    size * 0.5 * text.chars().count() as f32
}

pub(crate) fn detect_direction(text: &str) -> HbDirection {
    for ch in text.chars() {
        let code = ch as u32;
        let rtl = matches!(
            code,
            0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF | 0x1EE00..=0x1EEFF
        );
        if rtl {
            return HbDirection::RightToLeft;
        }
    }
    HbDirection::LeftToRight
}

fn face_name(face: &ttf_parser::Face<'_>, source: &str) -> String {
    use ttf_parser::name::name_id;

    let mut family = None;
    let mut full = None;
    let mut post = None;
    for entry in face.names() {
        let Some(name) = entry.to_string() else {
            continue;
        };
        match entry.name_id {
            name_id::TYPOGRAPHIC_FAMILY | name_id::FAMILY => {
                if family.is_none() {
                    family = Some(name);
                }
            }
            name_id::FULL_NAME => {
                if full.is_none() {
                    full = Some(name);
                }
            }
            name_id::POST_SCRIPT_NAME => {
                if post.is_none() {
                    post = Some(name);
                }
            }
            _ => {}
        }
    }
    post.or(full)
        .or(family)
        .unwrap_or_else(|| source.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styled_text_drops_empty_spans() {
        let mut text = StyledText::new();
        text.span("", Color::BLACK, 12.0);
        text.span("ab", Color::BLACK, 12.0);
        text.span("", Color::BLACK, 12.0);
        assert_eq!(text.spans().len(), 1);
        assert!(!text.is_empty());
    }

    #[test]
    fn plain_builds_a_single_span() {
        let text = StyledText::plain("hi", Color::WHITE, 9.0);
        assert_eq!(text.spans().len(), 1);
        assert_eq!(text.spans()[0].text, "hi");
        assert_eq!(text.spans()[0].size, 9.0);
        assert_eq!(text.max_size(), 9.0);
    }

    #[test]
    fn empty_store_measures_with_char_estimate() {
        let store = FontStore::new();
        let metrics = store.measure(&StyledText::plain("hello", Color::BLACK, 10.0));
        assert_eq!(metrics.width, 25.0);
        assert_eq!(metrics.ascent, 8.0);
        assert_eq!(metrics.descent, 2.0);
    }

    #[test]
    fn empty_store_metrics_follow_the_largest_span() {
        let store = FontStore::new();
        let mut text = StyledText::new();
        text.span("ab", Color::BLACK, 10.0);
        text.span("c", Color::BLACK, 20.0);
        let metrics = store.measure(&text);
        // 2 chars at 5.0 each plus 1 char at 10.0.
        assert_eq!(metrics.width, 20.0);
        assert_eq!(metrics.ascent, 16.0);
        assert_eq!(metrics.descent, 4.0);
    }

    #[test]
    fn empty_run_measures_to_zero() {
        let store = FontStore::new();
        let metrics = store.measure(&StyledText::new());
        assert_eq!(metrics.width, 0.0);
        assert_eq!(metrics.ascent, 0.0);
        assert_eq!(metrics.descent, 0.0);
    }

    #[test]
    fn register_bytes_rejects_invalid_programs() {
        let mut store = FontStore::new();
        let err = store.register_bytes(vec![0, 1, 2, 3], Some("bad.ttf")).unwrap_err();
        assert!(err.0.contains("bad.ttf"), "unexpected message: {}", err.0);
        assert!(store.is_empty());
    }

    #[test]
    fn anchor_defaults_to_start() {
        assert_eq!(TextAnchor::default(), TextAnchor::Start);
    }
}
