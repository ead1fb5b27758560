use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::arc::arc_to;
use crate::assets::ResourceProvider;
use crate::canvas::Recording;
use crate::error::SvgError;
use crate::font::{StyledText, TextAnchor, TextShaper};
use crate::gradient::{
    Gradient, GradientRegistry, GradientStop, GradientUnits, LinearGradient, RadialGradient,
    SpreadMode,
};
use crate::paint::{FillPaint, FillRule, LineCap, LineJoin, PaintRef, StrokePaint};
use crate::path::{
    Path, PathCombiner, circle_path, ellipse_path, line_path, polygon_path, polyline_path,
    rect_path,
};
use crate::render::Renderer;
use crate::types::{Align, Color, Matrix, Rect, ScaleMode, view_box_transform};

// SVG 1.1-ish subset frontend.
//
// Covers the common shapes and paints exported by design tools:
// - <svg> root with viewBox + preserveAspectRatio
// - <g>, <defs>, <use href="#id">
// - <path d="...">, <rect>, <circle>, <ellipse>, <line>, <polyline>, <polygon>
// - presentation attributes for fill/stroke/opacity/dash/transform/clip-path
// - <linearGradient>/<radialGradient> with stops and href inheritance
// - <text> with plain character content, <image> through a resource provider
//
// Unknown elements and attributes are skipped.

const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// Element nesting cap. Cyclic `use` references would otherwise recurse
/// without bound.
const MAX_ELEMENT_DEPTH: usize = 64;

/// Optional capability wiring for [`render_svg`]. Text and images are
/// skipped unless the matching capability is supplied.
#[derive(Default)]
pub struct SvgOptions {
    pub resources: Option<Arc<dyn ResourceProvider + Send + Sync>>,
    pub shaper: Option<Arc<dyn TextShaper + Send + Sync>>,
    pub combiner: Option<Box<dyn PathCombiner>>,
}

/// Renders an SVG document into a command recording, fitting the root
/// view box into `viewport`.
pub fn render_svg(
    svg_xml: &str,
    viewport: Rect,
    options: SvgOptions,
) -> Result<Recording, SvgError> {
    let recording = Arc::new(Mutex::new(Recording::new()));
    let mut renderer = Renderer::new(recording.clone());
    if let Some(resources) = options.resources {
        renderer.set_resource_provider(resources);
    }
    if let Some(shaper) = options.shaper {
        renderer.set_text_shaper(shaper);
    }
    if let Some(combiner) = options.combiner {
        renderer.set_path_combiner(combiner);
    }
    render_svg_with(svg_xml, viewport, &mut renderer)?;
    renderer.finish_pass("svg");

    let recorded = match recording.lock() {
        Ok(guard) => guard.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    Ok(recorded)
}

/// Renders an SVG document through a caller-wired renderer. All gradients
/// in the document register before the first draw.
pub fn render_svg_with(
    svg_xml: &str,
    viewport: Rect,
    renderer: &mut Renderer,
) -> Result<(), SvgError> {
    let doc = roxmltree::Document::parse(svg_xml)?;
    let Some(root) = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name().eq_ignore_ascii_case("svg"))
    else {
        return Err(SvgError::MissingRoot);
    };

    register_gradients(&doc, renderer.gradients_mut());
    let id_map = build_id_map(&doc);

    renderer.save();
    if let Some(view_box) = parse_view_box(root.attribute("viewBox")) {
        let (align_x, align_y, scale) =
            parse_preserve_aspect_ratio(root.attribute("preserveAspectRatio"));
        renderer.transform(&view_box_transform(
            viewport, view_box, align_x, align_y, scale,
        ));
    }
    render_element(renderer, root, &ElementStyle::default(), &id_map, 0);
    renderer.restore();
    Ok(())
}

/// Inherited presentation state, resolved attribute by attribute while
/// walking the tree.
#[derive(Debug, Clone)]
struct ElementStyle {
    fill: PaintRef,
    fill_rule: FillRule,
    fill_opacity: f32,
    stroke: PaintRef,
    stroke_opacity: f32,
    stroke_width: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f32,
    dash_array: Vec<f32>,
    dash_offset: f32,
    font_size: f32,
    text_anchor: TextAnchor,
}

impl Default for ElementStyle {
    fn default() -> Self {
        // SVG defaults: black fill, no stroke.
        Self {
            fill: PaintRef::color(Color::BLACK),
            fill_rule: FillRule::NonZero,
            fill_opacity: 1.0,
            stroke: PaintRef::None,
            stroke_opacity: 1.0,
            stroke_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
            font_size: 16.0,
            text_anchor: TextAnchor::Start,
        }
    }
}

fn render_element(
    renderer: &mut Renderer,
    node: roxmltree::Node<'_, '_>,
    inherited: &ElementStyle,
    id_map: &HashMap<String, roxmltree::Node<'_, '_>>,
    depth: usize,
) {
    if !node.is_element() || depth > MAX_ELEMENT_DEPTH {
        return;
    }

    let mut style = inherited.clone();
    apply_presentation_attributes(node, &mut style);

    let transform = node.attribute("transform").map(parse_transform);
    let clip = clip_reference(node, id_map);
    let framed = transform.is_some() || clip.is_some();
    if framed {
        renderer.save();
    }
    if let Some(matrix) = &transform {
        renderer.transform(matrix);
    }
    if let Some((path, rule)) = &clip {
        renderer.clip_path(path, *rule);
    }

    match node.tag_name().name() {
        // Definition containers never draw on their own.
        "defs" | "clipPath" | "linearGradient" | "radialGradient" | "symbol" | "style"
        | "title" | "desc" => {}
        "svg" | "g" => {
            for child in node.children().filter(|n| n.is_element()) {
                render_element(renderer, child, &style, id_map, depth + 1);
            }
        }
        "use" => {
            if let Some(id) = href_id(node) {
                if let Some(target) = id_map.get(&id).copied() {
                    let x = attr_number(node, "x", 0.0);
                    let y = attr_number(node, "y", 0.0);
                    renderer.save();
                    renderer.translate(x, y);
                    render_element(renderer, target, &style, id_map, depth + 1);
                    renderer.restore();
                }
            }
        }
        "text" => render_text(renderer, node, &style),
        "image" => render_image(renderer, node),
        tag => {
            if let Some(path) = shape_path(tag, node) {
                draw_shape(renderer, &path, &style);
            }
        }
    }

    if framed {
        renderer.restore();
    }
}

fn draw_shape(renderer: &mut Renderer, path: &Path, style: &ElementStyle) {
    let fill = FillPaint {
        paint: scaled_paint(&style.fill, style.fill_opacity),
        rule: style.fill_rule,
    };
    let stroke = stroke_model(style);
    renderer.draw_path(path, Some(&fill), stroke.as_ref());
}

fn stroke_model(style: &ElementStyle) -> Option<StrokePaint> {
    if matches!(style.stroke, PaintRef::None) || style.stroke_width <= 0.0 {
        return None;
    }
    Some(StrokePaint {
        paint: scaled_paint(&style.stroke, style.stroke_opacity),
        width: style.stroke_width,
        cap: style.line_cap,
        join: style.line_join,
        miter_limit: style.miter_limit,
        dash_array: style.dash_array.clone(),
        dash_offset: style.dash_offset,
    })
}

fn scaled_paint(paint: &PaintRef, opacity: f32) -> PaintRef {
    match paint {
        PaintRef::None => PaintRef::None,
        PaintRef::Color {
            color,
            opacity: base,
        } => PaintRef::Color {
            color: *color,
            opacity: base * opacity,
        },
        PaintRef::Reference {
            iri,
            opacity: base,
        } => PaintRef::Reference {
            iri: iri.clone(),
            opacity: base * opacity,
        },
    }
}

fn render_text(renderer: &mut Renderer, node: roxmltree::Node<'_, '_>, style: &ElementStyle) {
    let x = attr_number(node, "x", 0.0);
    let y = attr_number(node, "y", 0.0);
    let content = node.text().map(str::trim).unwrap_or("");
    if content.is_empty() {
        return;
    }
    // Gradient text fills fall back to black; an explicit none hides the run.
    let color = match &style.fill {
        PaintRef::None => return,
        PaintRef::Color { color, .. } => *color,
        PaintRef::Reference { .. } => Color::BLACK,
    };
    let text = StyledText::plain(content, color.with_opacity(style.fill_opacity), style.font_size);
    renderer.draw_text(&text, style.text_anchor, x, y);
}

fn render_image(renderer: &mut Renderer, node: roxmltree::Node<'_, '_>) {
    let Some(href) = href_attribute(node) else {
        return;
    };
    let x = attr_number(node, "x", 0.0);
    let y = attr_number(node, "y", 0.0);
    let width = attr_number(node, "width", 0.0);
    let height = attr_number(node, "height", 0.0);
    let (align_x, align_y, scale) =
        parse_preserve_aspect_ratio(node.attribute("preserveAspectRatio"));
    renderer.draw_image(href, x, y, width, height, align_x, align_y, scale);
}

fn shape_path(tag: &str, node: roxmltree::Node<'_, '_>) -> Option<Path> {
    match tag {
        "path" => {
            let path = parse_path_data(node.attribute("d")?);
            (!path.is_empty()).then_some(path)
        }
        "rect" => rect_shape(node),
        "circle" => circle_shape(node),
        "ellipse" => ellipse_shape(node),
        "line" => Some(line_path(
            attr_number(node, "x1", 0.0),
            attr_number(node, "y1", 0.0),
            attr_number(node, "x2", 0.0),
            attr_number(node, "y2", 0.0),
        )),
        "polyline" => poly_shape(node, false),
        "polygon" => poly_shape(node, true),
        _ => None,
    }
}

fn rect_shape(node: roxmltree::Node<'_, '_>) -> Option<Path> {
    let x = attr_number(node, "x", 0.0);
    let y = attr_number(node, "y", 0.0);
    let width = node.attribute("width").and_then(parse_number)?;
    let height = node.attribute("height").and_then(parse_number)?;
    if width <= 0.0 || height <= 0.0 {
        return None;
    }
    // Each radius defaults to the other when only one is given.
    let rx = node.attribute("rx").and_then(parse_number);
    let ry = node.attribute("ry").and_then(parse_number);
    let corner_rx = rx.or(ry).unwrap_or(0.0).clamp(0.0, width / 2.0);
    let corner_ry = ry.or(rx).unwrap_or(0.0).clamp(0.0, height / 2.0);
    Some(rect_path(x, y, corner_rx, corner_ry, width, height))
}

fn circle_shape(node: roxmltree::Node<'_, '_>) -> Option<Path> {
    let cx = attr_number(node, "cx", 0.0);
    let cy = attr_number(node, "cy", 0.0);
    let r = node.attribute("r").and_then(parse_number)?;
    (r > 0.0).then(|| circle_path(cx, cy, r))
}

fn ellipse_shape(node: roxmltree::Node<'_, '_>) -> Option<Path> {
    let cx = attr_number(node, "cx", 0.0);
    let cy = attr_number(node, "cy", 0.0);
    let rx = node.attribute("rx").and_then(parse_number)?;
    let ry = node.attribute("ry").and_then(parse_number)?;
    (rx > 0.0 && ry > 0.0).then(|| ellipse_path(cx, cy, rx, ry))
}

fn poly_shape(node: roxmltree::Node<'_, '_>, close: bool) -> Option<Path> {
    let points = parse_number_list(node.attribute("points")?);
    if points.len() < 4 {
        return None;
    }
    Some(if close {
        polygon_path(&points)
    } else {
        polyline_path(&points)
    })
}

fn apply_presentation_attributes(node: roxmltree::Node<'_, '_>, style: &mut ElementStyle) {
    if let Some(fill) = node.attribute("fill") {
        parse_paint_into(fill, &mut style.fill);
    }
    if let Some(stroke) = node.attribute("stroke") {
        parse_paint_into(stroke, &mut style.stroke);
    }
    if let Some(v) = node.attribute("stroke-width").and_then(parse_number) {
        style.stroke_width = v.max(0.0);
    }
    if let Some(v) = node.attribute("stroke-miterlimit").and_then(parse_number) {
        style.miter_limit = v.max(0.0);
    }
    if let Some(cap) = node.attribute("stroke-linecap") {
        style.line_cap = match cap.trim() {
            "round" => LineCap::Round,
            "square" => LineCap::Square,
            _ => LineCap::Butt,
        };
    }
    if let Some(join) = node.attribute("stroke-linejoin") {
        style.line_join = match join.trim() {
            "round" => LineJoin::Round,
            "bevel" => LineJoin::Bevel,
            _ => LineJoin::Miter,
        };
    }
    if let Some(rule) = node.attribute("fill-rule") {
        style.fill_rule = if rule.trim().eq_ignore_ascii_case("evenodd") {
            FillRule::EvenOdd
        } else {
            FillRule::NonZero
        };
    }
    if let Some(dashes) = node.attribute("stroke-dasharray") {
        if dashes.trim().eq_ignore_ascii_case("none") {
            style.dash_array.clear();
        } else {
            // Kept raw; odd counts and zero sums normalize at resolve time.
            style.dash_array = parse_number_list(dashes);
        }
    }
    if let Some(v) = node.attribute("stroke-dashoffset").and_then(parse_number) {
        style.dash_offset = v;
    }

    // Opacity attributes multiply into the inherited values, and plain
    // opacity affects fill and stroke alike.
    if let Some(v) = node.attribute("opacity").and_then(parse_number) {
        let o = v.clamp(0.0, 1.0);
        style.fill_opacity *= o;
        style.stroke_opacity *= o;
    }
    if let Some(v) = node.attribute("fill-opacity").and_then(parse_number) {
        style.fill_opacity *= v.clamp(0.0, 1.0);
    }
    if let Some(v) = node.attribute("stroke-opacity").and_then(parse_number) {
        style.stroke_opacity *= v.clamp(0.0, 1.0);
    }

    if let Some(v) = node.attribute("font-size").and_then(parse_number) {
        if v > 0.0 {
            style.font_size = v;
        }
    }
    if let Some(anchor) = node.attribute("text-anchor") {
        style.text_anchor = match anchor.trim() {
            "middle" => TextAnchor::Middle,
            "end" => TextAnchor::End,
            _ => TextAnchor::Start,
        };
    }
}

fn parse_paint_into(input: &str, out: &mut PaintRef) {
    let v = input.trim();
    if v.eq_ignore_ascii_case("none") {
        *out = PaintRef::None;
        return;
    }
    if let Some(id) = parse_url_reference(v) {
        *out = PaintRef::reference(format!("#{id}"));
        return;
    }
    if let Some(color) = parse_color(v) {
        *out = PaintRef::color(color);
    }
    // Unrecognized paints (currentColor and friends) keep the inherited one.
}

fn clip_reference(
    node: roxmltree::Node<'_, '_>,
    id_map: &HashMap<String, roxmltree::Node<'_, '_>>,
) -> Option<(Path, FillRule)> {
    let reference = node.attribute("clip-path")?;
    let id = parse_url_reference(reference)?;
    let clip_node = id_map.get(&id).copied()?;
    if clip_node.tag_name().name() != "clipPath" {
        return None;
    }
    let rule = match clip_node.attribute("clip-rule") {
        Some(v) if v.trim().eq_ignore_ascii_case("evenodd") => FillRule::EvenOdd,
        _ => FillRule::NonZero,
    };
    let mut outline = Path::new();
    collect_clip_shapes(&mut outline, clip_node, Matrix::identity(), id_map, 0);
    (!outline.is_empty()).then_some((outline, rule))
}

/// Flattens every shape under a `clipPath` into one multi-subpath outline,
/// with element transforms baked into the coordinates.
fn collect_clip_shapes(
    out: &mut Path,
    node: roxmltree::Node<'_, '_>,
    ctm: Matrix,
    id_map: &HashMap<String, roxmltree::Node<'_, '_>>,
    depth: usize,
) {
    if !node.is_element() || depth > MAX_ELEMENT_DEPTH {
        return;
    }
    let mut local_ctm = ctm;
    if let Some(transform) = node.attribute("transform") {
        local_ctm = local_ctm.mul(parse_transform(transform));
    }
    let tag = node.tag_name().name();
    match tag {
        "clipPath" | "g" | "svg" | "defs" => {
            for child in node.children().filter(|n| n.is_element()) {
                collect_clip_shapes(out, child, local_ctm, id_map, depth + 1);
            }
        }
        "use" => {
            if let Some(id) = href_id(node) {
                if let Some(target) = id_map.get(&id).copied() {
                    let x = attr_number(node, "x", 0.0);
                    let y = attr_number(node, "y", 0.0);
                    let use_ctm = local_ctm.mul(Matrix::translate(x, y));
                    collect_clip_shapes(out, target, use_ctm, id_map, depth + 1);
                }
            }
        }
        _ => {
            if let Some(mut path) = shape_path(tag, node) {
                if !local_ctm.is_identity() {
                    path.transform(&local_ctm);
                }
                out.append(&path);
            }
        }
    }
}

fn build_id_map<'a>(
    doc: &'a roxmltree::Document<'a>,
) -> HashMap<String, roxmltree::Node<'a, 'a>> {
    let mut out = HashMap::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        if let Some(id) = node.attribute("id") {
            // First wins, matching common authoring expectations.
            out.entry(id.to_string()).or_insert(node);
        }
    }
    out
}

fn href_attribute<'a>(node: roxmltree::Node<'a, '_>) -> Option<&'a str> {
    node.attribute("href")
        .or_else(|| node.attribute((XLINK_NS, "href")))
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn href_id(node: roxmltree::Node<'_, '_>) -> Option<String> {
    let raw = href_attribute(node)?;
    let raw = raw.trim_matches('"').trim_matches('\'');
    let id = raw.strip_prefix('#')?;
    (!id.is_empty()).then(|| id.to_string())
}

fn parse_url_reference(input: &str) -> Option<String> {
    let s = input.trim();
    if !s.to_ascii_lowercase().starts_with("url(") {
        return None;
    }
    let open = s.find('(')?;
    let close = s.rfind(')')?;
    if close <= open + 1 {
        return None;
    }
    let inner = s[open + 1..close]
        .trim()
        .trim_matches('"')
        .trim_matches('\'');
    let id = inner.strip_prefix('#')?;
    (!id.is_empty()).then(|| id.to_string())
}

struct PendingGradient {
    radial: bool,
    href: Option<String>,
    units: Option<GradientUnits>,
    spread: Option<SpreadMode>,
    transform: Option<Matrix>,
    x1: Option<f32>,
    y1: Option<f32>,
    x2: Option<f32>,
    y2: Option<f32>,
    cx: Option<f32>,
    cy: Option<f32>,
    r: Option<f32>,
    stops: Vec<GradientStop>,
}

fn register_gradients(doc: &roxmltree::Document<'_>, registry: &mut GradientRegistry) {
    let mut pending: Vec<(String, PendingGradient)> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();

    for node in doc.descendants().filter(|n| n.is_element()) {
        let radial = match node.tag_name().name() {
            "linearGradient" => false,
            "radialGradient" => true,
            _ => continue,
        };
        let Some(id) = node.attribute("id") else {
            continue;
        };
        if by_id.contains_key(id) {
            continue;
        }
        by_id.insert(id.to_string(), pending.len());
        pending.push((id.to_string(), parse_gradient(node, radial)));
    }

    for index in 0..pending.len() {
        let resolved = resolve_pending(&pending, &by_id, index);
        let id = &pending[index].0;
        match resolved {
            Gradient::Linear(gradient) => registry.register_linear(id, gradient),
            Gradient::Radial(gradient) => registry.register_radial(id, gradient),
        }
    }
}

fn parse_gradient(node: roxmltree::Node<'_, '_>, radial: bool) -> PendingGradient {
    let href = href_id(node);
    let units = node.attribute("gradientUnits").map(|v| match v.trim() {
        "userSpaceOnUse" => GradientUnits::UserSpaceOnUse,
        _ => GradientUnits::ObjectBoundingBox,
    });
    let spread = node.attribute("spreadMethod").map(|v| match v.trim() {
        "reflect" => SpreadMode::Reflect,
        "repeat" => SpreadMode::Repeat,
        _ => SpreadMode::Pad,
    });
    let transform = node.attribute("gradientTransform").map(parse_transform);

    let stops = node
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "stop")
        .map(parse_stop)
        .collect();

    PendingGradient {
        radial,
        href,
        units,
        spread,
        transform,
        x1: gradient_coord(node, "x1"),
        y1: gradient_coord(node, "y1"),
        x2: gradient_coord(node, "x2"),
        y2: gradient_coord(node, "y2"),
        cx: gradient_coord(node, "cx"),
        cy: gradient_coord(node, "cy"),
        r: gradient_coord(node, "r"),
        stops,
    }
}

/// Walks the href chain, nearest definition first, and fills whatever the
/// referencing gradient left unspecified. The hop cap doubles as a cycle
/// guard.
fn resolve_pending(
    pending: &[(String, PendingGradient)],
    by_id: &HashMap<String, usize>,
    index: usize,
) -> Gradient {
    let mut chain: Vec<&PendingGradient> = Vec::new();
    let mut cursor = Some(index);
    while let Some(i) = cursor {
        if chain.len() >= 8 {
            break;
        }
        let entry = &pending[i].1;
        chain.push(entry);
        cursor = entry
            .href
            .as_deref()
            .and_then(|href| by_id.get(href).copied());
    }

    let first = |pick: fn(&PendingGradient) -> Option<f32>| {
        chain.iter().copied().find_map(pick)
    };
    let units = chain.iter().find_map(|g| g.units).unwrap_or_default();
    let spread = chain.iter().find_map(|g| g.spread).unwrap_or_default();
    let transform = chain.iter().find_map(|g| g.transform);
    let stops = chain
        .iter()
        .find(|g| !g.stops.is_empty())
        .map(|g| g.stops.clone())
        .unwrap_or_default();

    if chain[0].radial {
        Gradient::Radial(RadialGradient {
            units,
            cx: first(|g| g.cx).unwrap_or(0.5),
            cy: first(|g| g.cy).unwrap_or(0.5),
            r: first(|g| g.r).unwrap_or(0.5),
            stops,
            spread,
            transform,
        })
    } else {
        Gradient::Linear(LinearGradient {
            units,
            x1: first(|g| g.x1).unwrap_or(0.0),
            y1: first(|g| g.y1).unwrap_or(0.0),
            x2: first(|g| g.x2).unwrap_or(1.0),
            y2: first(|g| g.y2).unwrap_or(0.0),
            stops,
            spread,
            transform,
        })
    }
}

fn parse_stop(node: roxmltree::Node<'_, '_>) -> GradientStop {
    let mut color = node.attribute("stop-color").and_then(parse_color);
    let mut opacity = node.attribute("stop-opacity").and_then(parse_number);
    // Inline style wins over the presentation attributes.
    if let Some(style) = node.attribute("style") {
        for declaration in style.split(';') {
            let Some((key, value)) = declaration.split_once(':') else {
                continue;
            };
            match key.trim() {
                "stop-color" => color = parse_color(value.trim()).or(color),
                "stop-opacity" => opacity = parse_number(value.trim()).or(opacity),
                _ => {}
            }
        }
    }
    GradientStop {
        offset: parse_stop_offset(node.attribute("offset")).unwrap_or(0.0),
        color: color.unwrap_or(Color::BLACK),
        opacity: opacity.unwrap_or(1.0).clamp(0.0, 1.0),
    }
}

fn parse_stop_offset(input: Option<&str>) -> Option<f32> {
    let s = input?.trim();
    if let Some(percent) = s.strip_suffix('%') {
        let v = percent.trim().parse::<f32>().ok()?;
        return Some((v / 100.0).clamp(0.0, 1.0));
    }
    let v = s.parse::<f32>().ok()?;
    Some(v.clamp(0.0, 1.0))
}

/// Gradient coordinates treat percentages as fractions, which is exact for
/// object-bounding-box units.
fn gradient_coord(node: roxmltree::Node<'_, '_>, name: &str) -> Option<f32> {
    let raw = node.attribute(name)?.trim();
    if let Some(percent) = raw.strip_suffix('%') {
        return percent.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }
    parse_number(raw)
}

fn parse_color(input: &str) -> Option<Color> {
    let v = input.trim();
    if let Some(hex) = v.strip_prefix('#') {
        return parse_hex_color(hex);
    }
    let lower = v.to_ascii_lowercase();
    if lower.starts_with("rgb") {
        return parse_rgb_color(&lower);
    }
    named_color(&lower)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim();
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Color::from_rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::from_rgb(r, g, b))
        }
        _ => None,
    }
}

fn parse_rgb_color(input: &str) -> Option<Color> {
    let open = input.find('(')?;
    let close = input.rfind(')')?;
    if close <= open {
        return None;
    }
    let parts: Vec<&str> = input[open + 1..close].split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r = parse_rgb_component(parts[0])?;
    let g = parse_rgb_component(parts[1])?;
    let b = parse_rgb_component(parts[2])?;
    if parts.len() == 4 {
        let alpha = parse_alpha_component(parts[3])?.clamp(0.0, 1.0);
        return Some(Color::from_argb((alpha * 255.0).round() as u8, r, g, b));
    }
    Some(Color::from_rgb(r, g, b))
}

fn parse_rgb_component(input: &str) -> Option<u8> {
    if let Some(percent) = input.strip_suffix('%') {
        let v = percent.trim().parse::<f32>().ok()?;
        return Some((v.clamp(0.0, 100.0) * 255.0 / 100.0).round() as u8);
    }
    let v = input.parse::<f32>().ok()?;
    Some(v.clamp(0.0, 255.0).round() as u8)
}

fn parse_alpha_component(input: &str) -> Option<f32> {
    if let Some(percent) = input.strip_suffix('%') {
        return percent.trim().parse::<f32>().ok().map(|v| v / 100.0);
    }
    input.parse::<f32>().ok()
}

/// Enough of the CSS named colors for common tool exports.
fn named_color(name: &str) -> Option<Color> {
    match name {
        "black" => Some(Color::BLACK),
        "white" => Some(Color::WHITE),
        "red" => Some(Color::from_rgb(255, 0, 0)),
        "green" => Some(Color::from_rgb(0, 128, 0)),
        "lime" => Some(Color::from_rgb(0, 255, 0)),
        "blue" => Some(Color::from_rgb(0, 0, 255)),
        "yellow" => Some(Color::from_rgb(255, 255, 0)),
        "cyan" | "aqua" => Some(Color::from_rgb(0, 255, 255)),
        "magenta" | "fuchsia" => Some(Color::from_rgb(255, 0, 255)),
        "gray" | "grey" => Some(Color::from_rgb(128, 128, 128)),
        "silver" => Some(Color::from_rgb(192, 192, 192)),
        "orange" => Some(Color::from_rgb(255, 165, 0)),
        "purple" => Some(Color::from_rgb(128, 0, 128)),
        "transparent" => Some(Color::TRANSPARENT),
        _ => None,
    }
}

fn parse_number(input: &str) -> Option<f32> {
    let s = input.trim();
    // Unit suffixes are dropped; user units pass through as-is.
    let s = s
        .trim_end_matches("px")
        .trim_end_matches("pt")
        .trim_end_matches("mm")
        .trim_end_matches("cm")
        .trim_end_matches("in")
        .trim();
    s.parse::<f32>().ok()
}

fn parse_number_list(input: &str) -> Vec<f32> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .filter_map(parse_number)
        .collect()
}

fn attr_number(node: roxmltree::Node<'_, '_>, name: &str, default: f32) -> f32 {
    node.attribute(name)
        .and_then(parse_number)
        .unwrap_or(default)
}

fn parse_transform(input: &str) -> Matrix {
    let mut out = Matrix::identity();
    let mut s = input.trim();

    while !s.is_empty() {
        let Some(open) = s.find('(') else { break };
        let name = s[..open].trim();
        let Some(close) = s[open + 1..].find(')') else {
            break;
        };
        let args = parse_number_list(&s[open + 1..open + 1 + close]);

        let m = match name {
            "translate" => {
                let tx = args.first().copied().unwrap_or(0.0);
                let ty = args.get(1).copied().unwrap_or(0.0);
                Matrix::translate(tx, ty)
            }
            "scale" => {
                let sx = args.first().copied().unwrap_or(1.0);
                let sy = args.get(1).copied().unwrap_or(sx);
                Matrix::scale(sx, sy)
            }
            "rotate" => {
                let angle = args.first().copied().unwrap_or(0.0);
                if args.len() >= 3 {
                    Matrix::translate(args[1], args[2])
                        .mul(Matrix::rotate(angle))
                        .mul(Matrix::translate(-args[1], -args[2]))
                } else {
                    Matrix::rotate(angle)
                }
            }
            "matrix" => {
                if args.len() >= 6 {
                    Matrix::from_values([args[0], args[1], args[2], args[3], args[4], args[5]])
                } else {
                    Matrix::identity()
                }
            }
            _ => Matrix::identity(),
        };

        out = out.mul(m);
        s = s[open + 1 + close + 1..].trim_start();
    }

    out
}

fn parse_view_box(input: Option<&str>) -> Option<Rect> {
    let raw = input?;
    let mut it = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty());
    let x = it.next()?.parse::<f32>().ok()?;
    let y = it.next()?.parse::<f32>().ok()?;
    let width = it.next()?.parse::<f32>().ok()?;
    let height = it.next()?.parse::<f32>().ok()?;
    Some(Rect::new(x, y, width, height))
}

fn parse_preserve_aspect_ratio(input: Option<&str>) -> (Align, Align, ScaleMode) {
    let Some(raw) = input else {
        return (Align::Mid, Align::Mid, ScaleMode::Meet);
    };
    let mut it = raw.split_ascii_whitespace();
    let alignment = it.next().unwrap_or("");
    if alignment.eq_ignore_ascii_case("none") {
        return (Align::None, Align::None, ScaleMode::None);
    }
    let (align_x, align_y) = match alignment {
        "xMinYMin" => (Align::Min, Align::Min),
        "xMidYMin" => (Align::Mid, Align::Min),
        "xMaxYMin" => (Align::Max, Align::Min),
        "xMinYMid" => (Align::Min, Align::Mid),
        "xMaxYMid" => (Align::Max, Align::Mid),
        "xMinYMax" => (Align::Min, Align::Max),
        "xMidYMax" => (Align::Mid, Align::Max),
        "xMaxYMax" => (Align::Max, Align::Max),
        _ => (Align::Mid, Align::Mid),
    };
    let scale = match it.next() {
        Some("slice") => ScaleMode::Slice,
        _ => ScaleMode::Meet,
    };
    (align_x, align_y, scale)
}

/// Parses an SVG path data string. Leniency runs one way: the first token
/// that is neither a command nor a usable number ends the parse and
/// everything built so far is kept.
fn parse_path_data(d: &str) -> Path {
    let mut path = Path::new();
    let mut scanner = PathScanner::new(d);
    let mut cmd = ' ';
    let mut cur_x = 0.0f32;
    let mut cur_y = 0.0f32;
    let mut start_x = 0.0f32;
    let mut start_y = 0.0f32;
    let mut last_cubic_ctrl: Option<(f32, f32)> = None;
    let mut last_quad_ctrl: Option<(f32, f32)> = None;
    let mut stall = usize::MAX;

    while let Some(c) = scanner.next_command(&mut cmd) {
        // A repeat that consumed nothing would spin forever.
        if scanner.offset() == stall {
            break;
        }
        stall = scanner.offset();

        match c {
            'M' | 'm' => {
                let rel = c == 'm';
                if let Some((x, y)) = scanner.next_pair() {
                    let (x, y) = if rel { (cur_x + x, cur_y + y) } else { (x, y) };
                    path.move_to(x, y);
                    cur_x = x;
                    cur_y = y;
                    start_x = x;
                    start_y = y;
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;

                    // Extra pairs after a move are implicit line commands.
                    while let Some((lx, ly)) = scanner.next_pair() {
                        let (lx, ly) = if rel {
                            (cur_x + lx, cur_y + ly)
                        } else {
                            (lx, ly)
                        };
                        path.line_to(lx, ly);
                        cur_x = lx;
                        cur_y = ly;
                    }
                }
            }
            'L' | 'l' => {
                let rel = c == 'l';
                while let Some((x, y)) = scanner.next_pair() {
                    let (x, y) = if rel { (cur_x + x, cur_y + y) } else { (x, y) };
                    path.line_to(x, y);
                    cur_x = x;
                    cur_y = y;
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'H' | 'h' => {
                let rel = c == 'h';
                while let Some(x) = scanner.next_number() {
                    let x = if rel { cur_x + x } else { x };
                    path.line_to(x, cur_y);
                    cur_x = x;
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'V' | 'v' => {
                let rel = c == 'v';
                while let Some(y) = scanner.next_number() {
                    let y = if rel { cur_y + y } else { y };
                    path.line_to(cur_x, y);
                    cur_y = y;
                }
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            'C' | 'c' => {
                let rel = c == 'c';
                while let (Some(x1), Some(y1), Some(x2), Some(y2), Some(x), Some(y)) = (
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                ) {
                    let (x1, y1, x2, y2, x, y) = if rel {
                        (
                            cur_x + x1,
                            cur_y + y1,
                            cur_x + x2,
                            cur_y + y2,
                            cur_x + x,
                            cur_y + y,
                        )
                    } else {
                        (x1, y1, x2, y2, x, y)
                    };
                    path.cubic_to(x1, y1, x2, y2, x, y);
                    cur_x = x;
                    cur_y = y;
                    last_cubic_ctrl = Some((x2, y2));
                    last_quad_ctrl = None;
                }
            }
            'S' | 's' => {
                let rel = c == 's';
                while let (Some(x2), Some(y2), Some(x), Some(y)) = (
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                ) {
                    let (x2, y2, x, y) = if rel {
                        (cur_x + x2, cur_y + y2, cur_x + x, cur_y + y)
                    } else {
                        (x2, y2, x, y)
                    };
                    let (x1, y1) = match last_cubic_ctrl {
                        Some((px, py)) => (2.0 * cur_x - px, 2.0 * cur_y - py),
                        None => (cur_x, cur_y),
                    };
                    path.cubic_to(x1, y1, x2, y2, x, y);
                    cur_x = x;
                    cur_y = y;
                    last_cubic_ctrl = Some((x2, y2));
                    last_quad_ctrl = None;
                }
            }
            'Q' | 'q' => {
                let rel = c == 'q';
                while let (Some(qx), Some(qy), Some(x), Some(y)) = (
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                    scanner.next_number(),
                ) {
                    let (qx, qy, x, y) = if rel {
                        (cur_x + qx, cur_y + qy, cur_x + x, cur_y + y)
                    } else {
                        (qx, qy, x, y)
                    };
                    path.quad_to(qx, qy, x, y);
                    cur_x = x;
                    cur_y = y;
                    last_quad_ctrl = Some((qx, qy));
                    last_cubic_ctrl = None;
                }
            }
            'T' | 't' => {
                let rel = c == 't';
                while let Some((x, y)) = scanner.next_pair() {
                    let (x, y) = if rel { (cur_x + x, cur_y + y) } else { (x, y) };
                    let (qx, qy) = match last_quad_ctrl {
                        Some((px, py)) => (2.0 * cur_x - px, 2.0 * cur_y - py),
                        None => (cur_x, cur_y),
                    };
                    path.quad_to(qx, qy, x, y);
                    cur_x = x;
                    cur_y = y;
                    last_quad_ctrl = Some((qx, qy));
                    last_cubic_ctrl = None;
                }
            }
            'A' | 'a' => {
                let rel = c == 'a';
                loop {
                    let (Some(rx), Some(ry), Some(rot)) = (
                        scanner.next_number(),
                        scanner.next_number(),
                        scanner.next_number(),
                    ) else {
                        break;
                    };
                    let (Some(large), Some(sweep)) = (scanner.next_flag(), scanner.next_flag())
                    else {
                        break;
                    };
                    let Some((x, y)) = scanner.next_pair() else {
                        break;
                    };
                    let (x, y) = if rel { (cur_x + x, cur_y + y) } else { (x, y) };
                    arc_to(&mut path, cur_x, cur_y, rx, ry, rot, large, sweep, x, y);
                    cur_x = x;
                    cur_y = y;
                    last_cubic_ctrl = None;
                    last_quad_ctrl = None;
                }
            }
            'Z' | 'z' => {
                path.close();
                cur_x = start_x;
                cur_y = start_y;
                last_cubic_ctrl = None;
                last_quad_ctrl = None;
            }
            _ => break,
        }
    }

    path
}

struct PathScanner<'a> {
    bytes: &'a [u8],
    i: usize,
}

impl<'a> PathScanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            bytes: input.as_bytes(),
            i: 0,
        }
    }

    fn offset(&self) -> usize {
        self.i
    }

    fn skip_separators(&mut self) {
        while self.i < self.bytes.len() {
            match self.bytes[self.i] {
                b' ' | b'\n' | b'\r' | b'\t' | b',' => self.i += 1,
                _ => break,
            }
        }
    }

    /// Returns the next command letter, or the current command again when
    /// the next token starts a number and the current command takes
    /// arguments. Anything else ends the stream.
    fn next_command(&mut self, current: &mut char) -> Option<char> {
        self.skip_separators();
        if self.i >= self.bytes.len() {
            return None;
        }
        let b = self.bytes[self.i];
        if b.is_ascii_alphabetic() {
            *current = b as char;
            self.i += 1;
            return Some(*current);
        }
        let repeatable = current.is_ascii_alphabetic() && !matches!(*current, 'Z' | 'z');
        if repeatable && matches!(b, b'0'..=b'9' | b'+' | b'-' | b'.') {
            return Some(*current);
        }
        None
    }

    fn next_number(&mut self) -> Option<f32> {
        self.skip_separators();
        if self.i >= self.bytes.len() {
            return None;
        }
        let start = self.i;
        let mut has_digits = false;

        if matches!(self.bytes[self.i], b'+' | b'-') {
            self.i += 1;
        }
        while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
            self.i += 1;
            has_digits = true;
        }
        if self.i < self.bytes.len() && self.bytes[self.i] == b'.' {
            self.i += 1;
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
                has_digits = true;
            }
        }
        if self.i < self.bytes.len() && matches!(self.bytes[self.i], b'e' | b'E') {
            self.i += 1;
            if self.i < self.bytes.len() && matches!(self.bytes[self.i], b'+' | b'-') {
                self.i += 1;
            }
            while self.i < self.bytes.len() && self.bytes[self.i].is_ascii_digit() {
                self.i += 1;
                has_digits = true;
            }
        }

        if !has_digits {
            self.i = start;
            return None;
        }

        let s = std::str::from_utf8(&self.bytes[start..self.i]).ok()?;
        s.parse::<f32>().ok()
    }

    fn next_pair(&mut self) -> Option<(f32, f32)> {
        let x = self.next_number()?;
        let y = self.next_number()?;
        Some((x, y))
    }

    /// Arc flags are single digits that may butt directly against the next
    /// number, so a leading 0 or 1 is taken on its own.
    fn next_flag(&mut self) -> Option<bool> {
        self.skip_separators();
        if self.i >= self.bytes.len() {
            return None;
        }
        match self.bytes[self.i] {
            b'0' => {
                self.i += 1;
                Some(false)
            }
            b'1' => {
                self.i += 1;
                Some(true)
            }
            _ => self.next_number().map(|v| v.abs() > 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::font::FontStore;
    use crate::paint::ResolvedBrush;
    use crate::path::PathSeg;

    fn render(svg: &str) -> Recording {
        render_svg(
            svg,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            SvgOptions::default(),
        )
        .expect("render")
    }

    fn fills(recording: &Recording) -> Vec<&crate::paint::ResolvedFill> {
        recording
            .commands()
            .iter()
            .filter_map(|c| match c {
                Command::FillPath { fill, .. } => Some(fill),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_simple_path() {
        let path = parse_path_data("M 0 0 L 10 0 L 10 10 Z");
        assert_eq!(
            path.segments(),
            &[
                PathSeg::MoveTo(0.0, 0.0),
                PathSeg::LineTo(10.0, 0.0),
                PathSeg::LineTo(10.0, 10.0),
                PathSeg::Close,
            ]
        );
    }

    #[test]
    fn relative_commands_accumulate() {
        let path = parse_path_data("m 1 2 l 4 0 v 4 h -4 z");
        assert_eq!(
            path.segments(),
            &[
                PathSeg::MoveTo(1.0, 2.0),
                PathSeg::LineTo(5.0, 2.0),
                PathSeg::LineTo(5.0, 6.0),
                PathSeg::LineTo(1.0, 6.0),
                PathSeg::Close,
            ]
        );
    }

    #[test]
    fn smooth_cubic_reflects_the_previous_control_point() {
        let path = parse_path_data("M 0 0 C 0 10 10 10 10 0 S 20 -10 20 0");
        assert_eq!(
            path.segments()[2],
            PathSeg::CubicTo(10.0, -10.0, 20.0, -10.0, 20.0, 0.0)
        );
    }

    #[test]
    fn smooth_quad_reflects_the_previous_control_point() {
        let path = parse_path_data("M 0 0 Q 5 10 10 0 T 20 0");
        assert_eq!(path.segments()[1], PathSeg::QuadTo(5.0, 10.0, 10.0, 0.0));
        assert_eq!(path.segments()[2], PathSeg::QuadTo(15.0, -10.0, 20.0, 0.0));
    }

    #[test]
    fn arc_flags_parse_without_separators() {
        let path = parse_path_data("M10 10 A5 5 0 01 20 20");
        assert!(
            path.segments()
                .iter()
                .any(|s| matches!(s, PathSeg::CubicTo(..))),
            "compact arc flag syntax should produce cubic segments"
        );
    }

    #[test]
    fn malformed_tokens_keep_leading_segments() {
        let path = parse_path_data("M 0 0 L 5 5 @ L 9 9");
        assert_eq!(
            path.segments(),
            &[PathSeg::MoveTo(0.0, 0.0), PathSeg::LineTo(5.0, 5.0)]
        );

        let path = parse_path_data("M 0 0 X 9 9");
        assert_eq!(path.segments(), &[PathSeg::MoveTo(0.0, 0.0)]);
    }

    #[test]
    fn viewbox_scales_into_the_viewport() {
        let recording = render_svg(
            r##"<svg viewBox="0 0 10 10"><rect width="10" height="10" fill="#102030"/></svg>"##,
            Rect::new(0.0, 0.0, 20.0, 20.0),
            SvgOptions::default(),
        )
        .expect("render");

        let commands = recording.commands();
        assert_eq!(commands.len(), 4);
        match &commands[1] {
            Command::Concat(m) => {
                assert_eq!((m.a, m.d), (2.0, 2.0));
                assert_eq!((m.e, m.f), (0.0, 0.0));
            }
            other => panic!("expected view box concat, got {other:?}"),
        }
        match &commands[2] {
            Command::FillPath { fill, .. } => {
                assert_eq!(fill.brush, ResolvedBrush::Solid(Color::from_rgb(0x10, 0x20, 0x30)));
            }
            other => panic!("expected fill, got {other:?}"),
        }
    }

    #[test]
    fn preserve_aspect_ratio_controls_the_fit() {
        let stretched = render_svg(
            r#"<svg viewBox="0 0 10 5" preserveAspectRatio="none"><rect width="1" height="1"/></svg>"#,
            Rect::new(0.0, 0.0, 20.0, 20.0),
            SvgOptions::default(),
        )
        .expect("render");
        match &stretched.commands()[1] {
            Command::Concat(m) => assert_eq!((m.a, m.d), (2.0, 4.0)),
            other => panic!("expected concat, got {other:?}"),
        }

        let centered = render_svg(
            r#"<svg viewBox="0 0 10 5"><rect width="1" height="1"/></svg>"#,
            Rect::new(0.0, 0.0, 20.0, 20.0),
            SvgOptions::default(),
        )
        .expect("render");
        match &centered.commands()[1] {
            Command::Concat(m) => {
                assert_eq!((m.a, m.d), (2.0, 2.0));
                // Vertical slack splits evenly under mid alignment.
                assert_eq!(m.f, 5.0);
            }
            other => panic!("expected concat, got {other:?}"),
        }
    }

    #[test]
    fn gradient_fill_resolves_against_shape_bounds() {
        let recording = render(
            r##"<svg>
              <defs>
                <linearGradient id="wash">
                  <stop offset="0" stop-color="#000000"/>
                  <stop offset="100%" stop-color="#ffffff"/>
                </linearGradient>
              </defs>
              <rect x="10" y="20" width="100" height="50" fill="url(#wash)"/>
            </svg>"##,
        );

        let fills = fills(&recording);
        assert_eq!(fills.len(), 1);
        match &fills[0].brush {
            ResolvedBrush::Linear {
                x1,
                y1,
                x2,
                y2,
                stops,
                ..
            } => {
                assert_eq!((*x1, *y1), (10.0, 20.0));
                assert_eq!((*x2, *y2), (110.0, 20.0));
                assert_eq!(stops.len(), 2);
                assert_eq!(stops[1].offset, 1.0);
            }
            other => panic!("expected linear brush, got {other:?}"),
        }
    }

    #[test]
    fn gradient_href_chains_inherit_stops_and_coordinates() {
        let recording = render(
            r##"<svg>
              <linearGradient id="base" x1="0.25">
                <stop offset="0" stop-color="red"/>
                <stop offset="1" stop-color="blue" stop-opacity="0.5"/>
              </linearGradient>
              <linearGradient id="derived" href="#base" x2="0.75"/>
              <rect width="10" height="10" fill="url(#derived)"/>
            </svg>"##,
        );

        let fills = fills(&recording);
        assert_eq!(fills.len(), 1);
        match &fills[0].brush {
            ResolvedBrush::Linear { x1, x2, stops, .. } => {
                assert_eq!((*x1, *x2), (2.5, 7.5));
                assert_eq!(stops.len(), 2);
                assert_eq!(stops[0].color, Color::from_rgb(255, 0, 0));
                assert_eq!(stops[1].color, Color::from_argb(128, 0, 0, 255));
            }
            other => panic!("expected linear brush, got {other:?}"),
        }
    }

    #[test]
    fn spread_method_parses_reflect_repeat_and_defaults_to_pad() {
        let doc = roxmltree::Document::parse(
            r##"<svg>
              <linearGradient id="mirror" spreadMethod="reflect"/>
              <linearGradient id="tile" spreadMethod="repeat"/>
              <radialGradient id="typo" spreadMethod="bounce"/>
              <linearGradient id="plain"/>
            </svg>"##,
        )
        .expect("parse");
        let mut registry = GradientRegistry::new();
        register_gradients(&doc, &mut registry);

        let spread = |iri: &str| match registry.get(iri).expect("registered") {
            Gradient::Linear(gradient) => gradient.spread,
            Gradient::Radial(gradient) => gradient.spread,
        };
        assert_eq!(spread("#mirror"), SpreadMode::Reflect);
        assert_eq!(spread("#tile"), SpreadMode::Repeat);
        assert_eq!(spread("#typo"), SpreadMode::Pad);
        assert_eq!(spread("#plain"), SpreadMode::Pad);
    }

    #[test]
    fn use_references_translate_into_place() {
        let recording = render(
            r##"<svg><defs><rect id="unit" width="4" height="4"/></defs><use href="#unit" x="5" y="6"/></svg>"##,
        );

        let commands = recording.commands();
        let translate_at = commands
            .iter()
            .position(|c| *c == Command::Translate(5.0, 6.0))
            .expect("translate");
        assert!(matches!(
            commands[translate_at + 1],
            Command::FillPath { .. }
        ));
    }

    #[test]
    fn clip_path_references_merge_their_shapes() {
        let recording = render(
            r##"<svg>
              <clipPath id="frame"><rect width="8" height="8"/><circle cx="4" cy="4" r="2"/></clipPath>
              <rect width="10" height="10" clip-path="url(#frame)" fill="#ff0000"/>
            </svg>"##,
        );

        let commands = recording.commands();
        let clip_at = commands
            .iter()
            .position(|c| matches!(c, Command::ClipPath { .. }))
            .expect("clip");
        match &commands[clip_at] {
            Command::ClipPath { path, rule } => {
                assert_eq!(*rule, FillRule::NonZero);
                let moves = path
                    .segments()
                    .iter()
                    .filter(|s| matches!(s, PathSeg::MoveTo(..)))
                    .count();
                assert_eq!(moves, 2);
            }
            other => panic!("expected clip, got {other:?}"),
        }
        assert!(matches!(
            commands[clip_at + 1],
            Command::FillPath { .. }
        ));
    }

    #[test]
    fn opacity_attributes_compose_multiplicatively() {
        let recording = render(
            r##"<svg><g opacity="0.5"><rect width="4" height="4" fill="#000000" fill-opacity="0.5"/></g></svg>"##,
        );

        let fills = fills(&recording);
        assert_eq!(fills.len(), 1);
        assert_eq!(
            fills[0].brush,
            ResolvedBrush::Solid(Color::from_argb(64, 0, 0, 0))
        );
    }

    #[test]
    fn stroke_attributes_map_onto_the_stroke_model() {
        let recording = render(
            r##"<svg><line x1="0" y1="0" x2="10" y2="0" stroke="red" stroke-width="3"
                 stroke-linecap="round" stroke-linejoin="bevel" stroke-miterlimit="8"
                 stroke-dasharray="4 2" stroke-dashoffset="1"/></svg>"##,
        );

        let stroke = recording
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::StrokePath { stroke, .. } => Some(stroke),
                _ => None,
            })
            .expect("stroke");
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.cap, LineCap::Round);
        assert_eq!(stroke.join, LineJoin::Bevel);
        assert_eq!(stroke.miter_limit, 8.0);
        let dash = stroke.dash.as_ref().expect("dash");
        assert_eq!(dash.intervals, vec![4.0, 2.0]);
        assert_eq!(dash.offset, 1.0);
        assert_eq!(stroke.brush, ResolvedBrush::Solid(Color::from_rgb(255, 0, 0)));
    }

    #[test]
    fn fill_none_draws_nothing() {
        let recording =
            render(r##"<svg><rect width="4" height="4" fill="none"/></svg>"##);
        assert_eq!(recording.commands().len(), 2);
        assert_eq!(recording.commands()[0], Command::Save);
        assert_eq!(recording.commands()[1], Command::Restore);
    }

    #[test]
    fn unknown_elements_are_skipped() {
        let recording = render(
            r##"<svg><video width="4" height="4"/><rect width="4" height="4" fill="red"/></svg>"##,
        );
        assert_eq!(fills(&recording).len(), 1);
    }

    #[test]
    fn text_is_measured_anchored_and_styled() {
        let recording = render_svg(
            r##"<svg><text x="100" y="50" text-anchor="middle" font-size="10" fill="#004080">hi</text></svg>"##,
            Rect::new(0.0, 0.0, 200.0, 100.0),
            SvgOptions {
                shaper: Some(Arc::new(FontStore::new())),
                ..SvgOptions::default()
            },
        )
        .expect("render");

        let (text, x, y) = recording
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::DrawText { text, x, y } => Some((text, *x, *y)),
                _ => None,
            })
            .expect("text");
        // Fallback metrics: two glyphs at half an em each.
        assert_eq!(x, 95.0);
        assert_eq!(y, 53.0);
        assert_eq!(text.spans()[0].color, Color::from_rgb(0x00, 0x40, 0x80));
        assert_eq!(text.spans()[0].size, 10.0);
    }

    #[test]
    fn image_elements_draw_through_the_provider() {
        let mut provider = crate::assets::AssetProvider::new();
        provider.insert("chip.png", png_bytes(2, 1));
        let recording = render_svg(
            r##"<svg><image href="chip.png" x="1" y="2" width="8" height="4"/></svg>"##,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            SvgOptions {
                resources: Some(Arc::new(provider)),
                ..SvgOptions::default()
            },
        )
        .expect("render");

        let placement = recording
            .commands()
            .iter()
            .find_map(|c| match c {
                Command::DrawBitmap { placement, .. } => Some(*placement),
                _ => None,
            })
            .expect("bitmap");
        assert_eq!((placement.a, placement.d), (4.0, 4.0));
        assert_eq!((placement.e, placement.f), (1.0, 2.0));
    }

    #[test]
    fn bad_documents_error_out() {
        let viewport = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(matches!(
            render_svg("not xml at all", viewport, SvgOptions::default()),
            Err(SvgError::Xml(_))
        ));
        assert!(matches!(
            render_svg("<html><body/></html>", viewport, SvgOptions::default()),
            Err(SvgError::MissingRoot)
        ));
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut src = image::RgbaImage::new(width, height);
        for px in src.pixels_mut() {
            *px = image::Rgba([255, 0, 0, 255]);
        }
        let mut bytes = Vec::new();
        src.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }
}
