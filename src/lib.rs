mod arc;
mod assets;
mod canvas;
mod debug;
mod error;
mod font;
mod gradient;
mod paint;
mod path;
mod raster;
mod render;
mod svg;
mod types;

pub use assets::{AssetProvider, Bitmap, BitmapCallback, ResourceProvider};
pub use canvas::{Canvas, Command, Recording};
pub use debug::{DEBUG_LOG_ENV, DebugLog};
pub use error::{GeometryError, ResourceError, SvgError};
pub use font::{FontStore, StyledText, TextAnchor, TextMetrics, TextShaper, TextSpan};
pub use gradient::{
    Gradient, GradientRegistry, GradientStop, GradientUnits, LinearGradient, RadialGradient,
    ResolvedStop, SpreadMode,
};
pub use paint::{
    Dash, FillPaint, FillRule, LineCap, LineJoin, PaintRef, ResolvedBrush, ResolvedFill,
    ResolvedStroke, StrokePaint, resolve_fill, resolve_stroke,
};
pub use path::{
    CombineMode, OP_CLOSE, OP_CUBIC_BEZ, OP_ELLIPTICAL_ARC, OP_LINE_TO, OP_MOVE_TO, OP_QUAD_ARC,
    Path, PathCombiner, PathSeg, build_path, circle_path, ellipse_path, line_path, polygon_path,
    polyline_path, rect_path,
};
pub use raster::PixmapCanvas;
pub use render::Renderer;
pub use svg::{SvgOptions, render_svg, render_svg_with};
pub use types::{Align, Color, Matrix, Rect, ScaleMode, view_box_transform};
