use std::fmt;

/// Structural failure while replaying an opcode stream into a path.
///
/// Only malformed input raises this: an opcode outside the known set, or a
/// value buffer that runs out before the opcode's operands are consumed.
/// Numeric degeneracies (zero radii, reversed stops, out-of-range arc
/// radii) never error; they recover to a documented fallback. The error is
/// scoped to the path being built, paths built earlier in the same pass are
/// unaffected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    UnknownOpcode {
        opcode: u8,
        index: usize,
    },
    TruncatedValues {
        opcode: u8,
        index: usize,
        needed: usize,
        available: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::UnknownOpcode { opcode, index } => {
                write!(f, "unknown path opcode {} at op index {}", opcode, index)
            }
            GeometryError::TruncatedValues {
                opcode,
                index,
                needed,
                available,
            } => {
                write!(
                    f,
                    "path opcode {} at op index {} needs {} values, {} remain",
                    opcode, index, needed, available
                )
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Failure to turn an SVG document into a render pass.
#[derive(Debug)]
pub enum SvgError {
    Xml(roxmltree::Error),
    MissingRoot,
}

impl fmt::Display for SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvgError::Xml(err) => write!(f, "svg parse error: {}", err),
            SvgError::MissingRoot => write!(f, "document has no svg root element"),
        }
    }
}

impl std::error::Error for SvgError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SvgError::Xml(err) => Some(err),
            SvgError::MissingRoot => None,
        }
    }
}

impl From<roxmltree::Error> for SvgError {
    fn from(value: roxmltree::Error) -> Self {
        SvgError::Xml(value)
    }
}

/// Reported through the resource provider's completion callback when a
/// bitmap request cannot be satisfied. The draw that asked for the bitmap
/// is silently omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError(pub String);

impl ResourceError {
    pub fn new(message: impl Into<String>) -> Self {
        ResourceError(message.into())
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource error: {}", self.0)
    }
}

impl std::error::Error for ResourceError {}
