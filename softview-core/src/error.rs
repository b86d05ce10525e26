/// Error types shared across the core crate
use std::fmt;

/// Domain errors from the linear algebra kernel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    /// Division by a scalar whose magnitude is below the kernel epsilon
    NearZeroDivisor(f32),
    /// Normalizing a vector whose length is below the kernel epsilon
    ZeroLength,
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::NearZeroDivisor(d) => write!(f, "division by near-zero scalar {}", d),
            MathError::ZeroLength => write!(f, "cannot normalize a zero-length vector"),
        }
    }
}

impl std::error::Error for MathError {}

/// Which per-vertex attribute an index list refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Position,
    TextureCoord,
    Normal,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Position => "vertex",
            Attribute::TextureCoord => "texture coordinate",
            Attribute::Normal => "normal",
        };
        f.write_str(name)
    }
}

/// Data-shape errors raised while building or editing a mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A parallel index list does not match the vertex index list length
    IndexCountMismatch {
        attribute: Attribute,
        expected: usize,
        found: usize,
    },
    /// An index points past the end of the attribute array
    IndexOutOfRange {
        attribute: Attribute,
        index: usize,
        len: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::IndexCountMismatch {
                attribute,
                expected,
                found,
            } => write!(
                f,
                "{} index count {} does not match vertex index count {}",
                attribute, found, expected
            ),
            GeometryError::IndexOutOfRange {
                attribute,
                index,
                len,
            } => write!(f, "{} index {} is out of range (len {})", attribute, index, len),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Errors from reading or writing Wavefront OBJ data
#[derive(Debug, Clone, PartialEq)]
pub enum ObjError {
    /// Malformed content; `line` is 1-based, 0 when the error concerns the whole file
    Parse { line: usize, message: String },
    Io(String),
}

impl ObjError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ObjError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Line number of a parse error, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            ObjError::Parse { line, .. } if *line > 0 => Some(*line),
            _ => None,
        }
    }
}

impl fmt::Display for ObjError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjError::Parse { line, message } if *line > 0 => {
                write!(f, "Line {}: {}", line, message)
            }
            ObjError::Parse { message, .. } => f.write_str(message),
            ObjError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ObjError {}

impl From<std::io::Error> for ObjError {
    fn from(e: std::io::Error) -> Self {
        ObjError::Io(e.to_string())
    }
}

impl From<GeometryError> for ObjError {
    fn from(e: GeometryError) -> Self {
        ObjError::parse(0, e.to_string())
    }
}

/// Errors from loading a viewer configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Serialize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Config parse error: {}", e),
            ConfigError::Serialize(e) => write!(f, "Config serialize error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e.to_string())
    }
}

impl From<ron::error::SpannedError> for ConfigError {
    fn from(e: ron::error::SpannedError) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<ron::Error> for ConfigError {
    fn from(e: ron::Error) -> Self {
        ConfigError::Serialize(e.to_string())
    }
}

/// Errors from loading a texture image
#[derive(Debug, Clone, PartialEq)]
pub enum TextureError {
    Io(String),
    Decode(String),
    /// Zero-sized image or texel count not matching the dimensions
    Empty,
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Io(e) => write!(f, "I/O error: {}", e),
            TextureError::Decode(e) => write!(f, "Texture decode error: {}", e),
            TextureError::Empty => write!(f, "Texture has no texels"),
        }
    }
}

impl std::error::Error for TextureError {}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        match e {
            image::ImageError::IoError(io) => TextureError::Io(io.to_string()),
            other => TextureError::Decode(other.to_string()),
        }
    }
}
