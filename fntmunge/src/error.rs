use std::io;
use std::path::PathBuf;

use glyph::BitmapError;
use thiserror::Error;

/// Everything that can stop a font compilation. None of these are
/// recoverable: bad source data has to be fixed, not worked around.
#[derive(Debug, Error)]
pub enum Error {
    #[error("font source directory {} not found", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("{}:{}: {}", .path.display(), .line, .message)]
    Format {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}:{}: {} is not supported", .path.display(), .line, .feature)]
    UnsupportedFeature {
        path: PathBuf,
        line: usize,
        feature: String,
    },

    #[error("jamo component `{0}` is not defined")]
    MissingJamo(String),

    #[error("cannot merge jamo `{jamo}` into U+{code_point:04X}: {source}")]
    LengthMismatch {
        code_point: u16,
        jamo: String,
        source: BitmapError,
    },

    #[error(
        "{}:{}: {} already defined at {}:{}",
        .path.display(), .line, .what, .first_path.display(), .first_line
    )]
    DuplicateDefinition {
        what: String,
        path: PathBuf,
        line: usize,
        first_path: PathBuf,
        first_line: usize,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
