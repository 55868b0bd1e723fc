//! NeoDGM font compiler.
//!
//! This library turns a directory of `.fnt` glyph sources into the binary
//! font resource read by `font_neodgm`. It runs in four stages, each taking
//! the previous stage's output:
//!
//! 1. [`parse`] reads the sources into a table of characters and a table of
//!    Hangul jamo components.
//! 2. [`compose`] builds the conjoining jamo and all 11,172 precomposed
//!    Hangul syllables out of the jamo components.
//! 3. [`pack`] lays the glyphs out in code point order.
//! 4. [`write`] serializes the result.
//!
//! [`compile`] runs the lot.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use glyph::GlyphBitmap;
use log::info;
use smart_default::SmartDefault;

pub mod compose;
mod error;
pub mod pack;
pub mod parse;
pub mod write;

pub use crate::error::Error;
pub use crate::pack::PackedFont;

/// Where `compile` looks for sources unless told otherwise.
pub const DEFAULT_SOURCE_DIR: &str = "neodgm-font-src";
/// Where `compile` puts the font unless told otherwise.
pub const DEFAULT_OUTPUT: &str = "src/main/resources/fonts/neodgm-font";

/// Glyphs by code point, kept in code point order.
pub type CharacterTable = BTreeMap<u16, GlyphBitmap>;

/// Jamo components by name, e.g. `cho_3_1`.
pub type JamoTable = HashMap<String, GlyphBitmap>;

/// What to do when a code point or jamo component is defined more than once
/// in the sources.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum DuplicatePolicy {
    /// Fail with `Error::DuplicateDefinition`.
    #[default]
    Reject,
    /// Keep the definition from the file that sorts last by name (or, within
    /// a file, the later one).
    LastWins,
}

#[derive(Clone, Debug, SmartDefault)]
pub struct CompileOptions {
    #[default(_code = "PathBuf::from(DEFAULT_SOURCE_DIR)")]
    pub source_dir: PathBuf,
    #[default(_code = "PathBuf::from(DEFAULT_OUTPUT)")]
    pub output: PathBuf,
    pub duplicates: DuplicatePolicy,
}

/// Totals reported by a successful `compile`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Summary {
    pub glyphs: usize,
    /// Size of the glyph data section alone.
    pub data_bytes: usize,
    /// Size of the whole resource file.
    pub file_bytes: usize,
}

impl Summary {
    fn of(font: &PackedFont) -> Self {
        let glyphs = font.records.len();
        Summary {
            glyphs,
            data_bytes: font.data.len(),
            file_bytes: font_neodgm::HEADER_LEN
                + glyphs * font_neodgm::RECORD_LEN
                + font.data.len(),
        }
    }
}

/// Runs the parse, compose and pack stages, without writing anything.
pub fn build(options: &CompileOptions) -> Result<PackedFont, Error> {
    let parse::Sources { mut chars, jamo } =
        parse::parse_dir(&options.source_dir, options.duplicates)?;
    compose::compose(&mut chars, &jamo)?;
    Ok(pack::pack(&chars))
}

/// Compiles the sources in `options.source_dir` into `options.output`.
///
/// Either the whole font is written or, on any error, nothing is.
pub fn compile(options: &CompileOptions) -> Result<Summary, Error> {
    let font = build(options)?;
    write::write_font_file(&font, &options.output)?;

    let summary = Summary::of(&font);
    info!(
        "{}: {} glyphs, {} bytes",
        options.output.display(),
        summary.glyphs,
        summary.file_bytes,
    );
    Ok(summary)
}
