//! Reader for `.fnt` glyph sources.
//!
//! A source file is a sequence of blocks. Each block is a header line
//! followed by one line per pixel row:
//!
//! ```text
//! 65 8
//! 00000000
//! 00011000
//! ...
//! ```
//!
//! A two-field header (`code width`) defines the character with that decimal
//! code point. A three-field header (`key width xoff`) defines a jamo
//! component used by the Hangul composer. Row lines hold one digit per
//! column; only the low bit of each character is looked at.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use arrayvec::ArrayVec;
use glyph::{GlyphBitmap, Width, ROWS};
use log::{debug, info, warn};

use crate::{CharacterTable, DuplicatePolicy, Error, JamoTable};

/// Extension of the files we pick up from the source directory.
pub const SOURCE_EXTENSION: &str = "fnt";

/// The two tables produced by parsing.
#[derive(Clone, Debug, Default)]
pub struct Sources {
    pub chars: CharacterTable,
    pub jamo: JamoTable,
}

/// Parses every `.fnt` file in `dir`.
///
/// Files are processed in file name order, so that with
/// `DuplicatePolicy::LastWins` the outcome doesn't depend on the order the
/// filesystem happens to list them in.
pub fn parse_dir(dir: &Path, policy: DuplicatePolicy) -> Result<Sources, Error> {
    if !dir.is_dir() {
        return Err(Error::DirectoryNotFound(dir.to_owned()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_source = path
            .extension()
            .map_or(false, |ext| ext == SOURCE_EXTENSION);
        if is_source && path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let mut parser = Parser::new(policy);
    for path in &files {
        let text = fs::read_to_string(path)?;
        parser.parse_file(path, &text)?;
    }

    let sources = parser.finish();
    info!(
        "parsed {} source files: {} characters, {} jamo components",
        files.len(),
        sources.chars.len(),
        sources.jamo.len(),
    );
    Ok(sources)
}

/// Incremental parser; feed it files with `parse_file`, then `finish`.
#[derive(Debug)]
pub struct Parser {
    policy: DuplicatePolicy,
    sources: Sources,
    /// Where each definition came from, for duplicate reporting.
    origins: HashMap<Key, Origin>,
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
enum Key {
    Char(u16),
    Jamo(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Char(cp) => write!(f, "character U+{:04X}", cp),
            Key::Jamo(key) => write!(f, "jamo `{}`", key),
        }
    }
}

#[derive(Clone, Debug)]
struct Origin {
    path: PathBuf,
    line: usize,
}

/// A parsed header line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Header<'a> {
    Char { code_point: u16, width: Width },
    Jamo { key: &'a str, width: Width },
}

impl Header<'_> {
    fn width(&self) -> Width {
        match *self {
            Header::Char { width, .. } | Header::Jamo { width, .. } => width,
        }
    }
}

/// Problem found in a line, before we attach the location to it.
#[derive(Clone, Debug, Eq, PartialEq)]
enum Fault {
    Format(String),
    Unsupported(String),
}

impl Fault {
    fn at(self, path: &Path, line: usize) -> Error {
        let path = path.to_owned();
        match self {
            Fault::Format(message) => Error::Format {
                path,
                line,
                message,
            },
            Fault::Unsupported(feature) => Error::UnsupportedFeature {
                path,
                line,
                feature,
            },
        }
    }
}

impl Parser {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Parser {
            policy,
            sources: Sources::default(),
            origins: HashMap::new(),
        }
    }

    /// Parses the contents of one source file. `path` is only used to label
    /// errors.
    pub fn parse_file(&mut self, path: &Path, text: &str) -> Result<(), Error> {
        let lines: Vec<&str> = text.lines().collect();
        let end = lines.len();

        let mut blocks = 0;
        let mut i = 0;
        while i < end {
            // Blank lines after the last complete block are harmless. Inside
            // a block they are rows (a space reads as 0), so this is only
            // checked where a header is expected.
            if lines[i..].iter().all(|l| l.trim().is_empty()) {
                break;
            }
            let header = parse_header(lines[i]).map_err(|f| f.at(path, i + 1))?;

            let rows_start = i + 1;
            let available = end - rows_start;
            if available < ROWS {
                return Err(Fault::Format(format!(
                    "block ends after {} of {} rows",
                    available, ROWS
                ))
                .at(path, end));
            }

            let glyph = parse_rows(&lines[rows_start..rows_start + ROWS], header.width())
                .map_err(|(row, f)| f.at(path, rows_start + row + 1))?;

            let key = match header {
                Header::Char { code_point, .. } => Key::Char(code_point),
                Header::Jamo { key, .. } => Key::Jamo(key.to_owned()),
            };
            self.define(key, glyph, path, i + 1)?;

            blocks += 1;
            i = rows_start + ROWS;
        }

        debug!("{}: {} glyph blocks", path.display(), blocks);
        Ok(())
    }

    pub fn finish(self) -> Sources {
        self.sources
    }

    fn define(
        &mut self,
        key: Key,
        glyph: GlyphBitmap,
        path: &Path,
        line: usize,
    ) -> Result<(), Error> {
        if let Some(first) = self.origins.get(&key) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    return Err(Error::DuplicateDefinition {
                        what: key.to_string(),
                        path: path.to_owned(),
                        line,
                        first_path: first.path.clone(),
                        first_line: first.line,
                    });
                }
                DuplicatePolicy::LastWins => warn!(
                    "{}:{}: {} redefined, replacing definition at {}:{}",
                    path.display(),
                    line,
                    key,
                    first.path.display(),
                    first.line,
                ),
            }
        }

        match &key {
            Key::Char(cp) => {
                self.sources.chars.insert(*cp, glyph);
            }
            Key::Jamo(name) => {
                self.sources.jamo.insert(name.clone(), glyph);
            }
        }
        self.origins.insert(
            key,
            Origin {
                path: path.to_owned(),
                line,
            },
        );
        Ok(())
    }
}

fn parse_header(line: &str) -> Result<Header, Fault> {
    let wrong_count = || {
        Fault::Format(format!(
            "expected 2 or 3 header fields, found {}",
            line.split_whitespace().count()
        ))
    };

    let mut fields = ArrayVec::<&str, 3>::new();
    for field in line.split_whitespace() {
        fields.try_push(field).map_err(|_| wrong_count())?;
    }

    match *fields.as_slice() {
        [code, width] => {
            let code_point = code.parse::<u16>().map_err(|_| {
                Fault::Format(format!(
                    "`{}` is not a code point in the range 0-65535",
                    code
                ))
            })?;
            Ok(Header::Char {
                code_point,
                width: parse_width(width)?,
            })
        }
        [key, width, xoff] => {
            let width = parse_width(width)?;
            let xoff = xoff.parse::<i32>().map_err(|_| {
                Fault::Format(format!("`{}` is not a horizontal offset", xoff))
            })?;
            if xoff != 0 {
                return Err(Fault::Unsupported(format!(
                    "horizontal jamo offset {}",
                    xoff
                )));
            }
            Ok(Header::Jamo { key, width })
        }
        _ => Err(wrong_count()),
    }
}

fn parse_width(field: &str) -> Result<Width, Fault> {
    field
        .parse::<usize>()
        .ok()
        .and_then(Width::from_columns)
        .ok_or_else(|| {
            Fault::Format(format!("glyph width must be 8 or 16, found `{}`", field))
        })
}

/// Converts `ROWS` lines of digits into a glyph. On failure, returns the
/// index of the offending row along with the problem.
fn parse_rows(rows: &[&str], width: Width) -> Result<GlyphBitmap, (usize, Fault)> {
    let mut glyph = GlyphBitmap::blank(width);
    for (row, line) in rows.iter().enumerate() {
        let mut cells = line.chars();
        for col in 0..width.columns() {
            let cell = cells.next().ok_or_else(|| {
                (
                    row,
                    Fault::Format(format!(
                        "row has {} pixels, expected {}",
                        line.chars().count(),
                        width.columns()
                    )),
                )
            })?;
            // Anything other than 0 and 1 is accepted and taken by parity,
            // which is what the existing sources rely on.
            if u32::from(cell) & 1 != 0 {
                glyph.set(col, row, true);
            }
        }
    }
    Ok(glyph)
}
