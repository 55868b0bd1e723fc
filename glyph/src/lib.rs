//! Monochrome glyph bitmaps.
//!
//! Glyphs are 16 pixels tall and either 8 or 16 pixels wide. They are stored
//! column-major, two bytes per column: the first byte of a column holds rows
//! 0-7 and the second rows 8-15, least significant bit at the top. So the
//! pixel at `(col, row)` lives in byte `col * 2 + (row >> 3)`, bit `row & 7`.
//!
//! This layout is what the compiled font resource carries, byte for byte, so
//! the renderer can blit a glyph without unpacking it.
//!
//! This crate is deliberately `no_std` so the runtime side can share it.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

use core::fmt;

/// Number of pixel rows in every glyph.
pub const ROWS: usize = 16;

/// Bytes needed to hold one column of `ROWS` pixels.
pub const BYTES_PER_COLUMN: usize = ROWS >> 3;

/// Storage for the widest glyph we support.
pub const MAX_BYTES: usize = Width::Wide.byte_len();

/// The two glyph widths the font format knows about.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Width {
    /// 8 columns; Latin text and other half-width characters.
    Narrow = 8,
    /// 16 columns; Hangul and other full-width characters.
    Wide = 16,
}

impl Width {
    pub const fn columns(self) -> usize {
        self as usize
    }

    pub const fn byte_len(self) -> usize {
        self.columns() * BYTES_PER_COLUMN
    }

    pub fn from_columns(columns: usize) -> Option<Self> {
        match columns {
            8 => Some(Width::Narrow),
            16 => Some(Width::Wide),
            _ => None,
        }
    }

    pub fn from_byte_len(len: usize) -> Option<Self> {
        if len % BYTES_PER_COLUMN != 0 {
            return None;
        }
        Self::from_columns(len / BYTES_PER_COLUMN)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum BitmapError {
    #[error("cannot merge a {from}-column glyph into a {into}-column glyph")]
    WidthMismatch { into: usize, from: usize },
}

/// A single glyph image.
///
/// Storage is always sized for a wide glyph. For narrow glyphs the unused
/// tail is kept zero, so derived equality and hashing only see real pixels.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct GlyphBitmap {
    width: Width,
    bytes: [u8; MAX_BYTES],
}

impl GlyphBitmap {
    /// Creates an all-clear glyph.
    pub const fn blank(width: Width) -> Self {
        GlyphBitmap {
            width,
            bytes: [0; MAX_BYTES],
        }
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// The packed representation, `width * BYTES_PER_COLUMN` bytes long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.width.byte_len()]
    }

    /// Reads the pixel at `(col, row)`.
    ///
    /// # Panics
    ///
    /// If the coordinate is outside the glyph.
    pub fn get(&self, col: usize, row: usize) -> bool {
        let (byte, bit) = self.locate(col, row);
        self.bytes[byte] & bit != 0
    }

    /// Turns the pixel at `(col, row)` on or off.
    ///
    /// # Panics
    ///
    /// If the coordinate is outside the glyph.
    pub fn set(&mut self, col: usize, row: usize, on: bool) {
        let (byte, bit) = self.locate(col, row);
        if on {
            self.bytes[byte] |= bit;
        } else {
            self.bytes[byte] &= !bit;
        }
    }

    /// ORs every pixel of `other` into this glyph. Both must have the same
    /// width.
    ///
    /// Since this is a plain bitwise OR, merging a set of glyphs gives the
    /// same result in any order.
    pub fn merge(&mut self, other: &GlyphBitmap) -> Result<(), BitmapError> {
        if self.width != other.width {
            return Err(BitmapError::WidthMismatch {
                into: self.width.columns(),
                from: other.width.columns(),
            });
        }
        for (dst, src) in self.bytes.iter_mut().zip(other.as_bytes()) {
            *dst |= *src;
        }
        Ok(())
    }

    pub fn is_blank(&self) -> bool {
        self.as_bytes().iter().all(|&b| b == 0)
    }

    fn locate(&self, col: usize, row: usize) -> (usize, u8) {
        assert!(
            col < self.width.columns() && row < ROWS,
            "pixel ({}, {}) outside {}x{} glyph",
            col,
            row,
            self.width.columns(),
            ROWS,
        );
        (col * BYTES_PER_COLUMN + (row >> 3), 1 << (row & 7))
    }
}

impl fmt::Debug for GlyphBitmap {
    /// Prints the glyph as text art, which makes failed test comparisons
    /// a lot easier to read than a byte dump.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "GlyphBitmap({}x{})", self.width.columns(), ROWS)?;
        for row in 0..ROWS {
            for col in 0..self.width.columns() {
                f.write_str(if self.get(col, row) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
