//! Runtime access to a compiled NeoDGM font resource.
//!
//! The resource is laid out as follows, all integers big-endian:
//!
//! ```text
//! u32 glyph count
//! count x { u16 code point, u32 offset, u8 length }   -- the index
//! glyph data, each glyph `length` bytes at `offset`
//! ```
//!
//! Index records are sorted by code point, so lookups are a binary search
//! over the index in place. Nothing is copied or allocated; a `Font` is just
//! a pair of slices into the resource.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

use byteorder::{BigEndian, ByteOrder};
use glyph::{GlyphBitmap, Width, BYTES_PER_COLUMN, ROWS};

/// Size of the glyph count that starts the resource.
pub const HEADER_LEN: usize = 4;
/// Size of one index record.
pub const RECORD_LEN: usize = 7;

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FontError {
    #[error("font resource truncated: need {needed} bytes, have {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("glyph U+{code_point:04X} has invalid length {length}")]
    BadGlyphLength { code_point: u16, length: u8 },
    #[error("glyph U+{code_point:04X} extends past the end of the glyph data")]
    IndexOutOfBounds { code_point: u16 },
    #[error("glyph index is not in ascending order at U+{code_point:04X}")]
    Unsorted { code_point: u16 },
}

/// One entry in the glyph index.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub code_point: u16,
    /// Byte offset of the glyph within the glyph data.
    pub offset: u32,
    pub length: u8,
}

impl Record {
    /// Decodes a record from the first `RECORD_LEN` bytes of `bytes`.
    ///
    /// # Panics
    ///
    /// If `bytes` is shorter than `RECORD_LEN`.
    pub fn read(bytes: &[u8]) -> Self {
        Record {
            code_point: BigEndian::read_u16(&bytes[0..2]),
            offset: BigEndian::read_u32(&bytes[2..6]),
            length: bytes[6],
        }
    }

    /// Encodes the record into the first `RECORD_LEN` bytes of `out`.
    ///
    /// # Panics
    ///
    /// If `out` is shorter than `RECORD_LEN`.
    pub fn write(&self, out: &mut [u8]) {
        BigEndian::write_u16(&mut out[0..2], self.code_point);
        BigEndian::write_u32(&mut out[2..6], self.offset);
        out[6] = self.length;
    }

    fn range(&self) -> core::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + usize::from(self.length)
    }
}

/// A validated font resource.
#[derive(Copy, Clone, Debug)]
pub struct Font<'a> {
    index: &'a [u8],
    data: &'a [u8],
}

impl<'a> Font<'a> {
    /// Checks the resource and wraps it.
    ///
    /// Every record is checked up front (ascending order, plausible length,
    /// in bounds), so lookups afterwards can't fail or panic.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, FontError> {
        if bytes.len() < HEADER_LEN {
            return Err(FontError::Truncated {
                needed: HEADER_LEN,
                actual: bytes.len(),
            });
        }
        let count = BigEndian::read_u32(&bytes[..HEADER_LEN]) as usize;
        let index_end = count
            .checked_mul(RECORD_LEN)
            .and_then(|n| n.checked_add(HEADER_LEN))
            .filter(|&end| end <= bytes.len())
            .ok_or(FontError::Truncated {
                needed: count.saturating_mul(RECORD_LEN).saturating_add(HEADER_LEN),
                actual: bytes.len(),
            })?;

        let font = Font {
            index: &bytes[HEADER_LEN..index_end],
            data: &bytes[index_end..],
        };

        let mut previous: Option<u16> = None;
        for record in font.records() {
            if previous.map_or(false, |p| p >= record.code_point) {
                return Err(FontError::Unsorted {
                    code_point: record.code_point,
                });
            }
            previous = Some(record.code_point);

            if Width::from_byte_len(usize::from(record.length)).is_none() {
                return Err(FontError::BadGlyphLength {
                    code_point: record.code_point,
                    length: record.length,
                });
            }
            if record.range().end > font.data.len() {
                return Err(FontError::IndexOutOfBounds {
                    code_point: record.code_point,
                });
            }
        }

        Ok(font)
    }

    /// Number of glyphs in the font.
    pub fn len(&self) -> usize {
        self.index.len() / RECORD_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The glyph data section, following the index.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn record(&self, i: usize) -> Option<Record> {
        let start = i.checked_mul(RECORD_LEN)?;
        let end = start.checked_add(RECORD_LEN)?;
        self.index.get(start..end).map(Record::read)
    }

    /// Index records in ascending code point order.
    pub fn records(&self) -> impl Iterator<Item = Record> + 'a {
        let index = self.index;
        index.chunks_exact(RECORD_LEN).map(Record::read)
    }

    /// Glyphs in ascending code point order.
    pub fn glyphs(&self) -> impl Iterator<Item = Glyph<'a>> + 'a {
        let data = self.data;
        self.records().filter_map(move |r| Glyph::new(r, data))
    }

    /// Finds the glyph for `code_point`, if the font has one.
    pub fn glyph(&self, code_point: u16) -> Option<Glyph<'a>> {
        let mut lo = 0;
        let mut hi = self.len();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let record = self.record(mid)?;
            if record.code_point < code_point {
                lo = mid + 1;
            } else if record.code_point > code_point {
                hi = mid;
            } else {
                return Glyph::new(record, self.data);
            }
        }
        None
    }

    /// Like `glyph`, for a `char`. Characters outside the 16-bit range are
    /// never present.
    pub fn glyph_for_char(&self, c: char) -> Option<Glyph<'a>> {
        let code_point = u32::from(c);
        if code_point > u32::from(u16::MAX) {
            return None;
        }
        self.glyph(code_point as u16)
    }
}

/// A glyph borrowed from a font.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Glyph<'a> {
    code_point: u16,
    width: Width,
    bytes: &'a [u8],
}

impl<'a> Glyph<'a> {
    fn new(record: Record, data: &'a [u8]) -> Option<Self> {
        let bytes = data.get(record.range())?;
        Some(Glyph {
            code_point: record.code_point,
            width: Width::from_byte_len(bytes.len())?,
            bytes,
        })
    }

    pub fn code_point(&self) -> u16 {
        self.code_point
    }

    pub fn width(&self) -> Width {
        self.width
    }

    /// The packed column-major pixels.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Reads the pixel at `(col, row)`.
    ///
    /// # Panics
    ///
    /// If the coordinate is outside the glyph.
    pub fn pixel(&self, col: usize, row: usize) -> bool {
        assert!(col < self.width.columns() && row < ROWS);
        self.bytes[col * BYTES_PER_COLUMN + (row >> 3)] & (1 << (row & 7)) != 0
    }

    /// Copies the glyph out into an owned bitmap.
    pub fn to_bitmap(&self) -> GlyphBitmap {
        let mut bitmap = GlyphBitmap::blank(self.width);
        for col in 0..self.width.columns() {
            for row in 0..ROWS {
                if self.pixel(col, row) {
                    bitmap.set(col, row, true);
                }
            }
        }
        bitmap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a resource by hand from `(code point, glyph bytes)` pairs.
    fn build(glyphs: &[(u16, &[u8])]) -> Vec<u8> {
        let mut out = vec![0; HEADER_LEN + glyphs.len() * RECORD_LEN];
        BigEndian::write_u32(&mut out[..HEADER_LEN], glyphs.len() as u32);
        let mut offset = 0;
        for (i, &(code_point, bytes)) in glyphs.iter().enumerate() {
            let at = HEADER_LEN + i * RECORD_LEN;
            Record {
                code_point,
                offset,
                length: bytes.len() as u8,
            }
            .write(&mut out[at..at + RECORD_LEN]);
            offset += bytes.len() as u32;
        }
        for &(_, bytes) in glyphs {
            out.extend_from_slice(bytes);
        }
        out
    }

    #[test]
    #[should_panic]
    fn short_record_panics() {
        Record::read(&[0; RECORD_LEN - 1]);
    }

    #[test]
    fn empty_font() {
        let bytes = build(&[]);
        assert_eq!(bytes, [0, 0, 0, 0]);
        let font = Font::parse(&bytes).unwrap();
        assert!(font.is_empty());
        assert_eq!(font.glyph(0x41), None);
    }

    #[test]
    fn record_encoding_is_big_endian() {
        let mut buf = [0; RECORD_LEN];
        Record {
            code_point: 0xAC00,
            offset: 0x0102_0304,
            length: 32,
        }
        .write(&mut buf);
        assert_eq!(buf, [0xAC, 0x00, 0x01, 0x02, 0x03, 0x04, 32]);
        assert_eq!(Record::read(&buf).offset, 0x0102_0304);
    }

    #[test]
    fn lookup() {
        let a = [0x11; 16];
        let ga = [0x22; 32];
        let z = [0x33; 16];
        let bytes = build(&[(0x41, &a), (0x5A, &z), (0xAC00, &ga)]);
        let font = Font::parse(&bytes).unwrap();
        assert_eq!(font.len(), 3);

        let g = font.glyph(0xAC00).unwrap();
        assert_eq!(g.code_point(), 0xAC00);
        assert_eq!(g.width(), Width::Wide);
        assert_eq!(g.bytes(), &ga[..]);

        assert_eq!(font.glyph(0x5A).unwrap().bytes(), &z[..]);
        assert_eq!(font.glyph_for_char('A').unwrap().bytes(), &a[..]);
        assert_eq!(font.glyph(0x42), None);
        assert_eq!(font.glyph(0), None);
        assert_eq!(font.glyph(0xFFFF), None);
        assert_eq!(font.glyph_for_char('\u{1F600}'), None);
    }

    #[test]
    fn lookup_every_entry() {
        let glyph = [0xA5; 16];
        let entries: Vec<(u16, &[u8])> =
            (0..100u16).map(|i| (i * 3 + 1, &glyph[..])).collect();
        let bytes = build(&entries);
        let font = Font::parse(&bytes).unwrap();
        for i in 0..100u16 {
            assert!(font.glyph(i * 3 + 1).is_some());
            assert!(font.glyph(i * 3 + 2).is_none());
        }
        assert_eq!(font.glyphs().count(), 100);
    }

    #[test]
    fn pixels() {
        let mut bytes = [0u8; 16];
        bytes[0] = 0b0000_0001; // (0, 0)
        bytes[3] = 0b1000_0000; // (1, 15)
        let font_bytes = build(&[(0x41, &bytes)]);
        let font = Font::parse(&font_bytes).unwrap();
        let g = font.glyph(0x41).unwrap();
        assert!(g.pixel(0, 0));
        assert!(g.pixel(1, 15));
        assert!(!g.pixel(1, 7));

        let bitmap = g.to_bitmap();
        assert_eq!(bitmap.as_bytes(), &bytes[..]);
    }

    #[test]
    fn truncated_header() {
        assert_eq!(
            Font::parse(&[0, 0]).unwrap_err(),
            FontError::Truncated {
                needed: 4,
                actual: 2
            }
        );
    }

    #[test]
    fn truncated_index() {
        let mut bytes = build(&[(0x41, &[0; 16])]);
        bytes.truncate(HEADER_LEN + 3);
        assert!(matches!(
            Font::parse(&bytes),
            Err(FontError::Truncated { .. })
        ));
    }

    #[test]
    fn truncated_data() {
        let mut bytes = build(&[(0x41, &[0; 16])]);
        bytes.pop();
        assert_eq!(
            Font::parse(&bytes).unwrap_err(),
            FontError::IndexOutOfBounds { code_point: 0x41 }
        );
    }

    #[test]
    fn bad_length() {
        let bytes = build(&[(0x41, &[0; 10])]);
        assert_eq!(
            Font::parse(&bytes).unwrap_err(),
            FontError::BadGlyphLength {
                code_point: 0x41,
                length: 10
            }
        );
    }

    #[test]
    fn unsorted() {
        let bytes = build(&[(0x42, &[0; 16]), (0x41, &[0; 16])]);
        assert_eq!(
            Font::parse(&bytes).unwrap_err(),
            FontError::Unsorted { code_point: 0x41 }
        );
        let bytes = build(&[(0x41, &[0; 16]), (0x41, &[0; 16])]);
        assert!(Font::parse(&bytes).is_err());
    }
}
