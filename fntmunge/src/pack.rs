//! Flattens the character table into an index and one data buffer.

use font_neodgm::Record;
use glyph::MAX_BYTES;

use crate::CharacterTable;

/// A font ready to serialize: index records sorted by code point, each
/// pointing at its glyph within `data`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackedFont {
    pub records: Vec<Record>,
    pub data: Vec<u8>,
}

/// Packs `chars` in ascending code point order. Glyphs are laid end to end,
/// so the records partition `data` with no gaps.
pub fn pack(chars: &CharacterTable) -> PackedFont {
    let mut font = PackedFont {
        records: Vec::with_capacity(chars.len()),
        data: Vec::with_capacity(chars.len() * MAX_BYTES),
    };

    for (&code_point, glyph) in chars {
        let bytes = glyph.as_bytes();
        // At most 64Ki glyphs of at most 32 bytes each, so neither of these
        // casts can truncate.
        debug_assert!(bytes.len() <= usize::from(u8::MAX));
        font.records.push(Record {
            code_point,
            offset: font.data.len() as u32,
            length: bytes.len() as u8,
        });
        font.data.extend_from_slice(bytes);
    }

    font
}
