//! Hangul composition.
//!
//! The 11,172 precomposed syllables are not drawn individually. Instead the
//! sources provide several shape variants of each jamo, and each syllable is
//! the OR of one variant each of its leading consonant (choseong), vowel
//! (jungseong) and, when present, trailing consonant (jongseong). Which
//! variant to use depends on the neighbouring jamo; that choice is made by
//! the three tables below.
//!
//! Jamo components are named `{position}_{index}_{variant}`, e.g. `cho_3_1`.

use std::fmt;

use arrayvec::ArrayVec;
use glyph::{GlyphBitmap, Width};
use log::{debug, info};

use crate::{CharacterTable, Error, JamoTable};

/// First of the modern leading consonants, U+1100.
pub const CHO_BASE: u16 = 0x1100;
/// First of the modern vowels, U+1161.
pub const JUNG_BASE: u16 = 0x1161;
/// First of the modern trailing consonants, U+11A8.
pub const JONG_BASE: u16 = 0x11A8;
/// First precomposed syllable, U+AC00.
pub const SYLLABLE_BASE: u16 = 0xAC00;

pub const CHO_COUNT: usize = 19;
pub const JUNG_COUNT: usize = 21;
pub const JONG_COUNT: usize = 27;
/// Trailing consonant slots per syllable, including "none".
pub const TAIL_COUNT: usize = JONG_COUNT + 1;
pub const SYLLABLE_COUNT: usize = CHO_COUNT * JUNG_COUNT * TAIL_COUNT;

/// Number of code points given a direct jamo glyph.
pub const DIRECT_JAMO_COUNT: usize = CHO_COUNT + JUNG_COUNT + JONG_COUNT;

/// Leading consonant variant, indexed by `[has tail][vowel]`.
pub const CHO_TABLE: [[u8; JUNG_COUNT]; 2] = [
    [0, 0, 0, 0, 0, 0, 0, 0, 1, 3, 3, 3, 1, 2, 4, 4, 4, 2, 1, 3, 0],
    [5, 5, 5, 5, 5, 5, 5, 5, 6, 7, 7, 7, 6, 6, 7, 7, 7, 6, 6, 7, 5],
];

/// Vowel variant, indexed by leading consonant. Syllables with a tail use
/// the variant two above this one.
pub const JUNG_TABLE: [u8; CHO_COUNT] =
    [0, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 1, 1, 1];

/// Trailing consonant variant, indexed by vowel.
pub const JONG_TABLE: [u8; JUNG_COUNT] =
    [0, 2, 0, 2, 1, 2, 1, 2, 3, 0, 2, 1, 3, 3, 1, 2, 1, 3, 3, 1, 1];

/// Where a jamo sits in the syllable block.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Position {
    Cho,
    Jung,
    Jong,
}

impl Position {
    fn prefix(self) -> &'static str {
        match self {
            Position::Cho => "cho",
            Position::Jung => "jung",
            Position::Jong => "jong",
        }
    }
}

/// Name of one jamo component in the jamo table.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct JamoKey {
    pub position: Position,
    pub index: usize,
    pub variant: usize,
}

impl fmt::Display for JamoKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}_{}_{}", self.position.prefix(), self.index, self.variant)
    }
}

/// A precomposed syllable broken into its jamo indices.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Syllable {
    pub lead: usize,
    pub vowel: usize,
    /// Zero means no trailing consonant.
    pub tail: usize,
}

impl Syllable {
    /// Decomposes a code point in the syllable block, or returns `None` for
    /// anything outside it.
    pub fn decompose(code_point: u16) -> Option<Self> {
        let offset = usize::from(code_point.checked_sub(SYLLABLE_BASE)?);
        if offset >= SYLLABLE_COUNT {
            return None;
        }
        Some(Self::from_offset(offset))
    }

    /// `offset` counts from U+AC00 and must be below `SYLLABLE_COUNT`.
    fn from_offset(offset: usize) -> Self {
        Syllable {
            lead: offset / (JUNG_COUNT * TAIL_COUNT),
            vowel: (offset % (JUNG_COUNT * TAIL_COUNT)) / TAIL_COUNT,
            tail: offset % TAIL_COUNT,
        }
    }

    pub fn has_tail(&self) -> bool {
        self.tail != 0
    }

    /// The jamo components that make up this syllable's glyph, two or three
    /// of them.
    pub fn jamo_keys(&self) -> ArrayVec<JamoKey, 3> {
        let tail = self.has_tail() as usize;
        let mut keys = ArrayVec::new();
        keys.push(JamoKey {
            position: Position::Cho,
            index: self.lead,
            variant: usize::from(CHO_TABLE[tail][self.vowel]),
        });
        keys.push(JamoKey {
            position: Position::Jung,
            index: self.vowel,
            variant: usize::from(JUNG_TABLE[self.lead]) + 2 * tail,
        });
        if self.has_tail() {
            keys.push(JamoKey {
                position: Position::Jong,
                index: self.tail,
                variant: usize::from(JONG_TABLE[self.vowel]),
            });
        }
        keys
    }
}

fn lookup(jamo: &JamoTable, key: JamoKey) -> Result<&GlyphBitmap, Error> {
    let name = key.to_string();
    jamo.get(&name).ok_or(Error::MissingJamo(name))
}

/// Adds the Hangul glyphs to `chars`: the first variant of every jamo at its
/// conjoining jamo code point, then every precomposed syllable.
///
/// A syllable the sources already define is used as a base and the jamo are
/// merged on top of it; otherwise the syllable starts out blank.
pub fn compose(chars: &mut CharacterTable, jamo: &JamoTable) -> Result<(), Error> {
    let direct = [
        (Position::Cho, CHO_BASE, CHO_COUNT),
        (Position::Jung, JUNG_BASE, JUNG_COUNT),
        (Position::Jong, JONG_BASE, JONG_COUNT),
    ];
    for &(position, base, count) in &direct {
        for index in 0..count {
            let key = JamoKey {
                position,
                index,
                variant: 0,
            };
            let glyph = *lookup(jamo, key)?;
            let code_point = base + index as u16;
            if chars.insert(code_point, glyph).is_some() {
                debug!("U+{:04X} replaced by jamo {}", code_point, key);
            }
        }
    }

    let mut overrides = 0;
    for offset in 0..SYLLABLE_COUNT {
        let code_point = SYLLABLE_BASE + offset as u16;
        let syllable = Syllable::from_offset(offset);

        if chars.contains_key(&code_point) {
            overrides += 1;
        }
        let glyph = chars
            .entry(code_point)
            .or_insert_with(|| GlyphBitmap::blank(Width::Wide));

        for key in syllable.jamo_keys() {
            glyph
                .merge(lookup(jamo, key)?)
                .map_err(|source| Error::LengthMismatch {
                    code_point,
                    jamo: key.to_string(),
                    source,
                })?;
        }
    }

    info!(
        "composed {} jamo and {} syllables ({} drawn over source glyphs)",
        DIRECT_JAMO_COUNT, SYLLABLE_COUNT, overrides,
    );
    Ok(())
}
