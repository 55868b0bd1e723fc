//! Serializes a packed font to the resource format read by `font_neodgm`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, WriteBytesExt};
use font_neodgm::RECORD_LEN;
use log::debug;

use crate::pack::PackedFont;
use crate::Error;

/// Writes the glyph count, the index and the glyph data to `out`.
pub fn write_font(font: &PackedFont, mut out: impl Write) -> io::Result<()> {
    out.write_u32::<BigEndian>(font.records.len() as u32)?;
    let mut buf = [0; RECORD_LEN];
    for record in &font.records {
        record.write(&mut buf);
        out.write_all(&buf)?;
    }
    out.write_all(&font.data)?;
    Ok(())
}

/// Writes the font to `path`, creating its directory if necessary.
///
/// The font is written to a temporary file next to `path` and renamed into
/// place once complete. If anything fails, the temporary file is removed and
/// whatever was at `path` before is left alone.
pub fn write_font_file(font: &PackedFont, path: &Path) -> Result<(), Error> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let temp = scopeguard::guard(temp_path(path)?, |temp| {
        // Only reached on failure; there's nothing useful to do if even the
        // cleanup fails.
        let _ = fs::remove_file(&temp);
    });

    let mut out = BufWriter::new(File::create(&*temp)?);
    write_font(font, &mut out)?;
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    drop(file);

    fs::rename(&*temp, path)?;
    scopeguard::ScopeGuard::into_inner(temp);
    debug!("wrote {}", path.display());
    Ok(())
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("output path {} has no file name", path.display()),
        )
    })?;
    let mut temp = OsString::from(".");
    temp.push(name);
    temp.push(".tmp");
    Ok(path.with_file_name(temp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pack::pack;
    use crate::CharacterTable;
    use font_neodgm::Font;
    use glyph::{GlyphBitmap, Width};

    fn sample() -> PackedFont {
        let mut chars = CharacterTable::new();
        let mut a = GlyphBitmap::blank(Width::Narrow);
        a.set(0, 0, true);
        a.set(7, 8, true);
        let mut ga = GlyphBitmap::blank(Width::Wide);
        ga.set(15, 15, true);
        chars.insert(0x41, a);
        chars.insert(0xAC00, ga);
        pack(&chars)
    }

    #[test]
    fn exact_bytes() {
        let mut out = Vec::new();
        write_font(&sample(), &mut out).unwrap();

        let mut expected = vec![
            0, 0, 0, 2, // count
            0x00, 0x41, 0, 0, 0, 0, 16, // 'A'
            0xAC, 0x00, 0, 0, 0, 16, 32, // '가'
        ];
        let mut a = [0u8; 16];
        a[0] = 0x01;
        a[15] = 0x01;
        let mut ga = [0u8; 32];
        ga[31] = 0x80;
        expected.extend_from_slice(&a);
        expected.extend_from_slice(&ga);
        assert_eq!(out, expected);
    }

    #[test]
    fn empty_font_is_just_a_count() {
        let mut out = Vec::new();
        write_font(&PackedFont::default(), &mut out).unwrap();
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn round_trip() {
        let font = sample();
        let mut out = Vec::new();
        write_font(&font, &mut out).unwrap();

        let read = Font::parse(&out).unwrap();
        assert_eq!(read.records().collect::<Vec<_>>(), font.records);
        assert_eq!(read.data(), &font.data[..]);
        for record in &font.records {
            let start = record.offset as usize;
            let end = start + usize::from(record.length);
            let glyph = read.glyph(record.code_point).unwrap();
            assert_eq!(glyph.bytes(), &font.data[start..end]);
        }
    }

    #[test]
    fn file_is_written_and_temp_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fonts").join("neodgm-font");
        write_font_file(&sample(), &path).unwrap();

        let mut expected = Vec::new();
        write_font(&sample(), &mut expected).unwrap();
        assert_eq!(fs::read(&path).unwrap(), expected);

        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, [OsString::from("neodgm-font")]);
    }

    #[test]
    fn existing_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neodgm-font");
        fs::write(&path, b"stale").unwrap();
        write_font_file(&sample(), &path).unwrap();
        assert_ne!(fs::read(&path).unwrap(), b"stale");
    }

    #[test]
    fn failed_rename_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory in the way makes the final rename fail.
        let path = dir.path().join("neodgm-font");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"").unwrap();

        assert!(matches!(
            write_font_file(&sample(), &path),
            Err(Error::Io(_))
        ));
        assert!(path.join("keep").exists());
        assert!(!dir.path().join(".neodgm-font.tmp").exists());
    }
}
