//! Command line front end for the NeoDGM font compiler.
//!
//! `neodgm compile` builds the font resource from `.fnt` sources; `show` and
//! `stats` inspect a resource that has already been built.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fntmunge::{CompileOptions, DuplicatePolicy, DEFAULT_OUTPUT, DEFAULT_SOURCE_DIR};
use font_neodgm::Font;
use glyph::{Width, ROWS};
use log::info;

#[derive(Parser, Debug)]
#[command(name = "neodgm", about = "Compile and inspect NeoDGM bitmap fonts")]
struct Args {
    /// Log each stage in more detail.
    #[arg(short, long, global = true, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a directory of .fnt sources into a font resource.
    Compile {
        #[arg(short, long, value_name = "DIR", default_value = DEFAULT_SOURCE_DIR)]
        source: PathBuf,

        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        /// Let later definitions of a code point or jamo replace earlier
        /// ones instead of failing.
        #[arg(long, action = clap::ArgAction::SetTrue)]
        allow_duplicates: bool,
    },
    /// Print glyphs from a compiled font.
    Show {
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        font: PathBuf,

        /// Decimal, hex (`0xAC00`, `U+AC00`) or a single character.
        #[arg(required = true, value_parser = parse_code_point)]
        code_points: Vec<u16>,
    },
    /// Summarize a compiled font.
    Stats {
        #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
        font: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();

    match args.command {
        Command::Compile {
            source,
            output,
            allow_duplicates,
        } => {
            let options = CompileOptions {
                source_dir: source,
                output,
                duplicates: if allow_duplicates {
                    DuplicatePolicy::LastWins
                } else {
                    DuplicatePolicy::Reject
                },
            };
            let summary = fntmunge::compile(&options).with_context(|| {
                format!("failed to compile {}", options.source_dir.display())
            })?;
            info!(
                "finished: {} glyphs ({} bytes of glyph data)",
                summary.glyphs, summary.data_bytes
            );
        }
        Command::Show {
            font: path,
            code_points,
        } => {
            let bytes = read_font(&path)?;
            let font = Font::parse(&bytes)
                .with_context(|| format!("invalid font {}", path.display()))?;
            for cp in code_points {
                print!("{}", render(&font, cp));
            }
        }
        Command::Stats { font: path } => {
            let bytes = read_font(&path)?;
            let font = Font::parse(&bytes)
                .with_context(|| format!("invalid font {}", path.display()))?;
            print!("{}", stats(&font, bytes.len()));
        }
    }

    Ok(())
}

fn read_font(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read font {}", path.display()))
}

fn parse_code_point(s: &str) -> Result<u16, String> {
    let hex = s
        .strip_prefix("U+")
        .or_else(|| s.strip_prefix("u+"))
        .or_else(|| s.strip_prefix("0x"));
    let parsed = match hex {
        Some(digits) => u32::from_str_radix(digits, 16).ok(),
        None => s.parse::<u32>().ok().or_else(|| {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(u32::from(c)),
                _ => None,
            }
        }),
    };
    match parsed {
        Some(cp) if cp <= u32::from(u16::MAX) => Ok(cp as u16),
        Some(cp) => Err(format!("U+{:04X} is outside the 16-bit range", cp)),
        None => Err(format!("`{}` is not a code point", s)),
    }
}

fn render(font: &Font, cp: u16) -> String {
    let glyph = match font.glyph(cp) {
        Some(g) => g,
        None => return format!("U+{:04X}: not in font\n\n", cp),
    };

    let mut out = format!("U+{:04X} ({} wide)\n", cp, glyph.width().columns());
    for row in 0..ROWS {
        for col in 0..glyph.width().columns() {
            out.push(if glyph.pixel(col, row) { '#' } else { '.' });
        }
        out.push('\n');
    }
    out.push('\n');
    out
}

fn stats(font: &Font, file_bytes: usize) -> String {
    let (mut narrow, mut wide) = (0, 0);
    for g in font.glyphs() {
        match g.width() {
            Width::Narrow => narrow += 1,
            Width::Wide => wide += 1,
        }
    }
    format!(
        "glyphs: {}\n  narrow: {}\n  wide: {}\nglyph data: {} bytes\nfile: {} bytes\n",
        font.len(),
        narrow,
        wide,
        font.data().len(),
        file_bytes,
    )
}
