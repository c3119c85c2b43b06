//! Bitmap font compiler CLI
//!
//! Compiles a BDF font description into a 1-bit grayscale PNG texture atlas
//! plus a character map sidecar, both written next to the input file:
//! `font.bdf` becomes `font.png` and `font.png.txt`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Arg, Command};

use font_atlas::bdf::{BdfCompiler, CompiledFont};
use font_atlas::png;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().init();

    let matches = Command::new("fontc")
        .about("Compiles a BDF bitmap font into a PNG texture atlas with a character map sidecar")
        .arg(
            Arg::new("input")
                .value_name("FONT")
                .help("Path to the BDF font description"),
        )
        .get_matches();

    // A bare invocation is a usage query, not an error.
    let Some(input) = matches.get_one::<String>("input") else {
        eprintln!("Usage: fontc <font.bdf>");
        return Ok(());
    };

    let input = PathBuf::from(input);
    let image_path = input.with_extension("png");
    let map_path = input.with_extension("png.txt");

    // Compile fully in memory first; output files only exist after a clean run.
    let font = BdfCompiler::compile_file(&input)
        .with_context(|| format!("failed to compile {}", input.display()))?;

    write_image(&image_path, &font)?;
    write_map(&map_path, &font)?;
    Ok(())
}

fn write_image(path: &Path, font: &CompiledFont) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    png::write_atlas(&mut writer, &font.plan, font.bitmap.as_bytes())
        .with_context(|| format!("failed to encode {}", path.display()))?;
    writer.flush()?;
    log::info!("Wrote atlas image {}", path.display());
    Ok(())
}

fn write_map(path: &Path, font: &CompiledFont) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    font.char_map
        .write(&mut writer, &font.metrics)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    log::info!("Wrote character map {}", path.display());
    Ok(())
}
