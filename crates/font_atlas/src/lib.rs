//! # Font Atlas
//!
//! Compiles fixed-cell bitmap fonts (BDF glyph descriptions) into a texture
//! atlas ready for GPU upload:
//!
//! - **Layout**: glyphs are packed into a near-square grid of fixed-size cells
//! - **Rasterization**: 1 bit per pixel, plotted straight into the packed atlas rows
//! - **Container**: the atlas is written as a minimal grayscale PNG (bit depth 1)
//! - **Character map**: a sidecar text table maps atlas slots back to character codes
//!
//! The whole pipeline is a single-threaded batch pass: parse, plan, rasterize,
//! encode, write. There is no partial output: a run either completes or fails
//! with a descriptive error.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use font_atlas::bdf::BdfCompiler;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let font = BdfCompiler::compile_file("terminus.bdf")?;
//!     let mut png = Vec::new();
//!     font_atlas::png::write_atlas(&mut png, &font.plan, font.bitmap.as_bytes())?;
//!     std::fs::write("terminus.png", png)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod atlas;
pub mod bdf;
pub mod charmap;
pub mod png;

pub use atlas::{AtlasBitmap, AtlasPlan};
pub use bdf::{BdfCompiler, BdfError, CompiledFont, FontMetrics};
pub use charmap::CharMap;
pub use png::PngError;

#[cfg(test)]
mod tests;
