//! Character map sidecar
//!
//! A small text table written next to the atlas image lets consumers map
//! "the Nth atlas cell" back to "the character it represents".

use std::io::{self, Write};

use crate::bdf::FontMetrics;

/// Sentinel written in place of a fallback code when the font declares none,
/// kept numeric so the header line always parses as three integers.
pub const NO_DEFAULT_CHAR: i64 = -1;

/// Character codes in glyph declaration order.
///
/// Declaration order IS atlas slot order: the code at position N belongs to
/// the glyph occupying cell N of the row-major grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharMap {
    codes: Vec<i64>,
}

impl CharMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the code for the next atlas slot.
    pub fn push(&mut self, code: i64) {
        self.codes.push(code);
    }

    /// Number of mapped slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Whether no slot has been mapped yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// The recorded codes, slot order.
    #[must_use]
    pub fn codes(&self) -> &[i64] {
        &self.codes
    }

    /// Write the sidecar table.
    ///
    /// First line: `size_x size_y default_char`, space separated; an absent
    /// fallback becomes [`NO_DEFAULT_CHAR`]. Then one decimal code per line,
    /// in slot order.
    pub fn write<W: Write>(&self, writer: &mut W, metrics: &FontMetrics) -> io::Result<()> {
        writeln!(
            writer,
            "{} {} {}",
            metrics.size_x,
            metrics.size_y,
            metrics.default_char.unwrap_or(NO_DEFAULT_CHAR)
        )?;
        for code in &self.codes {
            writeln!(writer, "{code}")?;
        }
        Ok(())
    }
}
