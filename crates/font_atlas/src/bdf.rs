//! BDF font description parsing and compilation
//!
//! Consumes a fixed-cell BDF glyph description line by line and drives the
//! atlas planner and rasterizer over a single streaming pass. The running
//! cursor (current glyph index, current row, current cell origin) lives in
//! the compiler itself rather than in ambient variables, so every transition
//! of the parse is explicit.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::SplitWhitespace;
use thiserror::Error;

use crate::atlas::{AtlasBitmap, AtlasPlan};
use crate::charmap::CharMap;

/// Widest glyph cell the packed row representation supports.
pub const MAX_CELL_WIDTH: u32 = 64;

/// Errors raised while parsing and compiling a font description.
#[derive(Error, Debug)]
pub enum BdfError {
    /// Underlying read failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A line the compiler could not accept
    #[error("line {line}: {message}")]
    Malformed {
        /// 1-based input line number
        line: usize,
        /// What was wrong with it
        message: String,
    },

    /// Input ended in the middle of a glyph's bitmap rows
    #[error("unexpected end of input inside a glyph bitmap")]
    TruncatedGlyph,

    /// Input ended before both the bounding box and the glyph count were seen
    #[error("font description ended before declaring its bounding box and glyph count")]
    MissingGlyphCount,
}

impl BdfError {
    fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }
}

/// Font-wide metrics shared by every glyph cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontMetrics {
    /// Glyph cell width in pixels
    pub size_x: u32,
    /// Glyph cell height in pixels
    pub size_y: u32,
    /// Fallback character code, when the font declares one
    pub default_char: Option<i64>,
}

/// The finished product of one compilation pass.
#[derive(Debug)]
pub struct CompiledFont {
    /// Cell metrics as declared by the source
    pub metrics: FontMetrics,
    /// Grid geometry every glyph was laid out against
    pub plan: AtlasPlan,
    /// Packed 1-bit atlas pixels, ready for the PNG encoder
    pub bitmap: AtlasBitmap,
    /// Character codes in declaration order, one per atlas slot
    pub char_map: CharMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Waiting for FONTBOUNDINGBOX
    SeekingMetrics,
    /// Metrics known, waiting for CHARS
    SeekingGlyphCount,
    /// Between glyphs
    GlyphHeader,
    /// Inside a BITMAP block, consuming hex rows
    GlyphRows,
}

/// Streaming BDF compiler.
///
/// Parsing, layout planning, and rasterization happen together in one pass:
/// the planner runs exactly once, when the glyph count is declared, and each
/// bitmap row is plotted into the shared atlas the moment it is read.
#[derive(Debug)]
pub struct BdfCompiler {
    state: State,
    size: Option<(u32, u32)>,
    default_char: Option<i64>,
    glyph_count: u32,
    plan: Option<AtlasPlan>,
    bitmap: Option<AtlasBitmap>,
    char_map: CharMap,
    glyph_index: u32,
    row: u32,
    cell: (u32, u32),
}

impl BdfCompiler {
    /// Compile a font description file into an atlas.
    pub fn compile_file<P: AsRef<Path>>(path: P) -> Result<CompiledFont, BdfError> {
        let path = path.as_ref();
        log::debug!("Compiling bitmap font from {:?}", path);
        let file = File::open(path)?;
        Self::compile(BufReader::new(file))
    }

    /// Compile a font description from any buffered reader.
    pub fn compile<R: BufRead>(reader: R) -> Result<CompiledFont, BdfError> {
        let mut compiler = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            compiler.process_line(line.trim(), index + 1)?;
        }
        compiler.finish()
    }

    fn new() -> Self {
        Self {
            state: State::SeekingMetrics,
            size: None,
            default_char: None,
            glyph_count: 0,
            plan: None,
            bitmap: None,
            char_map: CharMap::new(),
            glyph_index: 0,
            row: 0,
            cell: (0, 0),
        }
    }

    fn process_line(&mut self, line: &str, line_no: usize) -> Result<(), BdfError> {
        if self.state == State::GlyphRows {
            return self.glyph_row(line, line_no);
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(());
        };

        match keyword {
            "FONTBOUNDINGBOX" => self.bounding_box(&mut tokens, line_no),
            "DEFAULT_CHAR" => self.fallback_char(&mut tokens, line_no),
            "CHARS" => self.plan_layout(&mut tokens, line_no),
            "ENCODING" => self.encoding(&mut tokens, line_no),
            "BITMAP" => self.begin_glyph(line_no),
            "ENDCHAR" => self.end_glyph(line_no),
            // BDF carries plenty of directives this compiler has no use for
            // (STARTFONT, SIZE, SWIDTH, BBX, properties, comments, ...)
            _ => Ok(()),
        }
    }

    /// `FONTBOUNDINGBOX <width> <height> [...]`
    fn bounding_box(&mut self, tokens: &mut SplitWhitespace<'_>, line_no: usize) -> Result<(), BdfError> {
        let (Some(width), Some(height)) = (tokens.next(), tokens.next()) else {
            return Ok(());
        };
        if self.plan.is_some() {
            return Err(BdfError::malformed(
                line_no,
                "bounding box redeclared after the atlas was laid out",
            ));
        }

        let width = parse_int(width, line_no, "bounding box width")?;
        let height = parse_int(height, line_no, "bounding box height")?;
        if width < 1 || width > i64::from(MAX_CELL_WIDTH) {
            return Err(BdfError::malformed(
                line_no,
                format!("unsupported cell width {width} (expected 1-{MAX_CELL_WIDTH})"),
            ));
        }
        if height < 1 {
            return Err(BdfError::malformed(
                line_no,
                format!("unsupported cell height {height}"),
            ));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            self.size = Some((width as u32, height as u32));
        }
        if self.state == State::SeekingMetrics {
            self.state = State::SeekingGlyphCount;
        }
        Ok(())
    }

    /// `DEFAULT_CHAR <code>`
    fn fallback_char(&mut self, tokens: &mut SplitWhitespace<'_>, line_no: usize) -> Result<(), BdfError> {
        let Some(code) = tokens.next() else {
            return Ok(());
        };
        self.default_char = Some(parse_int(code, line_no, "default character code")?);
        Ok(())
    }

    /// `CHARS <count>`: the single point where the layout planner runs.
    fn plan_layout(&mut self, tokens: &mut SplitWhitespace<'_>, line_no: usize) -> Result<(), BdfError> {
        let Some(count) = tokens.next() else {
            return Ok(());
        };
        let Some((size_x, size_y)) = self.size else {
            return Err(BdfError::malformed(
                line_no,
                "glyph count declared before the font bounding box",
            ));
        };
        if self.plan.is_some() {
            return Err(BdfError::malformed(line_no, "glyph count declared twice"));
        }

        let count = parse_int(count, line_no, "glyph count")?;
        if count < 1 {
            return Err(BdfError::malformed(
                line_no,
                format!("font must declare at least one glyph, got {count}"),
            ));
        }
        if count > i64::from(u32::MAX) {
            return Err(BdfError::malformed(
                line_no,
                format!("glyph count {count} is out of range"),
            ));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = count as u32;
        let plan = AtlasPlan::new(count, size_x, size_y);
        self.bitmap = Some(AtlasBitmap::new(&plan));
        self.plan = Some(plan);
        self.glyph_count = count;
        self.state = State::GlyphHeader;
        Ok(())
    }

    /// `ENCODING <code>`: records the next glyph's character code.
    fn encoding(&mut self, tokens: &mut SplitWhitespace<'_>, line_no: usize) -> Result<(), BdfError> {
        let Some(code) = tokens.next() else {
            return Ok(());
        };
        if self.plan.is_none() {
            return Err(BdfError::malformed(
                line_no,
                "glyph encoding declared before the glyph count",
            ));
        }
        if self.char_map.len() == self.glyph_count as usize {
            return Err(BdfError::malformed(
                line_no,
                format!("font declares more glyphs than the announced count of {}", self.glyph_count),
            ));
        }
        self.char_map.push(parse_int(code, line_no, "character code")?);
        Ok(())
    }

    /// `BITMAP`: enters row parsing and pins the current glyph's cell origin.
    fn begin_glyph(&mut self, line_no: usize) -> Result<(), BdfError> {
        let Some(plan) = &self.plan else {
            return Err(BdfError::malformed(
                line_no,
                "glyph bitmap started before the glyph count",
            ));
        };
        if self.glyph_index >= self.glyph_count {
            return Err(BdfError::malformed(
                line_no,
                format!("font declares more glyphs than the announced count of {}", self.glyph_count),
            ));
        }
        self.cell = plan.cell_origin(self.glyph_index);
        self.row = 0;
        self.state = State::GlyphRows;
        Ok(())
    }

    /// `ENDCHAR`: finishes the current glyph and advances the cell cursor.
    fn end_glyph(&mut self, line_no: usize) -> Result<(), BdfError> {
        if self.plan.is_none() {
            return Err(BdfError::malformed(
                line_no,
                "glyph terminator before the glyph count",
            ));
        }
        self.glyph_index += 1;
        self.state = State::GlyphHeader;
        Ok(())
    }

    /// One hexadecimal row bitmask inside a BITMAP block.
    fn glyph_row(&mut self, line: &str, line_no: usize) -> Result<(), BdfError> {
        let token = line.split_whitespace().next().unwrap_or("");
        if token == "ENDCHAR" {
            return self.end_glyph(line_no);
        }

        let (Some((_, size_y)), Some(bitmap)) = (self.size, self.bitmap.as_mut()) else {
            return Err(BdfError::malformed(line_no, "bitmap row outside a glyph"));
        };
        if self.row >= size_y {
            return Err(BdfError::malformed(
                line_no,
                format!("glyph declares more than {size_y} bitmap rows"),
            ));
        }
        let bits = u64::from_str_radix(token, 16).map_err(|_| {
            BdfError::malformed(line_no, format!("invalid bitmap row {token:?}"))
        })?;

        bitmap.plot_row(self.cell.0, self.cell.1, self.row, bits);
        self.row += 1;
        Ok(())
    }

    fn finish(self) -> Result<CompiledFont, BdfError> {
        if self.state == State::GlyphRows {
            return Err(BdfError::TruncatedGlyph);
        }
        let (Some(plan), Some(bitmap)) = (self.plan, self.bitmap) else {
            return Err(BdfError::MissingGlyphCount);
        };

        log::info!(
            "Compiled {} glyph(s) into a {}x{} px atlas",
            self.glyph_index,
            plan.image_width(),
            plan.image_height()
        );

        Ok(CompiledFont {
            metrics: FontMetrics {
                size_x: plan.size_x,
                size_y: plan.size_y,
                default_char: self.default_char,
            },
            plan,
            bitmap,
            char_map: self.char_map,
        })
    }
}

fn parse_int(token: &str, line_no: usize, what: &str) -> Result<i64, BdfError> {
    token
        .parse()
        .map_err(|_| BdfError::malformed(line_no, format!("invalid {what} {token:?}")))
}
