//! End-to-end compilation tests: BDF text in, decoded atlas and sidecar out.

use std::io::Cursor;

use crate::bdf::BdfCompiler;
use crate::png;

const TWO_GLYPH_FONT: &str = "\
STARTFONT 2.1
FONT -test-fixed-medium-r-normal--8-80-75-75-c-80-iso10646-1
FONTBOUNDINGBOX 8 8 0 -1
DEFAULT_CHAR 63
CHARS 2
STARTCHAR A
ENCODING 65
BITMAP
FF
FF
FF
FF
FF
FF
FF
FF
ENDCHAR
STARTCHAR B
ENCODING 66
BITMAP
81
81
81
81
81
81
81
81
ENDCHAR
ENDFONT
";

fn compile_to_png(source: &str) -> Vec<u8> {
    let font = BdfCompiler::compile(Cursor::new(source)).unwrap();
    let mut out = Vec::new();
    png::write_atlas(&mut out, &font.plan, font.bitmap.as_bytes()).unwrap();
    out
}

#[test]
fn test_decoded_atlas_matches_declared_glyphs() {
    let encoded = compile_to_png(TWO_GLYPH_FONT);
    let decoded = image::load_from_memory(&encoded).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (16, 8));

    for y in 0..8 {
        for x in 0..16 {
            let expected = if x < 8 {
                255 // glyph A: every pixel set
            } else if x == 8 || x == 15 {
                255 // glyph B: leftmost and rightmost columns only
            } else {
                0
            };
            assert_eq!(decoded.get_pixel(x, y).0[0], expected, "pixel ({x}, {y})");
        }
    }
}

#[test]
fn test_sidecar_lists_slots_in_declaration_order() {
    let font = BdfCompiler::compile(Cursor::new(TWO_GLYPH_FONT)).unwrap();
    let mut out = Vec::new();
    font.char_map.write(&mut out, &font.metrics).unwrap();
    assert_eq!(out, b"8 8 63\n65\n66\n");
}

#[test]
fn test_identical_input_reproduces_identical_output() {
    let first = compile_to_png(TWO_GLYPH_FONT);
    let second = compile_to_png(TWO_GLYPH_FONT);
    assert_eq!(first, second);

    let font = BdfCompiler::compile(Cursor::new(TWO_GLYPH_FONT)).unwrap();
    let mut first_map = Vec::new();
    font.char_map.write(&mut first_map, &font.metrics).unwrap();
    let again = BdfCompiler::compile(Cursor::new(TWO_GLYPH_FONT)).unwrap();
    let mut second_map = Vec::new();
    again.char_map.write(&mut second_map, &again.metrics).unwrap();
    assert_eq!(first_map, second_map);
}

#[test]
fn test_unassigned_trailing_cells_decode_to_background() {
    // Three glyphs plan a 2x2 grid; the fourth cell has no glyph and must
    // stay entirely blank.
    let source = "\
FONTBOUNDINGBOX 8 8
CHARS 3
ENCODING 65
BITMAP
FF
FF
FF
FF
FF
FF
FF
FF
ENDCHAR
ENCODING 66
BITMAP
FF
FF
FF
FF
FF
FF
FF
FF
ENDCHAR
ENCODING 67
BITMAP
FF
FF
FF
FF
FF
FF
FF
FF
ENDCHAR
";
    let encoded = compile_to_png(source);
    let decoded = image::load_from_memory(&encoded).unwrap().to_luma8();
    assert_eq!(decoded.dimensions(), (16, 16));

    for y in 0..8 {
        for x in 0..16 {
            assert_eq!(decoded.get_pixel(x, y).0[0], 255, "top row pixel ({x}, {y})");
        }
    }
    for y in 8..16 {
        for x in 0..16 {
            let expected = if x < 8 { 255 } else { 0 };
            assert_eq!(decoded.get_pixel(x, y).0[0], expected, "bottom row pixel ({x}, {y})");
        }
    }
}
