//! Helvetica glyph metrics and WinAnsi text encoding for the built-in Type1 font.

/// Advance widths (1/1000 em) of the printable ASCII range, 0x20..=0x7E.
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const FALLBACK_WIDTH: u16 = 556;

pub const FONT_RESOURCE: &str = "F1";
pub const BASE_FONT: &str = "Helvetica";

fn glyph_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => HELVETICA_ASCII_WIDTHS[(byte - 0x20) as usize],
        _ => FALLBACK_WIDTH,
    }
}

/// Encodes text for a WinAnsiEncoding font. Characters outside Latin-1 become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Rendered width of `text` in points at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    let units: u32 = encode_win_ansi(text).into_iter().map(|b| glyph_width(b) as u32).sum();
    units as f32 * font_size / 1000.0
}
