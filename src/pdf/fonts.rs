//! Helvetica metrics and WinAnsi encoding for the page-number label
//!
//! Helvetica is one of the 14 standard PDF fonts, so nothing is embedded;
//! we only need its advance widths to right-align text.

/// Base font name written into the font dictionary
pub const HELVETICA: &str = "Helvetica";

/// First character code covered by [`HELVETICA_WIDTHS`]
const FIRST_CHAR: u8 = 32;

/// Helvetica advance widths for WinAnsiEncoding codes 32-255,
/// in 1/1000ths of the em square (from the Adobe AFM)
const HELVETICA_WIDTHS: [u16; 224] = [
    // 32-47: space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 48-63: 0-9 : ; < = > ?
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    // 64-79: @ A-O
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    // 80-95: P-Z [ \ ] ^ _
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    // 96-111: ` a-o
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    // 112-127: p-z { | } ~ DEL
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, 350,
    // 128-143
    556, 350, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 350, 611, 350,
    // 144-159
    350, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 350, 500, 667,
    // 160-175
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // 176-191
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // 192-207: À-Ï
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // 208-223: Ð-ß
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // 224-239: à-ï
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // 240-255: ð-ÿ
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Encode text as WinAnsiEncoding bytes
///
/// Latin-1 maps straight through; the Windows-1252 extras in 0x80-0x9F are
/// translated. Anything else (and control characters) becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_code).collect()
}

fn win_ansi_code(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => b'?',
    }
}

/// Advance width of one WinAnsi code, in 1/1000 em
pub fn helvetica_glyph_width(code: u8) -> u16 {
    code.checked_sub(FIRST_CHAR)
        .map(|i| HELVETICA_WIDTHS[i as usize])
        .unwrap_or(0)
}

/// Width of already-encoded text set in Helvetica at `font_size` points
pub fn helvetica_encoded_width(encoded: &[u8], font_size: f32) -> f32 {
    let units: u32 = encoded
        .iter()
        .map(|&b| u32::from(helvetica_glyph_width(b)))
        .sum();
    units as f32 * font_size / 1000.0
}

/// Width of `text` set in Helvetica at `font_size` points
pub fn helvetica_text_width(text: &str, font_size: f32) -> f32 {
    helvetica_encoded_width(&encode_win_ansi(text), font_size)
}
