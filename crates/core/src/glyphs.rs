//! Text-to-sign glyph lookup
//!
//! Static per-letter table of hand glyphs used as the display token for a
//! text-to-sign submission.

/// Glyph shown for characters outside the table
pub const FALLBACK_GLYPH: &str = "🤚";

fn glyph_for(c: char) -> &'static str {
    match c.to_ascii_uppercase() {
        'A' | 'E' | 'S' | 'T' => "✊",
        'B' => "🤚",
        'C' => "🤏",
        'D' | 'Z' => "☝️",
        'F' => "🤌",
        'G' | 'I' | 'J' | 'X' | 'Y' => "🤙",
        'H' | 'L' | 'W' => "🤟",
        'K' | 'V' => "✌️",
        'M' | 'N' => "🤜",
        'O' => "👌",
        'P' | 'Q' => "👇",
        'R' | 'U' => "🤞",
        ' ' => "  ",
        _ => FALLBACK_GLYPH,
    }
}

/// Render text as a glyph sequence, one glyph per character
pub fn render(text: &str) -> String {
    text.chars().map(glyph_for).collect()
}
