// src/utils/text.rs

//! Text normalization for extracted page content.

/// Normalize raw page text.
///
/// Whitespace-like glyphs become a single space, dash variants become `-`,
/// curly quotes become straight quotes, and runs of spaces collapse to one.
/// Leading/trailing whitespace and case are left untouched.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut last_was_space = false;

    for c in raw.chars() {
        let mapped = map_char(c);
        if mapped == ' ' {
            if last_was_space {
                continue;
            }
            last_was_space = true;
        } else {
            last_was_space = false;
        }
        out.push(mapped);
    }

    out
}

/// Normalize and trim, the form stored in documents.
pub fn clean(raw: &str) -> String {
    normalize(raw).trim().to_string()
}

/// Like [`clean`], but `None` for text that is empty after cleaning.
pub fn clean_non_empty(raw: &str) -> Option<String> {
    let cleaned = clean(raw);
    (!cleaned.is_empty()).then_some(cleaned)
}

fn map_char(c: char) -> char {
    match c {
        // whitespace and layout glyphs
        '\n' | '\t' | '\r' | '\u{00B6}' | '\u{2191}' | '\u{00A0}' => ' ',
        '\u{2002}' | '\u{2003}' | '\u{2009}' | '\u{200A}' | '\u{202F}' => ' ',
        // dashes
        '\u{2010}'..='\u{2015}' | '\u{2212}' => '-',
        // quotes
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' => '"',
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' => '\'',
        other => other,
    }
}
