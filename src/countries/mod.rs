//! Country name ↔ numeric code resolution.
//!
//! [`CountryResolver`] is the lookup seam used by the membership normalizer
//! and the chart labels. [`CountryRegistry`] implements it from a
//! `code,name,aliases` CSV table, with an embedded default.

mod registry;

pub use registry::CountryRegistry;

/// Best-effort mapping between free-text country names and canonical codes.
pub trait CountryResolver: Send + Sync {
    fn name_to_code(&self, name: &str) -> Option<u32>;
    fn code_to_name(&self, code: u32) -> Option<&str>;
}

/// Folds a free-text country name into a comparison key.
///
/// Bracketed footnote markers and parenthesized notes are dropped, common
/// Latin diacritics folded, `.` and `'` removed, `&` read as "and", other
/// punctuation and digits treated as spaces, and a leading "the" stripped.
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut square = 0usize;
    let mut paren = 0usize;

    for ch in raw.chars() {
        match ch {
            '[' => square += 1,
            ']' => square = square.saturating_sub(1),
            '(' => paren += 1,
            ')' => paren = paren.saturating_sub(1),
            _ if square > 0 || paren > 0 => {}
            '.' | '\'' | '\u{2019}' => {}
            '&' => out.push_str(" and "),
            c if c.is_alphabetic() => {
                for lower in fold_diacritic(c).to_lowercase() {
                    out.push(lower);
                }
            }
            _ => out.push(' '),
        }
    }

    let words: Vec<&str> = out.split_whitespace().collect();
    let words = match words.split_first() {
        Some((&"the", rest)) if !rest.is_empty() => rest,
        _ => &words[..],
    };
    words.join(" ")
}

fn fold_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'ç' | 'č' | 'ć' => 'c',
        'Ç' | 'Č' | 'Ć' => 'C',
        'è' | 'é' | 'ê' | 'ë' | 'ě' => 'e',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'ñ' | 'ń' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ő' => 'o',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ő' => 'O',
        'š' | 'ś' => 's',
        'Š' | 'Ś' => 'S',
        'ù' | 'ú' | 'û' | 'ü' | 'ű' => 'u',
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ű' => 'U',
        'ý' | 'ÿ' => 'y',
        'ž' | 'ź' | 'ż' => 'z',
        'Ž' | 'Ź' | 'Ż' => 'Z',
        other => other,
    }
}
