//! Folding of accented Latin letters into the storage character set
//!
//! Tables are single-byte ASCII text. Letters from the fold table below are
//! replaced by their unaccented equivalent, keeping case; every other
//! character passes through unchanged. Folding happens on write only.

/// Folds the accented letters of the fold table to plain ASCII.
pub fn transliterate(text: &str) -> String {
    text.chars().map(fold_char).collect()
}

/// Returns true when `text` can be stored byte-for-byte.
pub fn is_storable(text: &str) -> bool {
    text.is_ascii()
}

/// Returns the first character of `text` that cannot be stored, if any.
pub fn first_unstorable(text: &str) -> Option<char> {
    text.chars().find(|c| !c.is_ascii())
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'â' | 'ã' | 'á' => 'a',
        'À' | 'Â' | 'Ã' | 'Á' => 'A',
        'ç' => 'c',
        'Ç' => 'C',
        'é' | 'ê' => 'e',
        'É' | 'Ê' => 'E',
        'í' => 'i',
        'Í' => 'I',
        'ó' | 'õ' | 'ô' => 'o',
        'Ó' | 'Õ' | 'Ô' => 'O',
        'ú' | 'ü' => 'u',
        'Ú' | 'Ü' => 'U',
        other => other,
    }
}
