//! Utterance normalization.
//!
//! All lexicon matching happens on a lowercased, accent-folded copy of the
//! utterance so "não" and "nao", "orçamento" and "orcamento" compare equal.
//! Folding walks grapheme clusters rather than chars so combining marks in
//! pasted text (NFD input) fold the same way as precomposed letters.

use unicode_segmentation::UnicodeSegmentation;

/// Lowercase and strip Portuguese diacritics. Unknown graphemes pass
/// through unchanged.
pub fn fold(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut folded = String::with_capacity(lower.len());
    for grapheme in lower.graphemes(true) {
        match fold_grapheme(grapheme) {
            Some(ascii) => folded.push(ascii),
            None => folded.push_str(grapheme),
        }
    }
    folded
}

fn fold_grapheme(grapheme: &str) -> Option<char> {
    // Base letter of an NFD cluster, or the precomposed letter itself.
    let base = grapheme.chars().next()?;
    if grapheme.chars().count() > 1 {
        // Combining marks after an ASCII base: keep the base.
        if base.is_ascii_alphabetic() && grapheme.chars().skip(1).all(is_combining_mark) {
            return Some(base);
        }
    }
    let ascii = match base {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        _ => return None,
    };
    Some(ascii)
}

fn is_combining_mark(c: char) -> bool {
    matches!(c, '\u{0300}'..='\u{036f}')
}

/// Fold plus whitespace collapse, the canonical pre-matching form.
pub fn normalize(text: &str) -> String {
    fold(text).split_whitespace().collect::<Vec<_>>().join(" ")
}
