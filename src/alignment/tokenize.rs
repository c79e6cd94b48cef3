// Cell normalization and word tokenization.
//
// A cell is trimmed of surrounding whitespace and punctuation and lowercased,
// then split on whitespace; every word gets the same normalization. Lookups
// against the embedding store are exact, so both sides of a comparison must go
// through the same function.

fn is_trimmable(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || is_unicode_punctuation(c)
}

// Common non-ASCII punctuation seen in open-data cells (typographic quotes,
// dashes, ellipsis, guillemets, inverted marks).
fn is_unicode_punctuation(c: char) -> bool {
    matches!(
        c,
        '\u{2010}'..='\u{2027}' | '\u{2030}'..='\u{205E}' | '«' | '»' | '¡' | '¿' | '·'
    )
}

/// Trim whitespace and punctuation from both ends and lowercase.
pub fn normalize(value: &str) -> String {
    value.trim_matches(is_trimmable).to_lowercase()
}

/// Split a cell into normalized words. Empty and punctuation-only cells yield
/// no tokens.
pub fn tokenize(value: &str) -> Vec<String> {
    normalize(value)
        .split_whitespace()
        .map(normalize)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize("  \"Canada.\" "), "canada");
        assert_eq!(normalize("U.S.A."), "u.s.a");
        assert_eq!(normalize("—Québec…"), "québec");
    }

    #[test]
    fn test_tokenize_multi_word() {
        assert_eq!(tokenize("New  York, City"), vec!["new", "york", "city"]);
    }

    #[test]
    fn test_tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("-- ; --").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_repeated_words() {
        assert_eq!(tokenize("new new"), vec!["new", "new"]);
    }
}
