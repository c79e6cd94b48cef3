// Output formatting: terminal display of alignments and reports.

pub mod terminal;

/// Number of values shown per column when sampling.
pub const SAMPLE_SIZE: usize = 5;

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// Counts characters, not bytes, so cells with multi-byte text never split
/// mid-character.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let char_count = text.chars().count();
    if char_count <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}...")
    }
}

/// First few values of a column joined for display, each value shortened.
pub fn format_sample(values: &[String], max_chars: usize) -> String {
    values
        .iter()
        .take(SAMPLE_SIZE)
        .map(|v| truncate_chars(v, max_chars))
        .collect::<Vec<_>>()
        .join(", ")
}
