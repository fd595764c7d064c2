//! Helpers for turning free-form setup input into name lists and for
//! rendering the countdown.

/// Splits a pasted block of names on newlines, commas and semicolons.
///
/// Entries are trimmed, blanks dropped and duplicates removed keeping the
/// first occurrence.
pub fn clean_lines(block: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in block.split(['\n', '\r', ',', ';']) {
        let part = part.trim();
        if !part.is_empty() && !out.iter().any(|seen| seen == part) {
            out.push(part.to_string());
        }
    }
    out
}

/// Formats whole seconds as `MM:SS`; minutes are not wrapped at 60.
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
