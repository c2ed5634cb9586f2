// Output formatting — terminal display of summaries and short text previews.

pub mod terminal;

/// One-line preview of `text`: whitespace runs collapse to single spaces and
/// the result is cut to `max_chars` characters, with "..." when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let head: String = flat.chars().take(max_chars).collect();
    format!("{}...", head.trim_end())
}
