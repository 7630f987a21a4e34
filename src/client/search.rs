use regex::RegexBuilder;

pub const HIGHLIGHT_OPEN: &str = "<span class=\"search-highlight\">";
pub const HIGHLIGHT_CLOSE: &str = "</span>";

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Wraps every case-insensitive occurrence of `term` in highlight
/// markers. The term is escaped first so metacharacters match
/// literally; an empty term returns the text untouched.
pub fn highlight(text: &str, term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return text.to_string();
    }

    // Escaped patterns always compile; fall back to plain text anyway
    // rather than panic on arbitrary input.
    let Ok(re) = RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
    else {
        return text.to_string();
    };

    re.replace_all(text, |caps: &regex::Captures| {
        format!("{}{}{}", HIGHLIGHT_OPEN, &caps[0], HIGHLIGHT_CLOSE)
    })
    .into_owned()
}
