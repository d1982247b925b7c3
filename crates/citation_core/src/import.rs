use once_cell::sync::Lazy;
use regex::Regex;

/// URLs accepted by import and interactive prompts: http(s) followed by a
/// restricted character set. Query strings (`?`) are not accepted.
static URL_SYNTAX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[A-Za-z0-9./_\-:#\[\]@!$&'()*+,;%=]+$").expect("static url pattern")
});

pub fn is_valid_url(candidate: &str) -> bool {
    URL_SYNTAX_RE.is_match(candidate)
}

/// Counts from importing a block of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub duplicates: usize,
    /// Non-blank lines that were not valid URLs.
    pub skipped: usize,
}

/// Trims each line and classifies it. Blank lines yield nothing.
pub(crate) fn candidate_lines(text: &str) -> impl Iterator<Item = Result<&str, &str>> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| if is_valid_url(line) { Ok(line) } else { Err(line) })
}
