// JobSleuth - core/normalize.rs
//
// OCR text normalisation: whitespace, dash variants, line splitting.
// Core layer: pure string transforms, total over any input.

/// How to treat characters in front of the first column of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadingNoise {
    /// Drop any leading run of characters that are not `A-Z` or `0-9`
    /// (stray `_`, lowercase OCR junk such as `a `).
    Strip,
    /// Keep the line as trimmed.
    Keep,
}

/// Turn raw OCR output into ordered, trimmed, non-empty lines.
///
/// `None` and `""` both yield an empty vector.
pub fn normalize_lines(raw: Option<&str>, mode: LeadingNoise) -> Vec<String> {
    let raw = match raw {
        Some(text) if !text.is_empty() => text,
        _ => return Vec::new(),
    };

    unify_characters(raw)
        .split('\n')
        .filter_map(|line| clean_line(line, mode))
        .collect()
}

/// Join the OCR text of several pages into one screen text.
///
/// Every page is prefixed with a newline, so a page whose last line has no
/// terminator never runs into the first line of the next page.
pub fn join_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for page in pages {
        joined.push('\n');
        joined.push_str(page.as_ref());
    }
    joined
}

/// NBSP -> space, collapse horizontal whitespace runs, unify dashes.
fn unify_characters(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_blank_run = false;

    for ch in raw.chars() {
        if is_horizontal_space(ch) {
            if !in_blank_run {
                out.push(' ');
                in_blank_run = true;
            }
            continue;
        }
        in_blank_run = false;
        out.push(if is_dash_variant(ch) { '-' } else { ch });
    }

    out
}

fn clean_line(line: &str, mode: LeadingNoise) -> Option<String> {
    let mut cleaned = line.trim();
    if mode == LeadingNoise::Strip {
        cleaned =
            cleaned.trim_start_matches(|c: char| !(c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Whitespace other than line terminators. NBSP and BOM are included.
fn is_horizontal_space(ch: char) -> bool {
    ch != '\n' && ch != '\r' && (ch.is_whitespace() || ch == '\u{00A0}' || ch == '\u{FEFF}')
}

/// Hyphen, non-breaking hyphen, figure dash, en dash, em dash, horizontal bar.
fn is_dash_variant(ch: char) -> bool {
    ('\u{2010}'..='\u{2015}').contains(&ch)
}
