//! Source normalization.
//!
//! Produces the line stream whose 1-based positions are the address space for
//! labels and jumps. Comment-only and blank lines never consume an address.

pub const COMMENT_DELIMITER: &str = "//";
pub const LABEL_SUFFIX: char = ':';

/// Drop blank and comment-only lines and strip leading spaces/tabs from the rest.
///
/// Indentation is stripped before the comment test, so an indented `// note`
/// is still a comment line.
pub fn normalize<'a, I>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(|l| l.trim_end_matches('\r').trim_start_matches([' ', '\t']))
        .filter(|l| !l.trim().is_empty() && !l.starts_with(COMMENT_DELIMITER))
        .map(str::to_owned)
        .collect()
}

/// Remove a trailing `// ...` comment, if any.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_DELIMITER) {
        Some(p) => &line[..p],
        None => line,
    }
}

/// A normalized line split into its optional label and instruction tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitLine<'a> {
    pub label: Option<&'a str>,
    pub tokens: Vec<&'a str>,
    pub comment: Option<&'a str>,
}

/// Split off the comment, the `name:` label prefix and tokenize the remainder.
///
/// A label is recognised when the first whitespace-delimited token contains a
/// colon; any text following the colon in that same token starts the instruction.
pub fn split_line(line: &str) -> SplitLine<'_> {
    let code = strip_comment(line);
    let comment = line.get(code.len()..).filter(|c| !c.is_empty());
    let mut tokens: Vec<&str> = code.split_whitespace().collect();
    let mut label = None;
    if let Some(first) = tokens.first().copied() {
        if let Some(p) = first.find(LABEL_SUFFIX) {
            label = Some(&first[..p]);
            let rest = &first[p + LABEL_SUFFIX.len_utf8()..];
            if rest.is_empty() {
                tokens.remove(0);
            } else {
                tokens[0] = rest;
            }
        }
    }
    SplitLine {
        label,
        tokens,
        comment,
    }
}
