//! Text search over loaded content

/// Location of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextMatch {
    /// Byte offset of the match start
    pub offset: usize,
    /// Byte length of the matched text
    pub len: usize,
    /// 1-based line number
    pub line: usize,
    /// 1-based column, counted in characters
    pub column: usize,
}

/// Find the first occurrence of `needle` starting at byte `from`.
///
/// `from` is moved forward to the next character boundary if needed. An
/// empty needle never matches. Case-insensitive matching compares
/// characters by their lowercase forms.
pub fn find_text(
    content: &str,
    needle: &str,
    from: usize,
    case_sensitive: bool,
) -> Option<TextMatch> {
    if needle.is_empty() || from > content.len() {
        return None;
    }
    let mut start = from;
    while !content.is_char_boundary(start) {
        start += 1;
    }

    let (offset, len) = if case_sensitive {
        content[start..]
            .find(needle)
            .map(|pos| (start + pos, needle.len()))?
    } else {
        find_folded(content, needle, start)?
    };

    Some(locate(content, offset, len))
}

/// Every non-overlapping occurrence of `needle`, in order
pub fn find_all(content: &str, needle: &str, case_sensitive: bool) -> Vec<TextMatch> {
    let mut matches = Vec::new();
    let mut from = 0;
    while let Some(found) = find_text(content, needle, from, case_sensitive) {
        from = found.offset + found.len;
        matches.push(found);
    }
    matches
}

fn find_folded(content: &str, needle: &str, start: usize) -> Option<(usize, usize)> {
    content[start..].char_indices().find_map(|(pos, _)| {
        let candidate = &content[start + pos..];
        match_len_folded(candidate, needle).map(|len| (start + pos, len))
    })
}

/// Byte length of the prefix of `haystack` that matches `needle` ignoring case
fn match_len_folded(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay = haystack.char_indices();
    for wanted in needle.chars() {
        let (_, got) = hay.next()?;
        if got != wanted && !got.to_lowercase().eq(wanted.to_lowercase()) {
            return None;
        }
    }
    Some(hay.next().map_or(haystack.len(), |(pos, _)| pos))
}

fn locate(content: &str, offset: usize, len: usize) -> TextMatch {
    let before = &content[..offset];
    let line_start = before.rfind('\n').map_or(0, |pos| pos + 1);
    TextMatch {
        offset,
        len,
        line: before.matches('\n').count() + 1,
        column: content[line_start..offset].chars().count() + 1,
    }
}
