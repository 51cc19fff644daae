//! Text coordinate helpers shared by the manifest parsers.

/// Splits content into lines on `\n`, dropping a trailing `\r` from each.
///
/// Unlike [`str::lines`], a trailing newline yields a final empty line, so
/// line indices always match what an editor shows.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Byte offsets at which each line of `content` starts.
pub fn line_starts(content: &str) -> Vec<usize> {
    let mut starts = Vec::with_capacity(content.len() / 32 + 1);
    starts.push(0);
    starts.extend(
        content
            .bytes()
            .enumerate()
            .filter(|&(_, b)| b == b'\n')
            .map(|(i, _)| i + 1),
    );
    starts
}

/// Converts a byte offset into a 0-based `(line, column)` pair.
///
/// `starts` must come from [`line_starts`] for the same content.
pub fn offset_to_position(starts: &[usize], offset: usize) -> (usize, usize) {
    let line = match starts.binary_search(&offset) {
        Ok(line) => line,
        Err(next) => next.saturating_sub(1),
    };
    (line, offset - starts[line])
}

/// Byte index of the first non-whitespace character, if any.
pub fn first_non_whitespace(line: &str) -> Option<usize> {
    line.find(|c: char| !c.is_whitespace())
}

/// Length of `line` without trailing whitespace.
pub fn trimmed_end(line: &str) -> usize {
    line.trim_end().len()
}
