//! Location recovery for dependency declarations.
//!
//! Structural decoders report what a manifest declares but not the full
//! textual extent of each declaration. These helpers re-derive that extent
//! from the raw lines, starting at an anchor the decoder does know (the
//! byte position of an element's start tag, or a byte range in JSON).

use super::Location;
use crate::utils::{first_non_whitespace, offset_to_position, trimmed_end};

/// Position a structural decoder reported for a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    /// 0-indexed line
    pub line: usize,
    /// Byte column at or before the start of the declaration
    pub column: usize,
}

impl Anchor {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Anchor at a byte offset into the content `starts` was computed from
    pub fn from_offset(starts: &[usize], offset: usize) -> Self {
        let (line, column) = offset_to_position(starts, offset);
        Self { line, column }
    }
}

/// Finds `<name` at or after `from`, rejecting longer names that share the
/// prefix (`<package` does not match `<packages>`).
pub fn find_open_tag(line: &str, name: &str, from: usize) -> Option<usize> {
    let needle = format!("<{name}");
    let mut search = from;
    while let Some(rel) = line.get(search..)?.find(&needle) {
        let idx = search + rel;
        let after = idx + needle.len();
        match line[after..].chars().next() {
            None => return Some(idx),
            Some(c) if c.is_whitespace() || c == '>' || c == '/' => return Some(idx),
            Some(_) => search = after,
        }
    }
    None
}

/// End of an opening tag that starts before `from`: the byte index just past
/// its `>`, and whether the tag is self-closing. Quoted attribute values are
/// skipped. `None` when the tag continues on a later line.
fn opening_tag_end(line: &str, from: usize) -> Option<(usize, bool)> {
    let mut quote: Option<char> = None;
    let mut prev = None;
    for (i, c) in line.get(from..)?.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some((from + i + 1, prev == Some('/'))),
            None => {}
        }
        prev = Some(c);
    }
    None
}

/// Recovers the spans of an XML element declared at `anchor`.
///
/// A self-closing element, or one closed on its opening line, yields one
/// span from `<name` to the end of the element. Otherwise the first span
/// runs from `<name` to the end of the opening line, each following
/// non-blank line outside a comment contributes its trimmed content, and
/// the closing line contributes the `</name>` tag itself. If the element
/// does not end within `window` lines only the first span is returned.
///
/// Returns an empty vector when the opening tag is not found on the anchor
/// line; callers skip the declaration in that case.
pub fn locate_element(lines: &[&str], anchor: Anchor, name: &str, window: usize) -> Vec<Location> {
    let Some(first) = lines.get(anchor.line) else {
        return Vec::new();
    };
    let Some(start) = find_open_tag(first, name, anchor.column) else {
        return Vec::new();
    };
    let close = format!("</{name}>");
    let after_name = start + 1 + name.len();

    let mut in_open_tag = false;
    match opening_tag_end(first, after_name) {
        Some((end, true)) => return vec![Location::new(anchor.line, start, end)],
        Some((end, false)) => {
            if let Some(rel) = first[end..].find(&close) {
                let close_end = end + rel + close.len();
                return vec![Location::new(anchor.line, start, close_end)];
            }
        }
        None => in_open_tag = true,
    }

    let mut spans = vec![Location::new(anchor.line, start, trimmed_end(first))];
    let mut in_comment = false;
    let last = lines.len().min(anchor.line.saturating_add(window).saturating_add(1));

    for (line_num, text) in lines.iter().enumerate().take(last).skip(anchor.line + 1) {
        let trimmed = text.trim();
        if in_comment {
            in_comment = !trimmed.contains("-->");
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("<!--") {
            in_comment = !trimmed.contains("-->");
            continue;
        }
        let content_start = first_non_whitespace(text).unwrap_or(0);

        if in_open_tag {
            match opening_tag_end(text, content_start) {
                Some((end, true)) => {
                    spans.push(Location::new(line_num, content_start, end));
                    return spans;
                }
                Some((end, false)) => {
                    in_open_tag = false;
                    if let Some(rel) = text[end..].find(&close) {
                        let close_end = end + rel + close.len();
                        spans.push(Location::new(line_num, content_start, close_end));
                        return spans;
                    }
                }
                None => {}
            }
            spans.push(Location::new(line_num, content_start, trimmed_end(text)));
            continue;
        }

        if let Some(close_start) = text.find(&close) {
            spans.push(Location::new(line_num, close_start, close_start + close.len()));
            return spans;
        }
        spans.push(Location::new(line_num, content_start, trimmed_end(text)));
    }

    spans.truncate(1);
    spans
}

/// Spans covering the byte range `start..end` of the content the `lines` and
/// `starts` were computed from, one per non-blank line.
pub fn locate_range(lines: &[&str], starts: &[usize], start: usize, end: usize) -> Vec<Location> {
    let (first_line, first_col) = offset_to_position(starts, start);
    let (last_line, last_col) = offset_to_position(starts, end);
    if first_line == last_line {
        return vec![Location::new(first_line, first_col, last_col)];
    }

    let mut spans = Vec::with_capacity(last_line - first_line + 1);
    for line_num in first_line..=last_line {
        let Some(text) = lines.get(line_num) else {
            break;
        };
        let from = if line_num == first_line {
            first_col
        } else {
            match first_non_whitespace(text) {
                Some(col) => col,
                None => continue,
            }
        };
        let to = if line_num == last_line {
            last_col.min(text.len())
        } else {
            trimmed_end(text)
        };
        if from < to {
            spans.push(Location::new(line_num, from, to));
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{line_starts, split_lines};

    fn slices<'a>(lines: &[&'a str], spans: &[Location]) -> Vec<&'a str> {
        spans.iter().map(|s| s.slice(lines).unwrap()).collect()
    }

    #[test]
    fn test_single_line_self_closing() {
        let lines = vec![
            "<ItemGroup>",
            r#"    <PackageReference Include="Serilog" Version="3.1.1" />"#,
            "</ItemGroup>",
        ];
        let spans = locate_element(&lines, Anchor::new(1, 0), "PackageReference", 15);
        assert_eq!(spans, vec![Location::new(1, 4, 58)]);
        assert_eq!(
            slices(&lines, &spans),
            vec![r#"<PackageReference Include="Serilog" Version="3.1.1" />"#]
        );
    }

    #[test]
    fn test_single_line_with_closing_tag() {
        let lines = vec![r#"  <package id="A"><version>1.0</version></package>  "#];
        let spans = locate_element(&lines, Anchor::new(0, 0), "package", 15);
        assert_eq!(
            slices(&lines, &spans),
            vec![r#"<package id="A"><version>1.0</version></package>"#]
        );
    }

    #[test]
    fn test_multi_line_block() {
        let lines = vec![
            r#"    <PackageReference Include="Microsoft.TeamFoundationServer.Client">"#,
            "      <Version>19.225.1</Version>",
            "    </PackageReference>",
        ];
        let spans = locate_element(&lines, Anchor::new(0, 0), "PackageReference", 15);
        assert_eq!(spans.len(), 3);
        assert_eq!(
            slices(&lines, &spans),
            vec![
                r#"<PackageReference Include="Microsoft.TeamFoundationServer.Client">"#,
                "<Version>19.225.1</Version>",
                "</PackageReference>",
            ]
        );
    }

    #[test]
    fn test_multi_line_skips_blank_and_comment_lines() {
        let lines = vec![
            "<dependency>",
            "  <groupId>org.slf4j</groupId>",
            "",
            "  <!-- pinned",
            "       for now -->",
            "  <artifactId>slf4j-api</artifactId>",
            "  <!-- single line comment -->",
            "  <version>2.0.9</version>",
            "</dependency>",
        ];
        let spans = locate_element(&lines, Anchor::new(0, 0), "dependency", 15);
        let lines_hit: Vec<usize> = spans.iter().map(|s| s.line).collect();
        assert_eq!(lines_hit, vec![0, 1, 5, 7, 8]);
        assert_eq!(slices(&lines, &spans)[4], "</dependency>");
    }

    #[test]
    fn test_multi_line_attributes_self_closing() {
        let lines = vec![
            "  <PackageReference",
            r#"      Include="Serilog""#,
            r#"      Version="3.1.1" />"#,
        ];
        let spans = locate_element(&lines, Anchor::new(0, 0), "PackageReference", 15);
        assert_eq!(
            slices(&lines, &spans),
            vec!["<PackageReference", r#"Include="Serilog""#, r#"Version="3.1.1" />"#]
        );
    }

    #[test]
    fn test_unclosed_within_window_returns_first_span() {
        let mut lines = vec!["<dependency>"];
        lines.extend(std::iter::repeat_n("  <scope>test</scope>", 20));
        lines.push("</dependency>");
        let spans = locate_element(&lines, Anchor::new(0, 0), "dependency", 15);
        assert_eq!(spans, vec![Location::new(0, 0, 12)]);
    }

    #[test]
    fn test_missing_tag_returns_nothing() {
        let lines = vec!["<packages>", "</packages>"];
        assert!(locate_element(&lines, Anchor::new(0, 0), "package", 15).is_empty());
        assert!(locate_element(&lines, Anchor::new(7, 0), "package", 15).is_empty());
    }

    #[test]
    fn test_find_open_tag_respects_boundaries() {
        assert_eq!(find_open_tag("<packages><package id=\"a\"/>", "package", 0), Some(10));
        assert_eq!(find_open_tag("<dependencyManagement>", "dependency", 0), None);
        assert_eq!(find_open_tag("<dependency>", "dependency", 0), Some(0));
        assert_eq!(find_open_tag("<package", "package", 0), Some(0));
    }

    #[test]
    fn test_anchor_column_selects_second_element() {
        let lines = vec![r#"<package id="A" version="1.0" /><package id="B" version="2.0" />"#];
        let spans = locate_element(&lines, Anchor::new(0, 32), "package", 15);
        assert_eq!(
            slices(&lines, &spans),
            vec![r#"<package id="B" version="2.0" />"#]
        );
    }

    #[test]
    fn test_quoted_gt_in_attribute() {
        let lines =
            vec![r#"<PackageReference Include="A" Condition="'$(X)' > '1'" Version="1.0" />"#];
        let spans = locate_element(&lines, Anchor::new(0, 0), "PackageReference", 15);
        assert_eq!(spans[0].end_index, lines[0].len());
    }

    #[test]
    fn test_locate_range_single_line() {
        let content = "{\n  \"react\": \"18.2.0\"\n}";
        let lines = split_lines(content);
        let starts = line_starts(content);
        let spans = locate_range(&lines, &starts, 4, 21);
        assert_eq!(slices(&lines, &spans), vec!["\"react\": \"18.2.0\""]);
    }

    #[test]
    fn test_locate_range_multi_line() {
        let content = "{\n  \"react\":\n\n     \"18.2.0\"\n}";
        let lines = split_lines(content);
        let starts = line_starts(content);
        let end = content.find("\"18.2.0\"").unwrap() + 8;
        let spans = locate_range(&lines, &starts, 4, end);
        assert_eq!(slices(&lines, &spans), vec!["\"react\":", "\"18.2.0\""]);
    }
}
