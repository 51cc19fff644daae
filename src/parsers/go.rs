//! Parser for Go module files (go.mod)
//!
//! The decoder understands the go.mod grammar well enough to reject broken
//! files: every line is a directive, optionally grouped in a `verb ( ... )`
//! block. Only `require` directives produce dependencies.

use super::{Dependency, Ecosystem, Location, Parser};
use crate::error::{ParseError, Result};
use crate::utils::split_lines;

/// Directives that are accepted but carry no dependencies
const OTHER_DIRECTIVES: &[&str] = &[
    "module",
    "go",
    "toolchain",
    "godebug",
    "exclude",
    "replace",
    "retract",
    "tool",
    "ignore",
];

/// A `require` entry as written in go.mod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Require {
    pub path: String,
    pub version: String,
    pub indirect: bool,
    /// 1-based line, as go tooling reports it
    pub line: usize,
    /// Byte column where the module path token starts
    pub start: usize,
    /// Byte column just past the version token
    pub end: usize,
}

/// Decoded go.mod: the requirements, in file order
#[derive(Debug, Clone, Default)]
pub struct ModFile {
    pub module: Option<String>,
    pub requires: Vec<Require>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    start: usize,
    end: usize,
}

impl Token {
    fn is(&self, text: &str) -> bool {
        self.text == text
    }
}

/// Tokens of one line plus its trailing `//` comment
#[derive(Debug, Default)]
struct Lexed {
    tokens: Vec<Token>,
    comment: Option<String>,
}

fn lex_line(line: &str, line_no: usize) -> Result<Lexed> {
    let bytes = line.as_bytes();
    let mut lexed = Lexed::default();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if bytes[i..].starts_with(b"//") {
            lexed.comment = Some(line[i + 2..].trim().to_string());
            break;
        }

        let start = i;
        let text = match c {
            b'(' | b')' => {
                i += 1;
                line[start..i].to_string()
            }
            b'"' => {
                let mut text = String::new();
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => {
                            return Err(ParseError::go_mod(line_no, "unterminated quoted string"));
                        }
                        Some(b'"') => break,
                        Some(b'\\') => {
                            let Some(escaped) = line.get(i + 1..).and_then(|s| s.chars().next())
                            else {
                                return Err(ParseError::go_mod(
                                    line_no,
                                    "unterminated quoted string",
                                ));
                            };
                            text.push(escaped);
                            i += 1 + escaped.len_utf8();
                        }
                        Some(_) => {
                            let Some(ch) = line[i..].chars().next() else {
                                break;
                            };
                            text.push(ch);
                            i += ch.len_utf8();
                        }
                    }
                }
                i += 1;
                text
            }
            b'`' => {
                let Some(len) = line[i + 1..].find('`') else {
                    return Err(ParseError::go_mod(line_no, "unterminated raw string"));
                };
                i += len + 2;
                line[start + 1..i - 1].to_string()
            }
            _ => {
                while i < bytes.len()
                    && !bytes[i].is_ascii_whitespace()
                    && !matches!(bytes[i], b'(' | b')' | b'"' | b'`')
                    && !bytes[i..].starts_with(b"//")
                {
                    i += 1;
                }
                line[start..i].to_string()
            }
        };
        lexed.tokens.push(Token {
            text,
            start,
            end: i,
        });
    }

    Ok(lexed)
}

fn is_indirect(comment: Option<&str>) -> bool {
    comment.is_some_and(|c| c == "indirect" || c.starts_with("indirect;"))
}

fn parse_require(args: &[Token], comment: Option<&str>, line_no: usize) -> Result<Require> {
    let [path, version] = args else {
        return Err(ParseError::go_mod(line_no, "usage: require module/path v1.2.3"));
    };
    if path.text.is_empty() {
        return Err(ParseError::go_mod(line_no, "empty module path"));
    }
    if !version.text.starts_with('v') {
        return Err(ParseError::go_mod(
            line_no,
            format!("invalid version {:?} for {}", version.text, path.text),
        ));
    }
    Ok(Require {
        path: path.text.clone(),
        version: version.text.clone(),
        indirect: is_indirect(comment),
        line: line_no,
        start: path.start,
        end: version.end,
    })
}

impl ModFile {
    /// Decodes go.mod content. Errors carry 1-based line numbers.
    pub fn parse(content: &str) -> Result<Self> {
        let mut file = ModFile::default();
        // Verb of the open block and the line it was opened on
        let mut block: Option<(String, usize)> = None;

        for (idx, line) in split_lines(content).into_iter().enumerate() {
            let line_no = idx + 1;
            let lexed = lex_line(line, line_no)?;
            let comment = lexed.comment.as_deref();
            let tokens = lexed.tokens.as_slice();
            let Some(first) = tokens.first() else {
                continue;
            };

            if block.is_some() {
                if first.is(")") {
                    if tokens.len() > 1 {
                        return Err(ParseError::go_mod(line_no, "unexpected token after )"));
                    }
                    block = None;
                } else if matches!(&block, Some((verb, _)) if verb == "require") {
                    file.requires.push(parse_require(tokens, comment, line_no)?);
                }
                continue;
            }

            let verb = first.text.as_str();
            if verb != "require" && !OTHER_DIRECTIVES.contains(&verb) {
                return Err(ParseError::go_mod(line_no, format!("unknown directive: {verb}")));
            }

            match &tokens[1..] {
                [open] if open.is("(") => block = Some((verb.to_string(), line_no)),
                [open, close] if open.is("(") && close.is(")") => {}
                args if verb == "require" => {
                    file.requires.push(parse_require(args, comment, line_no)?);
                }
                [module, ..] if verb == "module" => file.module = Some(module.text.clone()),
                _ => {}
            }
        }

        if let Some((verb, opened)) = block {
            return Err(ParseError::go_mod(opened, format!("unterminated {verb} block")));
        }
        Ok(file)
    }
}

/// Parser for Go go.mod dependency files
#[derive(Debug, Default)]
pub struct GoParser;

impl GoParser {
    pub fn new() -> Self {
        Self
    }
}

impl Parser for GoParser {
    fn parse_content(&self, file_path: &str, content: &str) -> Result<Vec<Dependency>> {
        let module = ModFile::parse(content)?;
        tracing::trace!(
            "go.mod for {} has {} requirements",
            module.module.as_deref().unwrap_or("<unnamed>"),
            module.requires.len()
        );

        Ok(module
            .requires
            .into_iter()
            .filter_map(|req| {
                if req.indirect {
                    tracing::trace!("{} {} is an indirect requirement", req.path, req.version);
                }
                let location = Location::new(req.line - 1, req.start, req.end);
                Dependency::new(Ecosystem::Go, req.path, req.version, file_path, vec![location])
            })
            .collect())
    }
}
