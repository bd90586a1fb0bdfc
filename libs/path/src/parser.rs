//! Path expression parser
//!
//! Single-pass scanner over the path characters. Grammar:
//!
//! ```text
//! path             := "/" segment ("/" segment)* | "/"
//! segment          := [prefix ":"] name [collectionMarker]
//!                   | ["@"] [prefix ":"] ["@"] name
//! collectionMarker := "[" [digits] "]" | "<" [digits] ">" | "{" [digits] "}"
//! ```
//!
//! Both `prefix:@name` and `@prefix:name` are accepted for namespaced
//! attributes and produce the same segment.

use crate::error::{PathError, Result};
use crate::expression::PathExpression;
use crate::segment::{CollectionKind, PathSegment};
use smallvec::SmallVec;

const SEPARATOR: char = '/';

fn is_name_char(c: char) -> bool {
    !matches!(
        c,
        '/' | ':' | '@' | '[' | ']' | '<' | '>' | '{' | '}'
    )
}

fn is_close_char(c: char) -> bool {
    matches!(c, ']' | '>' | '}')
}

/// Parser for path expressions
pub struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            position: 0,
        }
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> PathError {
        PathError::malformed(self.input, position, reason)
    }

    /// Parse the whole input into a [`PathExpression`].
    pub fn parse(&mut self) -> Result<PathExpression> {
        if self.current() != Some(SEPARATOR) {
            return Err(self.error(0, "path must start with '/'"));
        }
        self.advance();

        let mut segments: SmallVec<[PathSegment; 6]> = SmallVec::new();

        // "/" alone addresses the document root
        if self.current().is_none() {
            return Ok(PathExpression::from_segments(segments));
        }

        loop {
            let segment = self.parse_segment()?;
            segments.push(segment);

            match self.current() {
                None => break,
                Some(SEPARATOR) => {
                    self.advance();
                    if self.current().is_none() {
                        return Err(self.error(self.position, "empty segment"));
                    }
                }
                Some(other) => {
                    return Err(self.error(self.position, format!("unexpected '{}'", other)));
                }
            }
        }

        if let Some(pos) = segments
            .iter()
            .take(segments.len().saturating_sub(1))
            .position(|s| s.attribute)
        {
            return Err(self.error(
                0,
                format!(
                    "attribute segment '{}' must be the last segment",
                    segments[pos]
                ),
            ));
        }

        Ok(PathExpression::from_segments(segments))
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.current() {
            if !is_name_char(c) {
                break;
            }
            name.push(c);
            self.advance();
        }
        name
    }

    fn parse_segment(&mut self) -> Result<PathSegment> {
        let start = self.position;
        if matches!(self.current(), None | Some(SEPARATOR)) {
            return Err(self.error(start, "empty segment"));
        }

        let mut attribute = false;
        if self.current() == Some('@') {
            attribute = true;
            self.advance();
        }

        let first = self.read_name();
        let mut prefix = None;
        let name = if self.current() == Some(':') {
            if first.is_empty() {
                return Err(self.error(self.position, "empty namespace prefix"));
            }
            self.advance();
            prefix = Some(first);

            if self.current() == Some('@') {
                if attribute {
                    return Err(self.error(self.position, "duplicate attribute marker"));
                }
                attribute = true;
                self.advance();
            }
            self.read_name()
        } else {
            first
        };

        match self.current() {
            Some('@') => return Err(self.error(self.position, "unexpected '@'")),
            Some(':') => return Err(self.error(self.position, "unexpected ':'")),
            _ => {}
        }

        if name.is_empty() {
            return Err(self.error(self.position, "empty segment name"));
        }

        let mut collection = CollectionKind::None;
        let mut index = None;
        if let Some(kind) = self.current().and_then(CollectionKind::from_open) {
            let open_pos = self.position;
            self.advance();

            let mut digits = String::new();
            while let Some(c) = self.current().filter(char::is_ascii_digit) {
                digits.push(c);
                self.advance();
            }

            let close = kind.close_char();
            match self.current() {
                c if c == close => self.advance(),
                None | Some(SEPARATOR) => {
                    return Err(self.error(open_pos, "unbalanced collection marker"));
                }
                Some(c) if is_close_char(c) => {
                    return Err(self.error(self.position, "mismatched collection marker"));
                }
                Some(_) => {
                    return Err(self.error(
                        self.position,
                        "collection index must be a non-negative integer",
                    ));
                }
            }

            if !digits.is_empty() {
                let parsed = digits
                    .parse::<usize>()
                    .map_err(|_| self.error(open_pos + 1, "collection index out of range"))?;
                index = Some(parsed);
            }
            collection = kind;
        }

        match self.current() {
            None | Some(SEPARATOR) => {}
            Some(c) if is_close_char(c) => {
                return Err(self.error(self.position, format!("unbalanced '{}'", c)));
            }
            Some(c) => {
                return Err(self.error(self.position, format!("unexpected '{}'", c)));
            }
        }

        if attribute && collection != CollectionKind::None {
            return Err(self.error(start, "attribute segment cannot be a collection"));
        }

        Ok(PathSegment {
            name,
            prefix,
            collection,
            index,
            attribute,
        })
    }
}
