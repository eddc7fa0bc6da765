//! Parsing of caller-supplied property path strings.
//!
//! `validate_property` and `validate_value` take dotted paths such as
//! `address.city` or `items[1]`. Segments are names with an optional
//! `[index]` or `[key]` qualifier.

use thiserror::Error;

use crate::ElementIndex;

/// Errors that can occur while parsing a property path string.
#[derive(Debug, Error)]
pub enum PathParseError {
    #[error("path is empty")]
    Empty,

    #[error("empty segment at offset {0}")]
    EmptySegment(usize),

    #[error("unterminated '[' at offset {0}")]
    UnterminatedIndex(usize),

    #[error("empty index at offset {0}")]
    EmptyIndex(usize),

    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
}

/// One parsed segment of a property path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    /// Property name.
    pub name: String,
    /// Optional container qualifier. All-digit qualifiers parse as
    /// positions, anything else as a map key.
    pub index: Option<ElementIndex>,
}

/// Parse a dotted property path into its segments.
pub fn parse_property_path(path: &str) -> Result<Vec<PathSegment>, PathParseError> {
    if path.is_empty() {
        return Err(PathParseError::Empty);
    }

    let mut segments = Vec::new();
    let mut chars = path.char_indices().peekable();

    loop {
        // Segment name
        let mut name = String::new();
        let start = chars.peek().map(|(i, _)| *i).unwrap_or(path.len());
        while let Some((_, c)) = chars.peek() {
            if *c == '.' || *c == '[' {
                break;
            }
            name.push(*c);
            chars.next();
        }
        if name.is_empty() {
            return Err(PathParseError::EmptySegment(start));
        }

        // Optional [index] qualifier
        let mut index = None;
        if let Some((open, '[')) = chars.peek().copied() {
            chars.next();
            let mut raw = String::new();
            let mut closed = false;
            for (_, c) in chars.by_ref() {
                if c == ']' {
                    closed = true;
                    break;
                }
                raw.push(c);
            }
            if !closed {
                return Err(PathParseError::UnterminatedIndex(open));
            }
            if raw.is_empty() {
                return Err(PathParseError::EmptyIndex(open));
            }
            index = Some(match raw.parse::<usize>() {
                Ok(position) => ElementIndex::Position(position),
                Err(_) => ElementIndex::Key(raw),
            });
        }

        segments.push(PathSegment { name, index });

        match chars.next() {
            None => break,
            Some((_, '.')) => continue,
            Some((offset, character)) => {
                return Err(PathParseError::UnexpectedCharacter { character, offset })
            }
        }
    }

    Ok(segments)
}
