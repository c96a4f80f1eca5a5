//! Line classification for the profile database - no I/O, fully testable.
//!
//! The database is a flat text file of `[device name]` headers, each
//! followed by `key = value` lines and `keyword:` directives:
//!
//! ```text
//! ; comment
//! [Linux: Logitech Gamepad F310]
//! plugged = True
//! X Axis = axis(0-,0+)
//! __NextController:
//! ```
//!
//! [`ProfileLines`] walks the text once, front to back, handing out
//! borrowed slices of the original buffer.

use std::fs;
use std::path::Path;

use strum::{Display, EnumString, IntoStaticStr};

use crate::config::AutopadError;

/// Control directives understood inside a profile block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
pub enum Keyword {
    /// Move on to the next controller slot.
    #[strum(serialize = "__NextController:")]
    NextController,
}

/// What a single database line turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Blank,
    Comment,
    /// Text between `[` and `]`, stripped.
    SectionHeader(&'a str),
    Parameter {
        key: &'a str,
        value: &'a str,
    },
    Keyword(Keyword),
    /// Ends in `:` but is not a known directive.
    UnknownKeyword(&'a str),
    Invalid(&'a str),
}

/// A classified line with its 1-based line number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub number: usize,
    pub kind: LineKind<'a>,
}

/// Strip spaces, tabs, CR and LF from both ends.
pub fn strip_space(s: &str) -> &str {
    s.trim_matches(|c| matches!(c, ' ' | '\t' | '\r' | '\n'))
}

/// Classify one raw line (without its terminating `\n`).
pub fn classify_line(raw: &str) -> LineKind<'_> {
    let line = strip_space(raw);

    if line.is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with(';') || line.starts_with('#') {
        return LineKind::Comment;
    }

    if let Some(inner) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
        return LineKind::SectionHeader(strip_space(inner));
    }

    if let Some((key, value)) = line.split_once('=') {
        return LineKind::Parameter {
            key: strip_space(key),
            value: strip_space(value),
        };
    }

    if line.ends_with(':') {
        return match line.parse::<Keyword>() {
            Ok(keyword) => LineKind::Keyword(keyword),
            Err(_) => LineKind::UnknownKeyword(line),
        };
    }

    LineKind::Invalid(line)
}

/// Lazy, restartable iterator over the classified lines of a database.
#[derive(Debug, Clone)]
pub struct ProfileLines<'a> {
    text: &'a str,
    pos: usize,
    number: usize,
}

impl<'a> ProfileLines<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            number: 0,
        }
    }
}

impl<'a> Iterator for ProfileLines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.text.get(self.pos..).filter(|r| !r.is_empty())?;
        let (raw, consumed) = match rest.find('\n') {
            Some(end) => (rest.get(..end)?, end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        self.number += 1;
        Some(Line {
            number: self.number,
            kind: classify_line(raw),
        })
    }
}

/// One item in the body of a profile block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockItem {
    Entry { key: String, value: String },
    Keyword(Keyword),
}

/// A `[header]` together with the entries and directives below it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileBlock {
    pub header: String,
    pub items: Vec<BlockItem>,
}

impl ProfileBlock {
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.items.iter().filter_map(|item| match item {
            BlockItem::Entry { key, value } => Some((key.as_str(), value.as_str())),
            BlockItem::Keyword(_) => None,
        })
    }

    pub fn keywords(&self) -> impl Iterator<Item = Keyword> + '_ {
        self.items.iter().filter_map(|item| match item {
            BlockItem::Keyword(k) => Some(*k),
            BlockItem::Entry { .. } => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The profile database text, loaded once and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProfileDatabase {
    text: String,
}

impl ProfileDatabase {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read the whole database file in one go. Invalid UTF-8 is replaced,
    /// not rejected.
    pub fn load(path: &Path) -> Result<Self, AutopadError> {
        let bytes = fs::read(path).map_err(|e| AutopadError::DatabaseReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self {
            text: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> ProfileLines<'_> {
        ProfileLines::new(&self.text)
    }

    /// Group the database into blocks. Lines ahead of the first header,
    /// comments and malformed lines are left out.
    pub fn blocks(&self) -> Vec<ProfileBlock> {
        let mut blocks: Vec<ProfileBlock> = Vec::new();
        for line in self.lines() {
            match line.kind {
                LineKind::SectionHeader(header) => blocks.push(ProfileBlock {
                    header: header.to_string(),
                    items: Vec::new(),
                }),
                LineKind::Parameter { key, value } => {
                    if let Some(block) = blocks.last_mut() {
                        block.items.push(BlockItem::Entry {
                            key: key.to_string(),
                            value: value.to_string(),
                        });
                    }
                }
                LineKind::Keyword(keyword) => {
                    if let Some(block) = blocks.last_mut() {
                        block.items.push(BlockItem::Keyword(keyword));
                    }
                }
                LineKind::Blank
                | LineKind::Comment
                | LineKind::UnknownKeyword(_)
                | LineKind::Invalid(_) => {}
            }
        }
        blocks
    }
}
