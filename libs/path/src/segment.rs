//! Path segments
//!
//! A segment is one step of a path expression. Its position in the expression
//! equals its nesting depth in the document.

use std::fmt;

/// Declared collection kind of a segment.
///
/// The bracket family only records what the mapping author declared; document
/// accessors walk all three kinds the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollectionKind {
    #[default]
    None,
    /// `[]` or `[n]`
    Array,
    /// `<>` or `<n>`
    List,
    /// `{}` or `{n}`
    Map,
}

impl CollectionKind {
    pub(crate) fn from_open(c: char) -> Option<Self> {
        match c {
            '[' => Some(Self::Array),
            '<' => Some(Self::List),
            '{' => Some(Self::Map),
            _ => None,
        }
    }

    pub(crate) fn close_char(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Array => Some(']'),
            Self::List => Some('>'),
            Self::Map => Some('}'),
        }
    }

    fn open_char(self) -> Option<char> {
        match self {
            Self::None => None,
            Self::Array => Some('['),
            Self::List => Some('<'),
            Self::Map => Some('{'),
        }
    }
}

/// One step of a [`PathExpression`](crate::PathExpression).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    pub name: String,
    pub prefix: Option<String>,
    pub collection: CollectionKind,
    pub index: Option<usize>,
    pub attribute: bool,
}

impl PathSegment {
    /// Plain element segment with no prefix, collection marker or attribute flag.
    pub fn element(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: None,
            collection: CollectionKind::None,
            index: None,
            attribute: false,
        }
    }

    pub fn is_collection(&self) -> bool {
        self.collection != CollectionKind::None
    }

    /// Collection segment without an explicit index.
    pub fn is_unindexed_collection(&self) -> bool {
        self.is_collection() && self.index.is_none()
    }

    /// `prefix:name`, or just `name` when unprefixed.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{}:{}", prefix, self.name),
            None => self.name.clone(),
        }
    }

    /// Copy of this segment with the given explicit index.
    pub fn with_index(&self, index: usize) -> Self {
        Self {
            index: Some(index),
            ..self.clone()
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attribute {
            write!(f, "@")?;
        }
        write!(f, "{}", self.qualified_name())?;
        if let (Some(open), Some(close)) = (self.collection.open_char(), self.collection.close_char())
        {
            write!(f, "{}", open)?;
            if let Some(index) = self.index {
                write!(f, "{}", index)?;
            }
            write!(f, "{}", close)?;
        }
        Ok(())
    }
}
