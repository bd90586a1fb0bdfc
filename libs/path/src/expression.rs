//! Parsed path expressions

use crate::error::{PathError, Result};
use crate::parser::Parser;
use crate::segment::PathSegment;
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Restartable iterator over the segments of a path.
pub type Segments<'a> = std::slice::Iter<'a, PathSegment>;

/// Immutable, ordered sequence of [`PathSegment`]s.
///
/// Index substitution methods return new expressions; the original is never
/// modified, so one parsed path can serve every iteration of a collection
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathExpression {
    segments: SmallVec<[PathSegment; 6]>,
}

impl PathExpression {
    /// Parse a path string.
    pub fn parse(input: &str) -> Result<Self> {
        Parser::new(input).parse()
    }

    pub(crate) fn from_segments(segments: SmallVec<[PathSegment; 6]>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> Segments<'_> {
        self.segments.iter()
    }

    pub fn get(&self, position: usize) -> Option<&PathSegment> {
        self.segments.get(position)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `true` for `/`.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_segment(&self) -> Option<&PathSegment> {
        self.segments.first()
    }

    pub fn last_segment(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// `true` when the path addresses an attribute.
    pub fn is_attribute(&self) -> bool {
        self.last_segment().is_some_and(|s| s.attribute)
    }

    pub fn has_collection(&self) -> bool {
        self.segments.iter().any(PathSegment::is_collection)
    }

    /// Outermost collection segment that carries no explicit index.
    pub fn first_unindexed_collection(&self) -> Option<(usize, &PathSegment)> {
        self.segments
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_unindexed_collection())
    }

    /// Copy with the segment at `position` given an explicit index.
    pub fn with_index(&self, position: usize, index: usize) -> Self {
        let mut segments = self.segments.clone();
        if let Some(seg) = segments.get_mut(position) {
            seg.index = Some(index);
        }
        Self { segments }
    }

    /// Copy with `index` substituted into every unindexed collection segment.
    pub fn with_collection_index(&self, index: usize) -> Self {
        let segments = self
            .segments
            .iter()
            .map(|s| {
                if s.is_unindexed_collection() {
                    s.with_index(index)
                } else {
                    s.clone()
                }
            })
            .collect();
        Self { segments }
    }

    /// Copy with `index` substituted into the outermost unindexed collection
    /// segment only. Deeper collections stay open for a nested expansion.
    pub fn with_first_collection_index(&self, index: usize) -> Self {
        match self.first_unindexed_collection() {
            Some((position, _)) => self.with_index(position, index),
            None => self.clone(),
        }
    }

    /// Copy keeping only the first `len` segments.
    pub fn truncate(&self, len: usize) -> Self {
        Self {
            segments: self.segments.iter().take(len).cloned().collect(),
        }
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl<'a> IntoIterator for &'a PathExpression {
    type Item = &'a PathSegment;
    type IntoIter = Segments<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_index_substitution() {
        let path = PathExpression::parse("/orders<>/items[]/sku").unwrap();

        let all = path.with_collection_index(2);
        assert_eq!(all.to_string(), "/orders<2>/items[2]/sku");

        let first = path.with_first_collection_index(1);
        assert_eq!(first.to_string(), "/orders<1>/items[]/sku");

        let again = first.with_first_collection_index(4);
        assert_eq!(again.to_string(), "/orders<1>/items[4]/sku");

        // original untouched
        assert_eq!(path.to_string(), "/orders<>/items[]/sku");
    }

    #[test]
    fn test_explicit_index_is_kept() {
        let path = PathExpression::parse("/a[3]/b<>").unwrap();
        assert_eq!(path.with_collection_index(0).to_string(), "/a[3]/b<0>");
    }

    #[test]
    fn test_segments_restartable() {
        let path = PathExpression::parse("/a/b/c").unwrap();
        let iter = path.segments();
        let names: Vec<_> = iter.clone().map(|s| s.name.as_str()).collect();
        let again: Vec<_> = iter.map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(names, again);
    }

    #[test]
    fn test_truncate() {
        let path = PathExpression::parse("/a/b<>/c").unwrap();
        assert_eq!(path.truncate(2).to_string(), "/a/b<>");
        assert_eq!(path.truncate(0).to_string(), "/");
    }
}
