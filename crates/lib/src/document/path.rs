//! Dotted field paths into JSON document bodies.
//!
//! A path is a sequence of object field names and `$` placeholders. Each `$`
//! stands for "the array element matched by the filter": when a [`Filter`]
//! is evaluated, every `ElemMatch` that succeeds records the index of the
//! element it matched, and the `$` segments of a path consume those indexes
//! in order. The first `$` refers to the outermost match.
//!
//! [`Filter`]: super::Filter

use std::fmt;

use serde_json::Value;

use super::errors::DocumentError;
use super::filter::Matches;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Descend into an object field.
    Field(String),
    /// Descend into the array element recorded by the next element match.
    Matched,
}

/// A dotted path such as `rows.$.lanes.$.janCode`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// The empty path, addressing the whole document body.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a dotted path. `$` segments become [`PathSegment::Matched`].
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('.')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "$" => PathSegment::Matched,
                name => PathSegment::Field(name.to_string()),
            })
            .collect();
        Self { segments }
    }

    /// Appends an object field segment.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    /// Appends a matched-element segment.
    pub fn matched(mut self) -> Self {
        self.segments.push(PathSegment::Matched);
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Number of `$` segments in this path.
    pub fn matched_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, PathSegment::Matched))
            .count()
    }

    /// Splits the path into its parent path and final segment.
    pub fn split_last(&self) -> Option<(FieldPath, &PathSegment)> {
        let (last, parent) = self.segments.split_last()?;
        Some((
            FieldPath {
                segments: parent.to_vec(),
            },
            last,
        ))
    }

    /// Resolves the path against `value`.
    ///
    /// Returns `Ok(None)` when a field along the way is absent or an indexed
    /// element does not exist. Fails when the path needs more element matches
    /// than `matches` recorded, or when a `$` lands on something that is not
    /// an array.
    pub fn resolve<'a>(
        &self,
        value: &'a Value,
        matches: &Matches,
    ) -> Result<Option<&'a Value>, DocumentError> {
        let mut positions = matches.positions().iter();
        let mut current = value;
        for segment in &self.segments {
            let next = match segment {
                PathSegment::Field(name) => current.as_object().and_then(|o| o.get(name)),
                PathSegment::Matched => {
                    let index = positions.next().ok_or_else(|| self.unresolved())?;
                    let array = current.as_array().ok_or_else(|| self.not_an_array())?;
                    array.get(*index)
                }
            };
            match next {
                Some(v) => current = v,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Mutable counterpart of [`FieldPath::resolve`].
    pub fn resolve_mut<'a>(
        &self,
        value: &'a mut Value,
        matches: &Matches,
    ) -> Result<Option<&'a mut Value>, DocumentError> {
        let mut positions = matches.positions().iter();
        let mut current = value;
        for segment in &self.segments {
            let next = match segment {
                PathSegment::Field(name) => current.as_object_mut().and_then(|o| o.get_mut(name)),
                PathSegment::Matched => {
                    let index = positions.next().ok_or_else(|| self.unresolved())?;
                    let array = current
                        .as_array_mut()
                        .ok_or_else(|| self.not_an_array())?;
                    array.get_mut(*index)
                }
            };
            match next {
                Some(v) => current = v,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    fn unresolved(&self) -> DocumentError {
        DocumentError::UnresolvedMatch {
            path: self.to_string(),
        }
    }

    fn not_an_array(&self) -> DocumentError {
        DocumentError::NotAnArray {
            path: self.to_string(),
        }
    }
}

impl From<&str> for FieldPath {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<&str> = self
            .segments
            .iter()
            .map(|s| match s {
                PathSegment::Field(name) => name.as_str(),
                PathSegment::Matched => "$",
            })
            .collect();
        write!(f, "{}", rendered.join("."))
    }
}
