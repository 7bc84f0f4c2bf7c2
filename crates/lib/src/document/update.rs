//! Document updates.
//!
//! An [`Update`] is an ordered list of operations applied to a single document
//! body. Paths may contain `$` segments, which resolve through the [`Matches`]
//! recorded by the filter that selected the document.

use serde_json::Value;

use super::errors::DocumentError;
use super::filter::{Filter, Matches};
use super::path::{FieldPath, PathSegment};

/// A single update operation.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOp {
    /// Replace (or create) the value at `path`.
    Set { path: FieldPath, value: Value },
    /// Append `value` to the end of the array at `path`.
    Push { path: FieldPath, value: Value },
    /// Remove every element of the array at `path` that satisfies `filter`.
    Pull { path: FieldPath, filter: Filter },
}

/// An ordered set of update operations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Update {
    ops: Vec<UpdateOp>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Set {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    pub fn push(mut self, path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        self.ops.push(UpdateOp::Push {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    pub fn pull(mut self, path: impl Into<FieldPath>, filter: Filter) -> Self {
        self.ops.push(UpdateOp::Pull {
            path: path.into(),
            filter,
        });
        self
    }

    /// Applies every operation to `body`, in order.
    ///
    /// Returns whether the body changed. On error the body may be partially
    /// updated; callers apply updates to a copy and discard it on failure.
    pub fn apply(&self, body: &mut Value, matches: &Matches) -> Result<bool, DocumentError> {
        let mut changed = false;
        for op in &self.ops {
            changed |= match op {
                UpdateOp::Set { path, value } => apply_set(body, path, value, matches)?,
                UpdateOp::Push { path, value } => {
                    let array = push_target(body, path, matches)?;
                    array.push(value.clone());
                    true
                }
                UpdateOp::Pull { path, filter } => {
                    let array = target_array(body, path, matches)?;
                    let before = array.len();
                    array.retain(|element| !filter.matches_value(element));
                    array.len() != before
                }
            };
        }
        Ok(changed)
    }
}

fn apply_set(
    body: &mut Value,
    path: &FieldPath,
    value: &Value,
    matches: &Matches,
) -> Result<bool, DocumentError> {
    let (parent_path, last) = path.split_last().ok_or(DocumentError::EmptyPath)?;

    // The parent consumes the leading `$` positions; a trailing `$` takes the next one.
    let parent = parent_path
        .resolve_mut(body, matches)?
        .ok_or_else(|| DocumentError::MissingParent {
            path: path.to_string(),
        })?;

    let slot = match last {
        PathSegment::Field(name) => {
            let object = parent
                .as_object_mut()
                .ok_or_else(|| DocumentError::NotAnObject {
                    path: parent_path.to_string(),
                })?;
            object.entry(name.clone()).or_insert(Value::Null)
        }
        PathSegment::Matched => {
            let index = matches
                .positions()
                .get(parent_path.matched_count())
                .copied()
                .ok_or_else(|| DocumentError::UnresolvedMatch {
                    path: path.to_string(),
                })?;
            let array = parent
                .as_array_mut()
                .ok_or_else(|| DocumentError::NotAnArray {
                    path: parent_path.to_string(),
                })?;
            array
                .get_mut(index)
                .ok_or_else(|| DocumentError::MissingParent {
                    path: path.to_string(),
                })?
        }
    };

    if *slot == *value {
        return Ok(false);
    }
    *slot = value.clone();
    Ok(true)
}

fn target_array<'a>(
    body: &'a mut Value,
    path: &FieldPath,
    matches: &Matches,
) -> Result<&'a mut Vec<Value>, DocumentError> {
    path.resolve_mut(body, matches)?
        .ok_or_else(|| DocumentError::MissingParent {
            path: path.to_string(),
        })?
        .as_array_mut()
        .ok_or_else(|| DocumentError::NotAnArray {
            path: path.to_string(),
        })
}

// A missing array field is created empty before pushing.
fn push_target<'a>(
    body: &'a mut Value,
    path: &FieldPath,
    matches: &Matches,
) -> Result<&'a mut Vec<Value>, DocumentError> {
    if let Some((parent_path, PathSegment::Field(name))) = path.split_last()
        && let Some(Value::Object(object)) = parent_path.resolve_mut(body, matches)?
    {
        object
            .entry(name.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
    }
    target_array(body, path, matches)
}
