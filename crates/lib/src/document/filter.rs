//! Document filters.
//!
//! A [`Filter`] is evaluated against a whole [`Document`]. Evaluation yields
//! [`Matches`]: the positions of the array elements picked by each successful
//! `ElemMatch`, outermost first. Update and projection paths consume those
//! positions through their `$` segments.

use serde_json::Value;

use super::Document;
use super::path::FieldPath;

/// Array positions recorded while evaluating a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matches {
    positions: Vec<usize>,
}

impl Matches {
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

/// A predicate over a document.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document.
    All,
    /// Matches the document whose business key equals the value.
    Key(String),
    /// The value at `path` equals `value`.
    Eq { path: FieldPath, value: Value },
    /// The string at `path` contains `needle`.
    Contains { path: FieldPath, needle: String },
    /// Some element of the array at `path` satisfies `filter`.
    ///
    /// The first such element is recorded for `$` resolution.
    ElemMatch { path: FieldPath, filter: Box<Filter> },
    And(Vec<Filter>),
    /// The first satisfied branch wins and contributes its matches.
    Or(Vec<Filter>),
    /// Negation. Matches recorded inside are discarded.
    Not(Box<Filter>),
}

impl Filter {
    pub fn key(key: impl ToString) -> Self {
        Filter::Key(key.to_string())
    }

    pub fn equals(path: impl Into<FieldPath>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn contains(path: impl Into<FieldPath>, needle: impl Into<String>) -> Self {
        Filter::Contains {
            path: path.into(),
            needle: needle.into(),
        }
    }

    pub fn elem_match(path: impl Into<FieldPath>, filter: Filter) -> Self {
        Filter::ElemMatch {
            path: path.into(),
            filter: Box::new(filter),
        }
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            Filter::All => other,
            first => Filter::And(vec![first, other]),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    /// Evaluates the filter against a document.
    ///
    /// Returns `None` when the document does not match.
    pub fn evaluate(&self, doc: &Document) -> Option<Matches> {
        let mut positions = Vec::new();
        if self.eval(Some(doc.key()), doc.body(), &mut positions) {
            Some(Matches { positions })
        } else {
            None
        }
    }

    /// Evaluates the filter against a bare value, such as an array element.
    ///
    /// `Key` filters never match here.
    pub fn matches_value(&self, value: &Value) -> bool {
        self.eval(None, value, &mut Vec::new())
    }

    /// The business key this filter pins, if it requires one.
    ///
    /// Backends use this to narrow the candidate set before evaluation.
    pub fn key_hint(&self) -> Option<&str> {
        match self {
            Filter::Key(key) => Some(key),
            Filter::And(filters) => filters.iter().find_map(|f| f.key_hint()),
            _ => None,
        }
    }

    fn eval(&self, key: Option<&str>, value: &Value, positions: &mut Vec<usize>) -> bool {
        match self {
            Filter::All => true,
            Filter::Key(expected) => key == Some(expected.as_str()),
            Filter::Eq { path, value: expected } => {
                lookup(path, value).is_some_and(|actual| actual == expected)
            }
            Filter::Contains { path, needle } => lookup(path, value)
                .and_then(Value::as_str)
                .is_some_and(|s| s.contains(needle.as_str())),
            Filter::ElemMatch { path, filter } => {
                let Some(elements) = lookup(path, value).and_then(Value::as_array) else {
                    return false;
                };
                for (index, element) in elements.iter().enumerate() {
                    let mark = positions.len();
                    positions.push(index);
                    if filter.eval(None, element, positions) {
                        return true;
                    }
                    positions.truncate(mark);
                }
                false
            }
            Filter::And(filters) => {
                let mark = positions.len();
                let all = filters.iter().all(|f| f.eval(key, value, positions));
                if !all {
                    positions.truncate(mark);
                }
                all
            }
            Filter::Or(filters) => {
                for filter in filters {
                    let mark = positions.len();
                    if filter.eval(key, value, positions) {
                        return true;
                    }
                    positions.truncate(mark);
                }
                false
            }
            Filter::Not(filter) => !filter.eval(key, value, &mut Vec::new()),
        }
    }
}

// Filter paths never contain `$`; a path that needs one simply does not match.
fn lookup<'a>(path: &FieldPath, value: &'a Value) -> Option<&'a Value> {
    path.resolve(value, &Matches::default()).ok().flatten()
}
