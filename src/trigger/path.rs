use std::collections::HashMap;

use snafu::{ensure, Snafu};

/// A concrete document location such as `events/e1/likes/u1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    segments: Vec<String>,
}

impl DocumentPath {
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl std::str::FromStr for DocumentPath {
    type Err = PathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let segments: Vec<String> = input.split('/').map(str::to_owned).collect();
        ensure!(
            segments.iter().all(|segment| !segment.is_empty()),
            EmptySegmentSnafu { path: input }
        );

        Ok(DocumentPath { segments })
    }
}

impl std::fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A watched location with wildcards, written as `events/{eventId}/likes/{userId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();

        for segment in pattern.split('/') {
            ensure!(!segment.is_empty(), EmptySegmentSnafu { path: pattern });

            let segment = match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                Some("") => return EmptyParamSnafu { pattern }.fail(),
                Some(name) => Segment::Param(name.to_owned()),
                None => Segment::Literal(segment.to_owned()),
            };

            segments.push(segment);
        }

        Ok(PathPattern {
            raw: pattern.to_owned(),
            segments,
        })
    }

    /// Returns the wildcard values if `path` lies under this pattern.
    pub fn matches(&self, path: &DocumentPath) -> Option<Params> {
        if self.segments.len() != path.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, value) in self.segments.iter().zip(path.segments()) {
            match segment {
                Segment::Literal(literal) if literal == value => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), value.to_owned());
                }
            }
        }

        Some(Params(params))
    }

    /// The collection that directly holds the matched documents, `likes` for `events/{eventId}/likes/{userId}`.
    pub fn collection(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|segment| match segment {
            Segment::Literal(literal) => Some(literal.as_str()),
            Segment::Param(_) => None,
        })
    }

    /// Builds a concrete path by substituting `values` for the wildcards, in order.
    ///
    /// Returns `None` unless there is exactly one non-empty value per wildcard.
    pub fn fill<I, S>(&self, values: I) -> Option<DocumentPath>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into);
        let mut segments = Vec::with_capacity(self.segments.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(literal) => segments.push(literal.clone()),
                Segment::Param(_) => {
                    let value = values.next().filter(|value| !value.is_empty())?;
                    segments.push(value);
                }
            }
        }

        if values.next().is_some() {
            return None;
        }

        Some(DocumentPath { segments })
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Wildcard values captured from a [DocumentPath].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Params(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PathError {
    #[snafu(display("path `{path}` contains an empty segment"))]
    EmptySegment { path: String },

    #[snafu(display("pattern `{pattern}` contains a wildcard without a name"))]
    EmptyParam { pattern: String },
}
