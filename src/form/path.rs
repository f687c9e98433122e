use std::fmt::{Display, Formatter};
use std::str::FromStr;

use thiserror::Error;

use super::validation::FieldKey;

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum PathSegment {
    Field(String),
    /// Array member addressed by its key-selector identity.
    Member(String),
    /// Array member addressed by position; resolved to a key before errors are attached.
    Index(usize),
}

/// Address of a value inside a form value.
///
/// Text syntax: `figures[#fig-2].quantity` selects by member key,
/// `figures[0].quantity` by position. `From<&str>` builds a single-field
/// path without parsing; use [`str::parse`] for the full syntax.
#[derive(Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    pub fn member(mut self, key: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Member(key.into()));
        self
    }

    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub(crate) fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

impl From<&str> for FieldPath {
    fn from(name: &str) -> Self {
        FieldPath::new().field(name)
    }
}

impl From<String> for FieldPath {
    fn from(name: String) -> Self {
        FieldPath::new().field(name)
    }
}

impl From<FieldKey> for FieldPath {
    fn from(key: FieldKey) -> Self {
        FieldPath::new().field(key.as_str())
    }
}

impl From<&FieldPath> for FieldPath {
    fn from(path: &FieldPath) -> Self {
        path.clone()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if position == 0 => f.write_str(name)?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Member(key) => write!(f, "[#{key}]")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PathParseError {
    #[error("field path is empty")]
    Empty,
    #[error("empty field name in `{0}`")]
    EmptyField(String),
    #[error("empty member key in `{0}`")]
    EmptyKey(String),
    #[error("unclosed `[` in `{0}`")]
    Unclosed(String),
    #[error("invalid member index `{index}` in `{input}`")]
    InvalidIndex { input: String, index: String },
    #[error("unexpected `]` in `{0}`")]
    Unexpected(String),
}

impl FromStr for FieldPath {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(PathParseError::Empty);
        }

        let mut segments = Vec::new();
        let mut rest = input;
        loop {
            let end = rest.find(['.', '[']).unwrap_or(rest.len());
            let name = &rest[..end];
            if name.is_empty() {
                return Err(PathParseError::EmptyField(input.to_owned()));
            }
            if name.contains(']') {
                return Err(PathParseError::Unexpected(input.to_owned()));
            }
            segments.push(PathSegment::Field(name.to_owned()));
            rest = &rest[end..];

            while let Some(after) = rest.strip_prefix('[') {
                let close = after
                    .find(']')
                    .ok_or_else(|| PathParseError::Unclosed(input.to_owned()))?;
                let inner = &after[..close];
                let segment = match inner.strip_prefix('#') {
                    Some("") => return Err(PathParseError::EmptyKey(input.to_owned())),
                    Some(key) => PathSegment::Member(key.to_owned()),
                    None => PathSegment::Index(inner.parse().map_err(|_| {
                        PathParseError::InvalidIndex {
                            input: input.to_owned(),
                            index: inner.to_owned(),
                        }
                    })?),
                };
                segments.push(segment);
                rest = &after[close + 1..];
            }

            if rest.is_empty() {
                break;
            }
            match rest.strip_prefix('.') {
                Some(next) => rest = next,
                None => return Err(PathParseError::Unexpected(input.to_owned())),
            }
        }

        Ok(FieldPath { segments })
    }
}
