//! core::path
//!
//! Hierarchical addressing for objects in the data store.
//!
//! # Format
//!
//! A [`DataPath`] is an ordered, non-empty sequence of segments. Its string
//! form joins the segments with `/`, e.g. `Triangle Geometry/Face Data/Normals`.
//! Parsing accepts a single optional leading `/`.
//!
//! # Invariants
//!
//! - A path has at least one segment
//! - Segments are non-empty and never contain `/`
//! - Equality, ordering and hashing are structural over the segments
//!
//! # Example
//!
//! ```
//! use meshpipe::core::path::DataPath;
//!
//! let geom = DataPath::parse("Triangle Geometry").unwrap();
//! let normals = geom.join("Face Data").unwrap().join("Face Normals").unwrap();
//! assert_eq!(normals.to_string(), "Triangle Geometry/Face Data/Face Normals");
//! assert_eq!(normals.parent().unwrap().name(), "Face Data");
//!
//! assert!(DataPath::parse("a//b").is_err());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Separator between path segments in the string form.
pub const SEPARATOR: char = '/';

/// Errors from path construction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("data path cannot be empty")]
    Empty,

    #[error("data path segment {index} is empty")]
    EmptySegment { index: usize },

    #[error("data path segment '{0}' cannot contain '/'")]
    InvalidSegment(String),
}

/// A validated location in a [`DataStructure`](crate::core::store::DataStructure).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DataPath(Vec<String>);

impl DataPath {
    /// Build a path from its segments.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if there are no segments or any segment is
    /// empty or contains the separator.
    pub fn new<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(PathError::Empty);
        }
        for (index, segment) in segments.iter().enumerate() {
            Self::validate_segment(segment).map_err(|e| match e {
                PathError::EmptySegment { .. } => PathError::EmptySegment { index },
                other => other,
            })?;
        }
        Ok(Self(segments))
    }

    /// Parse the `/`-separated string form.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let trimmed = s.strip_prefix(SEPARATOR).unwrap_or(s);
        if trimmed.is_empty() {
            return Err(PathError::Empty);
        }
        Self::new(trimmed.split(SEPARATOR))
    }

    fn validate_segment(segment: &str) -> Result<(), PathError> {
        if segment.is_empty() {
            return Err(PathError::EmptySegment { index: 0 });
        }
        if segment.contains(SEPARATOR) {
            return Err(PathError::InvalidSegment(segment.to_string()));
        }
        Ok(())
    }

    /// Return a new path with `segment` appended.
    pub fn join(&self, segment: impl Into<String>) -> Result<Self, PathError> {
        let segment = segment.into();
        Self::validate_segment(&segment).map_err(|e| match e {
            PathError::EmptySegment { .. } => PathError::EmptySegment {
                index: self.0.len(),
            },
            other => other,
        })?;
        let mut segments = self.0.clone();
        segments.push(segment);
        Ok(Self(segments))
    }

    /// The enclosing path, or `None` for a top-level path.
    pub fn parent(&self) -> Option<Self> {
        if self.0.len() <= 1 {
            return None;
        }
        Some(Self(self.0[..self.0.len() - 1].to_vec()))
    }

    /// The last segment.
    pub fn name(&self) -> &str {
        // Non-empty by construction.
        self.0.last().map(String::as_str).unwrap_or_default()
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments (always at least one).
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// True if `self` equals `prefix` or lies beneath it.
    pub fn starts_with(&self, prefix: &DataPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// True if `self` lies strictly beneath `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &DataPath) -> bool {
        self.0.len() > ancestor.0.len() && self.starts_with(ancestor)
    }
}

impl fmt::Display for DataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

impl FromStr for DataPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DataPath {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl TryFrom<&str> for DataPath {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<DataPath> for String {
    fn from(path: DataPath) -> Self {
        path.to_string()
    }
}
