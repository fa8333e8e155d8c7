//! Symbolic addresses into a document
//!
//! An [`EditorPath`] is a root-to-target sequence of [`PathSegment`]s. Field
//! segments select map entries, index segments select list positions, and
//! stable references select list elements by identity through the
//! [`KeyRegistry`](crate::core::keys::KeyRegistry). On the wire a path is a
//! JSON array mixing strings, integers and `{"key": ...}` objects.

use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque identifier for a list element, issued by a key registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct StableKey(u64);

impl StableKey {
    pub(crate) const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw counter value, unique within the issuing registry
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

/// Error for key strings that were not issued by a registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed stable key: '{0}'")]
pub struct ParseStableKeyError(String);

impl FromStr for StableKey {
    type Err = ParseStableKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('k')
            .and_then(|digits| digits.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| ParseStableKeyError(s.to_string()))
    }
}

impl From<StableKey> for String {
    fn from(key: StableKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for StableKey {
    type Error = ParseStableKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// One step of an [`EditorPath`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Select a map entry by name
    Field(String),
    /// Select a list element by position
    Index(usize),
    /// Select a list element by stable identity
    StableRef { key: StableKey },
}

impl PathSegment {
    #[must_use]
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Self::Field(name) => Some(name),
            _ => None,
        }
    }

    /// True for segments that address a list element
    #[must_use]
    pub const fn is_positional(&self) -> bool {
        matches!(self, Self::Index(_) | Self::StableRef { .. })
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
            Self::StableRef { key } => write!(f, "{{{key}}}"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<StableKey> for PathSegment {
    fn from(key: StableKey) -> Self {
        Self::StableRef { key }
    }
}

/// Address of a value inside a document, root first
///
/// # Examples
///
/// ```
/// use fx_editor::{editor_path, EditorPath, PathSegment};
///
/// let path = EditorPath::root().field("effects").field("blur").index(2);
/// assert_eq!(path, editor_path!["effects", "blur", 2]);
/// assert_eq!(path.to_string(), "effects/blur/2");
/// assert_eq!(path.last(), Some(&PathSegment::Index(2)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorPath {
    segments: Vec<PathSegment>,
}

impl EditorPath {
    /// The empty path, addressing the document root
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.segments.push(PathSegment::Field(name.into()));
        self
    }

    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(PathSegment::Index(index));
        self
    }

    #[must_use]
    pub fn key(mut self, key: StableKey) -> Self {
        self.segments.push(PathSegment::StableRef { key });
        self
    }

    /// Path extended by one segment
    #[must_use]
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push(segment.into());
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn iter(&self) -> core::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Parent path; `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.split_last().map(|(parent, _)| parent)
    }

    /// Parent path and final segment; `None` for the root
    #[must_use]
    pub fn split_last(&self) -> Option<(Self, &PathSegment)> {
        self.segments
            .split_last()
            .map(|(last, rest)| (Self::new(rest.to_vec()), last))
    }

    /// Whether `self` is `other` or one of its ancestors
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl fmt::Display for EditorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl From<Vec<PathSegment>> for EditorPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self::new(segments)
    }
}

impl FromIterator<PathSegment> for EditorPath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a EditorPath {
    type Item = &'a PathSegment;
    type IntoIter = core::slice::Iter<'a, PathSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Build an [`EditorPath`] from segment expressions
///
/// String expressions become field segments, `usize` expressions become
/// index segments and [`StableKey`]s become stable references.
///
/// # Examples
///
/// ```
/// use fx_editor::{editor_path, EditorPath};
///
/// assert_eq!(editor_path![], EditorPath::root());
/// assert_eq!(editor_path!["filters", "grain", 0].len(), 3);
/// ```
#[macro_export]
macro_rules! editor_path {
    () => {
        $crate::core::path::EditorPath::root()
    };
    ($($segment:expr),+ $(,)?) => {
        $crate::core::path::EditorPath::new(vec![
            $($crate::core::path::PathSegment::from($segment)),+
        ])
    };
}
