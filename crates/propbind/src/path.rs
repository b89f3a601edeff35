//! Property paths.

use std::fmt;
use std::rc::Rc;

/// Ordered sequence of property names, walked from a root object.
///
/// Segments are shared, so the suffixes a path watch hands to its nested
/// watches are cheap to clone.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct PropertyPath {
    segments: Rc<[String]>,
}

impl PropertyPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Split `"user.profile.name"` on dots. An empty string yields an empty
    /// path.
    #[must_use]
    pub fn parse_dotted(dotted: &str) -> Self {
        if dotted.is_empty() {
            return Self::default();
        }
        Self::new(dotted.split('.'))
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Debug for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.segments.iter()).finish()
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&[&str]> for PropertyPath {
    fn from(segments: &[&str]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for PropertyPath {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

impl<const N: usize> From<&[&str; N]> for PropertyPath {
    fn from(segments: &[&str; N]) -> Self {
        Self::new(segments.iter().copied())
    }
}

impl From<Vec<String>> for PropertyPath {
    fn from(segments: Vec<String>) -> Self {
        Self::new(segments)
    }
}

impl From<&[String]> for PropertyPath {
    fn from(segments: &[String]) -> Self {
        Self::new(segments.iter().cloned())
    }
}

impl From<&PropertyPath> for PropertyPath {
    fn from(path: &PropertyPath) -> Self {
        path.clone()
    }
}
